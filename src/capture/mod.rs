pub mod events;
pub mod exclusions;
pub mod session;
pub mod synthesize;

pub use events::{CapturedEvent, EventTarget};
pub use exclusions::{should_exclude_capture, CaptureContext, ExclusionConfig};
pub use session::{CaptureSession, GuideHandle};
pub use synthesize::{detect_navigation, synthesize_step, CaptureOptions, MASK_PLACEHOLDER};
