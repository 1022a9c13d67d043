pub mod annotation;
pub mod guide;
pub mod step;
pub mod validate;

pub use annotation::{Annotation, AnnotationType, Point};
pub use guide::{Guide, GuideMetadata, GuideSource, SCHEMA_VERSION};
pub use step::{ActionType, CaptureSource, Coordinates, Screenshot, Step, TargetMetadata};
pub use validate::{check_guide, validate_guide};
