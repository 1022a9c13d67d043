pub mod history;
pub mod merge;
pub mod ops;

pub use history::History;
pub use merge::{merge_steps, MergeOptions, ScreenshotStrategy};
pub use ops::{
    add_annotation_to_step, add_step_to_guide, create_annotation, create_guide, create_step,
    delete_step, deserialize_guide, remove_annotation_from_step, reorder_steps, serialize_guide,
    update_step, update_step_screenshot, StepPatch,
};
