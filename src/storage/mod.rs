pub mod index;
pub mod store;

pub use index::{GuideSummary, LibraryIndex, LIBRARY_VERSION};
pub use store::{safe_id, GuideStore};
