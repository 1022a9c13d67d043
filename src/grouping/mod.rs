pub mod algorithm;
pub mod config;

pub use algorithm::group_events;
pub use config::GroupingConfig;
