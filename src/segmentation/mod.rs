pub mod algorithm;
pub mod category;
pub mod config;
pub mod error;
pub mod naming;

pub use algorithm::{segment_captures, Group, Partition, UNSPLIT_GROUP_NAME};
pub use category::{CategoryBucket, CategoryRule, ExtensionRule};
pub use config::{ActionMode, Policy, ThresholdUnit};
pub use error::PolicyError;
