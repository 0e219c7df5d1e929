pub mod error;
pub mod gaps;
pub mod store;

pub use error::{CaptureError, SkippedRow};
pub use gaps::{median, GapSeries, GapStats};
pub use store::CaptureStore;
