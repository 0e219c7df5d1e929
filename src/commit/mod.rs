pub mod apply;
pub mod export;
pub mod plan;

pub use apply::{execute, CommitReport, FsRelocator, OverwriteAnswer, OverwritePrompt, Relocator, SideEffectFault};
pub use export::{GeoJsonExporter, PointExporter};
pub use plan::{build_plan, CommitPlan, ExportJob, GroupPlan, PointRecord, Relocation};
