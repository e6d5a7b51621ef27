//! Per-cycle ESR and efficiency metrics from battery cycler logs.

pub mod data;

pub use data::error::AnalysisError;
pub use data::model::{Analysis, CycleMetrics, Mode, SummaryMetrics};
pub use data::pipeline::process;
