use thiserror::Error;

use super::filter::StepClass;

/// Whole-file failures of one pipeline invocation.
///
/// Per-cell problems (non-numeric cells, zero denominators) never show up here;
/// they degrade to absent values inside the table.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalysisError {
    #[error("could not read input file: {0}")]
    FileAccess(String),
    #[error("could not find required columns: {}", format_missing(.missing))]
    Schema { missing: Vec<String> },
    #[error("no '{0}' steps found")]
    NoMatchingSteps(StepClass),
    #[error("no cycle has complete charge/discharge data")]
    EmptyResult,
}

fn format_missing(missing: &[String]) -> String {
    missing.join("; ")
}

impl AnalysisError {
    /// Multi-line message for dialogs and the CLI.
    pub fn user_message(&self) -> String {
        match self {
            AnalysisError::Schema { missing } => {
                let mut msg = String::from(
                    "Could not find required columns.\nPlease ensure your file has columns containing:",
                );
                for m in missing {
                    msg.push_str("\n- ");
                    msg.push_str(m);
                }
                msg
            }
            other => {
                let mut msg = other.to_string();
                if let Some(first) = msg.get_mut(0..1) {
                    first.make_ascii_uppercase();
                }
                msg
            }
        }
    }
}
