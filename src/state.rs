use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use rusty_cycler::data::pipeline::process;
use rusty_cycler::data::report;
use rusty_cycler::{Analysis, Mode};

use crate::color::SeriesPalette;

const DEFAULT_SERIES: &str = "ESR (Ω)";

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Which metric set to compute.
    pub mode: Mode,

    /// File of the last load attempt.
    pub source_path: Option<PathBuf>,

    /// Result of the last successful run (None after an error).
    pub analysis: Option<Analysis>,

    /// Rounded table cells for the results view (cached).
    pub table_rows: Vec<Vec<String>>,

    /// Result columns shown in the plot.
    pub plotted: BTreeSet<String>,

    /// Colour per result column.
    pub palette: SeriesPalette,

    /// Status line; `is_error` selects the colour.
    pub status_message: Option<String>,
    pub is_error: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            mode: Mode::default(),
            source_path: None,
            analysis: None,
            table_rows: Vec::new(),
            plotted: BTreeSet::from([DEFAULT_SERIES.to_string()]),
            palette: SeriesPalette::new(&report::headers(Mode::Full)[1..]),
            status_message: None,
            is_error: false,
        }
    }
}

impl AppState {
    /// Run the pipeline on `path`. Previous results are discarded first, so an
    /// error never sits next to a table from an earlier file.
    pub fn load(&mut self, path: &Path) {
        self.clear_results();
        self.source_path = Some(path.to_path_buf());

        match process(path, self.mode) {
            Ok(analysis) => {
                log::info!("Analysed {} cycles from {}", analysis.len(), path.display());
                self.set_analysis(analysis);
                self.status_message = Some(format!("Loaded: {}", display_name(path)));
            }
            Err(e) => {
                log::error!("Failed to process {}: {e}", path.display());
                self.status_message = Some(e.user_message());
                self.is_error = true;
            }
        }
    }

    /// Re-run the current file when the mode changes.
    pub fn set_mode(&mut self, mode: Mode) {
        if self.mode == mode {
            return;
        }
        self.mode = mode;
        if let Some(path) = self.source_path.clone() {
            self.load(&path);
        }
    }

    fn set_analysis(&mut self, analysis: Analysis) {
        self.table_rows = report::display_rows(&analysis);
        self.analysis = Some(analysis);
        self.is_error = false;
    }

    /// Drop table, summary and status.
    pub fn clear_results(&mut self) {
        self.analysis = None;
        self.table_rows.clear();
        self.status_message = None;
        self.is_error = false;
    }

    /// Write the current results; reports the outcome in the status line.
    pub fn export_to(&mut self, path: &Path) {
        let Some(analysis) = &self.analysis else {
            self.status_message = Some("There is no data to export. Please load a file first.".into());
            self.is_error = true;
            return;
        };
        match report::export(analysis, path) {
            Ok(written) => {
                self.status_message = Some(format!("Results saved to {}", written.display()));
                self.is_error = false;
            }
            Err(e) => {
                log::error!("Export failed: {e:#}");
                self.status_message = Some(format!("Export error: {e:#}"));
                self.is_error = true;
            }
        }
    }

    /// Full text of the current error, if the last action failed.
    pub fn error_details(&self) -> Option<&str> {
        self.status_message.as_deref().filter(|_| self.is_error)
    }

    /// Toggle a result column in the plot.
    pub fn toggle_series(&mut self, name: &str) {
        if !self.plotted.remove(name) {
            self.plotted.insert(name.to_string());
        }
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
