use eframe::egui::{RichText, Ui};
use egui_extras::{Column, TableBuilder};

use rusty_cycler::data::report;

use crate::state::AppState;

// ---------------------------------------------------------------------------
// Results table (central panel, top)
// ---------------------------------------------------------------------------

/// Render the per-cycle results table.
pub fn results_table(ui: &mut Ui, state: &AppState) {
    let Some(analysis) = &state.analysis else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a battery data file  (File → Open…)");
        });
        return;
    };

    let headers = report::headers(analysis.mode);
    let rows = &state.table_rows;

    TableBuilder::new(ui)
        .striped(true)
        .resizable(true)
        .columns(Column::auto().at_least(90.0), headers.len())
        .header(22.0, |mut header| {
            for h in &headers {
                header.col(|ui| {
                    ui.label(RichText::new(*h).strong());
                });
            }
        })
        .body(|body| {
            body.rows(20.0, rows.len(), |mut row| {
                let cells = &rows[row.index()];
                for cell in cells {
                    row.col(|ui| {
                        ui.label(cell.as_str());
                    });
                }
            });
        });
}
