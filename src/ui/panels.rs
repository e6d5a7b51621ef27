use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use rusty_cycler::Mode;
use rusty_cycler::data::report::{self, DEFAULT_EXPORT_NAME};

use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – summary and plot series
// ---------------------------------------------------------------------------

/// Render the left panel: summary scalars and the series checkboxes.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Summary");
    ui.separator();

    let Some(analysis) = &state.analysis else {
        match state.error_details() {
            Some(details) => {
                ui.label(RichText::new(details).color(Color32::RED));
            }
            None => {
                ui.label("No results.");
            }
        }
        return;
    };

    for line in report::summary_lines(&analysis.summary) {
        ui.label(RichText::new(line).strong());
    }
    ui.add_space(8.0);

    ui.heading("Plot");
    ui.separator();

    let names: Vec<&'static str> = report::headers(analysis.mode).into_iter().skip(1).collect();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for name in names {
                let mut checked = state.plotted.contains(name);
                let text = RichText::new(name).color(state.palette.color_for(name));
                if ui.checkbox(&mut checked, text).changed() {
                    state.toggle_series(name);
                }
            }
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            let can_export = state.analysis.is_some();
            if ui.add_enabled(can_export, egui::Button::new("Export…")).clicked() {
                save_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        for mode in [Mode::EsrOnly, Mode::Full] {
            if ui
                .selectable_label(state.mode == mode, mode.to_string())
                .clicked()
            {
                state.set_mode(mode);
            }
        }

        ui.separator();

        if let Some(msg) = &state.status_message {
            let color = if state.is_error { Color32::RED } else { Color32::GRAY };
            // Dialog-style messages span several lines; keep the bar to one.
            let first = msg.lines().next().unwrap_or_default();
            ui.label(RichText::new(first).color(color)).on_hover_text(msg.as_str());
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Select a Battery Data File")
        .add_filter("Supported files", &["xlsx", "xlsm", "xls", "ods", "csv", "json", "parquet"])
        .add_filter("Excel files", &["xlsx", "xlsm", "xls"])
        .add_filter("CSV", &["csv"])
        .add_filter("All files", &["*"])
        .pick_file();

    if let Some(path) = file {
        state.load(&path);
    }
}

pub fn save_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Save Results As")
        .set_file_name(DEFAULT_EXPORT_NAME)
        .add_filter("Excel files", &["xlsx"])
        .add_filter("CSV files", &["csv"])
        .save_file();

    if let Some(path) = file {
        state.export_to(&path);
    }
}
