use eframe::egui::Ui;
use egui_plot::{Legend, Line, Plot, PlotPoints, Points};

use rusty_cycler::data::report;

use crate::state::AppState;

// ---------------------------------------------------------------------------
// Per-cycle plot (central panel, bottom)
// ---------------------------------------------------------------------------

/// Plot the selected result columns against cycle index.
pub fn cycle_plot(ui: &mut Ui, state: &AppState) {
    let Some(analysis) = &state.analysis else {
        return;
    };

    let series = report::series(analysis);

    Plot::new("cycle_plot")
        .legend(Legend::default())
        .x_axis_label("Cycle Index")
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            for (name, points) in series {
                if !state.plotted.contains(name) || points.is_empty() {
                    continue;
                }
                let color = state.palette.color_for(name);

                plot_ui.line(
                    Line::new(PlotPoints::from(points.clone()))
                        .name(name)
                        .color(color)
                        .width(1.5),
                );
                plot_ui.points(
                    Points::new(PlotPoints::from(points))
                        .name(name)
                        .color(color)
                        .radius(3.0),
                );
            }
        });
}
