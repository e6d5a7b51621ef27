use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rust_xlsxwriter::{Format, Workbook};

use super::model::{Analysis, CycleMetrics, Mode, SummaryMetrics};

/// Decimal places used for display and export. Computation keeps full precision.
pub const DISPLAY_DECIMALS: i32 = 6;

/// Default file name offered by export dialogs.
pub const DEFAULT_EXPORT_NAME: &str = "esr_results.xlsx";

// ---------------------------------------------------------------------------
// Column layout
// ---------------------------------------------------------------------------

/// One output column: its header and how to read it from a row.
struct OutputColumn {
    header: &'static str,
    value: fn(&CycleMetrics) -> Option<f64>,
    full_only: bool,
}

static OUTPUT_COLUMNS: [OutputColumn; 11] = [
    OutputColumn { header: "Max Voltage CC-Chg (V)", value: |c| c.max_voltage_charge, full_only: false },
    OutputColumn { header: "Max Voltage CC-DChg (V)", value: |c| c.max_voltage_discharge, full_only: false },
    OutputColumn { header: "Max Current CC-Chg (A)", value: |c| c.max_current_charge, full_only: false },
    OutputColumn { header: "Max Current CC-DChg (A)", value: |c| c.max_current_discharge, full_only: false },
    OutputColumn { header: "Charge Capacity (Ah)", value: |c| c.charge_capacity, full_only: true },
    OutputColumn { header: "Discharge Capacity (Ah)", value: |c| c.discharge_capacity, full_only: true },
    OutputColumn { header: "Charge Energy (Wh)", value: |c| c.charge_energy, full_only: true },
    OutputColumn { header: "Discharge Energy (Wh)", value: |c| c.discharge_energy, full_only: true },
    OutputColumn { header: "ESR (Ω)", value: |c| c.esr, full_only: false },
    OutputColumn { header: "Coulombic Efficiency (%)", value: |c| c.coulombic_efficiency, full_only: true },
    OutputColumn { header: "Energy Efficiency (%)", value: |c| c.energy_efficiency, full_only: true },
];

const CYCLE_HEADER: &str = "Cycle Index";

fn value_columns(mode: Mode) -> impl Iterator<Item = &'static OutputColumn> {
    OUTPUT_COLUMNS
        .iter()
        .filter(move |c| !c.full_only || mode.is_full())
}

/// Output headers for a mode, in export order.
pub fn headers(mode: Mode) -> Vec<&'static str> {
    std::iter::once(CYCLE_HEADER)
        .chain(value_columns(mode).map(|c| c.header))
        .collect()
}

/// Round half away from zero to [`DISPLAY_DECIMALS`] places.
pub fn round_display(v: f64) -> f64 {
    let scale = 10f64.powi(DISPLAY_DECIMALS);
    let scaled = v * scale;
    // huge magnitudes have no fractional digits left to round
    if !scaled.is_finite() {
        return v;
    }
    let rounded = scaled.round() / scale;
    // avoid exporting "-0"
    if rounded == 0.0 { 0.0 } else { rounded }
}

/// A rounded value as text; undefined values are empty.
pub fn format_value(v: Option<f64>) -> String {
    v.map(|v| round_display(v).to_string()).unwrap_or_default()
}

/// The table as rows of display strings, matching [`headers`].
pub fn display_rows(analysis: &Analysis) -> Vec<Vec<String>> {
    analysis
        .cycles
        .iter()
        .map(|row| {
            std::iter::once(row.cycle.to_string())
                .chain(value_columns(analysis.mode).map(|c| format_value((c.value)(row))))
                .collect()
        })
        .collect()
}

/// Each value column as (header, [cycle, value] points), skipping undefined values.
pub fn series(analysis: &Analysis) -> Vec<(&'static str, Vec<[f64; 2]>)> {
    value_columns(analysis.mode)
        .map(|column| {
            let points = analysis
                .cycles
                .iter()
                .filter_map(|row| (column.value)(row).map(|v| [row.cycle as f64, v]))
                .collect();
            (column.header, points)
        })
        .collect()
}

/// Human-readable summary lines, e.g. `Average ESR: 0.125000 Ω`.
pub fn summary_lines(summary: &SummaryMetrics) -> Vec<String> {
    let fmt = |v: Option<f64>, unit: &str| match v {
        Some(v) => format!("{v:.6} {unit}"),
        None => "N/A".to_string(),
    };
    let mut lines = vec![
        format!("Cycles: {}", summary.cycles),
        format!("Average ESR: {}", fmt(summary.mean_esr, "Ω")),
        format!("Pooled ESR (mean ΔV / mean ΔI): {}", fmt(summary.pooled_esr, "Ω")),
    ];
    if summary.mode.is_full() {
        lines.push(format!(
            "Average Coulombic Efficiency: {}",
            fmt(summary.mean_coulombic_efficiency, "%")
        ));
        lines.push(format!(
            "Average Energy Efficiency: {}",
            fmt(summary.mean_energy_efficiency, "%")
        ));
    }
    if summary.ambiguous_step_rows > 0 {
        lines.push(format!(
            "Rows matching both CC charge and CC discharge: {}",
            summary.ambiguous_step_rows
        ));
    }
    lines
}

// ---------------------------------------------------------------------------
// Export
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Xlsx,
    Csv,
}

/// Pick the export format from the path, defaulting to xlsx.
///
/// `.csv` and `.xlsx` are kept as given; anything else (no extension or an
/// unknown one) gets `.xlsx` appended.
pub fn resolve_export_path(path: &Path) -> (PathBuf, ExportFormat) {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("csv") => (path.to_path_buf(), ExportFormat::Csv),
        Some("xlsx") => (path.to_path_buf(), ExportFormat::Xlsx),
        _ => {
            let mut name = path.as_os_str().to_os_string();
            name.push(".xlsx");
            (PathBuf::from(name), ExportFormat::Xlsx)
        }
    }
}

/// Write the table to `path`, choosing the format from the extension.
/// Returns the path actually written.
pub fn export(analysis: &Analysis, path: &Path) -> Result<PathBuf> {
    let (path, format) = resolve_export_path(path);
    match format {
        ExportFormat::Csv => write_csv(analysis, &path)?,
        ExportFormat::Xlsx => write_xlsx(analysis, &path)?,
    }
    log::info!("Exported {} cycles to {}", analysis.len(), path.display());
    Ok(path)
}

/// Delimited-text export of the rounded table.
pub fn write_csv(analysis: &Analysis, path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("creating {}", path.display()))?;
    writer
        .write_record(headers(analysis.mode))
        .context("writing CSV header")?;
    for row in display_rows(analysis) {
        writer.write_record(&row).context("writing CSV row")?;
    }
    writer.flush().context("flushing CSV")?;
    Ok(())
}

/// Spreadsheet export: rounded numbers as numeric cells, undefined values left blank.
pub fn write_xlsx(analysis: &Analysis, path: &Path) -> Result<()> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    let header_fmt = Format::new().set_bold();

    for (col, header) in headers(analysis.mode).into_iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, header, &header_fmt)?;
        sheet.set_column_width(col as u16, 24)?;
    }

    for (i, row) in analysis.cycles.iter().enumerate() {
        let r = (i + 1) as u32;
        sheet.write_number(r, 0, row.cycle as f64)?;
        for (j, column) in value_columns(analysis.mode).enumerate() {
            if let Some(v) = (column.value)(row) {
                sheet.write_number(r, (j + 1) as u16, round_display(v))?;
            }
        }
    }

    workbook
        .save(path)
        .with_context(|| format!("saving {}", path.display()))?;
    Ok(())
}
