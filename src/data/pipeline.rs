use std::path::Path;

use super::aggregate::aggregate_class;
use super::columns::{ColumnMap, Field};
use super::error::AnalysisError;
use super::filter::{StepClass, classify_rows};
use super::loader::load_file;
use super::model::{Analysis, CellValue, Mode, RawTable, Reading};
use super::reconcile::{join_cycles, reconcile, summarize};

/// Run the whole pipeline on one file.
///
/// Returns either the complete table and summary or a single error; nothing
/// partial is ever handed back.
pub fn process(path: &Path, mode: Mode) -> Result<Analysis, AnalysisError> {
    let table = load_file(path).map_err(|e| AnalysisError::FileAccess(format!("{e:#}")))?;
    log::info!(
        "Loaded {} rows with {} columns from {}",
        table.len(),
        table.headers.len(),
        path.display()
    );
    analyze(&table, mode)
}

/// Run the pipeline on an already loaded table.
pub fn analyze(table: &RawTable, mode: Mode) -> Result<Analysis, AnalysisError> {
    let columns = ColumnMap::resolve(&table.headers, mode)?;
    for (field, idx) in columns.resolved() {
        log::debug!("{field} -> '{}' (column {idx})", table.headers[idx]);
    }

    if table.is_empty() {
        return Err(AnalysisError::EmptyResult);
    }

    let readings = extract_readings(table, &columns);
    let rows = classify_rows(&readings);
    if rows.ambiguous > 0 {
        log::warn!(
            "{} rows have a step label matching both CC charge and CC discharge; \
             they count towards both",
            rows.ambiguous
        );
    }

    let charge = aggregate_class(&readings, &rows, StepClass::ConstantCurrentCharge, mode.is_full())?;
    let discharge =
        aggregate_class(&readings, &rows, StepClass::ConstantCurrentDischarge, mode.is_full())?;

    let cycles = reconcile(join_cycles(&charge, &discharge), mode)?;
    let mut summary = summarize(&cycles, mode);
    summary.ambiguous_step_rows = rows.ambiguous;

    log::info!("Computed metrics for {} cycles ({mode})", cycles.len());
    Ok(Analysis {
        mode,
        cycles,
        summary,
    })
}

/// Coerce every raw row into a [`Reading`]. Non-numeric cells become `None`.
pub fn extract_readings(table: &RawTable, columns: &ColumnMap) -> Vec<Reading> {
    let cell = |row: &[CellValue], field: Field| -> Option<CellValue> {
        columns.get(field).and_then(|idx| row.get(idx)).cloned()
    };
    let number = |row: &[CellValue], field: Field| cell(row, field).and_then(|c| c.as_f64());

    let mut bad_cycles = 0usize;
    let readings: Vec<Reading> = table
        .rows
        .iter()
        .map(|row| {
            let row = row.as_slice();
            let raw_cycle = cell(row, Field::CycleIndex).unwrap_or(CellValue::Null);
            let cycle = raw_cycle.as_cycle_index();
            if cycle.is_none() && !raw_cycle.is_null() {
                bad_cycles += 1;
            }
            Reading {
                cycle,
                voltage: number(row, Field::Voltage),
                current: number(row, Field::Current),
                step_label: cell(row, Field::StepType)
                    .map(|c| c.as_label())
                    .unwrap_or_default(),
                charge_capacity: number(row, Field::ChargeCapacity),
                discharge_capacity: number(row, Field::DischargeCapacity),
                charge_energy: number(row, Field::ChargeEnergy),
                discharge_energy: number(row, Field::DischargeEnergy),
            }
        })
        .collect();

    if bad_cycles > 0 {
        log::warn!("{bad_cycles} rows have a cycle index that is not an integer and were skipped");
    }
    readings
}
