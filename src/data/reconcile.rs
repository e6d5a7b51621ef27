use std::collections::BTreeMap;

use super::aggregate::{ClassMaxima, PerCycle};
use super::error::AnalysisError;
use super::model::{CycleMetrics, Mode, SummaryMetrics};

/// Outer join of both subsets' maxima into one record per cycle.
///
/// Every cycle present in any map gets a row; fields stay `None` where that map
/// has no entry.
pub fn join_cycles(charge: &ClassMaxima, discharge: &ClassMaxima) -> BTreeMap<i64, CycleMetrics> {
    let mut joined: BTreeMap<i64, CycleMetrics> = BTreeMap::new();

    let sources: [(&PerCycle, fn(&mut CycleMetrics, f64)); 8] = [
        (&charge.voltage, |m, v| m.max_voltage_charge = Some(v)),
        (&discharge.voltage, |m, v| m.max_voltage_discharge = Some(v)),
        (&charge.current, |m, v| m.max_current_charge = Some(v)),
        (&discharge.current, |m, v| m.max_current_discharge = Some(v)),
        (&charge.capacity, |m, v| m.charge_capacity = Some(v)),
        (&discharge.capacity, |m, v| m.discharge_capacity = Some(v)),
        (&charge.energy, |m, v| m.charge_energy = Some(v)),
        (&discharge.energy, |m, v| m.discharge_energy = Some(v)),
    ];

    for (map, set) in sources {
        for (&cycle, &value) in map {
            set(
                joined.entry(cycle).or_insert_with(|| CycleMetrics::new(cycle)),
                value,
            );
        }
    }
    joined
}

/// `numerator / denominator`, undefined on a zero denominator or a non-finite result.
pub fn safe_ratio(numerator: f64, denominator: f64) -> Option<f64> {
    if denominator == 0.0 {
        return None;
    }
    finite(numerator / denominator)
}

fn finite(v: f64) -> Option<f64> {
    v.is_finite().then_some(v)
}

/// ESR = ΔV / ΔI between the CC charge and CC discharge maxima.
pub fn esr(row: &CycleMetrics) -> Option<f64> {
    safe_ratio(row.voltage_delta()?, row.current_delta()?)
}

/// 100 × discharge capacity / charge capacity.
pub fn coulombic_efficiency(row: &CycleMetrics) -> Option<f64> {
    safe_ratio(row.discharge_capacity?, row.charge_capacity?).and_then(|r| finite(100.0 * r))
}

/// 100 × discharge energy / charge energy.
pub fn energy_efficiency(row: &CycleMetrics) -> Option<f64> {
    safe_ratio(row.discharge_energy?, row.charge_energy?).and_then(|r| finite(100.0 * r))
}

/// Mean over the defined values; undefined when there are none.
pub fn mean_defined<I: IntoIterator<Item = Option<f64>>>(values: I) -> Option<f64> {
    let (sum, count) = values
        .into_iter()
        .flatten()
        .filter(|v| v.is_finite())
        .fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    if count == 0 {
        return None;
    }
    finite(sum / count as f64)
}

/// Drop incomplete cycles, compute the derived columns and sort by cycle.
///
/// Incompleteness is structural: a cycle missing a required input never reaches
/// the ESR computation. A complete cycle can still end up with an undefined ESR
/// (zero current delta).
pub fn reconcile(
    joined: BTreeMap<i64, CycleMetrics>,
    mode: Mode,
) -> Result<Vec<CycleMetrics>, AnalysisError> {
    let total = joined.len();
    let cycles: Vec<CycleMetrics> = joined
        .into_values()
        .filter(|row| row.is_complete(mode))
        .map(|mut row| {
            row.esr = esr(&row);
            if mode.is_full() {
                row.coulombic_efficiency = coulombic_efficiency(&row);
                row.energy_efficiency = energy_efficiency(&row);
            }
            row
        })
        .collect();

    if cycles.len() < total {
        log::warn!(
            "Dropped {} of {total} cycles with incomplete charge/discharge data",
            total - cycles.len()
        );
    }
    if cycles.is_empty() {
        return Err(AnalysisError::EmptyResult);
    }
    Ok(cycles)
}

/// Summary scalars over the final table.
pub fn summarize(cycles: &[CycleMetrics], mode: Mode) -> SummaryMetrics {
    let mean_dv = mean_defined(cycles.iter().map(CycleMetrics::voltage_delta));
    let mean_di = mean_defined(cycles.iter().map(CycleMetrics::current_delta));
    let pooled_esr = match (mean_dv, mean_di) {
        (Some(dv), Some(di)) => safe_ratio(dv, di),
        _ => None,
    };

    let mut summary = SummaryMetrics {
        mode,
        cycles: cycles.len(),
        mean_esr: mean_defined(cycles.iter().map(|c| c.esr)),
        pooled_esr,
        ..Default::default()
    };
    if mode.is_full() {
        summary.mean_coulombic_efficiency = mean_defined(cycles.iter().map(|c| c.coulombic_efficiency));
        summary.mean_energy_efficiency = mean_defined(cycles.iter().map(|c| c.energy_efficiency));
    }
    summary
}
