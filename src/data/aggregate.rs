use std::collections::BTreeMap;

use super::error::AnalysisError;
use super::filter::{ClassifiedRows, StepClass};
use super::model::Reading;

/// Cycle index → aggregated value. Cycles without a contributing value are absent.
pub type PerCycle = BTreeMap<i64, f64>;

/// Numeric reading fields that can be reduced per cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quantity {
    Voltage,
    Current,
    ChargeCapacity,
    DischargeCapacity,
    ChargeEnergy,
    DischargeEnergy,
}

impl Quantity {
    fn value(self, reading: &Reading) -> Option<f64> {
        match self {
            Quantity::Voltage => reading.voltage,
            Quantity::Current => reading.current,
            Quantity::ChargeCapacity => reading.charge_capacity,
            Quantity::DischargeCapacity => reading.discharge_capacity,
            Quantity::ChargeEnergy => reading.charge_energy,
            Quantity::DischargeEnergy => reading.discharge_energy,
        }
    }
}

/// Maximum of `quantity` per cycle over the readings at `indices`, ignoring absent values.
pub fn max_by_cycle(readings: &[Reading], indices: &[usize], quantity: Quantity) -> PerCycle {
    let mut out = PerCycle::new();
    for reading in indices.iter().filter_map(|&i| readings.get(i)) {
        let (Some(cycle), Some(value)) = (reading.cycle, quantity.value(reading)) else {
            continue;
        };
        out.entry(cycle)
            .and_modify(|best: &mut f64| *best = best.max(value))
            .or_insert(value);
    }
    out
}

/// Per-cycle maxima for one CC subset.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClassMaxima {
    pub voltage: PerCycle,
    pub current: PerCycle,
    /// Charge capacity for the charge subset, discharge capacity for the discharge subset.
    pub capacity: PerCycle,
    /// Charge energy for the charge subset, discharge energy for the discharge subset.
    pub energy: PerCycle,
}

/// Reduce one CC subset to per-cycle maxima.
///
/// Capacity and energy are only aggregated when `with_efficiency_inputs` is set.
/// Fails when the subset is empty for the whole file.
pub fn aggregate_class(
    readings: &[Reading],
    rows: &ClassifiedRows,
    class: StepClass,
    with_efficiency_inputs: bool,
) -> Result<ClassMaxima, AnalysisError> {
    let indices = rows.indices(class);
    if indices.is_empty() {
        return Err(AnalysisError::NoMatchingSteps(class));
    }

    let (capacity, energy) = match class {
        StepClass::ConstantCurrentDischarge => (Quantity::DischargeCapacity, Quantity::DischargeEnergy),
        _ => (Quantity::ChargeCapacity, Quantity::ChargeEnergy),
    };

    let mut maxima = ClassMaxima {
        voltage: max_by_cycle(readings, indices, Quantity::Voltage),
        current: max_by_cycle(readings, indices, Quantity::Current),
        ..Default::default()
    };
    if with_efficiency_inputs {
        maxima.capacity = max_by_cycle(readings, indices, capacity);
        maxima.energy = max_by_cycle(readings, indices, energy);
    }

    log::debug!(
        "{class}: {} rows over {} cycles",
        indices.len(),
        maxima.voltage.len()
    );
    Ok(maxima)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reading(cycle: i64, voltage: Option<f64>, current: f64, capacity: Option<f64>) -> Reading {
        Reading {
            cycle: Some(cycle),
            voltage,
            current: Some(current),
            step_label: "CC_Chg".into(),
            charge_capacity: capacity,
            discharge_capacity: None,
            charge_energy: None,
            discharge_energy: None,
        }
    }

    #[test]
    fn test_max_ignores_absent_values() {
        let readings = vec![reading(1, Some(4.1), 1.0, None), reading(1, None, 1.0, None)];
        let maxima = max_by_cycle(&readings, &[0, 1], Quantity::Voltage);
        assert_eq!(maxima.get(&1), Some(&4.1));
    }

    #[test]
    fn test_max_per_cycle() {
        let readings = vec![
            reading(1, Some(3.9), 1.0, None),
            reading(1, Some(4.2), 2.0, None),
            reading(2, Some(4.1), 0.5, None),
            reading(2, Some(4.0), -1.0, None),
        ];
        let all = [0, 1, 2, 3];
        let v = max_by_cycle(&readings, &all, Quantity::Voltage);
        let i = max_by_cycle(&readings, &all, Quantity::Current);
        assert_eq!(v.into_iter().collect::<Vec<_>>(), vec![(1, 4.2), (2, 4.1)]);
        assert_eq!(i.into_iter().collect::<Vec<_>>(), vec![(1, 2.0), (2, 0.5)]);
    }

    #[test]
    fn test_cycle_without_values_is_absent() {
        let readings = vec![reading(1, Some(4.0), 1.0, Some(1.0)), reading(2, Some(4.0), 1.0, None)];
        let cap = max_by_cycle(&readings, &[0, 1], Quantity::ChargeCapacity);
        assert!(cap.contains_key(&1));
        assert!(!cap.contains_key(&2));
    }

    #[test]
    fn test_empty_subset_is_an_error() {
        let readings = vec![reading(1, Some(4.0), 1.0, None)];
        let rows = ClassifiedRows {
            cc_charge: vec![0],
            ..Default::default()
        };
        assert!(aggregate_class(&readings, &rows, StepClass::ConstantCurrentCharge, false).is_ok());
        assert_eq!(
            aggregate_class(&readings, &rows, StepClass::ConstantCurrentDischarge, false),
            Err(AnalysisError::NoMatchingSteps(StepClass::ConstantCurrentDischarge))
        );
    }

    #[test]
    fn test_efficiency_inputs_follow_the_flag() {
        let readings = vec![reading(1, Some(4.0), 1.0, Some(1.1))];
        let rows = ClassifiedRows {
            cc_charge: vec![0],
            ..Default::default()
        };
        let esr_only = aggregate_class(&readings, &rows, StepClass::ConstantCurrentCharge, false).unwrap();
        assert!(esr_only.capacity.is_empty());
        let full = aggregate_class(&readings, &rows, StepClass::ConstantCurrentCharge, true).unwrap();
        assert_eq!(full.capacity.get(&1), Some(&1.1));
    }
}
