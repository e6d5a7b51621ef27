use std::fmt;

use super::error::AnalysisError;
use super::model::Mode;

// ---------------------------------------------------------------------------
// Semantic fields and their header patterns
// ---------------------------------------------------------------------------

/// A column the pipeline reads, independent of how the cycler software names it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    CycleIndex,
    Voltage,
    Current,
    StepType,
    ChargeCapacity,
    DischargeCapacity,
    ChargeEnergy,
    DischargeEnergy,
}

impl Field {
    pub const ALL: [Field; 8] = [
        Field::CycleIndex,
        Field::Voltage,
        Field::Current,
        Field::StepType,
        Field::ChargeCapacity,
        Field::DischargeCapacity,
        Field::ChargeEnergy,
        Field::DischargeEnergy,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Field::CycleIndex => "cycle_index",
            Field::Voltage => "voltage",
            Field::Current => "current",
            Field::StepType => "step_type",
            Field::ChargeCapacity => "charge_capacity",
            Field::DischargeCapacity => "discharge_capacity",
            Field::ChargeEnergy => "charge_energy",
            Field::DischargeEnergy => "discharge_energy",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

struct FieldSpec {
    field: Field,
    /// Every needle must occur in the normalized header.
    needles: &'static [&'static str],
    full_only: bool,
}

/// Resolution order and header patterns. Matching is against trimmed, lowercased headers.
const FIELD_SPECS: [FieldSpec; 8] = [
    FieldSpec { field: Field::CycleIndex, needles: &["cycle", "index"], full_only: false },
    FieldSpec { field: Field::Voltage, needles: &["voltage"], full_only: false },
    FieldSpec { field: Field::Current, needles: &["current"], full_only: false },
    FieldSpec { field: Field::StepType, needles: &["step", "type"], full_only: false },
    FieldSpec { field: Field::ChargeCapacity, needles: &["chg. cap.(ah)"], full_only: true },
    FieldSpec { field: Field::DischargeCapacity, needles: &["dchg. cap.(ah)"], full_only: true },
    FieldSpec { field: Field::ChargeEnergy, needles: &["chg. energy(wh)"], full_only: true },
    FieldSpec { field: Field::DischargeEnergy, needles: &["dchg. energy(wh)"], full_only: true },
];

impl FieldSpec {
    fn is_required(&self, mode: Mode) -> bool {
        !self.full_only || mode.is_full()
    }

    fn matches(&self, normalized_header: &str) -> bool {
        self.needles.iter().all(|n| normalized_header.contains(n))
    }

    /// e.g. `cycle_index ('cycle' and 'index')`
    fn describe(&self) -> String {
        let needles: Vec<String> = self.needles.iter().map(|n| format!("'{n}'")).collect();
        format!("{} ({})", self.field, needles.join(" and "))
    }
}

pub fn normalize_header(header: &str) -> String {
    header.trim().to_lowercase()
}

// ---------------------------------------------------------------------------
// ColumnMap
// ---------------------------------------------------------------------------

/// Semantic field → column position in the input table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMap {
    mode: Mode,
    indices: [Option<usize>; 8],
}

impl ColumnMap {
    /// Resolve every field the mode requires against the header row.
    ///
    /// Each field takes the first header (in order) containing all of its needles.
    /// Optional fields are resolved too when present. On failure the error lists
    /// every missing required field, not just the first one.
    pub fn resolve<S: AsRef<str>>(headers: &[S], mode: Mode) -> Result<Self, AnalysisError> {
        let normalized: Vec<String> = headers.iter().map(|h| normalize_header(h.as_ref())).collect();

        let mut indices = [None; 8];
        let mut missing = Vec::new();
        for spec in &FIELD_SPECS {
            let found = normalized.iter().position(|h| spec.matches(h));
            if found.is_none() && spec.is_required(mode) {
                missing.push(spec.describe());
            }
            indices[spec.field.index()] = found;
        }

        if !missing.is_empty() {
            return Err(AnalysisError::Schema { missing });
        }
        Ok(ColumnMap { mode, indices })
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Column index of a field, if it was found in the header row.
    pub fn get(&self, field: Field) -> Option<usize> {
        self.indices[field.index()]
    }

    /// (field, column) pairs that resolved, in resolution order.
    pub fn resolved(&self) -> impl Iterator<Item = (Field, usize)> + '_ {
        Field::ALL
            .iter()
            .filter_map(move |&f| self.get(f).map(|idx| (f, idx)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn neware_headers() -> Vec<&'static str> {
        vec![
            "Record Index",
            "  Cycle Index ",
            "Step Type",
            "Time",
            "Current(A)",
            "Voltage(V)",
            "Chg. Cap.(Ah)",
            "DChg. Cap.(Ah)",
            "Chg. Energy(Wh)",
            "DChg. Energy(Wh)",
        ]
    }

    #[test]
    fn test_resolves_messy_headers() {
        let map = ColumnMap::resolve(&neware_headers(), Mode::Full).unwrap();
        assert_eq!(map.get(Field::CycleIndex), Some(1));
        assert_eq!(map.get(Field::StepType), Some(2));
        assert_eq!(map.get(Field::Current), Some(4));
        assert_eq!(map.get(Field::Voltage), Some(5));
        assert_eq!(map.get(Field::ChargeCapacity), Some(6));
        assert_eq!(map.get(Field::DischargeCapacity), Some(7));
        assert_eq!(map.get(Field::ChargeEnergy), Some(8));
        assert_eq!(map.get(Field::DischargeEnergy), Some(9));
    }

    #[test]
    fn test_normalization_is_case_and_whitespace_insensitive() {
        assert_eq!(normalize_header("  Cycle Index "), normalize_header("cycle index"));
        let a = ColumnMap::resolve(&["  CYCLE INDEX ", "Voltage", "Current", "Step Type"], Mode::EsrOnly);
        let b = ColumnMap::resolve(&["cycle index", "voltage", "current", "step type"], Mode::EsrOnly);
        assert_eq!(a.unwrap().get(Field::CycleIndex), b.unwrap().get(Field::CycleIndex));
    }

    #[test]
    fn test_first_matching_header_wins() {
        let map = ColumnMap::resolve(
            &["Cycle Index", "Voltage(V)", "Aux Voltage(V)", "Current(A)", "Step Type"],
            Mode::EsrOnly,
        )
        .unwrap();
        assert_eq!(map.get(Field::Voltage), Some(1));
    }

    #[test]
    fn test_missing_current_is_reported() {
        let err = ColumnMap::resolve(&["Cycle Index", "Voltage(V)", "Step Type"], Mode::EsrOnly)
            .unwrap_err();
        match err {
            AnalysisError::Schema { missing } => {
                assert_eq!(missing.len(), 1);
                assert!(missing[0].contains("current"));
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_all_missing_fields_are_listed() {
        let err = ColumnMap::resolve(&["Time", "Voltage(V)"], Mode::Full).unwrap_err();
        let AnalysisError::Schema { missing } = err else {
            panic!("expected schema error");
        };
        let names: Vec<&str> = missing.iter().map(|m| m.split(' ').next().unwrap_or("")).collect();
        assert_eq!(
            names,
            vec![
                "cycle_index",
                "current",
                "step_type",
                "charge_capacity",
                "discharge_capacity",
                "charge_energy",
                "discharge_energy",
            ]
        );
    }

    #[test]
    fn test_capacity_columns_optional_in_esr_mode() {
        let map = ColumnMap::resolve(&["Cycle Index", "Voltage", "Current", "Step Type"], Mode::EsrOnly)
            .unwrap();
        assert_eq!(map.get(Field::ChargeCapacity), None);
        assert_eq!(map.resolved().count(), 4);
    }

    #[test]
    fn test_cycle_requires_both_needles() {
        let err = ColumnMap::resolve(&["Cycle", "Index", "Voltage", "Current", "Step Type"], Mode::EsrOnly)
            .unwrap_err();
        assert!(err.to_string().contains("cycle_index"));
    }
}
