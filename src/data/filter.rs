use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

use super::model::Reading;

// ---------------------------------------------------------------------------
// Step classes and label patterns
// ---------------------------------------------------------------------------

/// Step category of a reading, derived from its free-text step label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StepClass {
    ConstantCurrentCharge,
    ConstantCurrentDischarge,
    Other,
}

impl fmt::Display for StepClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepClass::ConstantCurrentCharge => write!(f, "Constant Current Charge"),
            StepClass::ConstantCurrentDischarge => write!(f, "Constant Current Discharge"),
            StepClass::Other => write!(f, "Other"),
        }
    }
}

// "cc" must stand alone: start/end of label or a non-alphanumeric neighbour
// (space, underscore, hyphen), so "CC_Chg" matches and "CCCV_Chg" does not.
static CC_CHARGE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:(?:^|[^a-z0-9])cc(?:[^a-z0-9]|$).*(?:chg|charge))|(?:constant\s*current\s*charge)")
        .expect("CC charge pattern")
});

static CC_DISCHARGE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)(?:(?:^|[^a-z0-9])cc(?:[^a-z0-9]|$).*(?:dchg|disch|discharge))|(?:constant\s*current\s*discharge)",
    )
    .expect("CC discharge pattern")
});

// ---------------------------------------------------------------------------
// Per-row tags
// ---------------------------------------------------------------------------

/// Independent class tags for one step label.
///
/// Both tags can be set at once: "CC_DChg" contains "chg" after the "cc" token, so it
/// satisfies the charge pattern as well. Such rows feed both subsets; no precedence
/// between the classes is applied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepTags {
    pub cc_charge: bool,
    pub cc_discharge: bool,
}

impl StepTags {
    pub fn matches(&self, class: StepClass) -> bool {
        match class {
            StepClass::ConstantCurrentCharge => self.cc_charge,
            StepClass::ConstantCurrentDischarge => self.cc_discharge,
            StepClass::Other => !self.cc_charge && !self.cc_discharge,
        }
    }

    /// The label matched both CC patterns.
    pub fn is_ambiguous(&self) -> bool {
        self.cc_charge && self.cc_discharge
    }
}

/// Tag a single step label. Matching is case-insensitive.
pub fn classify(label: &str) -> StepTags {
    StepTags {
        cc_charge: CC_CHARGE_PATTERN.is_match(label),
        cc_discharge: CC_DISCHARGE_PATTERN.is_match(label),
    }
}

// ---------------------------------------------------------------------------
// Row subsets
// ---------------------------------------------------------------------------

/// Indices of the usable readings in each CC subset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassifiedRows {
    pub cc_charge: Vec<usize>,
    pub cc_discharge: Vec<usize>,
    /// Rows counted in both subsets.
    pub ambiguous: usize,
}

impl ClassifiedRows {
    pub fn indices(&self, class: StepClass) -> &[usize] {
        match class {
            StepClass::ConstantCurrentCharge => &self.cc_charge,
            StepClass::ConstantCurrentDischarge => &self.cc_discharge,
            StepClass::Other => &[],
        }
    }
}

/// Split readings into the CC charge and CC discharge subsets.
///
/// A reading passes when:
/// * it has a cycle index, a voltage and a current (see [`Reading::is_usable`])
/// * its step label matches the class pattern
pub fn classify_rows(readings: &[Reading]) -> ClassifiedRows {
    let mut out = ClassifiedRows::default();
    for (i, reading) in readings.iter().enumerate() {
        if !reading.is_usable() {
            continue;
        }
        let tags = classify(&reading.step_label);
        if tags.cc_charge {
            out.cc_charge.push(i);
        }
        if tags.cc_discharge {
            out.cc_discharge.push(i);
        }
        if tags.is_ambiguous() {
            out.ambiguous += 1;
        }
    }
    out
}
