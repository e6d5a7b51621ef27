use std::fmt;

use serde::Serialize;

// ---------------------------------------------------------------------------
// CellValue – a single cell of the raw input table
// ---------------------------------------------------------------------------

/// A dynamically-typed spreadsheet cell, as produced by the loaders.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    /// Date/time cells are kept as text; the pipeline never reads them.
    Date(String),
    Null,
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::String(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) => write!(f, "{v}"),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Date(d) => write!(f, "{d}"),
            CellValue::Null => Ok(()),
        }
    }
}

impl CellValue {
    /// Guess the type of a text cell (CSV, stringly-typed JSON).
    pub fn from_text(s: &str) -> Self {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return CellValue::Null;
        }
        if let Ok(i) = trimmed.parse::<i64>() {
            return CellValue::Integer(i);
        }
        if let Ok(f) = trimmed.parse::<f64>() {
            return CellValue::Float(f);
        }
        if trimmed == "true" || trimmed == "false" {
            return CellValue::Bool(trimmed == "true");
        }
        CellValue::String(s.to_string())
    }

    /// Numeric coercion. Anything that is not a finite number is absent.
    pub fn as_f64(&self) -> Option<f64> {
        let v = match self {
            CellValue::Float(v) => *v,
            CellValue::Integer(i) => *i as f64,
            CellValue::String(s) => s.trim().parse::<f64>().ok()?,
            _ => return None,
        };
        v.is_finite().then_some(v)
    }

    /// Cycle-index coercion: integers, integral floats and text holding either.
    pub fn as_cycle_index(&self) -> Option<i64> {
        match self {
            CellValue::Integer(i) => Some(*i),
            CellValue::String(s) => {
                let s = s.trim();
                s.parse::<i64>().ok().or_else(|| integral(s.parse::<f64>().ok()?))
            }
            CellValue::Float(v) => integral(*v),
            _ => None,
        }
    }

    /// The cell rendered as a step label; empty for nulls.
    pub fn as_label(&self) -> String {
        self.to_string()
    }

    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }
}

fn integral(v: f64) -> Option<i64> {
    (v.is_finite() && v.fract() == 0.0 && v.abs() < i64::MAX as f64).then_some(v as i64)
}

// ---------------------------------------------------------------------------
// RawTable – the loaded input file
// ---------------------------------------------------------------------------

/// Header row plus data rows, exactly as read from the input file.
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    pub headers: Vec<String>,
    /// Every row has `headers.len()` cells.
    pub rows: Vec<Vec<CellValue>>,
}

impl RawTable {
    /// Build a table, padding short rows with nulls and truncating long ones.
    pub fn new(headers: Vec<String>, rows: Vec<Vec<CellValue>>) -> Self {
        let width = headers.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, CellValue::Null);
                row
            })
            .collect();
        RawTable { headers, rows }
    }

    /// Number of data rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no data rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Reading – one coerced row
// ---------------------------------------------------------------------------

/// One timestep of the cycler log after column resolution and numeric coercion.
#[derive(Debug, Clone, PartialEq)]
pub struct Reading {
    pub cycle: Option<i64>,
    pub voltage: Option<f64>,
    pub current: Option<f64>,
    pub step_label: String,
    pub charge_capacity: Option<f64>,
    pub discharge_capacity: Option<f64>,
    pub charge_energy: Option<f64>,
    pub discharge_energy: Option<f64>,
}

impl Reading {
    /// A reading takes part in aggregation only with a cycle, a voltage and a current.
    pub fn is_usable(&self) -> bool {
        self.cycle.is_some() && self.voltage.is_some() && self.current.is_some()
    }
}

// ---------------------------------------------------------------------------
// Analysis mode
// ---------------------------------------------------------------------------

/// Which metric set the pipeline computes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Voltage/current maxima and ESR only.
    #[default]
    EsrOnly,
    /// Adds capacity/energy maxima and coulombic/energy efficiency.
    Full,
}

impl Mode {
    pub fn is_full(self) -> bool {
        self == Mode::Full
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::EsrOnly => write!(f, "ESR only"),
            Mode::Full => write!(f, "Full metrics"),
        }
    }
}

// ---------------------------------------------------------------------------
// Per-cycle and summary results
// ---------------------------------------------------------------------------

/// One row of the reconciled table. `None` means absent or undefined.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CycleMetrics {
    pub cycle: i64,
    pub max_voltage_charge: Option<f64>,
    pub max_voltage_discharge: Option<f64>,
    pub max_current_charge: Option<f64>,
    pub max_current_discharge: Option<f64>,
    pub charge_capacity: Option<f64>,
    pub discharge_capacity: Option<f64>,
    pub charge_energy: Option<f64>,
    pub discharge_energy: Option<f64>,
    pub esr: Option<f64>,
    pub coulombic_efficiency: Option<f64>,
    pub energy_efficiency: Option<f64>,
}

impl CycleMetrics {
    pub fn new(cycle: i64) -> Self {
        CycleMetrics {
            cycle,
            ..Default::default()
        }
    }

    /// All four ESR inputs are present.
    pub fn has_esr_inputs(&self) -> bool {
        self.max_voltage_charge.is_some()
            && self.max_voltage_discharge.is_some()
            && self.max_current_charge.is_some()
            && self.max_current_discharge.is_some()
    }

    /// All capacity and energy maxima are present.
    pub fn has_efficiency_inputs(&self) -> bool {
        self.charge_capacity.is_some()
            && self.discharge_capacity.is_some()
            && self.charge_energy.is_some()
            && self.discharge_energy.is_some()
    }

    /// Whether the row carries every field the mode requires.
    pub fn is_complete(&self, mode: Mode) -> bool {
        self.has_esr_inputs() && (!mode.is_full() || self.has_efficiency_inputs())
    }

    /// maxV_chg − maxV_dchg
    pub fn voltage_delta(&self) -> Option<f64> {
        Some(self.max_voltage_charge? - self.max_voltage_discharge?)
    }

    /// maxI_chg − maxI_dchg
    pub fn current_delta(&self) -> Option<f64> {
        Some(self.max_current_charge? - self.max_current_discharge?)
    }
}

/// Process-wide scalars computed from the final table.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SummaryMetrics {
    pub mode: Mode,
    pub cycles: usize,
    /// Mean of the per-cycle ESR over cycles where it is defined.
    pub mean_esr: Option<f64>,
    /// mean(ΔV) / mean(ΔI) over all cycles of the table.
    pub pooled_esr: Option<f64>,
    pub mean_coulombic_efficiency: Option<f64>,
    pub mean_energy_efficiency: Option<f64>,
    /// Rows whose step label matched both the CC charge and CC discharge patterns.
    pub ambiguous_step_rows: usize,
}

/// The per-cycle table plus its summary: the complete result of one invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    pub mode: Mode,
    /// Sorted by cycle index ascending.
    pub cycles: Vec<CycleMetrics>,
    pub summary: SummaryMetrics,
}

impl Analysis {
    /// Number of cycles in the table.
    pub fn len(&self) -> usize {
        self.cycles.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.cycles.is_empty()
    }
}
