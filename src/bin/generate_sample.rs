use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use rust_xlsxwriter::Workbook;

const HEADERS: [&str; 9] = [
    "Record Index",
    "Cycle Index",
    "Step Type",
    "Current(A)",
    "Voltage(V)",
    "Chg. Cap.(Ah)",
    "DChg. Cap.(Ah)",
    "Chg. Energy(Wh)",
    "DChg. Energy(Wh)",
];

const CYCLES: i64 = 5;
const POINTS_PER_STEP: usize = 40;
const NOMINAL_AH: f64 = 2.0;
const CC_CURRENT: f64 = 1.0;
const INTERNAL_OHMS: f64 = 0.06;
/// SOC where CC charge hands over to the CV hold.
const CC_CHARGE_END_SOC: f64 = 0.92;
/// SOC where CC discharge hits the cut-off and the CV tail takes over.
const CC_DISCHARGE_END_SOC: f64 = 0.1;
/// Fraction of charge input that ends up stored.
const CHARGE_ACCEPTANCE: f64 = 0.998;

/// One logged timestep. `voltage: None` marks a corrupted cell.
struct Row {
    cycle: i64,
    step: &'static str,
    current: f64,
    voltage: Option<f64>,
    chg_cap: f64,
    dchg_cap: f64,
    chg_energy: f64,
    dchg_energy: f64,
}

impl Row {
    fn new(cycle: i64, step: &'static str, current: f64, voltage: Option<f64>) -> Self {
        Row {
            cycle,
            step,
            current,
            voltage,
            chg_cap: 0.0,
            dchg_cap: 0.0,
            chg_energy: 0.0,
            dchg_energy: 0.0,
        }
    }
}

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Uniform noise in [-amplitude, amplitude)
    fn noise(&mut self, amplitude: f64) -> f64 {
        (self.next_f64() * 2.0 - 1.0) * amplitude
    }
}

/// Open-circuit voltage of a generic cell at state of charge `soc` (0..1).
/// Steep when empty, nearly flat at the top.
fn ocv(soc: f64) -> f64 {
    3.0 + 1.1 * (1.0 - (1.0 - soc).powi(3))
}

/// Exponentially decaying taper current, scaled so that its integral over the
/// step is `charge_ah`. Returns (current, step duration in hours) per point.
fn taper(charge_ah: f64) -> Vec<(f64, f64)> {
    let currents: Vec<f64> = (0..POINTS_PER_STEP / 4)
        .map(|k| CC_CURRENT * (-(k as f64) / 3.0).exp())
        .collect();
    let dt_h = charge_ah / currents.iter().sum::<f64>();
    currents.into_iter().map(|i| (i, dt_h)).collect()
}

/// Every cycle starts empty: CC charge to `CC_CHARGE_END_SOC`, CV hold to full,
/// rest, CC discharge to `CC_DISCHARGE_END_SOC`, CV tail to empty, rest.
/// Capacity and energy columns restart at zero on every step, as Neware does.
fn simulate(rng: &mut SimpleRng) -> Vec<Row> {
    let mut rows = Vec::new();
    let n = POINTS_PER_STEP as f64;

    for cycle in 1..=CYCLES {
        let capacity = NOMINAL_AH * (1.0 - 0.002 * (cycle - 1) as f64);

        // CC charge
        let dq = capacity * CC_CHARGE_END_SOC / n / CHARGE_ACCEPTANCE;
        let (mut cap, mut energy) = (0.0, 0.0);
        for k in 0..POINTS_PER_STEP {
            let soc = (k + 1) as f64 / n * CC_CHARGE_END_SOC;
            let v = ocv(soc) + CC_CURRENT * INTERNAL_OHMS + rng.noise(0.002);
            cap += dq;
            energy += dq * v;
            // a corrupted voltage cell, as seen in real exports
            let voltage = if cycle == 2 && k == 7 { None } else { Some(v) };
            rows.push(Row {
                chg_cap: cap,
                chg_energy: energy,
                ..Row::new(cycle, "CC_Chg", CC_CURRENT, voltage)
            });
        }

        // CV hold at the voltage CC charge ended on
        let cv_voltage = ocv(CC_CHARGE_END_SOC) + CC_CURRENT * INTERNAL_OHMS;
        let (mut cap, mut energy) = (0.0, 0.0);
        for (i, dt_h) in taper(capacity * (1.0 - CC_CHARGE_END_SOC) / CHARGE_ACCEPTANCE) {
            cap += i * dt_h;
            energy += i * dt_h * cv_voltage;
            rows.push(Row {
                chg_cap: cap,
                chg_energy: energy,
                ..Row::new(cycle, "CV_Chg", i, Some(cv_voltage))
            });
        }

        for _ in 0..5 {
            rows.push(Row::new(cycle, "Rest", 0.0, Some(ocv(1.0) + rng.noise(0.001))));
        }

        // The last cycle is cut off before its discharge.
        if cycle == CYCLES {
            break;
        }

        // CC discharge (negative current, Neware convention)
        let depth = 1.0 - CC_DISCHARGE_END_SOC;
        let dq = capacity * depth / n;
        let (mut cap, mut energy) = (0.0, 0.0);
        for k in 0..POINTS_PER_STEP {
            let soc = 1.0 - k as f64 / n * depth;
            let v = ocv(soc) - CC_CURRENT * INTERNAL_OHMS + rng.noise(0.002);
            cap += dq;
            energy += dq * v;
            rows.push(Row {
                dchg_cap: cap,
                dchg_energy: energy,
                ..Row::new(cycle, "CC_DChg", -CC_CURRENT, Some(v))
            });
        }

        // CV tail at the cut-off voltage drains the rest
        let cutoff = ocv(CC_DISCHARGE_END_SOC) - CC_CURRENT * INTERNAL_OHMS;
        let (mut cap, mut energy) = (0.0, 0.0);
        for (i, dt_h) in taper(capacity * CC_DISCHARGE_END_SOC) {
            cap += i * dt_h;
            energy += i * dt_h * cutoff;
            rows.push(Row {
                dchg_cap: cap,
                dchg_energy: energy,
                ..Row::new(cycle, "CV_DChg", -i, Some(cutoff))
            });
        }

        for _ in 0..5 {
            rows.push(Row::new(cycle, "Rest", 0.0, Some(ocv(0.0) + rng.noise(0.001))));
        }
    }
    rows
}

fn write_parquet(rows: &[Row], path: &str) -> Result<()> {
    let f64_col = |get: fn(&Row) -> f64| -> ArrayRef {
        Arc::new(Float64Array::from(rows.iter().map(get).collect::<Vec<_>>()))
    };

    let columns: Vec<ArrayRef> = vec![
        Arc::new(Int64Array::from((1..=rows.len() as i64).collect::<Vec<_>>())),
        Arc::new(Int64Array::from(rows.iter().map(|r| r.cycle).collect::<Vec<_>>())),
        Arc::new(StringArray::from(rows.iter().map(|r| r.step).collect::<Vec<_>>())),
        f64_col(|r| r.current),
        Arc::new(Float64Array::from(rows.iter().map(|r| r.voltage).collect::<Vec<_>>())),
        f64_col(|r| r.chg_cap),
        f64_col(|r| r.dchg_cap),
        f64_col(|r| r.chg_energy),
        f64_col(|r| r.dchg_energy),
    ];

    let fields: Vec<Field> = HEADERS
        .iter()
        .zip(&columns)
        .map(|(name, col)| Field::new(*name, col.data_type().clone(), *name == "Voltage(V)"))
        .collect();
    let schema = Arc::new(Schema::new(fields));

    let batch = RecordBatch::try_new(schema.clone(), columns).context("building record batch")?;

    let file = std::fs::File::create(path).with_context(|| format!("creating {path}"))?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing parquet batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(())
}

fn write_xlsx(rows: &[Row], path: &str) -> Result<()> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();

    for (col, header) in HEADERS.iter().enumerate() {
        sheet.write_string(0, col as u16, *header)?;
    }
    for (i, row) in rows.iter().enumerate() {
        let r = (i + 1) as u32;
        sheet.write_number(r, 0, (i + 1) as f64)?;
        sheet.write_number(r, 1, row.cycle as f64)?;
        sheet.write_string(r, 2, row.step)?;
        sheet.write_number(r, 3, row.current)?;
        match row.voltage {
            Some(v) => sheet.write_number(r, 4, v)?,
            None => sheet.write_string(r, 4, "--")?,
        };
        sheet.write_number(r, 5, row.chg_cap)?;
        sheet.write_number(r, 6, row.dchg_cap)?;
        sheet.write_number(r, 7, row.chg_energy)?;
        sheet.write_number(r, 8, row.dchg_energy)?;
    }

    workbook.save(path).with_context(|| format!("saving {path}"))?;
    Ok(())
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);
    let rows = simulate(&mut rng);

    write_parquet(&rows, "sample_cycler.parquet")?;
    write_xlsx(&rows, "sample_cycler.xlsx")?;

    println!(
        "Wrote {} readings over {CYCLES} cycles to sample_cycler.parquet and sample_cycler.xlsx",
        rows.len()
    );
    Ok(())
}
