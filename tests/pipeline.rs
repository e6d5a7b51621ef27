//! End-to-end runs of the analysis over files on disk.

use std::fs;
use std::path::{Path, PathBuf};

use rust_xlsxwriter::Workbook;
use tempfile::TempDir;

use rusty_cycler::data::filter::StepClass;
use rusty_cycler::data::report;
use rusty_cycler::{AnalysisError, Mode, process};

const ESR_LOG: &str = "\
Record Index,Cycle Index,Step Type,Current(A),Voltage(V)
1,1,CC_Chg,1.5,4.00
2,1,CC_Chg,2.0,4.20
3,1,Rest,0.0,4.10
4,1,CC_DChg,0.0,3.95
5,1,CC_DChg,0.0,3.80
";

const FULL_LOG: &str = "\
Cycle Index,Step Type,Current(A),Voltage(V),Chg. Cap.(Ah),DChg. Cap.(Ah),Chg. Energy(Wh),DChg. Energy(Wh)
1,CC_Chg,2.0,4.20,0.5,0,2.0,0
1,CC_Chg,2.0,4.20,1.0,0,4.0,0
1,CC_DChg,0.0,3.95,0,0.49,0,1.8
1,CC_DChg,0.0,3.95,0,0.98,0,3.6
";

fn write(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).unwrap();
    path
}

#[test]
fn esr_from_csv() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(&dir, "log.csv", ESR_LOG);

    let analysis = process(&path, Mode::EsrOnly).unwrap();
    assert_eq!(analysis.len(), 1);
    let row = &analysis.cycles[0];
    assert_eq!(row.cycle, 1);
    assert_eq!(row.max_voltage_charge, Some(4.2));
    assert_eq!(row.max_current_discharge, Some(0.0));
    assert!((row.esr.unwrap() - 0.125).abs() < 1e-9);
    assert_eq!(report::format_value(row.esr), "0.125");
    assert!(row.coulombic_efficiency.is_none());
}

#[test]
fn full_metrics_from_csv() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(&dir, "log.csv", FULL_LOG);

    let analysis = process(&path, Mode::Full).unwrap();
    let row = &analysis.cycles[0];
    assert_eq!(row.charge_capacity, Some(1.0));
    assert_eq!(row.discharge_capacity, Some(0.98));
    assert_eq!(report::format_value(row.coulombic_efficiency), "98");
    assert_eq!(report::format_value(row.energy_efficiency), "90");
    assert_eq!(report::format_value(analysis.summary.mean_energy_efficiency), "90");
}

#[test]
fn full_mode_needs_capacity_columns() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(&dir, "log.csv", ESR_LOG);

    match process(&path, Mode::Full) {
        Err(AnalysisError::Schema { missing }) => assert_eq!(missing.len(), 4),
        other => panic!("expected schema error, got {other:?}"),
    }
}

#[test]
fn header_only_file_is_empty_result() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(&dir, "log.csv", "Cycle Index,Step Type,Current(A),Voltage(V)\n");

    assert_eq!(process(&path, Mode::EsrOnly), Err(AnalysisError::EmptyResult));
}

#[test]
fn no_discharge_steps() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(
        &dir,
        "log.csv",
        "Cycle Index,Step Type,Current(A),Voltage(V)\n1,CC_Chg,2.0,4.2\n1,Rest,0,4.1\n",
    );

    assert_eq!(
        process(&path, Mode::EsrOnly),
        Err(AnalysisError::NoMatchingSteps(StepClass::ConstantCurrentDischarge))
    );
}

#[test]
fn no_charge_steps() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(
        &dir,
        "log.csv",
        "Cycle Index,Step Type,Current(A),Voltage(V)\n\
         1,Constant Current Discharge,-1.0,3.9\n\
         1,Rest,0,3.7\n",
    );

    assert_eq!(
        process(&path, Mode::EsrOnly),
        Err(AnalysisError::NoMatchingSteps(StepClass::ConstantCurrentCharge))
    );
}

#[test]
fn discharge_only_labels_also_count_as_charge() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(
        &dir,
        "log.csv",
        "Cycle Index,Step Type,Current(A),Voltage(V)\n\
         1,CC_DChg,-1.0,3.9\n\
         1,CC Discharge,-1.0,3.8\n",
    );

    // "chg" and "charge" follow the cc token, so both rows land in both subsets
    let analysis = process(&path, Mode::EsrOnly).unwrap();
    assert_eq!(analysis.summary.ambiguous_step_rows, 2);
    let row = &analysis.cycles[0];
    assert_eq!(row.max_voltage_charge, row.max_voltage_discharge);
    assert_eq!(row.esr, None);
}

#[test]
fn unreadable_inputs_are_file_access_errors() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("absent.csv");
    let unknown = write(&dir, "log.txt", ESR_LOG);

    for path in [missing, unknown] {
        let err = process(&path, Mode::EsrOnly).unwrap_err();
        assert!(matches!(err, AnalysisError::FileAccess(_)), "{err:?}");
    }
}

#[test]
fn repeated_runs_export_identical_bytes() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(&dir, "log.csv", FULL_LOG);

    let export = |name: &str| -> Vec<u8> {
        let analysis = process(&path, Mode::Full).unwrap();
        let written = report::export(&analysis, &dir.path().join(name)).unwrap();
        fs::read(written).unwrap()
    };

    assert_eq!(export("a.csv"), export("b.csv"));
}

#[test]
fn exported_table_is_not_a_valid_input() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(&dir, "log.csv", ESR_LOG);
    let analysis = process(&path, Mode::EsrOnly).unwrap();
    let exported = report::export(&analysis, &dir.path().join("out.csv")).unwrap();

    match process(&exported, Mode::EsrOnly) {
        Err(AnalysisError::Schema { missing }) => {
            assert_eq!(missing.len(), 1);
            assert!(missing[0].starts_with("step_type"), "{missing:?}");
        }
        other => panic!("expected schema error, got {other:?}"),
    }
}

fn write_workbook(path: &Path) {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    for (col, header) in ["Cycle Index", "Step Type", "Current(A)", "Voltage(V)"].iter().enumerate() {
        sheet.write_string(0, col as u16, *header).unwrap();
    }
    let rows = [
        (1.0, "CC_Chg", 2.0, 4.2),
        (1.0, "CC_DChg", 0.0, 3.95),
        (2.0, "CC_Chg", 2.0, 4.3),
        (2.0, "CC_DChg", 1.0, 4.0),
    ];
    for (i, (cycle, step, current, voltage)) in rows.into_iter().enumerate() {
        let r = (i + 1) as u32;
        sheet.write_number(r, 0, cycle).unwrap();
        sheet.write_string(r, 1, step).unwrap();
        sheet.write_number(r, 2, current).unwrap();
        sheet.write_number(r, 3, voltage).unwrap();
    }
    workbook.save(path).unwrap();
}

#[test]
fn esr_from_xlsx() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("log.xlsx");
    write_workbook(&path);

    let analysis = process(&path, Mode::EsrOnly).unwrap();
    let cycles: Vec<i64> = analysis.cycles.iter().map(|c| c.cycle).collect();
    assert_eq!(cycles, vec![1, 2]);
    assert_eq!(report::format_value(analysis.cycles[0].esr), "0.125");
    assert_eq!(report::format_value(analysis.cycles[1].esr), "0.3");
    assert_eq!(report::format_value(analysis.summary.pooled_esr), "0.183333");
}
