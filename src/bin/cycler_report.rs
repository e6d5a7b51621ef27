use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum, ValueHint};

use rusty_cycler::data::report;
use rusty_cycler::{Analysis, Mode, process};

#[derive(Parser, Debug)]
#[command(author, version, about = "Per-cycle ESR and efficiency report for battery cycler logs", long_about = None)]
struct Cli {
    /// Cycler export (.xlsx, .xls, .ods, .csv, .json, .parquet)
    #[arg(value_hint = ValueHint::FilePath)]
    input: PathBuf,

    /// Metric set to compute
    #[arg(long, value_enum, default_value_t = ModeOpt::Esr)]
    mode: ModeOpt,

    /// Write the result table here (.xlsx or .csv; other names get .xlsx appended)
    #[arg(short, long, value_hint = ValueHint::FilePath)]
    output: Option<PathBuf>,

    /// Print the summary as JSON instead of text
    #[arg(long)]
    summary_json: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum ModeOpt {
    /// Voltage/current maxima and ESR
    Esr,
    /// Adds capacity, energy, coulombic and energy efficiency
    Full,
}

impl From<ModeOpt> for Mode {
    fn from(opt: ModeOpt) -> Self {
        match opt {
            ModeOpt::Esr => Mode::EsrOnly,
            ModeOpt::Full => Mode::Full,
        }
    }
}

fn main() -> Result<ExitCode> {
    env_logger::init();
    let cli = Cli::parse();

    let analysis = match process(&cli.input, cli.mode.into()) {
        Ok(a) => a,
        Err(e) => {
            log::error!("{e}");
            eprintln!("{}", e.user_message());
            return Ok(ExitCode::FAILURE);
        }
    };

    print_table(&analysis);
    println!();
    if cli.summary_json {
        let json = serde_json::to_string_pretty(&analysis.summary).context("serialising summary")?;
        println!("{json}");
    } else {
        for line in report::summary_lines(&analysis.summary) {
            println!("{line}");
        }
    }

    if let Some(output) = &cli.output {
        let written = report::export(&analysis, output)
            .with_context(|| format!("exporting results to {}", output.display()))?;
        println!("Saved → {}", written.display());
    }

    Ok(ExitCode::SUCCESS)
}

/// Right-aligned text table of the rounded results.
fn print_table(analysis: &Analysis) {
    let headers = report::headers(analysis.mode);
    let rows = report::display_rows(analysis);

    let widths: Vec<usize> = headers
        .iter()
        .enumerate()
        .map(|(i, h)| {
            rows.iter()
                .map(|r| r[i].chars().count())
                .chain(std::iter::once(h.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let line = |cells: Vec<&str>| {
        cells
            .iter()
            .zip(&widths)
            .map(|(c, &w)| format!("{c:>w$}"))
            .collect::<Vec<_>>()
            .join("  ")
    };

    println!("{}", line(headers.clone()));
    for row in &rows {
        println!("{}", line(row.iter().map(String::as_str).collect()));
    }
}
