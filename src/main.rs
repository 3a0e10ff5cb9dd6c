use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use log::info;

use itr2_summary::{
    compute_tax, export_summary, load_table, print_report, read_broker_pnl, read_form16,
    read_income_sheet, read_tis, IncomeBreakdown,
};

/// Prepare ITR-2 summary figures from Form 16, AIS, TIS and broker tax P&L
/// exports. The generated sheets mirror the raw inputs so the consolidated
/// numbers can be verified before they are typed into the ITR utilities.
#[derive(Parser, Debug)]
#[command(version)]
struct Args {
    /// Path to the Form 16 data (CSV/Excel)
    #[arg(long)]
    form16: PathBuf,

    /// Path to the AIS data (CSV/Excel)
    #[arg(long)]
    ais: PathBuf,

    /// Path to the TIS data (CSV/Excel)
    #[arg(long)]
    tis: PathBuf,

    /// Path to the broker tax P&L data (CSV/Excel)
    #[arg(long)]
    broker: PathBuf,

    /// Output directory for the summary sheets
    #[arg(long)]
    output: PathBuf,

    /// Financial year label (for reference only)
    #[arg(long, default_value = "2023-24")]
    fy: String,

    /// Additional metadata as a JSON object, e.g. '{"PAN": "ABCDE1234F"}'
    #[arg(long)]
    metadata: Option<String>,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let form16 = read_form16(&load_table(&args.form16)?)?;
    let ais_income = read_income_sheet(&load_table(&args.ais)?)?;
    let tis = read_tis(&load_table(&args.tis)?)?;
    let gains = read_broker_pnl(&load_table(&args.broker)?)?;
    info!(
        "parsed inputs: salary income {:.2}, AIS income {:.2}, TIS income {:.2}, gains {:.2}",
        form16.salary_income(),
        ais_income.total(),
        tis.income.total(),
        gains.total()
    );

    let combined_income = IncomeBreakdown::combine(&ais_income, &tis.income);
    let tax = compute_tax(&form16, &combined_income, &gains, &tis.deductions, tis.tax_paid);

    let mut metadata = vec![("Financial Year".to_string(), args.fy.clone())];
    if let Some(raw) = &args.metadata {
        let value: serde_json::Value =
            serde_json::from_str(raw).context("--metadata is not valid JSON")?;
        let Some(object) = value.as_object() else {
            bail!("--metadata must be a JSON object");
        };
        for (key, value) in object {
            let rendered = match value {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            metadata.push((key.clone(), rendered));
        }
    }

    export_summary(
        &args.output,
        &form16,
        &ais_income,
        &tis,
        &gains,
        &tax,
        &metadata,
    )?;
    print_report(&tax, form16.tds + tis.tax_paid);
    println!("\nSummary written to {}", args.output.display());

    Ok(())
}
