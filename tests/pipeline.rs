use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;

use itr2_summary::{
    compute_tax, export_summary, load_table, read_broker_pnl, read_form16, read_income_sheet,
    read_tis, IncomeBreakdown,
};

fn sample(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("sample_data")
        .join(name)
}

fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-6,
        "expected {expected}, got {actual}"
    );
}

#[test]
fn full_pipeline_over_sample_data() -> Result<()> {
    let form16 = read_form16(&load_table(&sample("form16_sample.csv"))?)?;
    let ais_income = read_income_sheet(&load_table(&sample("ais_sample.csv"))?)?;
    let tis = read_tis(&load_table(&sample("tis_sample.csv"))?)?;
    let gains = read_broker_pnl(&load_table(&sample("broker_pnl_sample.csv"))?)?;

    assert_close(form16.gross_salary, 1_250_000.0);
    assert_close(form16.salary_income(), 1_137_600.0);
    assert_close(form16.tds, 95_000.0);
    assert_close(form16.total_deductions(), 225_000.0);
    // The "Employer Name" row has no amount and is skipped, not an error.
    assert_eq!(form16.extras.len(), 1);

    assert_close(ais_income.interest, 46_430.5);
    assert_close(ais_income.rental, 180_000.0);
    assert_eq!(ais_income.details.len(), 5);

    assert_close(tis.income.total(), 156_340.0);
    assert_close(tis.tax_paid, 20_000.0);
    assert_eq!(tis.deductions.get("SECTION80D"), Some(&50_000.0));
    // Three income rows plus the ignored "Demand" row.
    assert_eq!(tis.income.details.len(), 4);
    assert_eq!(tis.income.details.iter().filter(|d| d.category.is_none()).count(), 1);

    assert_close(gains.total(), 309_000.0);
    assert_close(gains.speculative, -8_000.0);

    let combined_income = IncomeBreakdown::combine(&ais_income, &tis.income);
    assert_close(combined_income.total(), 400_570.5);

    let tax = compute_tax(&form16, &combined_income, &gains, &tis.deductions, tis.tax_paid);
    assert_close(tax.total_income, 1_584_170.5);
    assert_close(tax.tax_before_cess, 231_251.15);
    assert_close(tax.tax_payable, 240_501.196);
    assert_close(tax.net_payable, 125_501.196);
    assert_close(tax.rebate_87a, 0.0);

    let out = std::env::temp_dir().join("itr2_summary_pipeline_test");
    let _ = fs::remove_dir_all(&out);
    export_summary(
        &out,
        &form16,
        &ais_income,
        &tis,
        &gains,
        &tax,
        &[("Financial Year".to_string(), "2023-24".to_string())],
    )?;

    for sheet in [
        "summary.csv",
        "salary.csv",
        "form16_deductions.csv",
        "form16_extras.csv",
        "tis_deductions.csv",
        "ais.csv",
        "tis_income.csv",
        "broker.csv",
        "summary.json",
    ] {
        assert!(out.join(sheet).exists(), "missing {sheet}");
    }

    let summary = fs::read_to_string(out.join("summary.csv"))?;
    assert!(summary.contains("Financial Year,2023-24"));
    assert!(summary.contains("Net Tax Payable/Refund"));

    let tis_sheet = fs::read_to_string(out.join("tis_income.csv"))?;
    assert!(tis_sheet.contains("ignored"));

    let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(out.join("summary.json"))?)?;
    assert_eq!(json["form16"]["gross_salary"], 1_250_000.0);
    assert!(json["tax"]["tax_payable"].as_f64().unwrap() > 0.0);

    Ok(())
}

#[test]
fn bad_amounts_fail_fast_with_context() -> Result<()> {
    let dir = std::env::temp_dir().join("itr2_summary_pipeline_bad");
    fs::create_dir_all(&dir)?;
    let path = dir.join("broker_bad.csv");
    fs::write(&path, "Type,Amount\nSTCG-Equity,abc\n")?;

    let err = read_broker_pnl(&load_table(&path)?).unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("abc"));
    assert!(msg.contains("STCG-Equity"));
    assert!(msg.contains("broker_bad.csv"));
    Ok(())
}
