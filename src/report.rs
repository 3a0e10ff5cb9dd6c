//! Report assembly: consolidated summary and per-source audit sheets.
//!
//! The core hands over fully-computed, immutable data; this module only
//! serializes it. One CSV file per logical sheet lands in the output
//! directory, alongside a `summary.json` with the complete aggregates for
//! downstream tooling.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::path::Path;

use anyhow::{Context, Result};
use log::info;
use serde::Serialize;

use crate::form16::Form16Data;
use crate::gains::CapitalGainsBreakdown;
use crate::income::{IncomeBreakdown, IncomeDetail};
use crate::tax::TaxComputation;
use crate::tis::TisReport;

#[derive(Serialize)]
struct SummaryDocument<'a> {
    metadata: &'a [(String, String)],
    form16: &'a Form16Data,
    ais_income: &'a IncomeBreakdown,
    tis: &'a TisReport,
    capital_gains: &'a CapitalGainsBreakdown,
    tax: &'a TaxComputation,
}

/// Write the consolidated summary and the raw-input mirror sheets.
///
/// `metadata` rows (financial year, PAN, ...) lead the summary sheet.
/// Sheets for empty maps or detail lists are not written at all, matching
/// the way the inputs themselves omit what they do not have.
pub fn export_summary(
    dir: &Path,
    form16: &Form16Data,
    ais_income: &IncomeBreakdown,
    tis: &TisReport,
    gains: &CapitalGainsBreakdown,
    tax: &TaxComputation,
    metadata: &[(String, String)],
) -> Result<()> {
    fs::create_dir_all(dir)
        .with_context(|| format!("failed to create output directory {}", dir.display()))?;

    let mut summary: Vec<(String, String)> = metadata.to_vec();
    for (metric, amount) in [
        ("Salary Income", form16.salary_income()),
        ("Other Income Declared to Employer", form16.other_income_declared),
        ("AIS Income", ais_income.total()),
        ("TIS Income", tis.income.total()),
        ("Speculative Income", gains.speculative),
        ("Non-Speculative Business Income", gains.non_speculative),
        ("STCG (111A)", gains.stcg_111a),
        ("LTCG (112A)", gains.ltcg_112a),
        ("Other Capital Gains", gains.other_gains),
        ("Chapter VI deductions (Form 16)", form16.total_deductions()),
        ("Chapter VI deductions (TIS)", tis.deductions.values().sum::<f64>()),
        ("Total Income (post deductions)", tax.total_income),
        ("Tax before cess", tax.tax_before_cess),
        ("Health & Education Cess", tax.health_education_cess),
        ("Total Tax Payable", tax.tax_payable),
        ("TDS + Advance Tax", form16.tds + tis.tax_paid),
        ("Rebate u/s 87A", tax.rebate_87a),
        ("Net Tax Payable/Refund", tax.net_payable),
    ] {
        summary.push((metric.to_string(), amount.to_string()));
    }
    write_pairs(&dir.join("summary.csv"), ("Metric", "Amount"), &summary)?;

    let salary: Vec<(String, String)> = [
        ("Gross Salary", form16.gross_salary),
        ("Exempt Allowances", form16.exempt_allowances),
        ("Standard Deduction", form16.standard_deduction),
        ("Professional Tax", form16.professional_tax),
        ("Other Income Declared", form16.other_income_declared),
        ("TDS", form16.tds),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();
    write_pairs(&dir.join("salary.csv"), ("Component", "Amount"), &salary)?;

    write_map(&dir.join("form16_deductions.csv"), "Section", &form16.deductions)?;
    write_map(&dir.join("form16_extras.csv"), "Field", &form16.extras)?;
    write_map(&dir.join("tis_deductions.csv"), "Section", &tis.deductions)?;

    write_income_details(&dir.join("ais.csv"), &ais_income.details, false)?;
    write_income_details(&dir.join("tis_income.csv"), &tis.income.details, true)?;
    write_gains_details(&dir.join("broker.csv"), gains)?;

    let json_path = dir.join("summary.json");
    let file = File::create(&json_path)
        .with_context(|| format!("failed to create {}", json_path.display()))?;
    serde_json::to_writer_pretty(
        file,
        &SummaryDocument {
            metadata,
            form16,
            ais_income,
            tis,
            capital_gains: gains,
            tax,
        },
    )
    .with_context(|| format!("failed to write {}", json_path.display()))?;

    info!("summary written to {}", dir.display());
    Ok(())
}

/// Print the headline figures of the computation to stdout.
pub fn print_report(tax: &TaxComputation, prepaid: f64) {
    println!("\n=== ITR-2 TAX SUMMARY ===\n");
    println!("Total income (post deductions): ₹{:.2}", tax.total_income);
    println!("Tax before cess: ₹{:.2}", tax.tax_before_cess);
    println!("Health & education cess: ₹{:.2}", tax.health_education_cess);
    println!("Rebate u/s 87A: ₹{:.2}", tax.rebate_87a);
    println!("Total tax payable: ₹{:.2}", tax.tax_payable);
    println!("TDS + advance tax already paid: ₹{:.2}", prepaid);
    if tax.net_payable >= 0.0 {
        println!("Net tax payable: ₹{:.2}", tax.net_payable);
    } else {
        println!("Refund due: ₹{:.2}", -tax.net_payable);
    }
}

fn write_pairs(path: &Path, columns: (&str, &str), rows: &[(String, String)]) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    wtr.write_record([columns.0, columns.1])?;
    for (key, value) in rows {
        wtr.write_record([key.as_str(), value.as_str()])?;
    }
    wtr.flush()?;
    Ok(())
}

fn write_map(path: &Path, key_column: &str, map: &BTreeMap<String, f64>) -> Result<()> {
    if map.is_empty() {
        return Ok(());
    }
    let rows: Vec<(String, String)> = map
        .iter()
        .map(|(k, v)| (k.clone(), v.to_string()))
        .collect();
    write_pairs(path, (key_column, "Amount"), &rows)
}

fn write_income_details(path: &Path, details: &[IncomeDetail], with_type: bool) -> Result<()> {
    if details.is_empty() {
        return Ok(());
    }
    let with_description = details.iter().any(|d| d.description.is_some());

    let mut wtr = csv::Writer::from_path(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    let mut header = Vec::new();
    if with_type {
        header.push("Type");
    }
    header.extend(["Category", "Mapped Category", "Amount"]);
    if with_description {
        header.push("Description");
    }
    wtr.write_record(&header)?;

    for detail in details {
        let mut record = Vec::new();
        if with_type {
            record.push(detail.entry_type.clone().unwrap_or_default());
        }
        record.push(detail.label.clone());
        record.push(
            detail
                .category
                .map(|c| c.label().to_string())
                .unwrap_or_else(|| "ignored".to_string()),
        );
        record.push(detail.amount.to_string());
        if with_description {
            record.push(detail.description.clone().unwrap_or_default());
        }
        wtr.write_record(&record)?;
    }
    wtr.flush()?;
    Ok(())
}

fn write_gains_details(path: &Path, gains: &CapitalGainsBreakdown) -> Result<()> {
    if gains.details.is_empty() {
        return Ok(());
    }
    let mut wtr = csv::Writer::from_path(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    let mut header = vec![
        "Type".to_string(),
        "Mapped Category".to_string(),
        "Amount".to_string(),
    ];
    if let Some(label) = &gains.description_label {
        header.push(capitalize(label));
    }
    wtr.write_record(&header)?;

    for detail in &gains.details {
        let mut record = vec![
            detail.label.clone(),
            detail.category.label().to_string(),
            detail.amount.to_string(),
        ];
        if gains.description_label.is_some() {
            record.push(detail.description.clone().unwrap_or_default());
        }
        wtr.write_record(&record)?;
    }
    wtr.flush()?;
    Ok(())
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
