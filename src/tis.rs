//! TIS (Taxpayer Information Summary) parser.
//!
//! Unlike the AIS sheet, TIS rows carry an entry type: income rows are
//! categorized like AIS entries, deduction rows go into a per-section map,
//! tax-paid rows sum into a single scalar, and anything else is kept in the
//! detail list for audit but excluded from every aggregate.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::Result;
use crate::form16::section_key;
use crate::income::{income_category, IncomeBreakdown, IncomeDetail};
use crate::table::{coerce_amount, find_column, resolve_column, slugify, Table};

#[derive(Debug, Default, Clone, Serialize)]
pub struct TisReport {
    pub income: IncomeBreakdown,
    pub deductions: BTreeMap<String, f64>,
    /// Advance/self-assessment tax flagged in the TIS.
    pub tax_paid: f64,
}

pub fn read_tis(table: &Table) -> Result<TisReport> {
    let type_col = resolve_column(table, &[&["type", "entry_type"]])?;
    let amount_col = resolve_column(table, &[&["amount", "value"]])?;
    let category_col = find_column(table, &["category", "section", "description"]);

    let mut report = TisReport::default();
    for row in table.rows() {
        let entry_raw = row[type_col].as_text();
        if entry_raw.is_empty() {
            continue;
        }
        let Some(amount) = coerce_amount(table, &row[amount_col], &entry_raw)? else {
            continue;
        };
        let category_text = category_col.map(|c| row[c].as_text()).unwrap_or_default();

        match slugify(&entry_raw).as_str() {
            "income" | "reported_income" => {
                let mapped = income_category(&slugify(&category_text));
                report.income.add(mapped, amount);
                report.income.details.push(IncomeDetail {
                    entry_type: Some(entry_raw),
                    label: category_text,
                    category: Some(mapped),
                    amount,
                    description: None,
                });
            }
            "deduction" | "reported_deduction" => {
                let section = if category_text.is_empty() {
                    "Deduction".to_string()
                } else {
                    category_text
                };
                *report.deductions.entry(section_key(&section)).or_insert(0.0) += amount;
            }
            "taxpaid" | "tax_paid" | "advance_tax" | "self_assessment_tax" => {
                report.tax_paid += amount;
            }
            _ => {
                report.income.details.push(IncomeDetail {
                    entry_type: Some(entry_raw),
                    label: category_text,
                    category: None,
                    amount,
                    description: None,
                });
            }
        }
    }
    Ok(report)
}
