//! Income categories and the AIS income-statement parser.

use serde::Serialize;

use crate::error::Result;
use crate::table::{coerce_amount, find_column, resolve_column, slugify, Table};

/// Canonical income heads. Every free-text label maps onto one of these;
/// anything unrecognized lands in [`IncomeCategory::Other`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IncomeCategory {
    Interest,
    Dividend,
    Rental,
    Other,
}

impl IncomeCategory {
    pub fn label(self) -> &'static str {
        match self {
            IncomeCategory::Interest => "interest_income",
            IncomeCategory::Dividend => "dividend_income",
            IncomeCategory::Rental => "rental_income",
            IncomeCategory::Other => "other_income",
        }
    }
}

/// Map a slugged category label onto its canonical head. Total: unknown
/// labels fall through to `Other`, never an error.
pub fn income_category(slug: &str) -> IncomeCategory {
    match slug {
        "interest" | "interest_income" | "bank_interest" | "savings_interest" => {
            IncomeCategory::Interest
        }
        "dividend" | "dividend_income" => IncomeCategory::Dividend,
        "rent" | "rental_income" | "house_property" => IncomeCategory::Rental,
        "other_income" | "others" | "speculative_income" => IncomeCategory::Other,
        _ => IncomeCategory::Other,
    }
}

/// One accepted (or deliberately ignored) row, kept in file order for the
/// audit sheets.
#[derive(Debug, Clone, Serialize)]
pub struct IncomeDetail {
    /// Entry-type text for TIS rows; absent for AIS rows.
    pub entry_type: Option<String>,
    pub label: String,
    /// `None` marks a TIS row recorded for audit but excluded from totals.
    pub category: Option<IncomeCategory>,
    pub amount: f64,
    pub description: Option<String>,
}

#[derive(Debug, Default, Clone, Serialize)]
pub struct IncomeBreakdown {
    pub interest: f64,
    pub dividend: f64,
    pub rental: f64,
    pub other: f64,
    pub details: Vec<IncomeDetail>,
}

impl IncomeBreakdown {
    pub fn total(&self) -> f64 {
        self.interest + self.dividend + self.rental + self.other
    }

    pub fn add(&mut self, category: IncomeCategory, amount: f64) {
        match category {
            IncomeCategory::Interest => self.interest += amount,
            IncomeCategory::Dividend => self.dividend += amount,
            IncomeCategory::Rental => self.rental += amount,
            IncomeCategory::Other => self.other += amount,
        }
    }

    /// Field-by-field sum of two independently-sourced breakdowns.
    ///
    /// Overlapping entries are summed, not reconciled: both statements may
    /// report the same transaction and the combined figure then counts it
    /// twice. Detail records stay with their source aggregates, so the
    /// combined value carries none.
    pub fn combine(a: &Self, b: &Self) -> Self {
        Self {
            interest: a.interest + b.interest,
            dividend: a.dividend + b.dividend,
            rental: a.rental + b.rental,
            other: a.other + b.other,
            details: Vec::new(),
        }
    }
}

/// Parse AIS income items: one categorized amount per row, with an optional
/// free-text description carried into the detail sheet.
pub fn read_income_sheet(table: &Table) -> Result<IncomeBreakdown> {
    let category_col = resolve_column(table, &[&["category", "head", "type"]])?;
    let amount_col = resolve_column(table, &[&["amount", "value", "reported_amount"]])?;
    let description_col = find_column(table, &["description", "details", "source"]);

    let mut breakdown = IncomeBreakdown::default();
    for row in table.rows() {
        let label = row[category_col].as_text();
        if label.is_empty() {
            continue;
        }
        let Some(amount) = coerce_amount(table, &row[amount_col], &label)? else {
            continue;
        };

        let category = income_category(&slugify(&label));
        breakdown.add(category, amount);
        breakdown.details.push(IncomeDetail {
            entry_type: None,
            label,
            category: Some(category),
            amount,
            description: description_col
                .map(|c| row[c].as_text())
                .filter(|s| !s.is_empty()),
        });
    }
    Ok(breakdown)
}
