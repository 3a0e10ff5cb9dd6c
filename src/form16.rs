//! Form 16 (employer salary statement) parser.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::Result;
use crate::table::{coerce_amount, resolve_column, slugify, Table};

/// Totals extracted from a Form 16 export.
///
/// Rows that match a known field synonym add into one of the six named
/// totals; rows naming a Chapter VI-A section go into `deductions`; every
/// other field is kept in `extras` so nothing silently disappears.
#[derive(Debug, Default, Clone, Serialize)]
pub struct Form16Data {
    pub gross_salary: f64,
    pub exempt_allowances: f64,
    pub standard_deduction: f64,
    pub professional_tax: f64,
    pub other_income_declared: f64,
    pub tds: f64,
    pub deductions: BTreeMap<String, f64>,
    pub extras: BTreeMap<String, f64>,
}

impl Form16Data {
    /// Salary income after standard allowances and deductions. May be
    /// negative; clamping happens in the tax computation, not here.
    pub fn salary_income(&self) -> f64 {
        self.gross_salary - self.exempt_allowances - self.standard_deduction - self.professional_tax
    }

    pub fn total_deductions(&self) -> f64 {
        self.deductions.values().sum()
    }
}

enum SalaryField {
    GrossSalary,
    ExemptAllowances,
    StandardDeduction,
    ProfessionalTax,
    OtherIncomeDeclared,
    Tds,
}

fn salary_field(slug: &str) -> Option<SalaryField> {
    match slug {
        "gross_salary" | "gross_salary_a" | "gross_total_income" => Some(SalaryField::GrossSalary),
        "allowances_to_the_extent_exempt_under_section10" | "exempt_allowances" => {
            Some(SalaryField::ExemptAllowances)
        }
        "standard_deduction" | "standard_deduction_us_16ia" => Some(SalaryField::StandardDeduction),
        "profession_tax" | "professional_tax" | "section_16_iii_professional_tax" => {
            Some(SalaryField::ProfessionalTax)
        }
        "other_income_declared" | "other_income_from_house_property_declared" => {
            Some(SalaryField::OtherIncomeDeclared)
        }
        "tds" | "tax_deducted_at_source" | "tax_deducted" => Some(SalaryField::Tds),
        _ => None,
    }
}

/// Deduction-section bucket key: uppercased, spaces stripped, so
/// "Section 80C (PF)" and "SECTION 80C (PF)" land in the same bucket.
pub fn section_key(label: &str) -> String {
    label.to_uppercase().replace(' ', "")
}

/// Parse a structured Form 16 export: a field column and an amount column,
/// one component per row.
pub fn read_form16(table: &Table) -> Result<Form16Data> {
    let field_col = resolve_column(table, &[&["field", "section", "component"]])?;
    let amount_col = resolve_column(table, &[&["amount", "value", "amt"]])?;

    let mut data = Form16Data::default();
    for row in table.rows() {
        let raw_field = row[field_col].as_text();
        if raw_field.is_empty() {
            continue;
        }
        let Some(amount) = coerce_amount(table, &row[amount_col], &raw_field)? else {
            continue;
        };

        let slug = slugify(&raw_field);
        if let Some(field) = salary_field(&slug) {
            let target = match field {
                SalaryField::GrossSalary => &mut data.gross_salary,
                SalaryField::ExemptAllowances => &mut data.exempt_allowances,
                SalaryField::StandardDeduction => &mut data.standard_deduction,
                SalaryField::ProfessionalTax => &mut data.professional_tax,
                SalaryField::OtherIncomeDeclared => &mut data.other_income_declared,
                SalaryField::Tds => &mut data.tds,
            };
            *target += amount;
        } else if slug.starts_with("section_80") || slug.starts_with("80") {
            *data.deductions.entry(section_key(&raw_field)).or_insert(0.0) += amount;
        } else {
            *data.extras.entry(raw_field).or_insert(0.0) += amount;
        }
    }
    Ok(data)
}
