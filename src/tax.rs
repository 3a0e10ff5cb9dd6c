//! Old-regime tax computation for FY 2023-24.
//!
//! Pure arithmetic over already-validated aggregates; this module performs
//! no I/O and cannot fail. The rate table is a constant of the design, not
//! user-configurable.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::form16::Form16Data;
use crate::gains::CapitalGainsBreakdown;
use crate::income::IncomeBreakdown;

/// Slab widths and marginal rates, lowest band first.
const SLABS: [(f64, f64); 4] = [
    (250_000.0, 0.0),
    (250_000.0, 0.05),
    (500_000.0, 0.20),
    (f64::INFINITY, 0.30),
];

const REBATE_87A_LIMIT: f64 = 500_000.0;
const REBATE_87A_MAX: f64 = 12_500.0;
const STCG_111A_RATE: f64 = 0.15;
const LTCG_112A_RATE: f64 = 0.10;
const LTCG_112A_EXEMPTION: f64 = 100_000.0;
const CESS_RATE: f64 = 0.04;

#[derive(Debug, Default, Clone, Serialize)]
pub struct TaxComputation {
    /// Gross total income less Chapter VI deductions, floored at zero.
    pub total_income: f64,
    pub tax_before_cess: f64,
    pub health_education_cess: f64,
    pub tax_payable: f64,
    /// Liability after TDS and advance tax; negative means a refund is due.
    pub net_payable: f64,
    pub rebate_87a: f64,
}

fn slab_tax(taxable_income: f64) -> f64 {
    let mut remaining = taxable_income;
    let mut tax = 0.0;
    for (width, rate) in SLABS {
        if remaining <= 0.0 {
            break;
        }
        let span = remaining.min(width);
        tax += span * rate;
        remaining -= span;
    }
    tax
}

/// Calculate the tax liability from the four source aggregates.
///
/// STCG 111A and LTCG 112A are taxed at their flat statutory rates and
/// removed from the slab base; everything else goes through the
/// progressive schedule. The section 87A rebate applies against slab tax
/// only, and prepaid tax (TDS + TIS tax-paid) is netted off at the end
/// without clamping, so the caller can tell a refund from a demand by the
/// sign of `net_payable`.
pub fn compute_tax(
    form16: &Form16Data,
    other_income: &IncomeBreakdown,
    gains: &CapitalGainsBreakdown,
    tis_deductions: &BTreeMap<String, f64>,
    tis_tax_paid: f64,
) -> TaxComputation {
    let deduction_total = form16.total_deductions() + tis_deductions.values().sum::<f64>();

    let gross_total_income = form16.salary_income()
        + form16.other_income_declared
        + other_income.total()
        + gains.total();

    let total_income = (gross_total_income - deduction_total).max(0.0);

    // Components taxed at special rates leave the slab base; losses stay in.
    let stcg = gains.stcg_111a.max(0.0);
    let ltcg = gains.ltcg_112a.max(0.0);
    let income_for_slabs = (total_income - stcg - ltcg).max(0.0);

    let mut slab = slab_tax(income_for_slabs);
    let mut rebate_87a = 0.0;
    if total_income <= REBATE_87A_LIMIT {
        rebate_87a = REBATE_87A_MAX.min(slab);
        slab -= rebate_87a;
    }

    let stcg_tax = STCG_111A_RATE * stcg;
    let ltcg_tax = LTCG_112A_RATE * (ltcg - LTCG_112A_EXEMPTION).max(0.0);

    let tax_before_cess = slab + stcg_tax + ltcg_tax;
    let cess = CESS_RATE * tax_before_cess;
    let tax_payable = tax_before_cess + cess;
    let prepaid = form16.tds + tis_tax_paid;

    TaxComputation {
        total_income,
        tax_before_cess,
        health_education_cess: cess,
        tax_payable,
        net_payable: tax_payable - prepaid,
        rebate_87a,
    }
}
