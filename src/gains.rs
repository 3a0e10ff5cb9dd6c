//! Broker tax P&L parser and capital-gains aggregate.

use serde::Serialize;

use crate::error::Result;
use crate::table::{coerce_amount, find_column, resolve_column, slugify, Table};

/// Canonical capital-gains buckets. Trade types that match no synonym fall
/// into [`GainsCategory::OtherGains`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GainsCategory {
    Stcg111a,
    Ltcg112a,
    Speculative,
    NonSpeculative,
    OtherGains,
}

impl GainsCategory {
    pub fn label(self) -> &'static str {
        match self {
            GainsCategory::Stcg111a => "stcg_111a",
            GainsCategory::Ltcg112a => "ltcg_112a",
            GainsCategory::Speculative => "speculative_income",
            GainsCategory::NonSpeculative => "non_speculative_income",
            GainsCategory::OtherGains => "other_gains",
        }
    }
}

pub fn gains_category(slug: &str) -> GainsCategory {
    match slug {
        "stcg_equity" | "stcg_equity_delivery" => GainsCategory::Stcg111a,
        "ltcg_equity" | "ltcg_equity_delivery" => GainsCategory::Ltcg112a,
        "intraday_equity" | "speculative" => GainsCategory::Speculative,
        "futures_options" | "fno" | "currency_fno" | "commodity_fno" => {
            GainsCategory::NonSpeculative
        }
        _ => GainsCategory::OtherGains,
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct GainsDetail {
    pub label: String,
    pub category: GainsCategory,
    pub amount: f64,
    pub description: Option<String>,
}

/// Realized gains summed per bucket, signs preserved as exported by the
/// broker. Losses stay negative; no netting beyond straight summation.
#[derive(Debug, Default, Clone, Serialize)]
pub struct CapitalGainsBreakdown {
    pub stcg_111a: f64,
    pub ltcg_112a: f64,
    pub speculative: f64,
    pub non_speculative: f64,
    pub other_gains: f64,
    /// Header of the descriptive column the details were read from, when
    /// the export had one.
    pub description_label: Option<String>,
    pub details: Vec<GainsDetail>,
}

impl CapitalGainsBreakdown {
    pub fn total(&self) -> f64 {
        self.stcg_111a + self.ltcg_112a + self.speculative + self.non_speculative + self.other_gains
    }

    fn add(&mut self, category: GainsCategory, amount: f64) {
        match category {
            GainsCategory::Stcg111a => self.stcg_111a += amount,
            GainsCategory::Ltcg112a => self.ltcg_112a += amount,
            GainsCategory::Speculative => self.speculative += amount,
            GainsCategory::NonSpeculative => self.non_speculative += amount,
            GainsCategory::OtherGains => self.other_gains += amount,
        }
    }
}

/// Parse a broker tax P&L export: a trade-type column (e.g. "STCG-Equity"),
/// a realized amount column, and an optional description/segment column.
pub fn read_broker_pnl(table: &Table) -> Result<CapitalGainsBreakdown> {
    let type_col = resolve_column(table, &[&["type", "category"]])?;
    let amount_col = resolve_column(table, &[&["amount", "net", "pnl"]])?;
    let description_col = find_column(table, &["description", "segment", "notes"]);

    let mut breakdown = CapitalGainsBreakdown {
        description_label: description_col.map(|c| table.headers()[c].clone()),
        ..Default::default()
    };
    for row in table.rows() {
        let type_raw = row[type_col].as_text();
        if type_raw.is_empty() {
            continue;
        }
        let Some(amount) = coerce_amount(table, &row[amount_col], &type_raw)? else {
            continue;
        };

        let category = gains_category(&slugify(&type_raw));
        breakdown.add(category, amount);
        breakdown.details.push(GainsDetail {
            label: type_raw,
            category,
            amount,
            description: description_col
                .map(|c| row[c].as_text())
                .filter(|s| !s.is_empty()),
        });
    }
    Ok(breakdown)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Cell;

    fn text(s: &str) -> Cell {
        Cell::Text(s.to_string())
    }

    fn num(v: f64) -> Cell {
        Cell::Number(v)
    }

    fn pnl_table(rows: Vec<Vec<Cell>>) -> Table {
        Table::new(
            vec!["Type".into(), "Amount".into(), "segment".into()],
            rows,
            "pnl.csv",
        )
    }

    #[test]
    fn buckets_preserve_sign_and_sum_to_accepted_rows() {
        let t = pnl_table(vec![
            vec![text("STCG-Equity"), num(150_000.0), text("Equity Delivery")],
            vec![text("LTCG-Equity"), num(120_000.0), text("Equity Delivery")],
            vec![text("Intraday-Equity"), num(-8_000.0), text("Equity Intraday")],
            vec![text("Futures-Options"), num(42_000.0), text("F&O")],
            vec![text("Buyback"), num(5_000.0), Cell::Empty],
            vec![text(""), num(77.0), Cell::Empty],
            vec![text("STCG-Equity"), Cell::Empty, Cell::Empty],
        ]);
        let b = read_broker_pnl(&t).unwrap();
        assert_eq!(b.stcg_111a, 150_000.0);
        assert_eq!(b.ltcg_112a, 120_000.0);
        assert_eq!(b.speculative, -8_000.0);
        assert_eq!(b.non_speculative, 42_000.0);
        assert_eq!(b.other_gains, 5_000.0);

        let accepted: f64 = b.details.iter().map(|d| d.amount).sum();
        assert_eq!(b.total(), accepted);
        assert_eq!(b.details.len(), 5);
        assert_eq!(b.description_label.as_deref(), Some("segment"));
        assert_eq!(b.details[0].description.as_deref(), Some("Equity Delivery"));
    }

    #[test]
    fn unknown_trade_types_fall_into_other_gains() {
        for raw in ["Buyback", "Slump Sale", "whatever"] {
            assert_eq!(gains_category(&slugify(raw)), GainsCategory::OtherGains);
        }
        assert_eq!(gains_category("fno"), GainsCategory::NonSpeculative);
        assert_eq!(gains_category("stcg_equity_delivery"), GainsCategory::Stcg111a);
    }

    #[test]
    fn bad_amount_aborts_with_context() {
        let t = pnl_table(vec![vec![text("STCG-Equity"), text("n/a"), Cell::Empty]]);
        let err = read_broker_pnl(&t).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("n/a"));
        assert!(msg.contains("STCG-Equity"));
        assert!(msg.contains("pnl.csv"));
    }
}
