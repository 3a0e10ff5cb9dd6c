//! Consolidates income-tax figures from Form 16, AIS, TIS and broker tax
//! P&L exports into a single computed ITR-2 summary.
//!
//! The pipeline is a single synchronous pass: each export is loaded into a
//! [`table::Table`], parsed into a typed aggregate by its source parser,
//! and the four aggregates feed the deterministic [`tax::compute_tax`]
//! computation. The report module then mirrors everything into CSV sheets
//! and a JSON document for manual entry into the ITR-2 utilities.
//!
//! Parsing is tolerant of header spelling (case- and punctuation-insensitive
//! synonyms) and of free-text category labels (unknown labels land in an
//! explicit fallback bucket), but strict about amounts: a non-numeric amount
//! fails the whole file rather than being skipped. Income reported in both
//! AIS and TIS is summed, not deduplicated; the detail sheets exist so the
//! user can spot and resolve such overlaps by hand. Nothing is ever
//! submitted anywhere; this only speeds up manual data entry.

pub mod error;
pub mod form16;
pub mod gains;
pub mod income;
pub mod report;
pub mod table;
pub mod tax;
pub mod tis;

pub use error::{InputFormatError, Result};
pub use form16::{read_form16, Form16Data};
pub use gains::{read_broker_pnl, CapitalGainsBreakdown, GainsCategory, GainsDetail};
pub use income::{read_income_sheet, IncomeBreakdown, IncomeCategory, IncomeDetail};
pub use report::{export_summary, print_report};
pub use table::{load_table, resolve_column, slugify, Cell, Table};
pub use tax::{compute_tax, TaxComputation};
pub use tis::{read_tis, TisReport};
