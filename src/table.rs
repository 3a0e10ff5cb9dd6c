//! Table abstraction shared by all statement parsers.
//!
//! A [`Table`] is an ordered header list plus ordered rows of loosely-typed
//! cells, loaded once from a CSV or Excel export and immutable thereafter.
//! Blank cells are kept distinct from zero so that parsers can tell "no
//! entry" apart from an actual amount.

use std::path::{Path, PathBuf};

use calamine::{open_workbook_auto, Data, Reader};
use log::debug;

use crate::error::{InputFormatError, Result};

/// A single loosely-typed cell value.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Number(f64),
    Empty,
}

impl Cell {
    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }

    /// Text rendering of the cell, trimmed. Integral numbers render without
    /// a trailing `.0` so that numeric-looking labels survive the round trip
    /// through a spreadsheet.
    pub fn as_text(&self) -> String {
        match self {
            Cell::Text(s) => s.trim().to_string(),
            Cell::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => format!("{}", *n as i64),
            Cell::Number(n) => n.to_string(),
            Cell::Empty => String::new(),
        }
    }

    /// Numeric coercion: numbers pass through, text is parsed, blank is
    /// `None`. Unparseable text is also `None`; callers decide whether
    /// that is an error.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Number(n) => Some(*n),
            Cell::Text(s) => s.trim().parse().ok(),
            Cell::Empty => None,
        }
    }
}

/// An immutable tabular input, indexable by column position.
///
/// Rows are padded to the header width on construction, so `row[col]` is
/// always in bounds for a resolved column index.
#[derive(Debug, Clone)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<Cell>>,
    source: PathBuf,
}

impl Table {
    pub fn new(headers: Vec<String>, mut rows: Vec<Vec<Cell>>, source: impl Into<PathBuf>) -> Self {
        let width = headers.len();
        for row in &mut rows {
            row.resize(width, Cell::Empty);
        }
        Self {
            headers,
            rows,
            source: source.into(),
        }
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> {
        self.rows.iter().map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn source(&self) -> &Path {
        &self.source
    }
}

/// Return a lowercase identifier derived from `value`: every run of
/// non-alphanumeric characters collapses to a single `_`, trimmed at both
/// ends. `"Section 80C (PF)"` becomes `"section_80c_pf"`.
pub fn slugify(value: &str) -> String {
    let mut slug = String::with_capacity(value.len());
    let mut pending_sep = false;
    for ch in value.chars() {
        if ch.is_alphanumeric() {
            if pending_sep && !slug.is_empty() {
                slug.push('_');
            }
            pending_sep = false;
            slug.extend(ch.to_lowercase());
        } else {
            pending_sep = true;
        }
    }
    slug
}

/// Find the first column whose slug matches one of the candidate names.
///
/// `alternatives` is an ordered list of synonym groups, one group per
/// logical field spelling set; the first group and first name to match a
/// header wins. Matching is case- and punctuation-insensitive on both
/// sides. Failing to match any group is an input-format error naming every
/// alternative that was tried.
pub fn resolve_column(table: &Table, alternatives: &[&[&str]]) -> Result<usize> {
    for names in alternatives {
        for name in *names {
            let slug = slugify(name);
            if let Some(pos) = table.headers().iter().position(|h| slugify(h) == slug) {
                return Ok(pos);
            }
        }
    }
    Err(InputFormatError::MissingColumn {
        path: table.source().to_path_buf(),
        tried: alternatives
            .iter()
            .map(|names| names.join("/"))
            .collect::<Vec<_>>()
            .join(", "),
    })
}

/// Locate an optional column by exact header name, first candidate wins.
pub fn find_column(table: &Table, names: &[&str]) -> Option<usize> {
    names
        .iter()
        .find_map(|name| table.headers().iter().position(|h| h == name))
}

/// Shared amount coercion for all parsers: blank cells are "no entry"
/// (`Ok(None)`), anything else must be numeric or the whole parse fails.
pub fn coerce_amount(table: &Table, cell: &Cell, label: &str) -> Result<Option<f64>> {
    if cell.is_empty() {
        return Ok(None);
    }
    match cell.as_f64() {
        Some(value) => Ok(Some(value)),
        None => Err(InputFormatError::InvalidAmount {
            path: table.source().to_path_buf(),
            label: label.to_string(),
            value: cell.as_text(),
        }),
    }
}

/// Load a CSV or Excel file into a [`Table`].
///
/// The extension selects the loader; Excel inputs are read from their first
/// worksheet with the first row as headers. Rows that are entirely blank
/// are dropped, and a file with no remaining rows is rejected.
pub fn load_table(path: &Path) -> Result<Table> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    let table = match ext.as_str() {
        "csv" => load_csv(path)?,
        "xlsx" | "xlsm" | "xls" => load_workbook(path)?,
        _ => {
            return Err(InputFormatError::UnsupportedExtension {
                path: path.to_path_buf(),
            })
        }
    };
    if table.is_empty() {
        return Err(InputFormatError::NoUsableRows {
            path: path.to_path_buf(),
        });
    }
    debug!("loaded {} rows from {}", table.len(), path.display());
    Ok(table)
}

fn classify(field: &str) -> Cell {
    let trimmed = field.trim();
    if trimmed.is_empty() {
        Cell::Empty
    } else if let Ok(n) = trimmed.parse::<f64>() {
        Cell::Number(n)
    } else {
        Cell::Text(field.to_string())
    }
}

fn load_csv(path: &Path) -> Result<Table> {
    let csv_err = |source| InputFormatError::Csv {
        path: path.to_path_buf(),
        source,
    };
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .map_err(csv_err)?;
    let headers: Vec<String> = rdr
        .headers()
        .map_err(csv_err)?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut rows = Vec::new();
    for record in rdr.records() {
        let record = record.map_err(csv_err)?;
        let row: Vec<Cell> = (0..headers.len())
            .map(|i| classify(record.get(i).unwrap_or("")))
            .collect();
        if row.iter().all(Cell::is_empty) {
            continue;
        }
        rows.push(row);
    }
    Ok(Table::new(headers, rows, path))
}

fn convert(data: &Data) -> Cell {
    match data {
        Data::Empty => Cell::Empty,
        Data::String(s) if s.trim().is_empty() => Cell::Empty,
        Data::String(s) => Cell::Text(s.clone()),
        Data::Float(f) => Cell::Number(*f),
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Bool(b) => Cell::Number(f64::from(*b)),
        Data::DateTime(dt) => Cell::Number(dt.as_f64()),
        // Error cells and ISO date/duration strings stay textual so that a
        // numeric coercion on them fails loudly instead of guessing.
        other => Cell::Text(other.to_string()),
    }
}

fn load_workbook(path: &Path) -> Result<Table> {
    let wb_err = |source| InputFormatError::Workbook {
        path: path.to_path_buf(),
        source,
    };
    let mut workbook = open_workbook_auto(path).map_err(wb_err)?;
    let sheet = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| InputFormatError::NoUsableRows {
            path: path.to_path_buf(),
        })?;
    let range = workbook.worksheet_range(&sheet).map_err(wb_err)?;

    let mut row_iter = range.rows();
    let headers: Vec<String> = match row_iter.next() {
        Some(first) => first.iter().map(|d| d.to_string().trim().to_string()).collect(),
        None => {
            return Err(InputFormatError::NoUsableRows {
                path: path.to_path_buf(),
            })
        }
    };

    let rows: Vec<Vec<Cell>> = row_iter
        .map(|r| (0..headers.len()).map(|i| r.get(i).map_or(Cell::Empty, convert)).collect())
        .filter(|row: &Vec<Cell>| !row.iter().all(Cell::is_empty))
        .collect();
    Ok(Table::new(headers, rows, path))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> Cell {
        Cell::Text(s.to_string())
    }

    fn table(headers: &[&str]) -> Table {
        Table::new(
            headers.iter().map(|h| h.to_string()).collect(),
            Vec::new(),
            "test.csv",
        )
    }

    #[test]
    fn slugify_collapses_punctuation() {
        assert_eq!(slugify("Gross Salary"), "gross_salary");
        assert_eq!(slugify("Section 80C (PF)"), "section_80c_pf");
        assert_eq!(slugify("  Amount  "), "amount");
        assert_eq!(slugify("___"), "");
    }

    #[test]
    fn resolve_is_case_and_punctuation_insensitive() {
        for header in ["Section 80C (PF)", "section_80c_pf", "SECTION 80C PF"] {
            let t = table(&["Other", header]);
            let col = resolve_column(&t, &[&["section 80c pf"]]).unwrap();
            assert_eq!(col, 1);
        }
    }

    #[test]
    fn resolve_prefers_earlier_groups_and_names() {
        let t = table(&["Value", "Amount"]);
        assert_eq!(resolve_column(&t, &[&["amount", "value"]]).unwrap(), 1);
        assert_eq!(
            resolve_column(&t, &[&["total"], &["value"]]).unwrap(),
            0
        );
    }

    #[test]
    fn resolve_failure_names_all_alternatives() {
        let t = table(&["Foo"]);
        let err = resolve_column(&t, &[&["field", "section"], &["amount"]]).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("field/section"));
        assert!(msg.contains("amount"));
        assert!(msg.contains("test.csv"));
    }

    #[test]
    fn find_column_is_exact() {
        let t = table(&["Type", "description"]);
        assert_eq!(find_column(&t, &["description", "notes"]), Some(1));
        assert_eq!(find_column(&t, &["Description"]), None);
    }

    #[test]
    fn cell_coercion() {
        assert_eq!(Cell::Number(12.5).as_f64(), Some(12.5));
        assert_eq!(text(" 1200 ").as_f64(), Some(1200.0));
        assert_eq!(text("abc").as_f64(), None);
        assert_eq!(Cell::Empty.as_f64(), None);
        assert_eq!(Cell::Number(2023.0).as_text(), "2023");
    }

    #[test]
    fn coerce_amount_skips_blank_and_rejects_text() {
        let t = table(&["Field", "Amount"]);
        assert_eq!(coerce_amount(&t, &Cell::Empty, "X").unwrap(), None);
        assert_eq!(
            coerce_amount(&t, &Cell::Number(5.0), "X").unwrap(),
            Some(5.0)
        );
        let err = coerce_amount(&t, &text("abc"), "X").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("abc"));
        assert!(msg.contains('X'));
        assert!(msg.contains("test.csv"));
    }

    #[test]
    fn short_rows_are_padded() {
        let t = Table::new(
            vec!["a".into(), "b".into(), "c".into()],
            vec![vec![text("x")]],
            "test.csv",
        );
        let row = t.rows().next().unwrap();
        assert_eq!(row.len(), 3);
        assert!(row[1].is_empty() && row[2].is_empty());
    }

    #[test]
    fn load_csv_classifies_cells() {
        let dir = std::env::temp_dir();
        let path = dir.join("itr2_summary_table_test.csv");
        std::fs::write(&path, "Field,Amount\nGross Salary,1200\nNotes,\n,,\n").unwrap();
        let t = load_table(&path).unwrap();
        assert_eq!(t.headers(), ["Field", "Amount"]);
        // The fully blank trailing row is dropped.
        assert_eq!(t.len(), 2);
        let rows: Vec<&[Cell]> = t.rows().collect();
        assert_eq!(rows[0][1], Cell::Number(1200.0));
        assert!(rows[1][1].is_empty());
    }

    #[test]
    fn load_rejects_unknown_extension_and_empty_file() {
        let dir = std::env::temp_dir();
        let bad = dir.join("itr2_summary_table_test.txt");
        std::fs::write(&bad, "x").unwrap();
        assert!(matches!(
            load_table(&bad),
            Err(InputFormatError::UnsupportedExtension { .. })
        ));

        let empty = dir.join("itr2_summary_table_empty.csv");
        std::fs::write(&empty, "Field,Amount\n,,\n").unwrap();
        assert!(matches!(
            load_table(&empty),
            Err(InputFormatError::NoUsableRows { .. })
        ));
    }
}
