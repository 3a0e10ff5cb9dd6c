use std::path::PathBuf;

use thiserror::Error;

/// Raised when an input file does not adhere to the expected format.
///
/// Every variant names the offending file; parse errors additionally carry
/// the row label and the raw cell value so the user can locate the entry in
/// the source export.
#[derive(Error, Debug)]
pub enum InputFormatError {
    #[error("unsupported file extension for {}", .path.display())]
    UnsupportedExtension { path: PathBuf },

    #[error("no usable rows found in {}", .path.display())]
    NoUsableRows { path: PathBuf },

    #[error("none of the expected columns were found in {}; tried: {tried}", .path.display())]
    MissingColumn { path: PathBuf, tried: String },

    #[error("invalid amount {value:?} for {label:?} in {}", .path.display())]
    InvalidAmount {
        path: PathBuf,
        label: String,
        value: String,
    },

    #[error("failed to read {}: {source}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("failed to read workbook {}: {source}", .path.display())]
    Workbook {
        path: PathBuf,
        #[source]
        source: calamine::Error,
    },
}

pub type Result<T> = std::result::Result<T, InputFormatError>;
