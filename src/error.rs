use thiserror::Error;

use crate::data::decode::SourceFormat;

// ---------------------------------------------------------------------------
// Error taxonomy
// ---------------------------------------------------------------------------

/// A source could not be decoded into rows. The user has to pick another file.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("the {0} source is empty or contains only whitespace")]
    Empty(SourceFormat),

    #[error("malformed {format} source: {reason}")]
    Malformed { format: SourceFormat, reason: String },

    #[error("unsupported file extension: .{0}")]
    UnsupportedExtension(String),
}

impl ParseError {
    pub(crate) fn malformed(format: SourceFormat, reason: impl ToString) -> Self {
        ParseError::Malformed {
            format,
            reason: reason.to_string(),
        }
    }
}

/// Well-formed input without any usable rows. Informational, not a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("the source contains no rows")]
pub struct EmptyDatasetError;

/// A remote page request failed. The caller decides whether to re-issue it.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed: {reason}")]
    Transport { url: String, reason: String },

    #[error("server returned {code} for {url}")]
    Status { url: String, code: u16 },

    #[error("invalid page response: {0}")]
    Decode(String),
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("XLSX write error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("view exceeds the worksheet row or column limit")]
    TooLarge,
}

/// Anything that can go wrong between "the user asked for data" and
/// "a Dataset is ready".
#[derive(Debug, Error)]
pub enum LoadError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Empty(#[from] EmptyDatasetError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
