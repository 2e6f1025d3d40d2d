use presto_connect::PrestoError;

use std::error::Error;
use std::fmt;
use std::path::PathBuf;
use tracing::subscriber::SetGlobalDefaultError;


#[derive(Debug)]
pub struct PrestoframeError {
    pub kind: PrestoframeErrorKind
}

impl fmt::Display for PrestoframeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PrestoframeError: {}", self.kind)
    }
}

impl Error for PrestoframeError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.kind)
    }
}

#[derive(Debug)]
pub enum PrestoframeErrorKind {
    Arrow(arrow::error::ArrowError),
    Configuration(String),
    Io { source: std::io::Error, path: PathBuf },
    MissingUser,
    Presto(PrestoError),
    RowWidthMismatch { row: usize, expected: usize, found: usize },
    Runtime(std::io::Error),
    SetGlobalDefault(SetGlobalDefaultError),
    ValueTypeMismatch { column: String, row: usize, expected: String, found: String },
}

impl fmt::Display for PrestoframeErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Arrow(e) => write!(f, "Failed to build table: {e}"),
            Self::Configuration(msg) => write!(f, "Invalid configuration: {msg}"),
            Self::Io { path, .. } => write!(f, "Failed to read '{}'", path.display()),
            Self::MissingUser => write!(f, "Could not determine the current user; set USER or pass a user explicitly"),
            Self::Presto(e) => write!(f, "{e}"),
            Self::RowWidthMismatch { row, expected, found } => {
                write!(f, "Row {row} has {found} value(s) but the result has {expected} column(s)")
            },
            Self::Runtime(e) => write!(f, "Failed to start async runtime: {e}"),
            Self::SetGlobalDefault(e) => write!(f, "Failed to set global default subscriber: {e}"),
            Self::ValueTypeMismatch { column, row, expected, found } => {
                write!(f, "Column '{column}' row {row}: expected {expected}, found {found}")
            },
        }
    }
}

impl Error for PrestoframeErrorKind {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Arrow(source) => Some(source),
            Self::Io { source, .. } => Some(source),
            Self::Presto(source) => Some(source),
            Self::Runtime(source) => Some(source),
            Self::SetGlobalDefault(source) => Some(source),
            _ => None,
        }
    }
}

impl From<PrestoframeErrorKind> for PrestoframeError {
    fn from(kind: PrestoframeErrorKind) -> Self {
        PrestoframeError { kind }
    }
}

impl From<PrestoError> for PrestoframeError {
    fn from(error: PrestoError) -> Self {
        PrestoframeError { kind: PrestoframeErrorKind::Presto(error) }
    }
}

impl From<arrow::error::ArrowError> for PrestoframeError {
    fn from(error: arrow::error::ArrowError) -> Self {
        PrestoframeError { kind: PrestoframeErrorKind::Arrow(error) }
    }
}

impl From<SetGlobalDefaultError> for PrestoframeError {
    fn from(error: SetGlobalDefaultError) -> Self {
        PrestoframeError { kind: PrestoframeErrorKind::SetGlobalDefault(error) }
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use std::{error::Error, io};

    #[test]
    fn prestoframe_error_display_formats_correctly() {
        let cases: Vec<(PrestoframeErrorKind, &str)> = vec![
            (PrestoframeErrorKind::Configuration("port".into()), "Invalid configuration: port"),
            (PrestoframeErrorKind::MissingUser, "Could not determine the current user"),
            (
                PrestoframeErrorKind::Presto(PrestoError::Unauthenticated("no ticket".into())),
                "Unauthenticated: no ticket",
            ),
            (
                PrestoframeErrorKind::RowWidthMismatch { row: 3, expected: 2, found: 1 },
                "Row 3 has 1 value(s) but the result has 2 column(s)",
            ),
            (
                PrestoframeErrorKind::ValueTypeMismatch {
                    column: "c".into(),
                    row: 0,
                    expected: "Int64".into(),
                    found: "\"ten\"".into(),
                },
                "Column 'c' row 0: expected Int64",
            ),
        ];

        for (kind, expect) in cases {
            let text = kind.to_string();
            assert!(
                text.contains(expect),
                "Expected `{}` in `{}`",
                expect,
                text
            );
        }
    }

    #[test]
    fn prestoframe_error_source_chain_works() {
        let kind = PrestoframeErrorKind::Io {
            source: io::Error::new(io::ErrorKind::Other, "permission denied"),
            path: PathBuf::from("/tmp/query.sql"),
        };
        let src = kind.source().unwrap().to_string();
        assert!(src.contains("permission denied"));
    }

    #[test]
    fn prestoframe_error_from_presto_keeps_source() {
        let error: PrestoframeError = PrestoError::InvalidState("closed".into()).into();

        assert!(matches!(error.kind, PrestoframeErrorKind::Presto(_)));
        let source = error.source().and_then(|kind| kind.source()).unwrap();
        assert!(source.to_string().contains("closed"));
    }
}
