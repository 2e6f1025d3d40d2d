use core::fmt;
use std::error::Error;
use std::path::PathBuf;

use serde::Deserialize;


/// Category the coordinator assigns to a failed query.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FailureKind {
    External,
    InsufficientResources,
    Internal,
    User,
    Unknown,
}

impl From<&str> for FailureKind {
    fn from(error_type: &str) -> Self {
        match error_type {
            "EXTERNAL" => FailureKind::External,
            "INSUFFICIENT_RESOURCES" => FailureKind::InsufficientResources,
            "INTERNAL_ERROR" => FailureKind::Internal,
            "USER_ERROR" => FailureKind::User,
            _ => FailureKind::Unknown,
        }
    }
}

/// Position in the submitted SQL the coordinator blamed for a failure.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorLocation {
    pub line_number: u32,
    pub column_number: u32,
}

/// The `error` object of a failed query, as reported by the coordinator.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct QueryFailure {
    pub message: String,
    pub error_code: i64,
    pub error_name: String,
    pub error_type: String,
    pub error_location: Option<ErrorLocation>,
    #[serde(skip)]
    pub query_id: Option<String>,
}

impl QueryFailure {
    pub fn kind(&self) -> FailureKind {
        FailureKind::from(self.error_type.as_str())
    }
}

impl fmt::Display for QueryFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}): {}", self.error_name, self.error_type, self.message)?;
        if let Some(location) = self.error_location {
            write!(f, " at line {}, column {}", location.line_number, location.column_number)?;
        }
        if let Some(query_id) = &self.query_id {
            write!(f, " [query {}]", query_id)?;
        }
        Ok(())
    }
}


/// Different `Presto` error types
#[derive(Debug)]
pub enum PrestoError {
    Http { status: u16, message: String },
    InvalidConfiguration(String),
    InvalidResponse(String),
    InvalidState(String),
    Io { source: std::io::Error, path: PathBuf },
    Query(QueryFailure),
    Transport(reqwest::Error),
    Unauthenticated(String),
}

impl fmt::Display for PrestoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrestoError::Http { status, message } => write!(f, "HTTP {}: {}", status, message),
            PrestoError::InvalidConfiguration(msg) => write!(f, "Invalid Configuration: {}", msg),
            PrestoError::InvalidResponse(msg) => write!(f, "Invalid Response: {}", msg),
            PrestoError::InvalidState(msg) => write!(f, "Invalid State: {}", msg),
            PrestoError::Io { path, .. } => write!(f, "Failed to read '{}'", path.display()),
            PrestoError::Query(failure) => write!(f, "Query Failed: {}", failure),
            PrestoError::Transport(e) => write!(f, "Transport: {}", e),
            PrestoError::Unauthenticated(msg) => write!(f, "Unauthenticated: {}", msg),
        }
    }
}

impl Error for PrestoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            PrestoError::Io { source, .. } => Some(source),
            PrestoError::Transport(source) => Some(source),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for PrestoError {
    fn from(error: reqwest::Error) -> Self {
        PrestoError::Transport(error)
    }
}

impl From<url::ParseError> for PrestoError {
    fn from(error: url::ParseError) -> Self {
        PrestoError::InvalidConfiguration(error.to_string())
    }
}

impl From<serde_json::Error> for PrestoError {
    fn from(error: serde_json::Error) -> Self {
        PrestoError::InvalidResponse(error.to_string())
    }
}

impl From<reqwest::header::InvalidHeaderValue> for PrestoError {
    fn from(error: reqwest::header::InvalidHeaderValue) -> Self {
        PrestoError::InvalidConfiguration(format!("Invalid header value: {}", error))
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_failure_display_includes_location_and_query_id() {
        let failure = QueryFailure {
            message: "line 1:8: Column 'nope' cannot be resolved".to_string(),
            error_code: 47,
            error_name: "COLUMN_NOT_FOUND".to_string(),
            error_type: "USER_ERROR".to_string(),
            error_location: Some(ErrorLocation { line_number: 1, column_number: 8 }),
            query_id: Some("20200223_000000_00001_abcde".to_string()),
        };

        let text = PrestoError::Query(failure).to_string();
        assert!(text.contains("COLUMN_NOT_FOUND (USER_ERROR)"), "{}", text);
        assert!(text.contains("line 1, column 8"), "{}", text);
        assert!(text.contains("[query 20200223_000000_00001_abcde]"), "{}", text);
    }

    #[test]
    fn failure_kind_is_classified_from_error_type() {
        let cases = [
            ("USER_ERROR", FailureKind::User),
            ("INTERNAL_ERROR", FailureKind::Internal),
            ("INSUFFICIENT_RESOURCES", FailureKind::InsufficientResources),
            ("EXTERNAL", FailureKind::External),
            ("SOMETHING_NEW", FailureKind::Unknown),
        ];

        for (error_type, expected) in cases {
            let failure = QueryFailure { error_type: error_type.to_string(), ..Default::default() };
            assert_eq!(failure.kind(), expected);
        }
    }

    #[test]
    fn io_error_source_is_accessible() {
        let error = PrestoError::Io {
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
            path: PathBuf::from("/etc/presto/ca.crt.pem"),
        };

        assert!(error.to_string().contains("/etc/presto/ca.crt.pem"));
        assert!(error.source().unwrap().to_string().contains("no such file"));
    }
}
