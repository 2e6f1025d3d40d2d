use crate::connection::ConnectionOptions;
use crate::error::PrestoError;
use super::SessionState;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, USER_AGENT};


pub const USER: HeaderName = HeaderName::from_static("x-presto-user");
pub const SOURCE: HeaderName = HeaderName::from_static("x-presto-source");
pub const CATALOG: HeaderName = HeaderName::from_static("x-presto-catalog");
pub const SCHEMA: HeaderName = HeaderName::from_static("x-presto-schema");
pub const SESSION: HeaderName = HeaderName::from_static("x-presto-session");
pub const TRANSACTION_ID: HeaderName = HeaderName::from_static("x-presto-transaction-id");

pub const SET_SESSION: &str = "x-presto-set-session";
pub const CLEAR_SESSION: &str = "x-presto-clear-session";
pub const STARTED_TRANSACTION_ID: &str = "x-presto-started-transaction-id";
pub const CLEAR_TRANSACTION_ID: &str = "x-presto-clear-transaction-id";

/// Transaction id sent while no transaction is active.
pub const NO_TRANSACTION: &str = "NONE";

const CLIENT_USER_AGENT: &str = concat!("presto-connect/", env!("CARGO_PKG_VERSION"));


/// Build the headers every statement request carries.
pub(crate) fn request_headers(
    options: &ConnectionOptions,
    state: &SessionState,
) -> Result<HeaderMap, PrestoError> {
    let mut headers = HeaderMap::new();

    headers.insert(USER_AGENT, HeaderValue::from_static(CLIENT_USER_AGENT));
    headers.insert(USER, HeaderValue::from_str(&options.user)?);
    headers.insert(SOURCE, HeaderValue::from_str(&options.source)?);

    if let Some(catalog) = &options.catalog {
        headers.insert(CATALOG, HeaderValue::from_str(catalog)?);
    }
    if let Some(schema) = &options.schema {
        headers.insert(SCHEMA, HeaderValue::from_str(schema)?);
    }

    if !state.properties.is_empty() {
        let session = state
            .properties
            .iter()
            .map(|(key, value)| format!("{key}={value}"))
            .collect::<Vec<_>>()
            .join(",");
        headers.insert(SESSION, HeaderValue::from_str(&session)?);
    }

    let transaction_id = state.transaction_id.as_deref().unwrap_or(NO_TRANSACTION);
    headers.insert(TRANSACTION_ID, HeaderValue::from_str(transaction_id)?);

    Ok(headers)
}

/// Fold the session-changing response headers into `state`.
pub(crate) fn apply_response_headers(headers: &HeaderMap, state: &mut SessionState) {
    for value in headers.get_all(SET_SESSION).iter().filter_map(|v| v.to_str().ok()) {
        if let Some((key, value)) = value.split_once('=') {
            state.properties.insert(key.trim().to_string(), value.trim().to_string());
        }
    }

    for key in headers.get_all(CLEAR_SESSION).iter().filter_map(|v| v.to_str().ok()) {
        state.properties.remove(key.trim());
    }

    if let Some(id) = headers.get(STARTED_TRANSACTION_ID).and_then(|v| v.to_str().ok()) {
        state.transaction_id = Some(id.to_string());
    }

    if headers.contains_key(CLEAR_TRANSACTION_ID) {
        state.transaction_id = None;
    }
}
