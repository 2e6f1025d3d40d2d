use crate::error::QueryFailure;

use serde::Deserialize;
use serde_json::Value;


/// A row as returned by the coordinator, one JSON value per column.
pub type Row = Vec<Value>;

/// Column metadata reported for a query.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Column {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
}

impl Column {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self { name: name.into(), type_name: type_name.into() }
    }
}

/// Progress counters of a running query.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct QueryStats {
    pub state: String,
    pub queued: bool,
    pub scheduled: bool,
    pub completed_splits: u64,
    pub total_splits: u64,
    pub processed_rows: u64,
    pub processed_bytes: u64,
}

/// One page of the `/v1/statement` protocol.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct QueryResults {
    pub(crate) id: String,
    pub(crate) info_uri: Option<String>,
    pub(crate) next_uri: Option<String>,
    pub(crate) columns: Option<Vec<Column>>,
    pub(crate) data: Option<Vec<Row>>,
    pub(crate) stats: QueryStats,
    pub(crate) error: Option<QueryFailure>,
}
