//! The query engine the runner talks to.
//!
//! The runner only needs a handful of capabilities from a client library:
//! open a session, run one query through a cursor, read it back, and release
//! everything. [`PrestoEngine`] provides them over `presto-connect`; tests
//! provide a scripted engine instead.
use crate::config::ConnectionConfig;

use presto_connect::{Column, Connection, Cursor, PrestoError, Row};


#[allow(async_fn_in_trait)]
pub trait QueryEngine {
    type Connection: EngineConnection;

    async fn connect(&self, config: &ConnectionConfig) -> Result<Self::Connection, PrestoError>;
}

#[allow(async_fn_in_trait)]
pub trait EngineConnection {
    type Cursor: EngineCursor;

    fn cursor(&self) -> Self::Cursor;
    async fn close(self) -> Result<(), PrestoError>;
    async fn rollback(self) -> Result<(), PrestoError>;
}

#[allow(async_fn_in_trait)]
pub trait EngineCursor {
    async fn execute(&mut self, sql: &str) -> Result<(), PrestoError>;
    async fn fetch_all(&mut self) -> Result<Vec<Row>, PrestoError>;
    fn description(&self) -> Vec<Column>;
    async fn cancel(&mut self) -> Result<(), PrestoError>;
}


/// The Presto engine uses a `presto-connect` session per call.
#[derive(Clone, Copy, Debug, Default)]
pub struct PrestoEngine;

impl QueryEngine for PrestoEngine {
    type Connection = Connection;

    async fn connect(&self, config: &ConnectionConfig) -> Result<Connection, PrestoError> {
        Connection::connect(config.options.clone(), config.credentials.clone()).await
    }
}

impl EngineConnection for Connection {
    type Cursor = Cursor;

    fn cursor(&self) -> Cursor {
        Connection::cursor(self)
    }

    async fn close(self) -> Result<(), PrestoError> {
        Connection::close(self).await
    }

    async fn rollback(self) -> Result<(), PrestoError> {
        Connection::rollback(self).await
    }
}

impl EngineCursor for Cursor {
    async fn execute(&mut self, sql: &str) -> Result<(), PrestoError> {
        Cursor::execute(self, sql).await
    }

    async fn fetch_all(&mut self) -> Result<Vec<Row>, PrestoError> {
        Cursor::fetch_all(self).await
    }

    fn description(&self) -> Vec<Column> {
        Cursor::description(self).to_vec()
    }

    async fn cancel(&mut self) -> Result<(), PrestoError> {
        Cursor::cancel(self).await
    }
}
