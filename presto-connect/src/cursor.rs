//! Query execution against a coordinator.
//!
//! A [`Cursor`] follows the statement protocol: the SQL is posted once, and
//! the coordinator answers with pages that each may carry column metadata,
//! rows, and the `nextUri` of the following page. The query is complete when
//! a page comes back without a `nextUri`.
//!
//! ```no_run
//! use presto_connect::{Connection, ConnectionOptions, NoAuthentication};
//! use std::sync::Arc;
//!
//! # tokio_test::block_on(async {
//! let options = ConnectionOptions::new("localhost", "alice");
//! let connection = Connection::connect(options, Arc::new(NoAuthentication)).await.unwrap();
//!
//! let mut cursor = connection.cursor();
//! cursor.execute("SELECT 1 AS x").await.unwrap();
//! let rows = cursor.fetch_all().await.unwrap();
//! assert_eq!(cursor.description()[0].name, "x");
//! # });
//! ```
use crate::client::{Column, PrestoClient, QueryResults, QueryStats, Row};
use crate::error::PrestoError;


#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CursorState {
    Idle,
    Running,
    Finished,
    Cancelled,
}

/// A server-side query handle.
#[derive(Debug)]
pub struct Cursor {
    client: PrestoClient,
    state: CursorState,
    query_id: Option<String>,
    info_uri: Option<String>,
    next_uri: Option<String>,
    columns: Option<Vec<Column>>,
    rows: Vec<Row>,
    stats: QueryStats,
}

impl Cursor {
    pub(crate) fn new(client: PrestoClient) -> Self {
        Self {
            client,
            state: CursorState::Idle,
            query_id: None,
            info_uri: None,
            next_uri: None,
            columns: None,
            rows: Vec::new(),
            stats: QueryStats::default(),
        }
    }

    pub fn state(&self) -> CursorState {
        self.state
    }

    pub fn query_id(&self) -> Option<&str> {
        self.query_id.as_deref()
    }

    /// Link to the coordinator's web page for the current query.
    pub fn info_uri(&self) -> Option<&str> {
        self.info_uri.as_deref()
    }

    pub fn stats(&self) -> &QueryStats {
        &self.stats
    }

    /// Columns reported for the current query, in the coordinator's order.
    /// Empty for statements that produce no result set.
    pub fn description(&self) -> &[Column] {
        self.columns.as_deref().unwrap_or_default()
    }

    /// Submit `sql` and wait until its column metadata is known or it finished.
    ///
    /// Rows received while waiting are buffered for [`Cursor::fetch_all`].
    pub async fn execute(&mut self, sql: &str) -> Result<(), PrestoError> {
        if self.state == CursorState::Running {
            return Err(PrestoError::InvalidState(
                "Cursor already has a running query; cancel it first".to_string(),
            ));
        }

        self.query_id = None;
        self.info_uri = None;
        self.next_uri = None;
        self.columns = None;
        self.rows.clear();
        self.stats = QueryStats::default();
        self.state = CursorState::Running;

        let page = self.client.submit(sql).await;
        let page = self.fail_on_error(page)?;
        tracing::info!("Submitted query {}", page.id);
        self.absorb(page);

        while self.columns.is_none() && self.next_uri.is_some() {
            self.advance().await?;
        }

        Ok(())
    }

    /// Pull every remaining page and return all rows of the query.
    pub async fn fetch_all(&mut self) -> Result<Vec<Row>, PrestoError> {
        match self.state {
            CursorState::Idle => {
                return Err(PrestoError::InvalidState("No query has been executed".to_string()));
            }
            CursorState::Cancelled => {
                return Err(PrestoError::InvalidState("Query was cancelled".to_string()));
            }
            CursorState::Running | CursorState::Finished => {}
        }

        while self.next_uri.is_some() {
            self.advance().await?;
        }

        tracing::debug!(
            "Fetched {} row(s) for query {}",
            self.rows.len(),
            self.query_id.as_deref().unwrap_or_default()
        );
        Ok(std::mem::take(&mut self.rows))
    }

    /// Release the server-side query if it is still open. Calling this on a
    /// finished or already cancelled cursor does nothing.
    pub async fn cancel(&mut self) -> Result<(), PrestoError> {
        if let Some(uri) = self.next_uri.take() {
            self.state = CursorState::Cancelled;
            self.client.cancel(&uri).await?;
            tracing::info!(
                "Cancelled query {}",
                self.query_id.as_deref().unwrap_or_default()
            );
        }

        Ok(())
    }

    async fn advance(&mut self) -> Result<(), PrestoError> {
        let Some(uri) = self.next_uri.clone() else {
            return Ok(());
        };

        let page = self.client.next(&uri).await;
        let page = self.fail_on_error(page)?;
        self.absorb(page);

        Ok(())
    }

    /// A query error ends the query server-side, so there is nothing left to
    /// cancel. Transport errors leave `next_uri` in place for [`Cursor::cancel`].
    fn fail_on_error(
        &mut self,
        page: Result<QueryResults, PrestoError>,
    ) -> Result<QueryResults, PrestoError> {
        if let Err(PrestoError::Query(failure)) = &page {
            self.state = CursorState::Finished;
            self.next_uri = None;
            if self.query_id.is_none() {
                self.query_id = failure.query_id.clone();
            }
        }
        page
    }

    fn absorb(&mut self, page: QueryResults) {
        if self.query_id.is_none() {
            self.query_id = Some(page.id);
        }
        if page.info_uri.is_some() {
            self.info_uri = page.info_uri;
        }
        if self.columns.is_none() {
            self.columns = page.columns;
        }
        if let Some(data) = page.data {
            self.rows.extend(data);
        }
        self.stats = page.stats;
        self.next_uri = page.next_uri;

        if self.next_uri.is_none() {
            self.state = CursorState::Finished;
        }
    }
}
