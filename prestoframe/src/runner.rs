//! Run a query and get the whole result back as one Arrow table.
//!
//! Every call opens its own session, runs one query through one cursor, pulls
//! the complete result into memory and releases the cursor and the session
//! before converting the rows. Limit the size of the result in the SQL itself.
use crate::config::{ConnectionConfig, RunOptions};
use crate::engine::{EngineConnection, EngineCursor, PrestoEngine, QueryEngine};
use crate::error::{PrestoframeError, PrestoframeErrorKind};
use crate::frame;

use arrow::record_batch::RecordBatch;
use presto_connect::{Column, PrestoError, Row};


/// Run `sql` with the default connection settings.
pub async fn run(sql: &str) -> Result<RecordBatch, PrestoframeError> {
    run_with_options(sql, &RunOptions::default()).await
}

/// Run `sql` with `options` merged over the defaults.
pub async fn run_with_options(sql: &str, options: &RunOptions) -> Result<RecordBatch, PrestoframeError> {
    let config = options.resolve()?;
    run_with(&PrestoEngine, sql, &config).await
}

/// Run `sql` on `engine`.
///
/// The cursor is cancelled and the session released on every exit path. If
/// the query failed, that failure is returned even when cleanup fails too;
/// if it succeeded, a cleanup failure is only logged.
pub async fn run_with<E: QueryEngine>(
    engine: &E,
    sql: &str,
    config: &ConnectionConfig,
) -> Result<RecordBatch, PrestoframeError> {
    tracing::debug!(
        "Connecting to {}:{} (catalog: {:?}, user: {})",
        config.options.host,
        config.options.port,
        config.options.catalog,
        config.options.user
    );
    let connection = engine.connect(config).await?;

    let mut cursor = connection.cursor();
    let fetched = fetch(&mut cursor, sql).await;

    if let Err(e) = cursor.cancel().await {
        tracing::warn!("Failed to cancel cursor: {e}");
    }

    let (columns, rows) = match fetched {
        Ok(result) => {
            if let Err(e) = connection.close().await {
                tracing::warn!("Failed to close session: {e}");
            }
            result
        }
        Err(error) => {
            if let Err(e) = connection.rollback().await {
                tracing::warn!("Failed to roll back session: {e}");
            }
            return Err(error.into());
        }
    };

    tracing::info!("Fetched {} row(s) in {} column(s)", rows.len(), columns.len());
    frame::to_record_batch(&columns, rows)
}

async fn fetch<C: EngineCursor>(cursor: &mut C, sql: &str) -> Result<(Vec<Column>, Vec<Row>), PrestoError> {
    cursor.execute(sql).await?;
    let rows = cursor.fetch_all().await?;
    Ok((cursor.description(), rows))
}


/// Synchronous wrappers for callers without an async runtime.
pub mod blocking {
    use super::*;

    /// Run `sql` with `options`, blocking the current thread until the whole
    /// result is in memory.
    pub fn run(sql: &str, options: &RunOptions) -> Result<RecordBatch, PrestoframeError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(PrestoframeErrorKind::Runtime)?;

        runtime.block_on(run_with_options(sql, options))
    }
}
