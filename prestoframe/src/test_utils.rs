#[cfg(test)]
pub mod test_utils {
    use crate::config::ConnectionConfig;
    use crate::engine::{EngineConnection, EngineCursor, QueryEngine};

    use presto_connect::{Column, ConnectionOptions, NoAuthentication, PrestoError, QueryFailure, Row};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    /// What the fake engine does when asked to run a query.
    #[derive(Clone, Debug)]
    pub enum Script {
        Rows { columns: Vec<Column>, rows: Vec<Row> },
        ConnectFails(String),
        ExecuteFails(QueryFailure),
        FetchFails(String),
    }

    impl Script {
        pub fn rows(columns: Vec<Column>, rows: Vec<Row>) -> Self {
            Script::Rows { columns, rows }
        }
    }

    #[derive(Clone, Debug, Default)]
    struct Shared {
        log: Arc<Mutex<Vec<String>>>,
        opened: Arc<AtomicUsize>,
        released: Arc<AtomicUsize>,
    }

    impl Shared {
        fn record(&self, entry: impl Into<String>) {
            self.log.lock().unwrap().push(entry.into());
        }
    }

    /// A scripted engine that records every call made to it.
    #[derive(Debug)]
    pub struct FakeEngine {
        script: Script,
        failing_cleanup: bool,
        shared: Shared,
    }

    impl FakeEngine {
        pub fn new(script: Script) -> Self {
            Self { script, failing_cleanup: false, shared: Shared::default() }
        }

        /// Make cancel, close and rollback fail after being recorded.
        pub fn failing_cleanup(mut self) -> Self {
            self.failing_cleanup = true;
            self
        }

        pub fn log(&self) -> Vec<String> {
            self.shared.log.lock().unwrap().clone()
        }

        pub fn sessions_opened(&self) -> usize {
            self.shared.opened.load(Ordering::SeqCst)
        }

        pub fn sessions_released(&self) -> usize {
            self.shared.released.load(Ordering::SeqCst)
        }
    }

    pub struct FakeConnection {
        script: Script,
        failing_cleanup: bool,
        shared: Shared,
    }

    impl FakeConnection {
        fn release(self, entry: &str) -> Result<(), PrestoError> {
            self.shared.record(entry);
            self.shared.released.fetch_add(1, Ordering::SeqCst);
            cleanup_result(self.failing_cleanup, entry)
        }
    }

    pub struct FakeCursor {
        script: Script,
        failing_cleanup: bool,
        shared: Shared,
        columns: Vec<Column>,
    }

    fn cleanup_result(failing: bool, entry: &str) -> Result<(), PrestoError> {
        if failing {
            Err(PrestoError::InvalidState(format!("{entry} failed")))
        } else {
            Ok(())
        }
    }

    impl QueryEngine for FakeEngine {
        type Connection = FakeConnection;

        async fn connect(&self, _config: &ConnectionConfig) -> Result<FakeConnection, PrestoError> {
            self.shared.record("connect");
            if let Script::ConnectFails(message) = &self.script {
                return Err(PrestoError::Unauthenticated(message.clone()));
            }
            self.shared.opened.fetch_add(1, Ordering::SeqCst);

            Ok(FakeConnection {
                script: self.script.clone(),
                failing_cleanup: self.failing_cleanup,
                shared: self.shared.clone(),
            })
        }
    }

    impl EngineConnection for FakeConnection {
        type Cursor = FakeCursor;

        fn cursor(&self) -> FakeCursor {
            FakeCursor {
                script: self.script.clone(),
                failing_cleanup: self.failing_cleanup,
                shared: self.shared.clone(),
                columns: Vec::new(),
            }
        }

        async fn close(self) -> Result<(), PrestoError> {
            self.release("close")
        }

        async fn rollback(self) -> Result<(), PrestoError> {
            self.release("rollback")
        }
    }

    impl EngineCursor for FakeCursor {
        async fn execute(&mut self, sql: &str) -> Result<(), PrestoError> {
            self.shared.record(format!("execute {sql}"));
            match &self.script {
                Script::ExecuteFails(failure) => Err(PrestoError::Query(failure.clone())),
                Script::Rows { columns, .. } => {
                    self.columns = columns.clone();
                    Ok(())
                }
                _ => Ok(()),
            }
        }

        async fn fetch_all(&mut self) -> Result<Vec<Row>, PrestoError> {
            self.shared.record("fetch_all");
            match &self.script {
                Script::Rows { rows, .. } => Ok(rows.clone()),
                Script::FetchFails(message) => Err(PrestoError::InvalidResponse(message.clone())),
                _ => Err(PrestoError::InvalidState("No query has been executed".to_string())),
            }
        }

        fn description(&self) -> Vec<Column> {
            self.columns.clone()
        }

        async fn cancel(&mut self) -> Result<(), PrestoError> {
            self.shared.record("cancel");
            cleanup_result(self.failing_cleanup, "cancel")
        }
    }

    /// A resolved configuration that needs no credentials.
    pub fn config() -> ConnectionConfig {
        ConnectionConfig {
            options: ConnectionOptions::new("localhost", "alice"),
            credentials: Arc::new(NoAuthentication),
        }
    }
}
