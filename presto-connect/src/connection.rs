//! Sessions with a Presto coordinator.
//!
//! # Typical usage
//!
//! ```no_run
//! use presto_connect::{Connection, ConnectionOptions, IsolationLevel, NoAuthentication};
//! use std::sync::Arc;
//!
//! # tokio_test::block_on(async {
//! let mut options = ConnectionOptions::new("coordinator.example", "alice");
//! options.catalog = Some("hive".to_string());
//! options.isolation_level = IsolationLevel::ReadUncommitted;
//!
//! let connection = Connection::connect(options, Arc::new(NoAuthentication))
//!     .await
//!     .expect("failed to connect");
//!
//! let mut cursor = connection.cursor();
//! cursor.execute("SHOW SCHEMAS").await.unwrap();
//! let rows = cursor.fetch_all().await.unwrap();
//!
//! connection.close().await.unwrap();
//! # });
//! ```
use crate::auth::Authentication;
use crate::client::PrestoClient;
use crate::cursor::Cursor;
use crate::error::PrestoError;
use crate::transaction::{IsolationLevel, Transaction};

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use url::Url;


#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum HttpScheme {
    #[default]
    Http,
    Https,
}

impl HttpScheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpScheme::Http => "http",
            HttpScheme::Https => "https",
        }
    }
}

impl FromStr for HttpScheme {
    type Err = PrestoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "http" => Ok(HttpScheme::Http),
            "https" => Ok(HttpScheme::Https),
            other => Err(PrestoError::InvalidConfiguration(format!(
                "HTTP scheme must be 'http' or 'https', got '{other}'"
            ))),
        }
    }
}

impl fmt::Display for HttpScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}


/// Everything needed to reach a coordinator, except credentials.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConnectionOptions {
    pub host: String,
    pub port: u16,
    pub http_scheme: HttpScheme,
    pub user: String,
    pub source: String,
    pub catalog: Option<String>,
    pub schema: Option<String>,
    pub session_properties: BTreeMap<String, String>,
    pub isolation_level: IsolationLevel,
}

impl ConnectionOptions {
    pub const DEFAULT_PORT: u16 = 8080;
    pub const DEFAULT_SOURCE: &'static str = "presto-connect";

    pub fn new(host: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: Self::DEFAULT_PORT,
            http_scheme: HttpScheme::default(),
            user: user.into(),
            source: Self::DEFAULT_SOURCE.to_string(),
            catalog: None,
            schema: None,
            session_properties: BTreeMap::new(),
            isolation_level: IsolationLevel::default(),
        }
    }

    /// `<scheme>://<host>:<port>` of the coordinator.
    pub fn base_url(&self) -> Result<Url, PrestoError> {
        if self.host.trim().is_empty() {
            return Err(PrestoError::InvalidConfiguration("Host must not be empty".to_string()));
        }
        Ok(Url::parse(&format!("{}://{}:{}", self.http_scheme, self.host, self.port))?)
    }
}


/// An open session with a coordinator.
///
/// For any isolation level other than autocommit the session runs inside an
/// explicit transaction, started in [`Connection::connect`] and ended by
/// [`Connection::close`] (commit) or [`Connection::rollback`].
#[derive(Debug)]
pub struct Connection {
    client: PrestoClient,
    transaction: Option<Transaction>,
}

impl Connection {
    pub async fn connect(
        options: ConnectionOptions,
        auth: Arc<dyn Authentication>,
    ) -> Result<Self, PrestoError> {
        let level = options.isolation_level;
        let client = PrestoClient::new(options, auth)?;
        tracing::debug!(
            "Connecting to {} as '{}'",
            client.options().base_url()?,
            client.options().user
        );

        let transaction = match level {
            IsolationLevel::AutoCommit => None,
            level => Some(Transaction::begin(&client, level).await?),
        };

        Ok(Self { client, transaction })
    }

    pub fn client(&self) -> &PrestoClient {
        &self.client
    }

    pub fn transaction_id(&self) -> Option<&str> {
        self.transaction.as_ref().map(Transaction::id)
    }

    /// Return a new cursor bound to this session.
    pub fn cursor(&self) -> Cursor {
        Cursor::new(self.client.clone())
    }

    /// Commit the session's transaction, if any, and end the session.
    pub async fn close(self) -> Result<(), PrestoError> {
        match self.transaction {
            Some(transaction) => transaction.commit().await,
            None => Ok(()),
        }
    }

    /// Roll back the session's transaction, if any, and end the session.
    pub async fn rollback(self) -> Result<(), PrestoError> {
        match self.transaction {
            Some(transaction) => transaction.rollback().await,
            None => Ok(()),
        }
    }
}
