use crate::client::PrestoClient;
use crate::cursor::Cursor;
use crate::error::PrestoError;

use std::fmt;
use std::str::FromStr;


/// Transaction isolation requested for a session.
///
/// Anything other than [`IsolationLevel::AutoCommit`] makes the session run
/// inside an explicit transaction, which is what lets the coordinator cancel
/// the whole unit of work when the client goes away.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum IsolationLevel {
    #[default]
    AutoCommit,
    ReadUncommitted,
    ReadCommitted,
    RepeatableRead,
    Serializable,
}

impl IsolationLevel {
    /// The clause used in `START TRANSACTION ISOLATION LEVEL ...`.
    pub fn as_sql(&self) -> Option<&'static str> {
        match self {
            IsolationLevel::AutoCommit => None,
            IsolationLevel::ReadUncommitted => Some("READ UNCOMMITTED"),
            IsolationLevel::ReadCommitted => Some("READ COMMITTED"),
            IsolationLevel::RepeatableRead => Some("REPEATABLE READ"),
            IsolationLevel::Serializable => Some("SERIALIZABLE"),
        }
    }
}

impl TryFrom<u8> for IsolationLevel {
    type Error = PrestoError;

    fn try_from(level: u8) -> Result<Self, Self::Error> {
        match level {
            0 => Ok(IsolationLevel::AutoCommit),
            1 => Ok(IsolationLevel::ReadUncommitted),
            2 => Ok(IsolationLevel::ReadCommitted),
            3 => Ok(IsolationLevel::RepeatableRead),
            4 => Ok(IsolationLevel::Serializable),
            other => Err(PrestoError::InvalidConfiguration(format!(
                "Isolation level must be between 0 and 4, got {other}"
            ))),
        }
    }
}

impl From<IsolationLevel> for u8 {
    fn from(level: IsolationLevel) -> Self {
        level as u8
    }
}

impl FromStr for IsolationLevel {
    type Err = PrestoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Ok(level) = s.trim().parse::<u8>() {
            return IsolationLevel::try_from(level);
        }

        match s.trim().to_ascii_lowercase().replace(['_', ' '], "-").as_str() {
            "autocommit" | "auto-commit" => Ok(IsolationLevel::AutoCommit),
            "read-uncommitted" => Ok(IsolationLevel::ReadUncommitted),
            "read-committed" => Ok(IsolationLevel::ReadCommitted),
            "repeatable-read" => Ok(IsolationLevel::RepeatableRead),
            "serializable" => Ok(IsolationLevel::Serializable),
            _ => Err(PrestoError::InvalidConfiguration(format!("Unknown isolation level: '{s}'"))),
        }
    }
}

impl fmt::Display for IsolationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_sql().unwrap_or("AUTOCOMMIT"))
    }
}


/// An explicit transaction opened on behalf of a [`Connection`](crate::Connection).
#[derive(Debug)]
pub(crate) struct Transaction {
    client: PrestoClient,
    id: String,
}

impl Transaction {
    pub(crate) async fn begin(
        client: &PrestoClient,
        level: IsolationLevel,
    ) -> Result<Self, PrestoError> {
        let Some(clause) = level.as_sql() else {
            return Err(PrestoError::InvalidState(
                "Autocommit sessions do not start transactions".to_string(),
            ));
        };

        client.clear_transaction().await;

        let mut cursor = Cursor::new(client.clone());
        cursor.execute(&format!("START TRANSACTION ISOLATION LEVEL {clause}")).await?;
        cursor.fetch_all().await?;

        let id = client.transaction_id().await.ok_or_else(|| {
            PrestoError::InvalidResponse("Coordinator did not start a transaction".to_string())
        })?;
        tracing::debug!("Started transaction {id} ({level})");

        Ok(Self { client: client.clone(), id })
    }

    pub(crate) fn id(&self) -> &str {
        &self.id
    }

    pub(crate) async fn commit(self) -> Result<(), PrestoError> {
        self.finish("COMMIT").await
    }

    pub(crate) async fn rollback(self) -> Result<(), PrestoError> {
        self.finish("ROLLBACK").await
    }

    async fn finish(self, statement: &str) -> Result<(), PrestoError> {
        let mut cursor = Cursor::new(self.client.clone());
        let outcome = match cursor.execute(statement).await {
            Ok(()) => cursor.fetch_all().await.map(|_| ()),
            Err(e) => Err(e),
        };

        // The transaction is over either way.
        self.client.clear_transaction().await;
        tracing::debug!("{statement} transaction {}", self.id);

        outcome
    }
}
