/*!
# presto-connect

<b>A small, async Rust client for the Presto statement protocol.</b>

This crate talks to a Presto coordinator over its REST interface
(`/v1/statement`): it submits SQL, follows result pages until the query is
complete, and hands back column metadata and rows as JSON values.

## ✨ Features

- ⚙️ **Connection options** mirroring the Presto client headers (user, source,
  catalog, schema, session properties);
- 🔁 **Transactions** started automatically for non-autocommit isolation levels;
- 🔐 **Pluggable authentication** (none, basic, Kerberos behind the `kerberos` feature);
- 🪶 **Async execution** using `tokio` and `reqwest`.
- 🧪 **Stub coordinator** for tests, behind the `test-utils` feature.

## Getting Started

```no_run
use presto_connect::{Connection, ConnectionOptions, NoAuthentication};
use std::sync::Arc;

# #[tokio::main]
# async fn main() -> Result<(), Box<dyn std::error::Error>> {
// 1️⃣ Describe the coordinator
let mut options = ConnectionOptions::new("localhost", "alice");
options.catalog = Some("hive".to_string());

// 2️⃣ Open a session and run a query
let connection = Connection::connect(options, Arc::new(NoAuthentication)).await?;
let mut cursor = connection.cursor();
cursor.execute("SELECT 1 AS x").await?;

// 3️⃣ Pull every row, then release the query and the session
let rows = cursor.fetch_all().await?;
let columns = cursor.description().to_vec();
cursor.cancel().await?;
connection.close().await?;
# Ok(())
# }
```

## 🧠 Concepts

- <b>[`Connection`]</b> — a session with the coordinator, optionally inside a transaction.
- <b>[`Cursor`]</b> — a single query: execute, fetch, describe, cancel.
- <b>[`Authentication`]</b> — opaque credentials applied to every request.
- <b>[`PrestoClient`]</b> — low-level HTTP client (used internally).
*/

mod auth;
pub mod client;
mod connection;
mod cursor;
mod error;
mod transaction;

pub use auth::{Authentication, BasicAuthentication, KerberosAuthentication, NoAuthentication};
pub use client::{Column, PrestoClient, QueryStats, Row};
pub use connection::{Connection, ConnectionOptions, HttpScheme};
pub use cursor::{Cursor, CursorState};
pub use error::{ErrorLocation, FailureKind, PrestoError, QueryFailure};
pub use transaction::IsolationLevel;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
