/*!
# prestoframe

<b>Run a Presto query, get an Arrow table back.</b>

`prestoframe` wraps `presto-connect` with deployment defaults (coordinator,
catalog, Kerberos credentials, isolation level) so that a single call opens
a session, runs the query, pulls the complete result into memory, releases
the session and returns the rows as an Arrow [`RecordBatch`](arrow::record_batch::RecordBatch).

## Getting Started

```no_run
use prestoframe::{RunOptions, run_with_options};

# #[tokio::main]
# async fn main() -> Result<(), Box<dyn std::error::Error>> {
let options = RunOptions::new().catalog("analytics_iceberg").schema("wmf");
let table = run_with_options(
    "SELECT wiki_db, count(*) AS c FROM mediawiki_history GROUP BY wiki_db ORDER BY c DESC LIMIT 10",
    &options,
).await?;

println!("{} rows", table.num_rows());
# Ok(())
# }
```

Without an async runtime, use [`blocking::run`].

## 🧠 Concepts

- <b>[`RunOptions`]</b> — per-call overrides; anything unset falls back to the defaults in [`config`].
- <b>[`QueryEngine`]</b> — the client capabilities the runner needs; [`PrestoEngine`] is the real one.
- <b>[`frame`]</b> — how Presto column types become Arrow types.
*/

pub mod config;
pub mod engine;
pub mod error;
pub mod frame;
pub mod runner;

pub use config::{ConnectionConfig, RunOptions};
pub use engine::{EngineConnection, EngineCursor, PrestoEngine, QueryEngine};
pub use error::{PrestoframeError, PrestoframeErrorKind};
pub use runner::{blocking, run, run_with, run_with_options};

#[cfg(test)]
mod test_utils;
