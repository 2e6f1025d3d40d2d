pub mod output;
pub mod ux;

use prestoframe::config::{self, RunOptions};
use prestoframe::{PrestoframeError, PrestoframeErrorKind};

pub use clap::{Parser, ValueEnum};
use presto_connect::{BasicAuthentication, HttpScheme, IsolationLevel, NoAuthentication};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;


/// User-facing enum to select how requests are authenticated
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum AuthKind {
    Kerberos,
    Basic,
    None,
}

/// Encoding of the result table written to stdout
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Csv,
    Json,
    Arrow,
}


#[derive(Parser)]
#[command(name = "prestoframe", version, about = "Run a Presto query and print the result table.")]
pub struct Cli {
    #[arg(
        help = "SQL to run. Use '-' to read it from stdin.",
        conflicts_with = "file",
    )]
    pub sql: Option<String>,

    #[arg(
        short,
        long,
        help = "Read the SQL from a file.",
    )]
    pub file: Option<PathBuf>,

    #[arg(
        long,
        help = "Coordinator host. [default: an-coord1001.eqiad.wmnet]",
        env = "PRESTO_HOST",
    )]
    pub host: Option<String>,

    #[arg(
        long,
        help = "Coordinator port. [default: 8281]",
        env = "PRESTO_PORT",
    )]
    pub port: Option<u16>,

    #[arg(
        long,
        help = "Default catalog for unqualified table names. [default: analytics_hive]",
        env = "PRESTO_CATALOG",
    )]
    pub catalog: Option<String>,

    #[arg(
        long,
        help = "Default schema for unqualified table names.",
        env = "PRESTO_SCHEMA",
    )]
    pub schema: Option<String>,

    #[arg(
        long,
        help = "User to run the query as. [default: $USER]",
        env = "PRESTO_USER",
    )]
    pub user: Option<String>,

    #[arg(
        long,
        help = "Client source reported to the coordinator. [default: presto-connect - $USER]",
        env = "PRESTO_SOURCE",
    )]
    pub source: Option<String>,

    #[arg(
        long,
        help = "http or https. [default: https]",
        env = "PRESTO_HTTP_SCHEME",
    )]
    pub http_scheme: Option<HttpScheme>,

    #[arg(
        long,
        help = "Transaction isolation level, by number (0-4) or name, e.g. read-uncommitted. [default: 1]",
        env = "PRESTO_ISOLATION_LEVEL",
    )]
    pub isolation_level: Option<IsolationLevel>,

    #[arg(
        long,
        value_enum,
        help = "How to authenticate requests.",
        default_value_t = AuthKind::Kerberos,
        env = "PRESTO_AUTH",
    )]
    pub auth: AuthKind,

    #[arg(
        long,
        help = "Password for --auth basic.",
        env = "PRESTO_PASSWORD",
        hide_env_values = true,
    )]
    pub password: Option<String>,

    #[arg(
        long,
        help = "Kerberos configuration file. [default: /etc/krb5.conf]",
        env = "PRESTO_KRB5_CONFIG",
    )]
    pub krb5_config: Option<PathBuf>,

    #[arg(
        long,
        help = "CA bundle used to verify the coordinator. [default: /etc/presto/ca.crt.pem]",
        env = "PRESTO_CA_BUNDLE",
    )]
    pub ca_bundle: Option<PathBuf>,

    #[arg(
        long,
        help = "Kerberos service name of the coordinator. [default: presto]",
        env = "PRESTO_SERVICE_NAME",
    )]
    pub service_name: Option<String>,

    #[arg(
        long,
        help = "Kerberos principal to authenticate as. [default: <user>@WIKIMEDIA]",
        env = "PRESTO_PRINCIPAL",
    )]
    pub principal: Option<String>,

    #[arg(
        long = "session",
        value_name = "KEY=VALUE",
        value_parser = parse_session_property,
        help = "Session property sent with the query. May be repeated.",
    )]
    pub session: Vec<(String, String)>,

    #[arg(
        long,
        value_enum,
        help = "Output format of the result.",
        default_value_t = OutputFormat::Table,
    )]
    pub format: OutputFormat,

    #[arg(
        short,
        long,
        action = clap::ArgAction::Count,
        help = "Set level of verbosity. [default: INFO]\n\t-v: DEBUG\n\t-vv: TRACE\n--quiet takes precedence over --verbose."
    )]
    pub verbose: u8,

    #[arg(
        short,
        long,
        action = clap::ArgAction::SetTrue,
        help = "Disable all information logs (only ERROR level logs are shown).\n--quiet takes precedence over --verbose."
    )]
    pub quiet: bool,
}

impl Cli {
    /// The query text, from the positional argument, `--file` or stdin.
    pub fn read_sql(&self) -> Result<String, PrestoframeError> {
        let sql = match (&self.sql, &self.file) {
            (_, Some(path)) => std::fs::read_to_string(path).map_err(|source| PrestoframeErrorKind::Io {
                source,
                path: path.clone(),
            })?,
            (Some(sql), None) if sql == "-" => {
                let mut sql = String::new();
                std::io::stdin().read_to_string(&mut sql).map_err(|source| PrestoframeErrorKind::Io {
                    source,
                    path: PathBuf::from("<stdin>"),
                })?;
                sql
            }
            (Some(sql), None) => sql.clone(),
            (None, None) => {
                return Err(PrestoframeErrorKind::Configuration(
                    "No SQL given; pass it as an argument, with --file, or '-' for stdin".to_string(),
                ).into());
            }
        };

        let sql = sql.trim().trim_end_matches(';').trim_end();
        if sql.is_empty() {
            return Err(PrestoframeErrorKind::Configuration("SQL must not be empty".to_string()).into());
        }
        Ok(sql.to_string())
    }

    /// Per-call options built from the flags. Unset flags keep the library defaults.
    pub fn run_options(&self) -> Result<RunOptions, PrestoframeError> {
        let mut options = RunOptions {
            catalog: self.catalog.clone(),
            schema: self.schema.clone(),
            host: self.host.clone(),
            port: self.port,
            http_scheme: self.http_scheme,
            user: self.user.clone(),
            isolation_level: self.isolation_level,
            source: self.source.clone(),
            session_properties: self.session.iter().cloned().collect(),
            credentials: None,
        };

        match self.auth {
            AuthKind::Kerberos => {
                if self.has_kerberos_overrides() {
                    let user = self.resolved_user()?;
                    let mut credentials = config::default_credentials(&user);
                    if let Some(service_name) = &self.service_name {
                        credentials.service_name = service_name.clone();
                    }
                    if let Some(path) = &self.krb5_config {
                        credentials = credentials.with_config(path);
                    }
                    if let Some(path) = &self.ca_bundle {
                        credentials = credentials.with_ca_bundle(path);
                    }
                    if let Some(principal) = &self.principal {
                        credentials = credentials.with_principal(principal);
                    }
                    options.credentials = Some(Arc::new(credentials));
                }
            }
            AuthKind::Basic => {
                let password = self.password.clone().ok_or_else(|| {
                    PrestoframeErrorKind::Configuration("--auth basic requires a password (PRESTO_PASSWORD)".to_string())
                })?;
                let user = self.resolved_user()?;
                options.credentials = Some(Arc::new(BasicAuthentication::new(user, password)));
            }
            AuthKind::None => {
                options.credentials = Some(Arc::new(NoAuthentication));
            }
        }

        Ok(options)
    }

    /// Kerberos configuration to export as `KRB5_CONFIG`, if one was given.
    pub fn krb5_config_export(&self) -> Option<&Path> {
        match self.auth {
            AuthKind::Kerberos => self.krb5_config.as_deref(),
            AuthKind::Basic | AuthKind::None => None,
        }
    }

    fn has_kerberos_overrides(&self) -> bool {
        self.krb5_config.is_some()
            || self.ca_bundle.is_some()
            || self.service_name.is_some()
            || self.principal.is_some()
    }

    fn resolved_user(&self) -> Result<String, PrestoframeError> {
        self.user
            .clone()
            .or_else(config::current_user)
            .ok_or_else(|| PrestoframeErrorKind::MissingUser.into())
    }
}


fn parse_session_property(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => Ok((key.trim().to_string(), value.trim().to_string())),
        _ => Err(format!("Expected KEY=VALUE, got '{s}'")),
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        let mut argv = vec!["prestoframe"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_positional_sql_is_trimmed() {
        let cli = parse(&["SELECT 1 AS x;\n"]);
        assert_eq!(cli.read_sql().unwrap(), "SELECT 1 AS x");
    }

    #[test]
    fn test_missing_sql_is_an_error() {
        let cli = parse(&[]);
        assert!(matches!(
            cli.read_sql(),
            Err(PrestoframeError { kind: PrestoframeErrorKind::Configuration(_) })
        ));
    }

    #[test]
    fn test_sql_file_is_read() {
        let path = std::env::temp_dir().join(format!("prestoframe-cli-{}.sql", std::process::id()));
        std::fs::write(&path, "SELECT 2 AS y\n").unwrap();

        let cli = parse(&["--file", path.to_str().unwrap()]);
        let sql = cli.read_sql();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(sql.unwrap(), "SELECT 2 AS y");
    }

    #[test]
    fn test_missing_sql_file_reports_path() {
        let cli = parse(&["--file", "/nonexistent/query.sql"]);
        match cli.read_sql() {
            Err(PrestoframeError { kind: PrestoframeErrorKind::Io { path, .. } }) => {
                assert_eq!(path, PathBuf::from("/nonexistent/query.sql"));
            }
            other => panic!("Expected io error, got {other:?}"),
        }
    }

    #[test]
    fn test_flags_become_run_options() {
        let cli = parse(&[
            "--host", "localhost",
            "--port", "8080",
            "--catalog", "iceberg",
            "--user", "alice",
            "--http-scheme", "http",
            "--isolation-level", "0",
            "--session", "query_max_run_time=1h",
            "--session", "join_distribution_type = BROADCAST",
            "--auth", "none",
            "SELECT 1",
        ]);

        let options = cli.run_options().unwrap();

        assert_eq!(options.host.as_deref(), Some("localhost"));
        assert_eq!(options.port, Some(8080));
        assert_eq!(options.catalog.as_deref(), Some("iceberg"));
        assert_eq!(options.http_scheme, Some(HttpScheme::Http));
        assert_eq!(options.isolation_level, Some(IsolationLevel::AutoCommit));
        assert_eq!(options.session_properties.get("query_max_run_time").map(String::as_str), Some("1h"));
        assert_eq!(
            options.session_properties.get("join_distribution_type").map(String::as_str),
            Some("BROADCAST")
        );
        assert_eq!(format!("{:?}", options.credentials), "Some(NoAuthentication)");
    }

    #[test]
    fn test_unset_flags_keep_defaults() {
        let cli = parse(&["--user", "alice", "SELECT 1"]);

        let config = cli.run_options().unwrap().resolve().unwrap();

        assert_eq!(config.options.host, config::DEFAULT_HOST);
        assert_eq!(config.options.port, config::DEFAULT_PORT);
        assert_eq!(config.options.isolation_level, config::DEFAULT_ISOLATION_LEVEL);
        assert!(format!("{:?}", config.credentials).contains("alice@WIKIMEDIA"));
    }

    #[test]
    fn test_kerberos_overrides() {
        let cli = parse(&[
            "--user", "alice",
            "--principal", "analytics-search@WIKIMEDIA",
            "--service-name", "presto-test",
            "SELECT 1",
        ]);

        let debug = format!("{:?}", cli.run_options().unwrap().credentials);

        assert!(debug.contains("analytics-search@WIKIMEDIA"), "{debug}");
        assert!(debug.contains("presto-test"), "{debug}");
        assert!(debug.contains("/etc/presto/ca.crt.pem"), "{debug}");
    }

    #[test]
    fn test_krb5_config_is_exported_for_kerberos_only() {
        let cli = parse(&["--krb5-config", "/tmp/krb5.conf", "SELECT 1"]);
        assert_eq!(cli.krb5_config_export(), Some(Path::new("/tmp/krb5.conf")));

        let cli = parse(&["--krb5-config", "/tmp/krb5.conf", "--auth", "none", "SELECT 1"]);
        assert_eq!(cli.krb5_config_export(), None);
    }

    #[test]
    fn test_basic_auth_requires_password() {
        let cli = parse(&["--user", "alice", "--auth", "basic", "SELECT 1"]);
        if cli.password.is_some() {
            // PRESTO_PASSWORD is set in this environment.
            return;
        }

        assert!(matches!(
            cli.run_options(),
            Err(PrestoframeError { kind: PrestoframeErrorKind::Configuration(_) })
        ));
    }

    #[test]
    fn test_invalid_session_property_is_rejected() {
        let result = Cli::try_parse_from(["prestoframe", "--session", "no-equals-sign", "SELECT 1"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_sql_and_file_conflict() {
        let result = Cli::try_parse_from(["prestoframe", "--file", "q.sql", "SELECT 1"]);
        assert!(result.is_err());
    }
}
