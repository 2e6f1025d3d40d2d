//! Connection defaults and per-call overrides.
//!
//! [`RunOptions`] holds what the caller chose; every field left unset is
//! filled from the defaults below when the options are resolved into a
//! [`ConnectionConfig`]. Resolution happens once per call, so nothing is
//! cached between calls.
use crate::error::{PrestoframeError, PrestoframeErrorKind};

use presto_connect::{
    Authentication, ConnectionOptions, HttpScheme, IsolationLevel, KerberosAuthentication,
};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;


pub const DEFAULT_CATALOG: &str = "analytics_hive";
pub const DEFAULT_HOST: &str = "an-coord1001.eqiad.wmnet";
pub const DEFAULT_PORT: u16 = 8281;
pub const DEFAULT_HTTP_SCHEME: HttpScheme = HttpScheme::Https;
/// Read uncommitted: runs queries inside a transaction so they can be cancelled.
pub const DEFAULT_ISOLATION_LEVEL: IsolationLevel = IsolationLevel::ReadUncommitted;
pub const DEFAULT_KRB5_CONFIG: &str = "/etc/krb5.conf";
pub const DEFAULT_SERVICE_NAME: &str = "presto";
pub const DEFAULT_REALM: &str = "WIKIMEDIA";
pub const DEFAULT_CA_BUNDLE: &str = "/etc/presto/ca.crt.pem";

/// Environment variables consulted, in order, for the current user.
const USER_VARIABLES: [&str; 3] = ["USER", "LOGNAME", "USERNAME"];


/// Per-call overrides. Unset fields fall back to the defaults.
#[derive(Clone, Default)]
pub struct RunOptions {
    pub catalog: Option<String>,
    pub schema: Option<String>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub http_scheme: Option<HttpScheme>,
    pub user: Option<String>,
    pub isolation_level: Option<IsolationLevel>,
    pub source: Option<String>,
    pub session_properties: BTreeMap<String, String>,
    pub credentials: Option<Arc<dyn Authentication>>,
}

impl fmt::Debug for RunOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunOptions")
            .field("catalog", &self.catalog)
            .field("schema", &self.schema)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("http_scheme", &self.http_scheme)
            .field("user", &self.user)
            .field("isolation_level", &self.isolation_level)
            .field("source", &self.source)
            .field("session_properties", &self.session_properties)
            .field("credentials", &self.credentials)
            .finish()
    }
}

impl RunOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn catalog(mut self, catalog: impl Into<String>) -> Self {
        self.catalog = Some(catalog.into());
        self
    }

    pub fn schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    pub fn http_scheme(mut self, http_scheme: HttpScheme) -> Self {
        self.http_scheme = Some(http_scheme);
        self
    }

    pub fn user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }

    pub fn isolation_level(mut self, isolation_level: IsolationLevel) -> Self {
        self.isolation_level = Some(isolation_level);
        self
    }

    pub fn source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn session_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.session_properties.insert(key.into(), value.into());
        self
    }

    pub fn credentials(mut self, credentials: Arc<dyn Authentication>) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Merge the overrides with the defaults, looking the user up in the
    /// environment when none was given.
    pub fn resolve(&self) -> Result<ConnectionConfig, PrestoframeError> {
        self.resolve_for(current_user())
    }

    /// Resolve on behalf of `process_user`, the user running this process.
    /// It is the default query user and always names the default source.
    fn resolve_for(&self, process_user: Option<String>) -> Result<ConnectionConfig, PrestoframeError> {
        let user = match (&self.user, &process_user) {
            (Some(user), _) => user.clone(),
            (None, Some(user)) => user.clone(),
            (None, None) => return Err(PrestoframeErrorKind::MissingUser.into()),
        };
        if user.trim().is_empty() {
            return Err(PrestoframeErrorKind::Configuration("User must not be empty".to_string()).into());
        }

        let options = ConnectionOptions {
            host: self.host.clone().unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: self.port.unwrap_or(DEFAULT_PORT),
            http_scheme: self.http_scheme.unwrap_or(DEFAULT_HTTP_SCHEME),
            source: self
                .source
                .clone()
                .unwrap_or_else(|| default_source(process_user.as_deref().unwrap_or(&user))),
            catalog: Some(self.catalog.clone().unwrap_or_else(|| DEFAULT_CATALOG.to_string())),
            schema: self.schema.clone(),
            session_properties: self.session_properties.clone(),
            isolation_level: self.isolation_level.unwrap_or(DEFAULT_ISOLATION_LEVEL),
            user,
        };

        let credentials = match &self.credentials {
            Some(credentials) => credentials.clone(),
            None => Arc::new(default_credentials(&options.user)),
        };

        Ok(ConnectionConfig { options, credentials })
    }
}


/// A fully resolved configuration for one call.
#[derive(Clone, Debug)]
pub struct ConnectionConfig {
    pub options: ConnectionOptions,
    pub credentials: Arc<dyn Authentication>,
}


/// `presto-connect - <user>`, where the user is the one running the process
/// rather than the one the query runs as.
pub fn default_source(user: &str) -> String {
    format!("{} - {}", ConnectionOptions::DEFAULT_SOURCE, user)
}

/// Kerberos credentials for `<user>@WIKIMEDIA` with the deployment's trust material.
pub fn default_credentials(user: &str) -> KerberosAuthentication {
    KerberosAuthentication::new(DEFAULT_SERVICE_NAME)
        .with_config(DEFAULT_KRB5_CONFIG)
        .with_principal(format!("{user}@{DEFAULT_REALM}"))
        .with_ca_bundle(DEFAULT_CA_BUNDLE)
}

/// The current OS user, from the environment.
pub fn current_user() -> Option<String> {
    USER_VARIABLES
        .iter()
        .filter_map(|name| std::env::var(name).ok())
        .find(|user| !user.trim().is_empty())
}
