//! Credentials attached to every request sent to the coordinator.
//!
//! An [`Authentication`] is an opaque capability: the client hands it the
//! HTTP client builder once, so it can install trust roots, and then every
//! outgoing request, so it can attach credentials. Nothing else in the crate
//! looks inside it.
use crate::connection::ConnectionOptions;
use crate::error::PrestoError;

use reqwest::{ClientBuilder, RequestBuilder};
use std::fmt;
use std::path::PathBuf;


pub trait Authentication: fmt::Debug + Send + Sync {
    /// Adjust the HTTP client before it is built, e.g. to trust a private CA.
    fn configure(&self, builder: ClientBuilder) -> Result<ClientBuilder, PrestoError> {
        Ok(builder)
    }

    /// Attach credentials to a single request.
    fn authenticate(
        &self,
        request: RequestBuilder,
        options: &ConnectionOptions,
    ) -> Result<RequestBuilder, PrestoError>;
}


/// Sends requests with the user header only.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoAuthentication;

impl Authentication for NoAuthentication {
    fn authenticate(
        &self,
        request: RequestBuilder,
        _options: &ConnectionOptions,
    ) -> Result<RequestBuilder, PrestoError> {
        Ok(request)
    }
}


/// HTTP basic authentication. Coordinators only accept it over https.
#[derive(Clone)]
pub struct BasicAuthentication {
    username: String,
    password: String,
}

impl BasicAuthentication {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self { username: username.into(), password: password.into() }
    }
}

impl fmt::Debug for BasicAuthentication {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BasicAuthentication")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

impl Authentication for BasicAuthentication {
    fn authenticate(
        &self,
        request: RequestBuilder,
        _options: &ConnectionOptions,
    ) -> Result<RequestBuilder, PrestoError> {
        Ok(request.basic_auth(&self.username, Some(&self.password)))
    }
}


/// Kerberos (SPNEGO) authentication against `<service_name>/<host>`.
///
/// The CA bundle, when present, is added to the client's trust roots so the
/// coordinator's certificate can be verified. Token generation needs the
/// `kerberos` feature and a system GSSAPI library; the library reads its
/// configuration from the `KRB5_CONFIG` environment variable or its built-in
/// default, so `config` is only checked for existence here. Applications
/// that want it applied export it as `KRB5_CONFIG` before starting threads.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KerberosAuthentication {
    pub config: PathBuf,
    pub service_name: String,
    pub principal: Option<String>,
    pub ca_bundle: Option<PathBuf>,
}

impl KerberosAuthentication {
    pub fn new(service_name: impl Into<String>) -> Self {
        Self {
            config: PathBuf::from("/etc/krb5.conf"),
            service_name: service_name.into(),
            principal: None,
            ca_bundle: None,
        }
    }

    pub fn with_config(mut self, config: impl Into<PathBuf>) -> Self {
        self.config = config.into();
        self
    }

    pub fn with_principal(mut self, principal: impl Into<String>) -> Self {
        self.principal = Some(principal.into());
        self
    }

    pub fn with_ca_bundle(mut self, ca_bundle: impl Into<PathBuf>) -> Self {
        self.ca_bundle = Some(ca_bundle.into());
        self
    }

    /// The service principal the coordinator is expected to run as.
    pub fn target_principal(&self, host: &str) -> String {
        format!("{}/{}", self.service_name, host)
    }

    #[cfg(feature = "kerberos")]
    fn negotiate_token(&self, host: &str) -> Result<String, PrestoError> {
        use base64::Engine;
        use cross_krb5::{ClientCtx, InitiateFlags};

        if !self.config.exists() {
            return Err(PrestoError::Unauthenticated(format!(
                "Kerberos configuration '{}' does not exist",
                self.config.display()
            )));
        }

        let target = self.target_principal(host);
        let (_pending, token) = ClientCtx::new(
            InitiateFlags::empty(),
            self.principal.as_deref(),
            &target,
            None,
        )
        .map_err(|e| PrestoError::Unauthenticated(format!("{target}: {e}")))?;

        Ok(base64::engine::general_purpose::STANDARD.encode(&*token))
    }

    #[cfg(not(feature = "kerberos"))]
    fn negotiate_token(&self, host: &str) -> Result<String, PrestoError> {
        Err(PrestoError::Unauthenticated(format!(
            "cannot obtain a Kerberos ticket for '{}': presto-connect was built without the `kerberos` feature",
            self.target_principal(host)
        )))
    }
}

impl Authentication for KerberosAuthentication {
    fn configure(&self, builder: ClientBuilder) -> Result<ClientBuilder, PrestoError> {
        let Some(path) = &self.ca_bundle else {
            return Ok(builder);
        };

        let pem = std::fs::read(path)
            .map_err(|source| PrestoError::Io { source, path: path.clone() })?;
        let certificates = reqwest::Certificate::from_pem_bundle(&pem)?;
        tracing::debug!("Trusting {} certificate(s) from '{}'", certificates.len(), path.display());

        Ok(certificates
            .into_iter()
            .fold(builder, |builder, certificate| builder.add_root_certificate(certificate)))
    }

    fn authenticate(
        &self,
        request: RequestBuilder,
        options: &ConnectionOptions,
    ) -> Result<RequestBuilder, PrestoError> {
        let token = self.negotiate_token(&options.host)?;
        Ok(request.header(reqwest::header::AUTHORIZATION, format!("Negotiate {token}")))
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> RequestBuilder {
        reqwest::Client::new().get("http://localhost:8080/v1/statement")
    }

    #[test]
    fn basic_authentication_sets_authorization_header() {
        let options = ConnectionOptions::new("localhost", "alice");
        let auth = BasicAuthentication::new("alice", "secret");

        let built = auth.authenticate(request(), &options).unwrap().build().unwrap();
        let header = built.headers().get(reqwest::header::AUTHORIZATION).unwrap();

        // base64("alice:secret")
        assert_eq!(header, "Basic YWxpY2U6c2VjcmV0");
    }

    #[test]
    fn basic_authentication_debug_hides_password() {
        let auth = BasicAuthentication::new("alice", "secret");
        let text = format!("{auth:?}");
        assert!(!text.contains("secret"));
    }

    #[test]
    fn no_authentication_leaves_request_untouched() {
        let options = ConnectionOptions::new("localhost", "alice");
        let built = NoAuthentication.authenticate(request(), &options).unwrap().build().unwrap();
        assert!(built.headers().get(reqwest::header::AUTHORIZATION).is_none());
    }

    #[test]
    fn kerberos_target_principal_uses_service_and_host() {
        let auth = KerberosAuthentication::new("presto").with_principal("alice@EXAMPLE");
        assert_eq!(auth.target_principal("coordinator.example"), "presto/coordinator.example");
        assert_eq!(auth.principal.as_deref(), Some("alice@EXAMPLE"));
    }

    #[test]
    fn kerberos_missing_ca_bundle_is_an_io_error() {
        let auth = KerberosAuthentication::new("presto")
            .with_ca_bundle("/nonexistent/presto/ca.crt.pem");

        let result = auth.configure(reqwest::Client::builder());
        assert!(matches!(result, Err(PrestoError::Io { .. })));
    }

    #[cfg(not(feature = "kerberos"))]
    #[test]
    fn kerberos_without_feature_is_unauthenticated() {
        let options = ConnectionOptions::new("coordinator.example", "alice");
        let auth = KerberosAuthentication::new("presto");

        let result = auth.authenticate(request(), &options);
        match result {
            Err(PrestoError::Unauthenticated(msg)) => assert!(msg.contains("presto/coordinator.example")),
            other => panic!("Expected Unauthenticated, got {other:?}"),
        }
    }
}
