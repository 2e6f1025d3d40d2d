pub(crate) mod headers;
mod response;

pub use self::response::{Column, QueryStats, Row};
pub(crate) use self::response::QueryResults;
use crate::auth::Authentication;
use crate::connection::ConnectionOptions;
use crate::error::PrestoError;

use reqwest::{Method, RequestBuilder, Response, StatusCode};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use url::Url;


const STATEMENT_PATH: &str = "/v1/statement";


/// Session state the coordinator may change through response headers.
#[derive(Clone, Debug, Default)]
pub(crate) struct SessionState {
    pub(crate) properties: BTreeMap<String, String>,
    pub(crate) transaction_id: Option<String>,
}


/// The HTTP client used internally by [`Connection`](crate::Connection) and
/// [`Cursor`](crate::Cursor).
///
/// Cloning is cheap: clones share the HTTP connection pool and the session
/// state, so a transaction started through one clone is visible to all.
#[derive(Clone, Debug)]
pub struct PrestoClient {
    http: reqwest::Client,
    options: Arc<ConnectionOptions>,
    auth: Arc<dyn Authentication>,
    statement_url: Url,
    state: Arc<RwLock<SessionState>>,
}

impl PrestoClient {
    pub fn new(
        options: ConnectionOptions,
        auth: Arc<dyn Authentication>,
    ) -> Result<Self, PrestoError> {
        let statement_url = options.base_url()?.join(STATEMENT_PATH)?;
        let http = auth.configure(reqwest::Client::builder())?.build()?;
        let state = SessionState {
            properties: options.session_properties.clone(),
            transaction_id: None,
        };

        Ok(Self {
            http,
            options: Arc::new(options),
            auth,
            statement_url,
            state: Arc::new(RwLock::new(state)),
        })
    }

    pub fn options(&self) -> &ConnectionOptions {
        &self.options
    }

    /// Return the id of the active transaction, if any.
    pub async fn transaction_id(&self) -> Option<String> {
        self.state.read().await.transaction_id.clone()
    }

    /// Return the current session properties.
    pub async fn session_properties(&self) -> BTreeMap<String, String> {
        self.state.read().await.properties.clone()
    }

    pub(crate) async fn clear_transaction(&self) {
        self.state.write().await.transaction_id = None;
    }

    /// Submit `sql` and return the first page of results.
    pub(crate) async fn submit(&self, sql: &str) -> Result<QueryResults, PrestoError> {
        tracing::debug!("POST {}", self.statement_url);
        let request = self
            .request(Method::POST, self.statement_url.as_str())
            .await?
            .body(sql.to_string());

        self.process(request.send().await?).await
    }

    /// Follow a `nextUri` and return the page behind it.
    pub(crate) async fn next(&self, uri: &str) -> Result<QueryResults, PrestoError> {
        tracing::trace!("GET {uri}");
        let request = self.request(Method::GET, uri).await?;

        self.process(request.send().await?).await
    }

    /// Ask the coordinator to drop the query behind `uri`.
    pub(crate) async fn cancel(&self, uri: &str) -> Result<(), PrestoError> {
        tracing::debug!("DELETE {uri}");
        let response = self.request(Method::DELETE, uri).await?.send().await?;

        match response.status() {
            status if status.is_success() => Ok(()),
            // Already gone, which is what we wanted.
            StatusCode::NOT_FOUND | StatusCode::GONE => Ok(()),
            status => Err(PrestoError::Http {
                status: status.as_u16(),
                message: response.text().await.unwrap_or_default(),
            }),
        }
    }

    async fn request(&self, method: Method, uri: &str) -> Result<RequestBuilder, PrestoError> {
        let headers = {
            let state = self.state.read().await;
            headers::request_headers(&self.options, &state)?
        };

        let request = self.http.request(method, uri).headers(headers);
        self.auth.authenticate(request, &self.options)
    }

    async fn process(&self, response: Response) -> Result<QueryResults, PrestoError> {
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED {
            return Err(PrestoError::Unauthenticated(response.text().await.unwrap_or_default()));
        }
        if !status.is_success() {
            return Err(PrestoError::Http {
                status: status.as_u16(),
                message: response.text().await.unwrap_or_default(),
            });
        }

        {
            let mut state = self.state.write().await;
            headers::apply_response_headers(response.headers(), &mut state);
        }

        let bytes = response.bytes().await?;
        let mut results: QueryResults = serde_json::from_slice(&bytes)?;

        if let Some(mut failure) = results.error.take() {
            failure.query_id = Some(results.id);
            return Err(PrestoError::Query(failure));
        }

        Ok(results)
    }
}
