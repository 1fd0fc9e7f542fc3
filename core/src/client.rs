//! Request builder, response parser and async entry points for the
//! federation registry API.
//!
//! # Design
//! `FederationClient` holds a `base_url`, its options and a shared
//! `Transport`; nothing is mutated after construction. Each endpoint has a
//! `build_*` method that produces an `HttpRequest` and an async method that
//! sends it. `parse_response` turns any `HttpResponse` into a JSON value or
//! an error. Only `send` performs I/O and reports failures to the
//! diagnostic sink.

use std::fmt;
use std::sync::{Arc, OnceLock};

use serde::Serialize;
use serde_json::Value;

use crate::config::ClientOptions;
use crate::error::{ApiError, Result};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::query::{encode_criteria, QueryBuilder};
use crate::transport::{ReqwestTransport, Transport};

/// Async client for an OpenID Federation registry.
///
/// Cloning is cheap; clones share the transport and diagnostic sink.
#[derive(Clone)]
pub struct FederationClient {
    base_url: String,
    options: ClientOptions,
    /// Filled on first use with a `ReqwestTransport` unless `with_transport`
    /// set one.
    transport: Arc<OnceLock<Arc<dyn Transport>>>,
}

impl FederationClient {
    /// Client with default options. `base_url` is used verbatim.
    pub fn new(base_url: &str) -> Self {
        Self::with_options(base_url, ClientOptions::default())
    }

    pub fn with_options(base_url: &str, options: ClientOptions) -> Self {
        Self {
            base_url: base_url.to_string(),
            options,
            transport: Arc::new(OnceLock::new()),
        }
    }

    /// Replace the transport used by the async methods.
    ///
    /// `ClientOptions::timeout` is only applied by the default reqwest
    /// transport; a custom transport enforces its own timeouts. Headers, the
    /// null-parameter policy and the diagnostic sink still apply.
    pub fn with_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Arc::new(OnceLock::from(transport));
        self
    }

    fn transport(&self) -> &Arc<dyn Transport> {
        self.transport
            .get_or_init(|| Arc::new(ReqwestTransport::new(self.options.timeout)) as Arc<dyn Transport>)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    // -----------------------------------------------------------------------
    // Request building
    // -----------------------------------------------------------------------

    /// Build a request for `endpoint`, which is appended to the base URL as is.
    pub fn build_request(
        &self,
        method: HttpMethod,
        endpoint: &str,
        body: Option<String>,
    ) -> HttpRequest {
        let mut headers = Vec::with_capacity(1 + self.options.default_headers.len());
        headers.push(("content-type".to_string(), "application/json".to_string()));
        headers.extend(self.options.default_headers.iter().cloned());
        HttpRequest {
            method,
            endpoint: endpoint.to_string(),
            url: format!("{}{endpoint}", self.base_url),
            headers,
            body,
        }
    }

    pub fn build_get(&self, endpoint: &str) -> HttpRequest {
        self.build_request(HttpMethod::Get, endpoint, None)
    }

    pub fn build_post<T: Serialize + ?Sized>(&self, endpoint: &str, data: &T) -> Result<HttpRequest> {
        let body =
            serde_json::to_string(data).map_err(|e| ApiError::Serialization(e.to_string()))?;
        Ok(self.build_request(HttpMethod::Post, endpoint, Some(body)))
    }

    /// `GET /list?<criteria>`; criteria are form-encoded in iteration order.
    pub fn build_list<I, K, V>(&self, criteria: I) -> HttpRequest
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        self.build_get(&format!("/list?{}", encode_criteria(criteria)))
    }

    pub fn build_fetch(&self, uri: &str) -> HttpRequest {
        self.build_get(&self.query("/fetch").param("sub", uri).build())
    }

    pub fn build_resolve(&self, sub: &str, anchor: &str, entity_type: Option<&str>) -> HttpRequest {
        let endpoint = self
            .query("/resolve")
            .param("sub", sub)
            .param("anchor", anchor)
            .optional("type", entity_type)
            .build();
        self.build_get(&endpoint)
    }

    pub fn build_trust_mark(&self, sub: &str, trust_mark_id: &str) -> HttpRequest {
        let endpoint = self
            .query("/trust-mark")
            .param("sub", sub)
            .param("trust_mark_id", trust_mark_id)
            .build();
        self.build_get(&endpoint)
    }

    pub fn build_trust_mark_status(
        &self,
        sub: &str,
        trust_mark_id: &str,
        trust_mark: &str,
        iat: Option<i64>,
    ) -> HttpRequest {
        let iat = iat.map(|t| t.to_string());
        let endpoint = self
            .query("/trust-mark-status")
            .param("sub", sub)
            .param("trust_mark_id", trust_mark_id)
            .param("trust_mark", trust_mark)
            .optional("iat", iat.as_deref())
            .build();
        self.build_get(&endpoint)
    }

    pub fn build_trust_mark_holders(&self, trust_mark_id: &str, sub: Option<&str>) -> HttpRequest {
        let endpoint = self
            .query("/trust-mark-list")
            .param("trust_mark_id", trust_mark_id)
            .optional("sub", sub)
            .build();
        self.build_get(&endpoint)
    }

    pub fn build_historical_keys(&self) -> HttpRequest {
        self.build_get("/historical-keys")
    }

    fn query(&self, path: &'static str) -> QueryBuilder {
        QueryBuilder::new(path, self.options.null_params)
    }

    // -----------------------------------------------------------------------
    // Response parsing
    // -----------------------------------------------------------------------

    /// Decode a response body for `endpoint`. Non-2xx statuses fail before
    /// the body is looked at.
    pub fn parse_response(&self, endpoint: &str, response: HttpResponse) -> Result<Value> {
        if !response.is_success() {
            return Err(ApiError::HttpStatus {
                status: response.status,
                endpoint: endpoint.to_string(),
                body: response.body,
            });
        }
        serde_json::from_str(&response.body).map_err(|e| ApiError::Parse {
            endpoint: endpoint.to_string(),
            message: e.to_string(),
        })
    }

    // -----------------------------------------------------------------------
    // Network calls
    // -----------------------------------------------------------------------

    /// Issue `method` against `base_url + endpoint` with an optional JSON
    /// body and decode the response. Every other async method funnels
    /// through here or `send`.
    pub async fn request(
        &self,
        method: HttpMethod,
        endpoint: &str,
        body: Option<String>,
    ) -> Result<Value> {
        self.send(self.build_request(method, endpoint, body)).await
    }

    /// Execute a built request and decode its body. Failures are reported to
    /// the diagnostic sink once, then returned.
    pub async fn send(&self, request: HttpRequest) -> Result<Value> {
        let endpoint = request.endpoint.clone();
        tracing::debug!(method = request.method.as_str(), %endpoint, "federation request");

        let result = match self.transport().execute(request).await {
            Ok(response) => self.parse_response(&endpoint, response),
            Err(failure) => Err(ApiError::Transport {
                endpoint,
                message: failure.to_string(),
            }),
        };
        result.inspect_err(|err| self.options.diagnostics.report(err))
    }

    pub async fn get(&self, endpoint: &str) -> Result<Value> {
        self.request(HttpMethod::Get, endpoint, None).await
    }

    pub async fn post<T: Serialize + ?Sized>(&self, endpoint: &str, data: &T) -> Result<Value> {
        let body = serde_json::to_string(data)
            .map_err(|e| ApiError::Serialization(e.to_string()))
            .inspect_err(|err| self.options.diagnostics.report(err))?;
        self.request(HttpMethod::Post, endpoint, Some(body)).await
    }

    pub async fn list<I, K, V>(&self, criteria: I) -> Result<Value>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        self.send(self.build_list(criteria)).await
    }

    pub async fn fetch(&self, uri: &str) -> Result<Value> {
        self.send(self.build_fetch(uri)).await
    }

    pub async fn resolve(&self, sub: &str, anchor: &str, entity_type: Option<&str>) -> Result<Value> {
        self.send(self.build_resolve(sub, anchor, entity_type)).await
    }

    pub async fn trust_mark(&self, sub: &str, trust_mark_id: &str) -> Result<Value> {
        self.send(self.build_trust_mark(sub, trust_mark_id)).await
    }

    pub async fn trust_mark_status(
        &self,
        sub: &str,
        trust_mark_id: &str,
        trust_mark: &str,
        iat: Option<i64>,
    ) -> Result<Value> {
        self.send(self.build_trust_mark_status(sub, trust_mark_id, trust_mark, iat))
            .await
    }

    pub async fn trust_mark_holders(&self, trust_mark_id: &str, sub: Option<&str>) -> Result<Value> {
        self.send(self.build_trust_mark_holders(trust_mark_id, sub)).await
    }

    pub async fn historical_keys(&self) -> Result<Value> {
        self.send(self.build_historical_keys()).await
    }
}

impl fmt::Debug for FederationClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FederationClient")
            .field("base_url", &self.base_url)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}
