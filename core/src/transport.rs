//! Executes `HttpRequest` values against the network.
//!
//! # Design
//! `FederationClient` only ever sees the `Transport` trait. The default
//! implementation wraps a `reqwest::Client`; tests plug in their own to
//! record requests and script responses.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::http::{HttpMethod, HttpRequest, HttpResponse};

/// No response was obtained for a request.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{0}")]
pub struct TransportFailure(pub String);

impl TransportFailure {
    /// Join `err` and every error in its `source()` chain, outermost first.
    /// Causes already contained in an outer message are skipped.
    pub fn from_chain(err: &(dyn std::error::Error + 'static)) -> Self {
        let mut parts = vec![err.to_string()];
        let mut source = err.source();
        while let Some(cause) = source {
            let text = cause.to_string();
            if !parts.iter().any(|p| p.contains(&text)) {
                parts.push(text);
            }
            source = cause.source();
        }
        Self(parts.join(": "))
    }
}

impl From<reqwest::Error> for TransportFailure {
    fn from(err: reqwest::Error) -> Self {
        let kind = if err.is_timeout() {
            Some("timed out")
        } else if err.is_connect() {
            Some("connection failed")
        } else if err.is_builder() {
            Some("invalid request")
        } else {
            None
        };
        let chain = Self::from_chain(&err);
        match kind {
            Some(kind) => Self(format!("{kind}: {}", chain.0)),
            None => chain,
        }
    }
}

/// Performs one HTTP round-trip.
///
/// Non-2xx responses are returned as `Ok`; status interpretation belongs to
/// the client.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportFailure>;
}

/// `Transport` backed by `reqwest`.
///
/// Building the underlying client can fail (TLS backend initialization).
/// That failure is held and reported on the first request, so constructing
/// a `FederationClient` never fails.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Result<reqwest::Client, TransportFailure>,
}

impl ReqwestTransport {
    pub fn new(timeout: Option<Duration>) -> Self {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Self {
            client: builder.build().map_err(TransportFailure::from),
        }
    }

    pub fn from_client(client: reqwest::Client) -> Self {
        Self { client: Ok(client) }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportFailure> {
        let client = self.client.as_ref().map_err(TransportFailure::clone)?;

        let method = match request.method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
        };
        let mut builder = client.request(method, &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = response.text().await?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::io;

    use super::*;

    #[derive(Debug, Error)]
    #[error("error sending request for url (http://127.0.0.1:1/historical-keys)")]
    struct SendError(#[source] ConnectError);

    #[derive(Debug, Error)]
    #[error("tcp connect error")]
    struct ConnectError(#[source] io::Error);

    #[test]
    fn chain_keeps_every_cause() {
        let err = SendError(ConnectError(io::Error::new(
            io::ErrorKind::ConnectionRefused,
            "Connection refused (os error 111)",
        )));

        let failure = TransportFailure::from_chain(&err);

        assert_eq!(
            failure.to_string(),
            "error sending request for url (http://127.0.0.1:1/historical-keys): \
             tcp connect error: Connection refused (os error 111)"
        );
    }

    #[test]
    fn chain_skips_repeated_causes() {
        #[derive(Debug, Error)]
        #[error("request failed: operation timed out")]
        struct Wrapped(#[source] io::Error);

        let err = Wrapped(io::Error::new(io::ErrorKind::TimedOut, "operation timed out"));

        assert_eq!(
            TransportFailure::from_chain(&err).to_string(),
            "request failed: operation timed out"
        );
    }

    #[tokio::test]
    async fn invalid_url_is_described_as_invalid_request() {
        let transport = ReqwestTransport::new(None);
        let request = HttpRequest {
            method: HttpMethod::Get,
            endpoint: "/fetch".to_string(),
            url: "not a url/fetch".to_string(),
            headers: Vec::new(),
            body: None,
        };

        let failure = transport.execute(request).await.unwrap_err();

        assert!(failure.0.starts_with("invalid request: "), "{failure}");
    }
}
