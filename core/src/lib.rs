//! Async client for OpenID Federation trust-registry services.
//!
//! # Overview
//! `FederationClient` turns each registry endpoint (list, fetch, resolve,
//! trust marks, historical keys) into an `HttpRequest`, executes it through a
//! `Transport`, and returns the response body as an untyped
//! `serde_json::Value`. Entity statements, trust-mark JWTs and metadata are
//! passed through without interpretation.
//!
//! # Design
//! - The client is immutable after construction and safe to share across
//!   tasks; concurrent calls are independent.
//! - Every operation has a pure `build_*` counterpart, and
//!   `parse_response` is pure, so URL construction and status handling are
//!   testable without a server.
//! - Failures go to a pluggable `DiagnosticSink` once and are then returned.
//!   No retries, no caching.

pub mod client;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod http;
pub mod query;
pub mod transport;

pub use client::FederationClient;
pub use config::{ClientOptions, NullParams};
pub use diagnostics::{DiagnosticSink, NoopSink, TracingSink};
pub use error::{ApiError, Result};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use transport::{ReqwestTransport, Transport, TransportFailure};
