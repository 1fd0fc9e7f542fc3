//! Where request failures get reported before they are returned.
//!
//! # Design
//! The client reports every failure exactly once through a `DiagnosticSink`
//! and then hands the same error back to the caller. The sink is chosen at
//! construction time; the default forwards to `tracing`.

use crate::error::ApiError;

/// Receives every error the client is about to return.
pub trait DiagnosticSink: Send + Sync {
    fn report(&self, error: &ApiError);
}

/// Emits an `error!` event per failure with the endpoint and status as fields.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn report(&self, error: &ApiError) {
        tracing::error!(
            endpoint = error.endpoint().unwrap_or(""),
            status = error.status(),
            "federation request failed: {error}"
        );
    }
}

/// Discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSink;

impl DiagnosticSink for NoopSink {
    fn report(&self, _error: &ApiError) {}
}

impl<F> DiagnosticSink for F
where
    F: Fn(&ApiError) + Send + Sync,
{
    fn report(&self, error: &ApiError) {
        self(error)
    }
}
