//! Client configuration.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::diagnostics::{DiagnosticSink, TracingSink};

/// How optional query parameters are written when the caller passes `None`.
///
/// Deployed registries have seen `type=null`, `iat=null` and `sub=null` on
/// the wire for years, so `Literal` is the default. `Omit` drops the
/// parameter instead.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NullParams {
    #[default]
    Literal,
    Omit,
}

/// Options accepted by `FederationClient::with_options`.
#[derive(Clone)]
pub struct ClientOptions {
    /// Per-request timeout applied by the default transport. `None` waits
    /// as long as the underlying HTTP stack does.
    pub timeout: Option<Duration>,
    /// Extra headers sent after `content-type` on every request.
    pub default_headers: Vec<(String, String)>,
    pub null_params: NullParams,
    pub diagnostics: Arc<dyn DiagnosticSink>,
}

impl ClientOptions {
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_headers.push((name.into(), value.into()));
        self
    }

    pub fn null_params(mut self, policy: NullParams) -> Self {
        self.null_params = policy;
        self
    }

    pub fn diagnostics(mut self, sink: impl DiagnosticSink + 'static) -> Self {
        self.diagnostics = Arc::new(sink);
        self
    }
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            timeout: None,
            default_headers: Vec::new(),
            null_params: NullParams::default(),
            diagnostics: Arc::new(TracingSink),
        }
    }
}

impl fmt::Debug for ClientOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientOptions")
            .field("timeout", &self.timeout)
            .field("default_headers", &self.default_headers)
            .field("null_params", &self.null_params)
            .finish_non_exhaustive()
    }
}
