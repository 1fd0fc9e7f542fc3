//! Endpoint and query-string construction.
//!
//! Named operations encode each value as a URI component (space becomes
//! `%20`). `list` criteria are serialized as a form-encoded query string
//! (space becomes `+`), preserving the caller's iteration order.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use url::form_urlencoded;

use crate::config::NullParams;

/// Characters left untouched when encoding a single URI component.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Percent-encode `value` for use as a single query parameter.
pub fn encode_component(value: &str) -> String {
    utf8_percent_encode(value, COMPONENT).to_string()
}

/// Serialize arbitrary criteria as `application/x-www-form-urlencoded`.
pub fn encode_criteria<I, K, V>(criteria: I) -> String
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (key, value) in criteria {
        serializer.append_pair(key.as_ref(), value.as_ref());
    }
    serializer.finish()
}

/// Accumulates `key=value` pairs for a fixed endpoint path.
#[derive(Debug)]
pub(crate) struct QueryBuilder {
    path: &'static str,
    null_params: NullParams,
    pairs: Vec<String>,
}

impl QueryBuilder {
    pub(crate) fn new(path: &'static str, null_params: NullParams) -> Self {
        Self {
            path,
            null_params,
            pairs: Vec::new(),
        }
    }

    pub(crate) fn param(mut self, key: &str, value: &str) -> Self {
        self.pairs
            .push(format!("{}={}", encode_component(key), encode_component(value)));
        self
    }

    /// Add a parameter that may be absent. Absent values are written as the
    /// text `null` or skipped, depending on the configured policy.
    pub(crate) fn optional(self, key: &str, value: Option<&str>) -> Self {
        match (value, self.null_params) {
            (Some(value), _) => self.param(key, value),
            (None, NullParams::Literal) => self.param(key, "null"),
            (None, NullParams::Omit) => self,
        }
    }

    pub(crate) fn build(self) -> String {
        if self.pairs.is_empty() {
            return self.path.to_string();
        }
        format!("{}?{}", self.path, self.pairs.join("&"))
    }
}
