//! Path parameter carrier and adapter.

use super::{absent_if_empty, decode_text};
use crate::descriptor::ParamDescriptor;
use crate::error::ParamResult;
use crate::field::Value;
use indexmap::IndexMap;
use percent_encoding::percent_decode_str;

/// Captured path segments by template name, as produced by a router match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathParams {
    values: IndexMap<String, String>,
}

impl PathParams {
    /// No captures.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a segment as given.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.insert(name.into(), value.into());
    }

    /// Stores a percent-encoded segment after decoding it.
    ///
    /// Invalid UTF-8 sequences are replaced with U+FFFD.
    pub fn insert_encoded(&mut self, name: impl Into<String>, raw: &str) {
        let decoded = percent_decode_str(raw).decode_utf8_lossy().into_owned();
        self.values.insert(name.into(), decoded);
    }

    /// Captured value for `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    /// Number of captures.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether nothing was captured.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for PathParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = PathParams::new();
        for (k, v) in iter {
            params.insert(k, v);
        }
        params
    }
}

/// Decodes one generic path parameter; `None` when the route captured nothing for it.
pub(crate) fn decode(
    params: &PathParams,
    descriptor: &ParamDescriptor,
) -> ParamResult<Option<Value>> {
    match params.get(&descriptor.name) {
        Some(raw) => Ok(absent_if_empty(decode_text(
            raw,
            &descriptor.rules,
            descriptor,
        )?)),
        None => Ok(None),
    }
}
