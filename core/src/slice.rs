//! # Slice Codec
//!
//! Ordered sequences of scalars, joined and split with the style delimiters.

use crate::error::CodecError;
use crate::primitive::{decode_scalar, encode_scalar, Scalar, ScalarKind};
use crate::style::StyleRules;

/// Strips `prefix` from `raw`, failing when it is not an exact leading match.
pub(crate) fn strip_prefix<'a>(raw: &'a str, prefix: &str) -> Result<&'a str, CodecError> {
    raw.strip_prefix(prefix)
        .ok_or_else(|| CodecError::PrefixMismatch(prefix.to_string()))
}

/// Decodes a single raw string into a sequence.
///
/// An empty remainder after the prefix yields an empty sequence.
pub fn decode_slice(
    raw: &str,
    rules: &StyleRules,
    kind: ScalarKind,
) -> Result<Vec<Scalar>, CodecError> {
    let rest = strip_prefix(raw, &rules.prefix)?;
    if rest.is_empty() {
        return Ok(Vec::new());
    }
    if rules.delimiter.is_empty() {
        return Ok(vec![decode_scalar(rest, kind)?]);
    }
    rest.split(rules.delimiter.as_str())
        .map(|piece| decode_scalar(piece, kind).map_err(CodecError::from))
        .collect()
}

/// Decodes values that the carrier already split, one element per value.
pub fn decode_elements<'a, I>(values: I, kind: ScalarKind) -> Result<Vec<Scalar>, CodecError>
where
    I: IntoIterator<Item = &'a str>,
{
    values
        .into_iter()
        .map(|v| decode_scalar(v, kind).map_err(CodecError::from))
        .collect()
}

/// Prefix once, then every element joined with the delimiter.
pub fn encode_slice(values: &[Scalar], rules: &StyleRules) -> String {
    let body: Vec<String> = values.iter().map(encode_scalar).collect();
    format!("{}{}", rules.prefix, body.join(&rules.delimiter))
}
