//! # Location Adapters
//!
//! Extract raw values from the physical carriers (path captures, query
//! multimap, header lines, cookie jar), drive the codecs, and assemble the
//! destination struct. Response encoding goes the other way for headers and
//! cookies.

mod cookie;
mod header;
mod path;
mod query;

pub use cookie::CookieJar;
pub use path::PathParams;
pub use query::QueryValues;

use crate::cache::DescriptorCache;
use crate::descriptor::ParamDescriptor;
use crate::error::{CodecError, ParamError, ParamResult};
use crate::field::{FieldAccessor, ParamStruct, RawParam, Value};
use crate::object::{decode_object, encode_object};
use crate::primitive::{decode_scalar, encode_scalar};
use crate::slice::{decode_slice, encode_slice, strip_prefix};
use crate::style::{Location, Shape, StyleRules};
use http::HeaderMap;

/// The non-body parts of one request.
#[derive(Debug, Clone, Copy)]
pub struct RequestParams<'a> {
    /// Captures from the route match.
    pub path: &'a PathParams,
    /// The decoded query string.
    pub query: &'a QueryValues,
    /// Request headers, cookies included.
    pub headers: &'a HeaderMap,
}

impl<'a> RequestParams<'a> {
    /// Bundles the three carriers.
    pub fn new(path: &'a PathParams, query: &'a QueryValues, headers: &'a HeaderMap) -> Self {
        Self {
            path,
            query,
            headers,
        }
    }
}

/// Objects with no resolved property count as absent.
pub(crate) fn absent_if_empty(value: Value) -> Option<Value> {
    match &value {
        Value::Object(slots) if slots.iter().all(Option::is_none) => None,
        _ => Some(value),
    }
}

/// Decodes a single raw string with `rules` according to the descriptor's shape.
pub(crate) fn decode_text(
    raw: &str,
    rules: &StyleRules,
    descriptor: &ParamDescriptor,
) -> ParamResult<Value> {
    let invalid = |e: CodecError| e.into_param(descriptor.location, &descriptor.name, raw);
    match descriptor.shape {
        Shape::Primitive(kind) => {
            let body = strip_prefix(raw, &rules.prefix).map_err(invalid)?;
            decode_scalar(body, kind)
                .map(Value::Scalar)
                .map_err(|e| invalid(e.into()))
        }
        Shape::Slice(kind) => decode_slice(raw, rules, kind)
            .map(Value::List)
            .map_err(invalid),
        Shape::Object => decode_object(raw, rules, &descriptor.properties)
            .map(Value::Object)
            .map_err(invalid),
        Shape::Custom => Err(custom_needs_marshaler(descriptor)),
    }
}

/// Encodes a value with `rules` according to the descriptor's shape.
pub(crate) fn encode_text(
    value: &Value,
    rules: &StyleRules,
    descriptor: &ParamDescriptor,
) -> ParamResult<String> {
    match (descriptor.shape, value) {
        (Shape::Primitive(_), Value::Scalar(scalar)) => {
            Ok(format!("{}{}", rules.prefix, encode_scalar(scalar)))
        }
        (Shape::Slice(_), Value::List(items)) => Ok(encode_slice(items, rules)),
        (Shape::Object, Value::Object(slots)) => {
            Ok(encode_object(slots, rules, &descriptor.properties))
        }
        (Shape::Custom, _) => Err(custom_needs_marshaler(descriptor)),
        (shape, _) => Err(ParamError::configuration(format!(
            "value for parameter '{}' does not match its {} shape",
            descriptor.name,
            shape.name()
        ))),
    }
}

fn custom_needs_marshaler(descriptor: &ParamDescriptor) -> ParamError {
    ParamError::configuration(format!(
        "parameter '{}' has a custom shape and must go through its marshaler",
        descriptor.name
    ))
}

/// Decodes one raw carrier value for `descriptor` outside of a struct.
///
/// Path and header values are taken as sent, cookie values without the
/// `name=` key, and query values as a whole query string. `Ok(None)` means the
/// parameter was absent and not required.
pub fn decode_string(raw: &str, descriptor: &ParamDescriptor) -> ParamResult<Option<Value>> {
    let value = match descriptor.location {
        Location::Path | Location::Header => {
            absent_if_empty(decode_text(raw, &descriptor.rules, descriptor)?)
        }
        Location::Cookie => absent_if_empty(decode_text(raw, &descriptor.keyed_rules(), descriptor)?),
        Location::Query => query::decode(&QueryValues::parse(raw), descriptor)?,
    };
    match value {
        None if descriptor.required => {
            Err(ParamError::required(descriptor.location, &descriptor.name))
        }
        other => Ok(other),
    }
}

/// Encodes a value the way [`decode_string`] expects to read it back.
///
/// Cookie text containing bytes a `Cookie` header cannot carry is `Invalid`.
pub fn encode_value(value: &Value, descriptor: &ParamDescriptor) -> ParamResult<String> {
    match descriptor.location {
        Location::Path | Location::Header => encode_text(value, &descriptor.rules, descriptor),
        Location::Cookie => {
            let text = encode_text(value, &descriptor.keyed_rules(), descriptor)?;
            cookie::check_value(descriptor, &text)?;
            Ok(text)
        }
        Location::Query => {
            if descriptor.shape == Shape::Custom {
                return Err(custom_needs_marshaler(descriptor));
            }
            Ok(query::encode(value, descriptor))
        }
    }
}

/// Decodes the parameters of `T` from a request using the global cache.
pub fn decode_params<T: ParamStruct>(request: &RequestParams<'_>) -> ParamResult<T> {
    decode_params_with(DescriptorCache::global(), request)
}

/// Decodes the parameters of `T` using a specific cache.
///
/// Fails on the first field error; no partially decoded value is returned.
pub fn decode_params_with<T: ParamStruct>(
    cache: &DescriptorCache,
    request: &RequestParams<'_>,
) -> ParamResult<T> {
    let binding = cache.get_or_build::<T>()?;
    let jar = CookieJar::from_headers(request.headers);
    let mut target = T::default();

    for (descriptor, accessor) in binding.fields() {
        tracing::trace!(
            name = %descriptor.name,
            location = %descriptor.location,
            style = %descriptor.style,
            "decoding parameter"
        );
        let present = match accessor {
            FieldAccessor::Generic { write, .. } => {
                let value = match descriptor.location {
                    Location::Path => path::decode(request.path, descriptor)?,
                    Location::Query => query::decode(request.query, descriptor)?,
                    Location::Header => header::decode(request.headers, descriptor)?,
                    Location::Cookie => cookie::decode(&jar, descriptor)?,
                };
                match value {
                    Some(value) => {
                        write(&mut target, value);
                        true
                    }
                    None => false,
                }
            }
            FieldAccessor::Custom { decode, .. } => {
                let lines;
                let raw = match descriptor.location {
                    Location::Path => request.path.get(&descriptor.name).map(RawParam::Path),
                    Location::Query => request
                        .query
                        .has_param(descriptor)
                        .then_some(RawParam::Query(request.query)),
                    Location::Header => {
                        lines = header::lines(request.headers, descriptor)?;
                        (!lines.is_empty()).then(|| RawParam::Header(&lines))
                    }
                    Location::Cookie => jar.get(&descriptor.name).map(RawParam::Cookie),
                };
                match raw {
                    Some(raw) => {
                        decode(&mut target, raw, descriptor)?;
                        true
                    }
                    None => false,
                }
            }
        };

        if !present && descriptor.required {
            tracing::debug!(
                name = %descriptor.name,
                location = %descriptor.location,
                "missing required parameter"
            );
            return Err(ParamError::required(descriptor.location, &descriptor.name));
        }
    }
    Ok(target)
}

/// Encodes the header and cookie parameters of `T` for a response using the global cache.
pub fn encode_params<T: ParamStruct>(value: &T) -> ParamResult<HeaderMap> {
    encode_params_with(DescriptorCache::global(), value)
}

/// Encodes the header and cookie parameters of `T` using a specific cache.
///
/// Path and query fields are skipped, as are `None` values.
pub fn encode_params_with<T: ParamStruct>(
    cache: &DescriptorCache,
    value: &T,
) -> ParamResult<HeaderMap> {
    let binding = cache.get_or_build::<T>()?;
    let mut headers = HeaderMap::new();

    for (descriptor, accessor) in binding.fields() {
        if !descriptor.location.is_encodable() {
            continue;
        }
        let encoded = match accessor {
            FieldAccessor::Generic { read, .. } => match read(value) {
                Some(field) => {
                    let rules = match descriptor.location {
                        Location::Cookie => descriptor.keyed_rules(),
                        _ => descriptor.rules.clone(),
                    };
                    vec![encode_text(&field, &rules, descriptor)?]
                }
                None => continue,
            },
            FieldAccessor::Custom { encode, .. } => match encode(value, descriptor)? {
                Some(lines) => lines,
                None => continue,
            },
        };
        match descriptor.location {
            Location::Cookie => cookie::append(&mut headers, descriptor, &encoded)?,
            _ => header::append(&mut headers, descriptor, &encoded)?,
        }
    }
    Ok(headers)
}
