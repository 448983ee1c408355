//! Header adapter: request lines in, response lines out.

use super::{absent_if_empty, decode_text};
use crate::descriptor::ParamDescriptor;
use crate::error::{ParamError, ParamResult};
use crate::field::Value;
use http::header::{HeaderMap, HeaderName, HeaderValue};

pub(crate) fn header_name(descriptor: &ParamDescriptor) -> ParamResult<HeaderName> {
    HeaderName::from_bytes(descriptor.name.as_bytes()).map_err(|_| {
        ParamError::configuration(format!("invalid header name '{}'", descriptor.name))
    })
}

fn line_text<'h>(value: &'h HeaderValue, descriptor: &ParamDescriptor) -> ParamResult<&'h str> {
    value.to_str().map_err(|_| {
        ParamError::invalid(
            descriptor.location,
            &descriptor.name,
            String::from_utf8_lossy(value.as_bytes()),
        )
    })
}

/// Every line carrying the parameter, in request order.
pub(crate) fn lines<'h>(
    headers: &'h HeaderMap,
    descriptor: &ParamDescriptor,
) -> ParamResult<Vec<&'h str>> {
    let name = header_name(descriptor)?;
    headers
        .get_all(&name)
        .iter()
        .map(|value| line_text(value, descriptor))
        .collect()
}

/// Decodes one generic header parameter from the first matching line.
pub(crate) fn decode(
    headers: &HeaderMap,
    descriptor: &ParamDescriptor,
) -> ParamResult<Option<Value>> {
    let name = header_name(descriptor)?;
    match headers.get(&name) {
        Some(value) => {
            let raw = line_text(value, descriptor)?;
            Ok(absent_if_empty(decode_text(raw, &descriptor.rules, descriptor)?))
        }
        None => Ok(None),
    }
}

/// Appends one response line per encoded value.
pub(crate) fn append(
    headers: &mut HeaderMap,
    descriptor: &ParamDescriptor,
    encoded: &[String],
) -> ParamResult<()> {
    let name = header_name(descriptor)?;
    for text in encoded {
        let value = HeaderValue::from_str(text)
            .map_err(|_| ParamError::invalid(descriptor.location, &descriptor.name, text))?;
        headers.append(name.clone(), value);
    }
    Ok(())
}
