//! Cookie adapter: the request `Cookie` jar and response `Set-Cookie` lines.

use super::{absent_if_empty, decode_text};
use crate::descriptor::ParamDescriptor;
use crate::error::{ParamError, ParamResult};
use crate::field::Value;
use http::header::{HeaderMap, HeaderValue, COOKIE, SET_COOKIE};
use indexmap::IndexMap;

/// Cookies sent with a request, by name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CookieJar<'h> {
    cookies: IndexMap<&'h str, &'h str>,
}

impl<'h> CookieJar<'h> {
    /// Collects every `name=value` pair from all `Cookie` lines.
    ///
    /// The first cookie with a given name wins. Lines that are not text and
    /// pairs without `=` are skipped.
    pub fn from_headers(headers: &'h HeaderMap) -> Self {
        let mut cookies = IndexMap::new();
        for line in headers.get_all(COOKIE).iter() {
            let Ok(text) = line.to_str() else {
                continue;
            };
            for pair in text.split(';') {
                let Some((name, value)) = pair.trim().split_once('=') else {
                    continue;
                };
                let value = value
                    .strip_prefix('"')
                    .and_then(|v| v.strip_suffix('"'))
                    .unwrap_or(value);
                cookies.entry(name.trim()).or_insert(value);
            }
        }
        Self { cookies }
    }

    /// Value of the cookie called `name`.
    pub fn get(&self, name: &str) -> Option<&'h str> {
        self.cookies.get(name).copied()
    }

    /// Number of distinct cookies.
    pub fn len(&self) -> usize {
        self.cookies.len()
    }

    /// Whether no cookies were sent.
    pub fn is_empty(&self) -> bool {
        self.cookies.is_empty()
    }
}

/// Decodes one generic cookie parameter.
pub(crate) fn decode(jar: &CookieJar<'_>, descriptor: &ParamDescriptor) -> ParamResult<Option<Value>> {
    match jar.get(&descriptor.name) {
        Some(raw) => Ok(absent_if_empty(decode_text(
            raw,
            &descriptor.keyed_rules(),
            descriptor,
        )?)),
        None => Ok(None),
    }
}

/// RFC 6265 cookie-octets, plus `,` which form style uses as a delimiter.
fn is_cookie_byte(b: u8) -> bool {
    matches!(b, 0x21 | 0x23..=0x2B | b',' | 0x2D..=0x3A | 0x3C..=0x5B | 0x5D..=0x7E)
}

/// Rejects values that [`CookieJar`] could not read back unchanged.
pub(crate) fn check_value(descriptor: &ParamDescriptor, text: &str) -> ParamResult<()> {
    if text.bytes().all(is_cookie_byte) {
        return Ok(());
    }
    tracing::debug!(name = %descriptor.name, value = text, "cookie value not representable");
    Err(ParamError::invalid(descriptor.location, &descriptor.name, text))
}

/// Appends one `Set-Cookie: name=value` line per encoded value.
pub(crate) fn append(
    headers: &mut HeaderMap,
    descriptor: &ParamDescriptor,
    encoded: &[String],
) -> ParamResult<()> {
    for text in encoded {
        check_value(descriptor, text)?;
        let line = format!("{}={}", descriptor.name, text);
        let value = HeaderValue::from_str(&line)
            .map_err(|_| ParamError::invalid(descriptor.location, &descriptor.name, text))?;
        headers.append(SET_COOKIE, value);
    }
    Ok(())
}
