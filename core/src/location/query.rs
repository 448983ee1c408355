//! Query string carrier and adapter.

use super::{absent_if_empty, decode_text};
use crate::descriptor::ParamDescriptor;
use crate::error::ParamResult;
use crate::field::Value;
use crate::object::{decode_object_keyed, encode_object};
use crate::primitive::encode_scalar;
use crate::slice::{decode_elements, encode_slice};
use crate::style::{Shape, Style};
use indexmap::IndexMap;
use url::form_urlencoded;

/// Decoded query string: every key with all of its values, in order of appearance.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryValues {
    values: IndexMap<String, Vec<String>>,
}

impl QueryValues {
    /// An empty multimap.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a raw `application/x-www-form-urlencoded` query string.
    ///
    /// A leading `?` is ignored.
    pub fn parse(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        form_urlencoded::parse(query.as_bytes())
            .into_owned()
            .collect()
    }

    /// Appends one value for `key`.
    pub fn append(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.entry(key.into()).or_default().push(value.into());
    }

    /// First value of `key`.
    pub fn first(&self, key: &str) -> Option<&str> {
        self.values
            .get(key)
            .and_then(|v| v.first())
            .map(String::as_str)
    }

    /// Every value of `key`, empty when absent.
    pub fn get_all(&self, key: &str) -> &[String] {
        self.values.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Whether `key` appears at least once.
    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the query string had no keys.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterates keys with their values.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Whether any key belongs to the parameter, including `name[prop]` keys.
    pub(crate) fn has_param(&self, descriptor: &ParamDescriptor) -> bool {
        if self.contains_key(&descriptor.name) {
            return true;
        }
        let bracket = format!("{}[", descriptor.name);
        self.values.keys().any(|k| k.starts_with(&bracket))
            || descriptor
                .properties
                .iter()
                .any(|p| self.contains_key(&p.key))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for QueryValues {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut values = QueryValues::new();
        for (k, v) in iter {
            values.append(k, v);
        }
        values
    }
}

fn repeats_key(descriptor: &ParamDescriptor) -> bool {
    descriptor.explode
        && matches!(
            descriptor.style,
            Style::Form | Style::SpaceDelimited | Style::PipeDelimited
        )
}

/// Decodes one generic query parameter; `None` when no key for it was sent.
pub(crate) fn decode(
    query: &QueryValues,
    descriptor: &ParamDescriptor,
) -> ParamResult<Option<Value>> {
    let location = descriptor.location;
    let name = descriptor.name.as_str();
    match descriptor.shape {
        Shape::Slice(kind) if repeats_key(descriptor) => {
            let values = query.get_all(name);
            if values.is_empty() {
                return Ok(None);
            }
            decode_elements(values.iter().map(String::as_str), kind)
                .map(|items| Some(Value::List(items)))
                .map_err(|e| e.into_param(location, name, &values.join("&")))
        }
        Shape::Object if descriptor.explode => {
            let slots = decode_object_keyed(|key| query.first(key), &descriptor.properties)
                .map_err(|(e, raw)| e.into_param(location, name, raw))?;
            Ok(absent_if_empty(Value::Object(slots)))
        }
        _ => match query.first(name) {
            Some(raw) => Ok(absent_if_empty(decode_text(
                raw,
                &descriptor.keyed_rules(),
                descriptor,
            )?)),
            None => Ok(None),
        },
    }
}

/// Serializes a value as the query pairs it would travel as.
fn encode_pairs(value: &Value, descriptor: &ParamDescriptor) -> Vec<(String, String)> {
    let name = descriptor.name.clone();
    let keyed = descriptor.keyed_rules();
    match value {
        Value::Scalar(scalar) => vec![(name, encode_scalar(scalar))],
        Value::List(items) if repeats_key(descriptor) => items
            .iter()
            .map(|item| (name.clone(), encode_scalar(item)))
            .collect(),
        Value::List(items) => vec![(name, encode_slice(items, &keyed))],
        Value::Object(slots) if descriptor.explode => descriptor
            .properties
            .iter()
            .zip(slots)
            .filter_map(|(prop, slot)| {
                slot.as_ref()
                    .map(|scalar| (prop.key.clone(), encode_scalar(scalar)))
            })
            .collect(),
        Value::Object(slots) => vec![(name, encode_object(slots, &keyed, &descriptor.properties))],
    }
}

/// Percent-encoded query string for a single parameter value.
pub(crate) fn encode(value: &Value, descriptor: &ParamDescriptor) -> String {
    form_urlencoded::Serializer::new(String::new())
        .extend_pairs(encode_pairs(value, descriptor))
        .finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::ParamSpec;
    use crate::object::PropertySpec;
    use crate::primitive::{Scalar, ScalarKind};
    use pretty_assertions::assert_eq;

    fn slice(spec: ParamSpec) -> ParamDescriptor {
        ParamDescriptor::resolve(&spec, Shape::Slice(ScalarKind::I32), false, &[]).unwrap()
    }

    fn object(spec: ParamSpec) -> ParamDescriptor {
        let props = [
            PropertySpec::new("stringprop", ScalarKind::String),
            PropertySpec::new("intprop", ScalarKind::I32),
        ];
        ParamDescriptor::resolve(&spec, Shape::Object, false, &props).unwrap()
    }

    #[test]
    fn test_parse_keeps_repeats_in_order() {
        let q = QueryValues::parse("?a=1&b=x+y&a=2");
        assert_eq!(q.get_all("a"), ["1", "2"]);
        assert_eq!(q.first("b"), Some("x y"));
        assert_eq!(q.len(), 2);
        assert!(q.get_all("c").is_empty());
    }

    #[test]
    fn test_form_explode_collects_every_occurrence() {
        let d = slice(ParamSpec::query("formexint").explode(true));
        let q = QueryValues::parse("formexint=0&formexint=123");
        assert_eq!(
            decode(&q, &d).unwrap(),
            Some(Value::List(vec![Scalar::I32(0), Scalar::I32(123)]))
        );
    }

    #[test]
    fn test_delimited_non_explode() {
        let space = slice(ParamSpec::query("spaceint").style(Style::SpaceDelimited));
        let pipe = slice(ParamSpec::query("pipeint").style(Style::PipeDelimited));
        let q = QueryValues::parse("spaceint=0%20123&pipeint=0|123");
        let expected = Some(Value::List(vec![Scalar::I32(0), Scalar::I32(123)]));
        assert_eq!(decode(&q, &space).unwrap(), expected);
        assert_eq!(decode(&q, &pipe).unwrap(), expected);
    }

    #[test]
    fn test_deep_object_keys() {
        let d = object(ParamSpec::query("deepstruct").style(Style::DeepObject));
        let q = QueryValues::parse("deepstruct%5Bstringprop%5D=propstring&deepstruct[intprop]=123");
        assert_eq!(
            decode(&q, &d).unwrap(),
            Some(Value::Object(vec![
                Some(Scalar::Str("propstring".into())),
                Some(Scalar::I32(123))
            ]))
        );
        assert!(q.has_param(&d));
    }

    #[test]
    fn test_absent_key_is_none() {
        let d = slice(ParamSpec::query("missing"));
        assert_eq!(decode(&QueryValues::new(), &d).unwrap(), None);
        let d = object(ParamSpec::query("obj").explode(true));
        assert_eq!(decode(&QueryValues::parse("other=1"), &d).unwrap(), None);
    }

    #[test]
    fn test_bad_element_reports_raw_values() {
        let d = slice(ParamSpec::query("n").explode(true));
        let err = decode(&QueryValues::parse("n=1&n=x"), &d).unwrap_err();
        assert_eq!(err.to_string(), "query parameter n was improperly formatted: 1&x");
    }

    #[test]
    fn test_encode_round_trips_through_parse() {
        let d = object(ParamSpec::query("deepstruct").style(Style::DeepObject));
        let value = Value::Object(vec![Some(Scalar::Str("a b".into())), Some(Scalar::I32(7))]);
        let encoded = encode(&value, &d);
        assert_eq!(encoded, "deepstruct%5Bstringprop%5D=a+b&deepstruct%5Bintprop%5D=7");
        assert_eq!(decode(&QueryValues::parse(&encoded), &d).unwrap(), Some(value));

        let d = slice(ParamSpec::query("ids"));
        let value = Value::List(vec![Scalar::I32(3), Scalar::I32(4)]);
        assert_eq!(encode(&value, &d), "ids=3%2C4");
    }
}
