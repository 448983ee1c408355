//! # Struct Codec
//!
//! Flat objects: one level of named scalar properties, written as
//! `name<value_delimiter>value` pairs joined by the style delimiter.

use crate::descriptor::PropertyDescriptor;
use crate::error::{CodecError, ParamError, ParamResult};
use crate::primitive::{decode_scalar, encode_scalar, Complex, Primitive, Scalar, ScalarKind};
use crate::slice::strip_prefix;
use crate::style::StyleRules;
use std::sync::Arc;

/// Splits the body of an object value into (name, value) pairs.
fn split_pairs<'a>(
    rest: &'a str,
    rules: &StyleRules,
) -> Result<Vec<(&'a str, &'a str)>, CodecError> {
    if rest.is_empty() {
        return Ok(Vec::new());
    }
    let tokens: Vec<&str> = rest.split(rules.delimiter.as_str()).collect();
    if rules.delimiter == rules.value_delimiter {
        if tokens.len() % 2 != 0 {
            return Err(CodecError::MalformedPairs);
        }
        return Ok(tokens.chunks(2).map(|pair| (pair[0], pair[1])).collect());
    }
    tokens
        .into_iter()
        .map(|token| {
            token
                .split_once(rules.value_delimiter.as_str())
                .ok_or(CodecError::MalformedPairs)
        })
        .collect()
}

/// Decodes a single raw string into one slot per declared property.
///
/// Unknown keys are ignored and the first occurrence of a key wins.
pub fn decode_object(
    raw: &str,
    rules: &StyleRules,
    properties: &[PropertyDescriptor],
) -> Result<Vec<Option<Scalar>>, CodecError> {
    let rest = strip_prefix(raw, &rules.prefix)?;
    let pairs = split_pairs(rest, rules)?;
    properties
        .iter()
        .map(|prop| {
            match pairs.iter().find(|(name, _)| *name == prop.name) {
                Some((_, value)) => Ok(Some(decode_scalar(value, prop.kind)?)),
                None => Ok(None),
            }
        })
        .collect()
}

/// Decodes properties that the carrier exposes under their own keys.
pub fn decode_object_keyed<'a, F>(
    lookup: F,
    properties: &[PropertyDescriptor],
) -> Result<Vec<Option<Scalar>>, (CodecError, &'a str)>
where
    F: Fn(&str) -> Option<&'a str>,
{
    properties
        .iter()
        .map(|prop| match lookup(&prop.key) {
            Some(value) => decode_scalar(value, prop.kind)
                .map(Some)
                .map_err(|e| (CodecError::from(e), value)),
            None => Ok(None),
        })
        .collect()
}

/// Emits every present property in declaration order.
pub fn encode_object(
    values: &[Option<Scalar>],
    rules: &StyleRules,
    properties: &[PropertyDescriptor],
) -> String {
    let pairs: Vec<String> = properties
        .iter()
        .zip(values)
        .filter_map(|(prop, value)| {
            value.as_ref().map(|v| {
                format!("{}{}{}", prop.name, rules.value_delimiter, encode_scalar(v))
            })
        })
        .collect();
    format!("{}{}", rules.prefix, pairs.join(&rules.delimiter))
}

/// A scalar property value: a primitive or an optional primitive.
pub trait PropertyValue: Send + Sync + 'static {
    /// Kind of the inner primitive.
    const KIND: ScalarKind;
    /// Whether the property is an `Option`.
    const NULLABLE: bool;

    /// Current value, `None` when an optional property is unset.
    fn read(&self) -> Option<Scalar>;

    /// Stores a decoded value.
    fn write(&mut self, scalar: Scalar);
}

macro_rules! impl_property_value {
    ($($ty:ty),* $(,)?) => {
        $(
            impl PropertyValue for $ty {
                const KIND: ScalarKind = <$ty as Primitive>::KIND;
                const NULLABLE: bool = false;

                fn read(&self) -> Option<Scalar> {
                    Some(self.to_scalar())
                }

                fn write(&mut self, scalar: Scalar) {
                    if let Some(v) = <$ty as Primitive>::from_scalar(scalar) {
                        *self = v;
                    }
                }
            }

            impl PropertyValue for Option<$ty> {
                const KIND: ScalarKind = <$ty as Primitive>::KIND;
                const NULLABLE: bool = true;

                fn read(&self) -> Option<Scalar> {
                    self.as_ref().map(Primitive::to_scalar)
                }

                fn write(&mut self, scalar: Scalar) {
                    *self = <$ty as Primitive>::from_scalar(scalar);
                }
            }
        )*
    };
}

impl_property_value!(
    bool,
    i8,
    i16,
    i32,
    i64,
    u8,
    u16,
    u32,
    u64,
    f32,
    f64,
    Complex<f32>,
    Complex<f64>,
    String,
);

/// A struct that travels as a single object-shaped parameter.
///
/// ```
/// use paramstyle_core::{ParamObject, PropertySet};
///
/// #[derive(Default)]
/// struct Range {
///     from: i64,
///     to: Option<i64>,
/// }
///
/// impl ParamObject for Range {
///     fn describe(props: &mut PropertySet<Self>) {
///         props
///             .property("from", |r| &r.from, |r| &mut r.from)
///             .property("to", |r| &r.to, |r| &mut r.to);
///     }
/// }
/// ```
pub trait ParamObject: Default + Send + Sync + 'static {
    /// Declares the properties in wire order.
    fn describe(props: &mut PropertySet<Self>);
}

/// Name, kind and optionality of one declared property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertySpec {
    /// Property name inside the object.
    pub name: String,
    /// Scalar kind of the value.
    pub kind: ScalarKind,
    /// Whether the property is optional.
    pub nullable: bool,
}

impl PropertySpec {
    /// A required property of `kind`.
    pub fn new(name: impl Into<String>, kind: ScalarKind) -> Self {
        Self {
            name: name.into(),
            kind,
            nullable: false,
        }
    }
}

type PropertyRead<T> = Arc<dyn Fn(&T) -> Option<Scalar> + Send + Sync>;
type PropertyWrite<T> = Arc<dyn Fn(&mut T, Scalar) + Send + Sync>;

/// Collects the properties of a [`ParamObject`].
pub struct PropertySet<T> {
    specs: Vec<PropertySpec>,
    reads: Vec<PropertyRead<T>>,
    writes: Vec<PropertyWrite<T>>,
    errors: Vec<String>,
}

impl<T: 'static> PropertySet<T> {
    pub(crate) fn new() -> Self {
        Self {
            specs: Vec::new(),
            reads: Vec::new(),
            writes: Vec::new(),
            errors: Vec::new(),
        }
    }

    /// Declares one property with its accessor pair.
    pub fn property<V: PropertyValue>(
        &mut self,
        name: &str,
        get: fn(&T) -> &V,
        get_mut: fn(&mut T) -> &mut V,
    ) -> &mut Self {
        if name.is_empty() {
            self.errors.push("property name cannot be empty".to_string());
            return self;
        }
        if self.specs.iter().any(|s| s.name == name) {
            self.errors.push(format!("duplicate property '{}'", name));
            return self;
        }
        self.specs.push(PropertySpec {
            name: name.to_string(),
            kind: V::KIND,
            nullable: V::NULLABLE,
        });
        self.reads.push(Arc::new(move |t: &T| get(t).read()));
        self.writes
            .push(Arc::new(move |t: &mut T, s: Scalar| get_mut(t).write(s)));
        self
    }

    pub(crate) fn finish(self) -> ParamResult<ObjectAccess<T>> {
        if let Some(first) = self.errors.into_iter().next() {
            return Err(ParamError::configuration(first));
        }
        Ok(ObjectAccess {
            specs: self.specs,
            reads: self.reads,
            writes: self.writes,
        })
    }
}

/// Typed accessors for every declared property of an object.
pub(crate) struct ObjectAccess<T> {
    pub(crate) specs: Vec<PropertySpec>,
    reads: Vec<PropertyRead<T>>,
    writes: Vec<PropertyWrite<T>>,
}

impl<T> ObjectAccess<T> {
    pub(crate) fn read(&self, target: &T) -> Vec<Option<Scalar>> {
        self.reads.iter().map(|read| read(target)).collect()
    }

    pub(crate) fn write(&self, target: &mut T, values: Vec<Option<Scalar>>) {
        for (write, value) in self.writes.iter().zip(values) {
            if let Some(scalar) = value {
                write(target, scalar);
            }
        }
    }
}
