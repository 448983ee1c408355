//! # Field Layouts
//!
//! How a Rust field type maps onto a parameter shape, and how a parameter
//! struct declares its fields. Everything here is resolved once per type and
//! stored in the descriptor cache as a [`TypeBinding`].

use crate::descriptor::{ParamDescriptor, ParamSpec};
use crate::error::{ParamError, ParamResult};
use crate::location::QueryValues;
use crate::object::{ParamObject, PropertySet, PropertySpec};
use crate::primitive::{Complex, Primitive, Scalar};
use crate::style::{Location, Shape};
use serde::Serialize;
use std::sync::Arc;

/// A dynamically typed field value moved between codecs and accessors.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    /// A primitive field.
    Scalar(Scalar),
    /// A slice field.
    List(Vec<Scalar>),
    /// An object field, one slot per declared property.
    Object(Vec<Option<Scalar>>),
}

/// The raw carrier value handed to a [`CustomParam`].
#[derive(Debug, Clone, Copy)]
pub enum RawParam<'a> {
    /// The captured path segment.
    Path(&'a str),
    /// The whole query multimap.
    Query(&'a QueryValues),
    /// Every header line with the parameter's name, in order.
    Header(&'a [&'a str]),
    /// The cookie value.
    Cookie(&'a str),
}

/// A field type that bypasses the generic codecs.
pub trait CustomParam: Default + Send + Sync + 'static {
    /// Decodes the raw carrier value into `self`.
    fn decode_param(&mut self, raw: RawParam<'_>, descriptor: &ParamDescriptor) -> ParamResult<()>;

    /// Encodes `self` as one header line (or cookie value) per returned string.
    fn encode_param(&self, descriptor: &ParamDescriptor) -> ParamResult<Vec<String>> {
        Err(ParamError::configuration(format!(
            "{} parameter '{}' does not support encoding",
            descriptor.location, descriptor.name
        )))
    }
}

type ReadFn<F> = Arc<dyn Fn(&F) -> Option<Value> + Send + Sync>;
type WriteFn<F> = Arc<dyn Fn(&mut F, Value) + Send + Sync>;
type DecodeFn<F> =
    Arc<dyn Fn(&mut F, RawParam<'_>, &ParamDescriptor) -> ParamResult<()> + Send + Sync>;
type EncodeFn<F> =
    Arc<dyn Fn(&F, &ParamDescriptor) -> ParamResult<Option<Vec<String>>> + Send + Sync>;

pub(crate) enum FieldCodec<F> {
    Generic { read: ReadFn<F>, write: WriteFn<F> },
    Custom { decode: DecodeFn<F>, encode: EncodeFn<F> },
}

/// Shape, properties and value access for one field type.
pub struct FieldLayout<F> {
    pub(crate) shape: Shape,
    pub(crate) nullable: bool,
    pub(crate) properties: Vec<PropertySpec>,
    pub(crate) codec: FieldCodec<F>,
}

impl<F: Primitive> FieldLayout<F> {
    fn primitive() -> Self {
        Self {
            shape: Shape::Primitive(F::KIND),
            nullable: false,
            properties: Vec::new(),
            codec: FieldCodec::Generic {
                read: Arc::new(|v: &F| Some(Value::Scalar(v.to_scalar()))),
                write: Arc::new(|v: &mut F, value: Value| {
                    if let Value::Scalar(scalar) = value {
                        if let Some(p) = F::from_scalar(scalar) {
                            *v = p;
                        }
                    }
                }),
            },
        }
    }
}

impl<P: Primitive> FieldLayout<Vec<P>> {
    fn slice() -> Self {
        Self {
            shape: Shape::Slice(P::KIND),
            nullable: false,
            properties: Vec::new(),
            codec: FieldCodec::Generic {
                read: Arc::new(|v: &Vec<P>| {
                    Some(Value::List(v.iter().map(Primitive::to_scalar).collect()))
                }),
                write: Arc::new(|v: &mut Vec<P>, value: Value| {
                    if let Value::List(items) = value {
                        *v = items.into_iter().filter_map(P::from_scalar).collect();
                    }
                }),
            },
        }
    }
}

impl<F: ParamObject> FieldLayout<F> {
    /// Layout for a [`ParamObject`] field.
    pub fn object() -> ParamResult<Self> {
        let mut props = PropertySet::new();
        F::describe(&mut props);
        let access = Arc::new(props.finish()?);
        let properties = access.specs.clone();
        let read_access = Arc::clone(&access);
        Ok(Self {
            shape: Shape::Object,
            nullable: false,
            properties,
            codec: FieldCodec::Generic {
                read: Arc::new(move |v: &F| Some(Value::Object(read_access.read(v)))),
                write: Arc::new(move |v: &mut F, value: Value| {
                    if let Value::Object(slots) = value {
                        access.write(v, slots);
                    }
                }),
            },
        })
    }
}

impl<F: CustomParam> FieldLayout<F> {
    /// Layout for a [`CustomParam`] field.
    pub fn custom() -> ParamResult<Self> {
        Ok(Self {
            shape: Shape::Custom,
            nullable: false,
            properties: Vec::new(),
            codec: FieldCodec::Custom {
                decode: Arc::new(
                    |v: &mut F, raw: RawParam<'_>, d: &ParamDescriptor| v.decode_param(raw, d),
                ),
                encode: Arc::new(|v: &F, d: &ParamDescriptor| v.encode_param(d).map(Some)),
            },
        })
    }
}

impl<V: ParamField> FieldLayout<Option<V>> {
    fn optional(inner: FieldLayout<V>) -> ParamResult<Self> {
        if inner.nullable {
            return Err(ParamError::configuration(
                "nested Option parameters are not supported",
            ));
        }
        let codec = match inner.codec {
            FieldCodec::Generic { read, write } => FieldCodec::Generic {
                read: Arc::new(move |v: &Option<V>| v.as_ref().and_then(|inner| read(inner))),
                write: Arc::new(move |v: &mut Option<V>, value: Value| {
                    let mut inner = V::default();
                    write(&mut inner, value);
                    *v = Some(inner);
                }),
            },
            FieldCodec::Custom { decode, encode } => FieldCodec::Custom {
                decode: Arc::new(
                    move |v: &mut Option<V>, raw: RawParam<'_>, d: &ParamDescriptor| {
                        let mut inner = V::default();
                        decode(&mut inner, raw, d)?;
                        *v = Some(inner);
                        Ok(())
                    },
                ),
                encode: Arc::new(move |v: &Option<V>, d: &ParamDescriptor| match v {
                    Some(inner) => encode(inner, d),
                    None => Ok(None),
                }),
            },
        };
        Ok(Self {
            shape: inner.shape,
            nullable: true,
            properties: inner.properties,
            codec,
        })
    }
}

/// A Rust type usable as a parameter field.
///
/// Primitives, `Vec` of primitives and `Option` are covered here. Object and
/// custom types opt in with a one line impl:
///
/// ```ignore
/// impl ParamField for Range {
///     fn layout() -> ParamResult<FieldLayout<Self>> {
///         FieldLayout::object()
///     }
/// }
/// ```
pub trait ParamField: Default + Send + Sync + 'static {
    /// Describes how values of this type are carried.
    fn layout() -> ParamResult<FieldLayout<Self>>;
}

macro_rules! impl_primitive_field {
    ($($ty:ty),* $(,)?) => {
        $(
            impl ParamField for $ty {
                fn layout() -> ParamResult<FieldLayout<Self>> {
                    Ok(FieldLayout::primitive())
                }
            }
        )*
    };
}

impl_primitive_field!(
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

impl<P: Primitive> ParamField for Vec<P> {
    fn layout() -> ParamResult<FieldLayout<Self>> {
        Ok(FieldLayout::slice())
    }
}

impl<V: ParamField> ParamField for Option<V> {
    fn layout() -> ParamResult<FieldLayout<Self>> {
        FieldLayout::optional(V::layout()?)
    }
}

type FieldRead<T> = Arc<dyn Fn(&T) -> Option<Value> + Send + Sync>;
type FieldWrite<T> = Arc<dyn Fn(&mut T, Value) + Send + Sync>;
type FieldDecode<T> =
    Arc<dyn Fn(&mut T, RawParam<'_>, &ParamDescriptor) -> ParamResult<()> + Send + Sync>;
type FieldEncode<T> =
    Arc<dyn Fn(&T, &ParamDescriptor) -> ParamResult<Option<Vec<String>>> + Send + Sync>;

/// Type-erased access to one field of a parameter struct.
pub(crate) enum FieldAccessor<T> {
    Generic {
        read: FieldRead<T>,
        write: FieldWrite<T>,
    },
    Custom {
        decode: FieldDecode<T>,
        encode: FieldEncode<T>,
    },
}

/// A struct whose fields are request or response parameters.
///
/// ```
/// use paramstyle_core::{FieldSet, ParamSpec, ParamStruct};
///
/// #[derive(Default)]
/// struct ListPets {
///     limit: Option<u32>,
///     tags: Vec<String>,
/// }
///
/// impl ParamStruct for ListPets {
///     fn describe(fields: &mut FieldSet<Self>) {
///         fields
///             .field(ParamSpec::query("limit"), |p| &p.limit, |p| &mut p.limit)
///             .tag("tags,in=query,explode", |p| &p.tags, |p| &mut p.tags);
///     }
/// }
/// ```
pub trait ParamStruct: Default + Send + Sync + 'static {
    /// Declares every parameter field in order.
    fn describe(fields: &mut FieldSet<Self>);
}

/// Collects the fields of a [`ParamStruct`].
pub struct FieldSet<T> {
    descriptors: Vec<ParamDescriptor>,
    accessors: Vec<FieldAccessor<T>>,
    errors: Vec<ParamError>,
}

impl<T: 'static> FieldSet<T> {
    fn new() -> Self {
        Self {
            descriptors: Vec::new(),
            accessors: Vec::new(),
            errors: Vec::new(),
        }
    }

    /// Declares a field from a typed spec.
    pub fn field<V: ParamField>(
        &mut self,
        spec: ParamSpec,
        get: fn(&T) -> &V,
        get_mut: fn(&mut T) -> &mut V,
    ) -> &mut Self {
        match self.resolve::<V>(&spec, get, get_mut) {
            Ok((descriptor, accessor)) => {
                self.descriptors.push(descriptor);
                self.accessors.push(accessor);
            }
            Err(err) => self.errors.push(err),
        }
        self
    }

    /// Declares a field from the tag grammar.
    pub fn tag<V: ParamField>(
        &mut self,
        tag: &str,
        get: fn(&T) -> &V,
        get_mut: fn(&mut T) -> &mut V,
    ) -> &mut Self {
        match tag.parse::<ParamSpec>() {
            Ok(spec) => self.field(spec, get, get_mut),
            Err(err) => {
                self.errors.push(err);
                self
            }
        }
    }

    fn resolve<V: ParamField>(
        &self,
        spec: &ParamSpec,
        get: fn(&T) -> &V,
        get_mut: fn(&mut T) -> &mut V,
    ) -> ParamResult<(ParamDescriptor, FieldAccessor<T>)> {
        let duplicate = self.descriptors.iter().any(|d| {
            d.location == spec.location
                && if spec.location == Location::Header {
                    d.name.eq_ignore_ascii_case(&spec.name)
                } else {
                    d.name == spec.name
                }
        });
        if duplicate {
            return Err(ParamError::configuration(format!(
                "duplicate parameter '{}' in {}",
                spec.name, spec.location
            )));
        }

        let layout = V::layout()?;
        let descriptor =
            ParamDescriptor::resolve(spec, layout.shape, layout.nullable, &layout.properties)?;
        let accessor = match layout.codec {
            FieldCodec::Generic { read, write } => FieldAccessor::Generic {
                read: Arc::new(move |t: &T| read(get(t))),
                write: Arc::new(move |t: &mut T, value: Value| write(get_mut(t), value)),
            },
            FieldCodec::Custom { decode, encode } => FieldAccessor::Custom {
                decode: Arc::new(move |t: &mut T, raw: RawParam<'_>, d: &ParamDescriptor| {
                    decode(get_mut(t), raw, d)
                }),
                encode: Arc::new(move |t: &T, d: &ParamDescriptor| encode(get(t), d)),
            },
        };
        Ok((descriptor, accessor))
    }
}

/// The fully built descriptors and accessors of one parameter struct.
pub struct TypeBinding<T> {
    descriptors: Arc<[ParamDescriptor]>,
    accessors: Vec<FieldAccessor<T>>,
}

impl<T: ParamStruct> TypeBinding<T> {
    /// Runs `T::describe` and validates every field.
    pub fn build() -> ParamResult<Self> {
        let mut fields = FieldSet::new();
        T::describe(&mut fields);
        if let Some(err) = fields.errors.into_iter().next() {
            return Err(err);
        }
        Ok(Self {
            descriptors: fields.descriptors.into(),
            accessors: fields.accessors,
        })
    }
}

impl<T> TypeBinding<T> {
    /// Descriptors in declaration order.
    pub fn descriptors(&self) -> &Arc<[ParamDescriptor]> {
        &self.descriptors
    }

    pub(crate) fn fields(&self) -> impl Iterator<Item = (&ParamDescriptor, &FieldAccessor<T>)> {
        self.descriptors.iter().zip(self.accessors.iter())
    }
}

impl<T> std::fmt::Debug for TypeBinding<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeBinding")
            .field("type", &std::any::type_name::<T>())
            .field("descriptors", &self.descriptors)
            .finish()
    }
}
