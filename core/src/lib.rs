#![deny(missing_docs)]

//! # Paramstyle Core
//!
//! Codec for OpenAPI 3.1 path, query, header and cookie parameters.
//!
//! A parameter struct implements [`ParamStruct`] and declares each field with a
//! [`ParamSpec`]. Its descriptors are resolved once, cached by type, and then
//! drive [`decode_params`] for requests and [`encode_params`] for responses.

/// Shared error types.
pub mod error;

/// Location, style and shape tables.
pub mod style;

/// Scalar values.
pub mod primitive;

/// Sequence encode/decode.
pub mod slice;

/// Flat object encode/decode.
pub mod object;

/// Field metadata and resolved descriptors.
pub mod descriptor;

/// Field type layouts and parameter structs.
pub mod field;

/// Per-type descriptor cache.
pub mod cache;

/// Path, query, header and cookie adapters.
pub mod location;

/// OpenAPI parameter and header rendering.
pub mod openapi;

pub use cache::{descriptors, register, DescriptorCache};
pub use descriptor::{ParamDescriptor, ParamSpec, PropertyDescriptor};
pub use error::{CodecError, ParamError, ParamResult};
pub use field::{
    CustomParam, FieldLayout, FieldSet, ParamField, ParamStruct, RawParam, TypeBinding, Value,
};
pub use location::{
    decode_params, decode_params_with, decode_string, encode_params, encode_params_with,
    encode_value, CookieJar, PathParams, QueryValues, RequestParams,
};
pub use object::{ParamObject, PropertySet, PropertySpec, PropertyValue};
pub use primitive::{Complex, Primitive, Scalar, ScalarError, ScalarKind};
pub use style::{Location, Shape, Style, StyleRules};
