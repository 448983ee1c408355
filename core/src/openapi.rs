//! # OpenAPI Rendering
//!
//! Turns cached descriptors into `utoipa` parameter and response header objects
//! for an OpenAPI document generator.

use crate::cache::DescriptorCache;
use crate::descriptor::ParamDescriptor;
use crate::error::ParamResult;
use crate::field::ParamStruct;
use crate::primitive::ScalarKind;
use crate::style::{Location, Shape, Style};
use utoipa::openapi::header::{Header, HeaderBuilder};
use utoipa::openapi::path::{Parameter, ParameterBuilder, ParameterIn, ParameterStyle};
use utoipa::openapi::schema::{Array, KnownFormat, ObjectBuilder, Schema, SchemaFormat, Type};
use utoipa::openapi::{Deprecated, RefOr, Required};

fn scalar_schema(kind: ScalarKind) -> Schema {
    let (schema_type, format) = match kind {
        ScalarKind::Bool => (Type::Boolean, None),
        ScalarKind::I32 => (Type::Integer, Some(SchemaFormat::KnownFormat(KnownFormat::Int32))),
        ScalarKind::I64 => (Type::Integer, Some(SchemaFormat::KnownFormat(KnownFormat::Int64))),
        ScalarKind::I8 => (Type::Integer, Some(SchemaFormat::Custom("int8".into()))),
        ScalarKind::I16 => (Type::Integer, Some(SchemaFormat::Custom("int16".into()))),
        ScalarKind::U8 => (Type::Integer, Some(SchemaFormat::Custom("uint8".into()))),
        ScalarKind::U16 => (Type::Integer, Some(SchemaFormat::Custom("uint16".into()))),
        ScalarKind::U32 => (Type::Integer, Some(SchemaFormat::Custom("uint32".into()))),
        ScalarKind::U64 => (Type::Integer, Some(SchemaFormat::Custom("uint64".into()))),
        ScalarKind::F32 => (Type::Number, Some(SchemaFormat::KnownFormat(KnownFormat::Float))),
        ScalarKind::F64 => (Type::Number, Some(SchemaFormat::KnownFormat(KnownFormat::Double))),
        ScalarKind::Complex64 => (Type::String, Some(SchemaFormat::Custom("complex64".into()))),
        ScalarKind::Complex128 => (Type::String, Some(SchemaFormat::Custom("complex128".into()))),
        ScalarKind::String => (Type::String, None),
    };
    Schema::Object(
        ObjectBuilder::new()
            .schema_type(schema_type)
            .format(format)
            .build(),
    )
}

/// Schema of the value carried by one parameter.
pub fn schema_for(descriptor: &ParamDescriptor) -> Schema {
    match descriptor.shape {
        Shape::Primitive(kind) => scalar_schema(kind),
        Shape::Slice(kind) => Schema::Array(Array::new(RefOr::T(scalar_schema(kind)))),
        Shape::Object => {
            let mut builder = ObjectBuilder::new().schema_type(Type::Object);
            for prop in &descriptor.properties {
                builder = builder.property(&prop.name, RefOr::T(scalar_schema(prop.kind)));
                if !prop.nullable {
                    builder = builder.required(&prop.name);
                }
            }
            Schema::Object(builder.build())
        }
        Shape::Custom => Schema::Object(ObjectBuilder::new().schema_type(Type::String).build()),
    }
}

fn parameter_in(location: Location) -> ParameterIn {
    match location {
        Location::Path => ParameterIn::Path,
        Location::Query => ParameterIn::Query,
        Location::Header => ParameterIn::Header,
        Location::Cookie => ParameterIn::Cookie,
    }
}

fn parameter_style(style: Style) -> ParameterStyle {
    match style {
        Style::Simple => ParameterStyle::Simple,
        Style::Label => ParameterStyle::Label,
        Style::Matrix => ParameterStyle::Matrix,
        Style::Form => ParameterStyle::Form,
        Style::SpaceDelimited => ParameterStyle::SpaceDelimited,
        Style::PipeDelimited => ParameterStyle::PipeDelimited,
        Style::DeepObject => ParameterStyle::DeepObject,
    }
}

fn flag<T>(value: bool, yes: T, no: T) -> T {
    if value {
        yes
    } else {
        no
    }
}

/// One OpenAPI parameter object.
pub fn parameter_for(descriptor: &ParamDescriptor) -> Parameter {
    let mut builder = ParameterBuilder::new()
        .name(&descriptor.name)
        .parameter_in(parameter_in(descriptor.location))
        .required(flag(descriptor.required, Required::True, Required::False))
        .description(descriptor.description.clone())
        .schema(Some(RefOr::T(schema_for(descriptor))))
        .style(Some(parameter_style(descriptor.style)))
        .explode(Some(descriptor.explode));
    if descriptor.deprecated {
        builder = builder.deprecated(Some(Deprecated::True));
    }
    if descriptor.allow_reserved {
        builder = builder.allow_reserved(Some(true));
    }
    builder.build()
}

/// Request parameters of `T` in declaration order.
pub fn request_parameters<T: ParamStruct>() -> ParamResult<Vec<Parameter>> {
    request_parameters_with::<T>(DescriptorCache::global())
}

/// [`request_parameters`] against a specific cache.
pub fn request_parameters_with<T: ParamStruct>(
    cache: &DescriptorCache,
) -> ParamResult<Vec<Parameter>> {
    Ok(cache.descriptors::<T>()?.iter().map(parameter_for).collect())
}

/// Response headers of `T`, with every cookie folded into one `Set-Cookie` entry.
pub fn response_headers<T: ParamStruct>() -> ParamResult<Vec<(String, Header)>> {
    response_headers_with::<T>(DescriptorCache::global())
}

/// [`response_headers`] against a specific cache.
pub fn response_headers_with<T: ParamStruct>(
    cache: &DescriptorCache,
) -> ParamResult<Vec<(String, Header)>> {
    let descriptors = cache.descriptors::<T>()?;
    let mut headers = Vec::new();
    let mut cookies = Vec::new();
    for descriptor in descriptors.iter() {
        match descriptor.location {
            Location::Header => {
                let header = HeaderBuilder::new()
                    .schema(RefOr::T(schema_for(descriptor)))
                    .description(descriptor.description.clone())
                    .build();
                headers.push((descriptor.name.clone(), header));
            }
            Location::Cookie => cookies.push(descriptor.name.as_str()),
            Location::Path | Location::Query => {}
        }
    }
    if !cookies.is_empty() {
        let header = HeaderBuilder::new()
            .schema(RefOr::T(Schema::Object(
                ObjectBuilder::new().schema_type(Type::String).build(),
            )))
            .description(Some(format!("Sets cookies: {}", cookies.join(", "))))
            .build();
        headers.push(("Set-Cookie".to_string(), header));
    }
    Ok(headers)
}
