//! # Commands
//!
//! Each subcommand resolves a parameter from the command line the same way a
//! parameter struct would, then runs one codec operation on it.

use crate::error::{CliError, CliResult};
use crate::output::{Output, OutputFormat};
use paramstyle_core::primitive::{decode_scalar, encode_scalar};
use paramstyle_core::style::{resolve, resolve_style};
use paramstyle_core::{
    decode_string, encode_value, Location, ParamDescriptor, ParamSpec, PropertySpec, Scalar,
    ScalarKind, Shape, Style, Value,
};
use serde::Serialize;

/// Value shape selected on the command line.
#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeArg {
    /// A single scalar.
    Primitive,
    /// A sequence of scalars.
    Slice,
    /// A flat object; properties come from `--prop`.
    Object,
}

impl ShapeArg {
    fn shape(self, kind: ScalarKind) -> Shape {
        match self {
            ShapeArg::Primitive => Shape::Primitive(kind),
            ShapeArg::Slice => Shape::Slice(kind),
            ShapeArg::Object => Shape::Object,
        }
    }
}

/// Parses `name:kind`, with a trailing `?` on the kind for an optional property.
fn parse_prop(s: &str) -> Result<PropertySpec, String> {
    let (name, kind) = s
        .split_once(':')
        .ok_or_else(|| format!("invalid NAME:kind: no `:` found in `{}`", s))?;
    let (kind, nullable) = match kind.strip_suffix('?') {
        Some(kind) => (kind, true),
        None => (kind, false),
    };
    Ok(PropertySpec {
        name: name.to_string(),
        kind: kind.parse()?,
        nullable,
    })
}

/// Arguments for the rules command.
#[derive(clap::Args, Debug, Clone)]
pub struct RulesArgs {
    /// Parameter location.
    #[clap(long = "in")]
    pub location: Location,

    /// Serialization style; the location default when omitted.
    #[clap(long)]
    pub style: Option<Style>,

    /// Explode flag.
    #[clap(long)]
    pub explode: bool,

    /// Value shape.
    #[clap(long, value_enum, default_value = "primitive")]
    pub shape: ShapeArg,

    /// Parameter name, used by keyed prefixes.
    #[clap(long, default_value = "name")]
    pub name: String,
}

#[derive(Serialize)]
struct RulesReport<'a> {
    name: &'a str,
    #[serde(rename = "in")]
    location: Location,
    style: Style,
    explode: bool,
    shape: &'static str,
    prefix: String,
    delimiter: String,
    value_delimiter: String,
}

/// Prints the prefix and delimiters for one combination.
pub fn rules(args: &RulesArgs, format: OutputFormat) -> CliResult<String> {
    let style = resolve_style(args.location, args.style, &args.name)?;
    let shape = args.shape.shape(ScalarKind::String);
    let explode = paramstyle_core::style::effective_explode(style, args.explode);
    let rules = resolve(args.location, style, explode, shape, &args.name)?;
    let report = RulesReport {
        name: &args.name,
        location: args.location,
        style,
        explode,
        shape: shape.name(),
        prefix: rules.prefix,
        delimiter: rules.delimiter,
        value_delimiter: rules.value_delimiter,
    };
    let text = format!(
        "prefix={:?} delimiter={:?} value_delimiter={:?}",
        report.prefix, report.delimiter, report.value_delimiter
    );
    Output::new(&report, text).render(format)
}

/// A parameter declared by tag, shared by describe, decode and encode.
#[derive(clap::Args, Debug, Clone)]
pub struct TargetArgs {
    /// Field tag, e.g. `ids,in=query,style=pipeDelimited`.
    pub tag: String,

    /// Scalar kind of the value or of each element.
    #[clap(long, default_value = "string")]
    pub kind: ScalarKind,

    /// Value shape.
    #[clap(long, value_enum, default_value = "primitive")]
    pub shape: ShapeArg,

    /// Object property as `name:kind`; repeat in declaration order.
    #[clap(long = "prop", value_parser = parse_prop)]
    pub props: Vec<PropertySpec>,

    /// Treat the field as optional.
    #[clap(long)]
    pub nullable: bool,
}

impl TargetArgs {
    fn descriptor(&self) -> CliResult<ParamDescriptor> {
        let spec: ParamSpec = self.tag.parse()?;
        let shape = self.shape.shape(self.kind);
        let props: &[PropertySpec] = if shape == Shape::Object { &self.props } else { &[] };
        if shape != Shape::Object && !self.props.is_empty() {
            return Err(CliError::General(
                "--prop only applies to --shape object".to_string(),
            ));
        }
        let descriptor = ParamDescriptor::resolve(&spec, shape, self.nullable, props)?;
        tracing::debug!(
            name = %descriptor.name,
            location = %descriptor.location,
            style = %descriptor.style,
            explode = descriptor.explode,
            "resolved descriptor"
        );
        Ok(descriptor)
    }
}

/// Prints the resolved descriptor for a tag.
pub fn describe(args: &TargetArgs, format: OutputFormat) -> CliResult<String> {
    let d = args.descriptor()?;
    let text = format!(
        "{} in={} style={} explode={} required={} shape={}",
        d.name,
        d.location,
        d.style,
        d.explode,
        d.required,
        d.shape.name()
    );
    Output::new(&d, text).render(format)
}

/// Arguments for the decode command.
#[derive(clap::Args, Debug, Clone)]
pub struct DecodeArgs {
    #[clap(flatten)]
    pub target: TargetArgs,

    /// Raw value as the carrier holds it; a whole query string for `in=query`.
    pub raw: String,
}

#[derive(Serialize)]
#[serde(untagged)]
enum Decoded {
    Absent,
    Value(Value),
}

fn value_text(value: &Value) -> String {
    match value {
        Value::Scalar(s) => encode_scalar(s),
        Value::List(items) => {
            let items: Vec<String> = items.iter().map(encode_scalar).collect();
            format!("[{}]", items.join(", "))
        }
        Value::Object(slots) => {
            let slots: Vec<String> = slots
                .iter()
                .map(|s| s.as_ref().map_or_else(|| "null".to_string(), encode_scalar))
                .collect();
            format!("{{{}}}", slots.join(", "))
        }
    }
}

/// Decodes one raw value and prints it.
pub fn decode(args: &DecodeArgs, format: OutputFormat) -> CliResult<String> {
    let d = args.target.descriptor()?;
    let decoded = decode_string(&args.raw, &d)?;
    let text = decoded
        .as_ref()
        .map_or_else(|| "absent".to_string(), value_text);
    let decoded = decoded.map_or(Decoded::Absent, Decoded::Value);
    Output::new(&decoded, text).render(format)
}

/// Arguments for the encode command.
#[derive(clap::Args, Debug, Clone)]
pub struct EncodeArgs {
    #[clap(flatten)]
    pub target: TargetArgs,

    /// One value for a primitive, each element for a slice, `prop=value` for an object.
    #[clap(required = true)]
    pub values: Vec<String>,
}

fn scalar(raw: &str, kind: ScalarKind) -> CliResult<Scalar> {
    decode_scalar(raw, kind).map_err(|e| CliError::General(e.to_string()))
}

fn build_value(d: &ParamDescriptor, values: &[String]) -> CliResult<Value> {
    match d.shape {
        Shape::Primitive(kind) => match values {
            [single] => Ok(Value::Scalar(scalar(single, kind)?)),
            _ => Err(CliError::General(format!(
                "a primitive takes one value, got {}",
                values.len()
            ))),
        },
        Shape::Slice(kind) => values
            .iter()
            .map(|v| scalar(v, kind))
            .collect::<CliResult<Vec<_>>>()
            .map(Value::List),
        Shape::Object => {
            let mut slots = vec![None; d.properties.len()];
            for pair in values {
                let (name, raw) = pair.split_once('=').ok_or_else(|| {
                    CliError::General(format!("expected prop=value, got `{}`", pair))
                })?;
                let index = d
                    .properties
                    .iter()
                    .position(|p| p.name == name)
                    .ok_or_else(|| CliError::General(format!("unknown property `{}`", name)))?;
                slots[index] = Some(scalar(raw, d.properties[index].kind)?);
            }
            Ok(Value::Object(slots))
        }
        Shape::Custom => Err(CliError::General(
            "custom parameters cannot be encoded from the command line".to_string(),
        )),
    }
}

#[derive(Serialize)]
struct Encoded<'a> {
    name: &'a str,
    #[serde(rename = "in")]
    location: Location,
    encoded: &'a str,
}

/// Encodes values and prints the wire string.
pub fn encode(args: &EncodeArgs, format: OutputFormat) -> CliResult<String> {
    let d = args.target.descriptor()?;
    let value = build_value(&d, &args.values)?;
    let encoded = encode_value(&value, &d)?;
    let report = Encoded {
        name: &d.name,
        location: d.location,
        encoded: &encoded,
    };
    Output::new(&report, encoded.clone()).render(format)
}
