#![deny(missing_docs)]

//! # Parameter Descriptors
//!
//! `ParamSpec` is the declared metadata of one field (typed builder or tag
//! grammar). `ParamDescriptor` is the validated, fully resolved form that the
//! codecs and the OpenAPI renderer consume.

use crate::error::{ParamError, ParamResult};
use crate::object::PropertySpec;
use crate::primitive::ScalarKind;
use crate::style::{self, Location, Shape, Style, StyleRules};
use http::HeaderName;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Declared metadata for one parameter field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamSpec {
    /// Wire name.
    pub name: String,
    /// Carrier location.
    pub location: Location,
    /// Declared style, `None` for the location default.
    pub style: Option<Style>,
    /// Declared explode flag, `None` for `false`.
    pub explode: Option<bool>,
    /// Whether the value must be present. Path parameters are always required.
    pub required: bool,
    /// Documentation text.
    pub description: Option<String>,
    /// Documentation flag.
    pub deprecated: bool,
    /// Documentation flag.
    pub allow_empty_value: bool,
    /// Documentation flag.
    pub allow_reserved: bool,
}

impl ParamSpec {
    /// Starts a spec for `name` in `location`.
    pub fn new(name: impl Into<String>, location: Location) -> Self {
        Self {
            name: name.into(),
            location,
            style: None,
            explode: None,
            required: false,
            description: None,
            deprecated: false,
            allow_empty_value: false,
            allow_reserved: false,
        }
    }

    /// Shorthand for a path parameter.
    pub fn path(name: impl Into<String>) -> Self {
        Self::new(name, Location::Path)
    }

    /// Shorthand for a query parameter.
    pub fn query(name: impl Into<String>) -> Self {
        Self::new(name, Location::Query)
    }

    /// Shorthand for a header parameter.
    pub fn header(name: impl Into<String>) -> Self {
        Self::new(name, Location::Header)
    }

    /// Shorthand for a cookie parameter.
    pub fn cookie(name: impl Into<String>) -> Self {
        Self::new(name, Location::Cookie)
    }

    /// Sets the style.
    pub fn style(mut self, style: Style) -> Self {
        self.style = Some(style);
        self
    }

    /// Sets the explode flag.
    pub fn explode(mut self, explode: bool) -> Self {
        self.explode = Some(explode);
        self
    }

    /// Marks the parameter required.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Sets the description.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Marks the parameter deprecated.
    pub fn deprecated(mut self) -> Self {
        self.deprecated = true;
        self
    }

    /// Sets `allowEmptyValue`.
    pub fn allow_empty_value(mut self) -> Self {
        self.allow_empty_value = true;
        self
    }

    /// Sets `allowReserved`.
    pub fn allow_reserved(mut self) -> Self {
        self.allow_reserved = true;
        self
    }
}

fn parse_flag(key: &str, value: Option<&str>) -> ParamResult<bool> {
    match value {
        None | Some("true") => Ok(true),
        Some("false") => Ok(false),
        Some(other) => Err(ParamError::configuration(format!(
            "invalid value for '{}': {}",
            key, other
        ))),
    }
}

/// Parses the tag grammar `name,in=query,style=form,explode,required`.
impl FromStr for ParamSpec {
    type Err = ParamError;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        let mut name: Option<&str> = None;
        let mut location: Option<Location> = None;
        let mut style: Option<Style> = None;
        let mut explode: Option<bool> = None;
        let mut required = false;
        let mut description: Option<String> = None;
        let mut deprecated = false;
        let mut allow_empty_value = false;
        let mut allow_reserved = false;

        for token in tag.split(',').map(str::trim) {
            if token.is_empty() {
                continue;
            }
            let (key, value) = match token.split_once('=') {
                Some((k, v)) => (k.trim(), Some(v.trim())),
                None => (token, None),
            };
            if value.is_none() && name.is_none() && !is_tag_key(key) {
                name = Some(key);
                continue;
            }
            match key {
                "in" => {
                    let v = value.ok_or_else(|| {
                        ParamError::configuration("'in' requires a value")
                    })?;
                    location = Some(v.parse()?);
                }
                "style" => {
                    let v = value.ok_or_else(|| {
                        ParamError::configuration("'style' requires a value")
                    })?;
                    style = Some(v.parse()?);
                }
                "explode" => explode = Some(parse_flag(key, value)?),
                "required" => required = parse_flag(key, value)?,
                "description" => description = value.map(str::to_string),
                "deprecated" => deprecated = parse_flag(key, value)?,
                "allowEmptyValue" => allow_empty_value = parse_flag(key, value)?,
                "allowReserved" => allow_reserved = parse_flag(key, value)?,
                other => {
                    return Err(ParamError::configuration(format!(
                        "unknown param tag key: {}",
                        other
                    )))
                }
            }
        }

        let name = name
            .filter(|n| !n.is_empty())
            .ok_or_else(|| ParamError::configuration(format!("missing param name in tag '{}'", tag)))?;
        let location = location.ok_or_else(|| {
            ParamError::configuration(format!("missing 'in' for param '{}'", name))
        })?;
        Ok(ParamSpec {
            name: name.to_string(),
            location,
            style,
            explode,
            required,
            description,
            deprecated,
            allow_empty_value,
            allow_reserved,
        })
    }
}

fn is_tag_key(key: &str) -> bool {
    matches!(
        key,
        "in" | "style"
            | "explode"
            | "required"
            | "description"
            | "deprecated"
            | "allowEmptyValue"
            | "allowReserved"
    )
}

/// One scalar property of an object-shaped parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyDescriptor {
    /// Sub-key inside the object.
    pub name: String,
    /// Key used when the property travels on its own (`name[prop]` for deepObject).
    pub key: String,
    /// Scalar kind.
    pub kind: ScalarKind,
    /// Whether the property is optional.
    pub nullable: bool,
}

/// The resolved encoding rules for one parameter field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamDescriptor {
    /// Wire name.
    pub name: String,
    /// Carrier location.
    #[serde(rename = "in")]
    pub location: Location,
    /// Resolved style, always legal for `location`.
    pub style: Style,
    /// Effective explode flag.
    pub explode: bool,
    /// Whether absence is an error.
    pub required: bool,
    /// Value shape.
    pub shape: Shape,
    /// Prefix and delimiters from the style table.
    pub rules: StyleRules,
    /// Object properties in declaration order, empty for other shapes.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub properties: Vec<PropertyDescriptor>,
    /// The field is an `Option`.
    pub nullable: bool,
    /// Documentation text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Documentation flag.
    #[serde(default)]
    pub deprecated: bool,
    /// Documentation flag.
    #[serde(default)]
    pub allow_empty_value: bool,
    /// Documentation flag.
    #[serde(default)]
    pub allow_reserved: bool,
}

impl ParamDescriptor {
    /// Validates `spec` against a value shape and derives the style rules.
    pub fn resolve(
        spec: &ParamSpec,
        shape: Shape,
        nullable: bool,
        properties: &[PropertySpec],
    ) -> ParamResult<Self> {
        let name = spec.name.as_str();
        if name.is_empty() {
            return Err(ParamError::configuration("parameter name cannot be empty"));
        }
        match spec.location {
            Location::Header => {
                HeaderName::from_bytes(name.as_bytes()).map_err(|_| {
                    ParamError::configuration(format!("invalid header name '{}'", name))
                })?;
            }
            Location::Cookie => {
                if name
                    .chars()
                    .any(|c| c.is_whitespace() || c.is_control() || "=;,\"".contains(c))
                {
                    return Err(ParamError::configuration(format!(
                        "invalid cookie name '{}'",
                        name
                    )));
                }
            }
            Location::Path | Location::Query => {}
        }

        let style = style::resolve_style(spec.location, spec.style, name)?;
        let explode = style::effective_explode(style, spec.explode.unwrap_or(false));
        let rules = style::resolve(spec.location, style, explode, shape, name)?;

        let properties = if shape == Shape::Object {
            if properties.is_empty() {
                return Err(ParamError::configuration(format!(
                    "object parameter '{}' declares no properties",
                    name
                )));
            }
            properties
                .iter()
                .map(|p| PropertyDescriptor {
                    name: p.name.clone(),
                    key: if style == Style::DeepObject {
                        format!("{}[{}]", name, p.name)
                    } else {
                        p.name.clone()
                    },
                    kind: p.kind,
                    nullable: p.nullable,
                })
                .collect()
        } else {
            Vec::new()
        };

        Ok(Self {
            name: name.to_string(),
            location: spec.location,
            style,
            explode,
            required: spec.required || spec.location == Location::Path,
            shape,
            rules,
            properties,
            nullable,
            description: spec.description.clone(),
            deprecated: spec.deprecated,
            allow_empty_value: spec.allow_empty_value,
            allow_reserved: spec.allow_reserved,
        })
    }

    /// Rules with the `name=` prefix cleared, for carriers keyed by name.
    pub fn keyed_rules(&self) -> StyleRules {
        self.rules.keyed()
    }
}
