#![deny(missing_docs)]

//! # Style Table
//!
//! Locations, serialization styles, and the pure lookup that turns a
//! (location, style, explode, shape) combination into the prefix and
//! delimiters used by the slice and object codecs.

use crate::error::{ParamError, ParamResult};
use crate::primitive::ScalarKind;
use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Where a parameter lives in the HTTP message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Location {
    /// A templated path segment.
    #[display("path")]
    Path,
    /// A query string key.
    #[display("query")]
    Query,
    /// A header line.
    #[display("header")]
    Header,
    /// A cookie.
    #[display("cookie")]
    Cookie,
}

impl Location {
    /// Style used when a field does not declare one.
    pub fn default_style(self) -> Style {
        match self {
            Location::Path | Location::Header => Style::Simple,
            Location::Query | Location::Cookie => Style::Form,
        }
    }

    /// Styles OpenAPI permits for this location.
    pub fn allowed_styles(self) -> &'static [Style] {
        match self {
            Location::Path => &[Style::Simple, Style::Label, Style::Matrix],
            Location::Query => &[
                Style::Form,
                Style::SpaceDelimited,
                Style::PipeDelimited,
                Style::DeepObject,
            ],
            Location::Header => &[Style::Simple],
            Location::Cookie => &[Style::Form],
        }
    }

    /// Whether `style` is legal here.
    pub fn allows(self, style: Style) -> bool {
        self.allowed_styles().contains(&style)
    }

    /// Whether values for this location can be written into a response.
    pub fn is_encodable(self) -> bool {
        matches!(self, Location::Header | Location::Cookie)
    }
}

impl FromStr for Location {
    type Err = ParamError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "path" => Ok(Location::Path),
            "query" => Ok(Location::Query),
            "header" => Ok(Location::Header),
            "cookie" => Ok(Location::Cookie),
            other => Err(ParamError::configuration(format!(
                "invalid param 'in': {}",
                other
            ))),
        }
    }
}

/// OpenAPI parameter serialization style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Style {
    /// `simple`
    #[display("simple")]
    Simple,
    /// `label`
    #[display("label")]
    Label,
    /// `matrix`
    #[display("matrix")]
    Matrix,
    /// `form`
    #[display("form")]
    Form,
    /// `spaceDelimited`
    #[display("spaceDelimited")]
    SpaceDelimited,
    /// `pipeDelimited`
    #[display("pipeDelimited")]
    PipeDelimited,
    /// `deepObject`
    #[display("deepObject")]
    DeepObject,
}

impl FromStr for Style {
    type Err = ParamError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "simple" => Ok(Style::Simple),
            "label" => Ok(Style::Label),
            "matrix" => Ok(Style::Matrix),
            "form" => Ok(Style::Form),
            "spacedelimited" => Ok(Style::SpaceDelimited),
            "pipedelimited" => Ok(Style::PipeDelimited),
            "deepobject" => Ok(Style::DeepObject),
            other => Err(ParamError::configuration(format!(
                "unknown param style: {}",
                other
            ))),
        }
    }
}

/// Structural kind of a parameter value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "type", content = "kind")]
pub enum Shape {
    /// A single scalar.
    Primitive(ScalarKind),
    /// An ordered sequence of scalars.
    Slice(ScalarKind),
    /// One level of named scalar properties.
    Object,
    /// A user-supplied codec.
    Custom,
}

impl Shape {
    /// Human readable shape name used in error messages.
    pub fn name(&self) -> &'static str {
        match self {
            Shape::Primitive(_) => "primitive",
            Shape::Slice(_) => "slice",
            Shape::Object => "object",
            Shape::Custom => "custom",
        }
    }
}

/// Prefix and delimiters derived from the style table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyleRules {
    /// Emitted once before the value.
    pub prefix: String,
    /// Separates slice elements or object properties.
    pub delimiter: String,
    /// Separates a property name from its value (objects only).
    pub value_delimiter: String,
}

impl StyleRules {
    fn new(prefix: impl Into<String>, delimiter: impl Into<String>, value_delimiter: &str) -> Self {
        Self {
            prefix: prefix.into(),
            delimiter: delimiter.into(),
            value_delimiter: value_delimiter.to_string(),
        }
    }

    /// Rules for a carrier that has already consumed the `name=` key
    /// (query multimaps and cookie jars).
    pub fn keyed(&self) -> StyleRules {
        StyleRules {
            prefix: String::new(),
            ..self.clone()
        }
    }
}

/// Resolves the style for a field, applying the location default when none was declared.
///
/// Headers and cookies have a single legal style, which replaces whatever was
/// declared. On path and query an illegal declared style is rejected.
pub fn resolve_style(location: Location, declared: Option<Style>, name: &str) -> ParamResult<Style> {
    let Some(style) = declared else {
        return Ok(location.default_style());
    };
    if matches!(location, Location::Header | Location::Cookie) {
        let forced = location.default_style();
        if style != forced {
            tracing::debug!(name, %location, declared = %style, %forced, "style forced");
        }
        return Ok(forced);
    }
    if !location.allows(style) {
        let allowed: Vec<String> = location
            .allowed_styles()
            .iter()
            .map(|s| s.to_string())
            .collect();
        return Err(ParamError::configuration(format!(
            "Parameter '{}' uses style '{}' which is not allowed for {}. Allowed styles: {}",
            name,
            style,
            location,
            allowed.join(", ")
        )));
    }
    Ok(style)
}

/// `deepObject` is always exploded; every other style keeps the declared flag.
pub fn effective_explode(style: Style, declared: bool) -> bool {
    declared || style == Style::DeepObject
}

/// Looks up the prefix and delimiters for one combination.
///
/// Unsupported (style, shape) pairs are configuration errors.
pub fn resolve(
    location: Location,
    style: Style,
    explode: bool,
    shape: Shape,
    name: &str,
) -> ParamResult<StyleRules> {
    if !location.allows(style) {
        return Err(ParamError::configuration(format!(
            "Parameter '{}' uses style '{}' which is not allowed for {}",
            name, style, location
        )));
    }
    let explode = effective_explode(style, explode);
    let shape = match shape {
        Shape::Custom => match style {
            Style::SpaceDelimited | Style::PipeDelimited => Shape::Slice(ScalarKind::String),
            Style::DeepObject => Shape::Object,
            _ => Shape::Primitive(ScalarKind::String),
        },
        other => other,
    };

    let rules = match (style, shape) {
        (Style::Simple, Shape::Primitive(_)) | (Style::Simple, Shape::Slice(_)) => {
            StyleRules::new("", ",", "")
        }
        (Style::Simple, Shape::Object) => {
            StyleRules::new("", ",", if explode { "=" } else { "," })
        }

        (Style::Label, Shape::Primitive(_)) => StyleRules::new(".", "", ""),
        (Style::Label, Shape::Slice(_)) => {
            StyleRules::new(".", if explode { "." } else { "," }, "")
        }
        (Style::Label, Shape::Object) => {
            if explode {
                StyleRules::new(".", ".", "=")
            } else {
                StyleRules::new(".", ",", ",")
            }
        }

        (Style::Matrix, Shape::Primitive(_)) => StyleRules::new(format!(";{}=", name), "", ""),
        (Style::Matrix, Shape::Slice(_)) => {
            let delimiter = if explode {
                format!(";{}=", name)
            } else {
                ",".to_string()
            };
            StyleRules::new(format!(";{}=", name), delimiter, "")
        }
        (Style::Matrix, Shape::Object) => {
            if explode {
                StyleRules::new(";", ";", "=")
            } else {
                StyleRules::new(format!(";{}=", name), ",", ",")
            }
        }

        (Style::Form, Shape::Primitive(_)) => StyleRules::default(),
        (Style::Form, Shape::Slice(_)) => {
            let delimiter = if explode {
                format!("&{}=", name)
            } else {
                ",".to_string()
            };
            StyleRules::new(format!("{}=", name), delimiter, "")
        }
        (Style::Form, Shape::Object) => {
            if explode {
                StyleRules::new("", "&", "=")
            } else {
                StyleRules::new("", ",", ",")
            }
        }

        (Style::SpaceDelimited, Shape::Slice(_)) | (Style::PipeDelimited, Shape::Slice(_)) => {
            let delimiter = if explode {
                format!("&{}=", name)
            } else if style == Style::SpaceDelimited {
                " ".to_string()
            } else {
                "|".to_string()
            };
            StyleRules::new(format!("{}=", name), delimiter, "")
        }

        (Style::DeepObject, Shape::Object) => StyleRules::new("", "&", "="),

        (style, shape) => {
            return Err(ParamError::configuration(format!(
                "Parameter '{}' uses style '{}' which does not support {} values",
                name,
                style,
                shape.name()
            )))
        }
    };
    Ok(rules)
}
