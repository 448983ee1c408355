//! # Error Handling
//!
//! Provides the unified `ParamError` enum used by every codec and adapter.

use crate::primitive::ScalarError;
use crate::style::Location;
use derive_more::{Display, From};
use http::StatusCode;

/// The parameter codec error enum.
///
/// `Configuration` is a programming defect raised while a type is registered.
/// The remaining variants are client-facing and abort the binding of a single request.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum ParamError {
    /// Malformed or contradictory field metadata.
    #[display("Configuration Error: {_0}")]
    Configuration(String),

    /// A required value was absent from the request.
    #[display("missing required {location} parameter {name}")]
    Required {
        /// Where the parameter was expected.
        location: Location,
        /// Wire name of the parameter.
        name: String,
    },

    /// A value was present but could not be decoded under the resolved style.
    #[display("{location} parameter {name} was improperly formatted: {value}")]
    Invalid {
        /// Where the parameter was read from.
        location: Location,
        /// Wire name of the parameter.
        name: String,
        /// The offending raw value.
        value: String,
    },

    /// A custom marshaler rejected the value.
    #[display("{location} parameter {name} was rejected: {message}")]
    Custom {
        /// Where the parameter was read from.
        location: Location,
        /// Wire name of the parameter.
        name: String,
        /// Message supplied by the custom marshaler.
        message: String,
    },
}

impl ParamError {
    /// Builds a `Required` error.
    pub fn required(location: Location, name: impl Into<String>) -> Self {
        Self::Required {
            location,
            name: name.into(),
        }
    }

    /// Builds an `Invalid` error.
    pub fn invalid(location: Location, name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Invalid {
            location,
            name: name.into(),
            value: value.into(),
        }
    }

    /// Builds a `Custom` error.
    pub fn custom(location: Location, name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Custom {
            location,
            name: name.into(),
            message: message.into(),
        }
    }

    /// Builds a `Configuration` error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Whether the error was caused by the request rather than by the program.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, Self::Configuration(_))
    }

    /// HTTP status the owning server should answer with.
    pub fn status_code(&self) -> StatusCode {
        if self.is_client_error() {
            StatusCode::UNPROCESSABLE_ENTITY
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

/// Manual implementation of the standard Error trait.
impl std::error::Error for ParamError {}

/// Helper type alias for Result using ParamError.
pub type ParamResult<T> = Result<T, ParamError>;

/// Failure inside the slice or object codec.
///
/// Adapters turn every variant into [`ParamError::Invalid`] carrying the raw value.
#[derive(Debug, Clone, PartialEq, Eq, Display, From)]
pub enum CodecError {
    /// The raw value did not start with the style prefix.
    #[display("value does not start with {_0:?}")]
    PrefixMismatch(String),

    /// Property tokens did not form name/value pairs.
    #[display("malformed name/value pairs")]
    MalformedPairs,

    /// An element or property value failed scalar decoding.
    #[display("{_0}")]
    #[from]
    Scalar(ScalarError),
}

impl std::error::Error for CodecError {}

impl CodecError {
    /// Converts into the client-facing error for one parameter.
    pub fn into_param(self, location: Location, name: &str, raw: &str) -> ParamError {
        tracing::debug!(%location, name, raw, error = %self, "rejecting parameter value");
        ParamError::invalid(location, name, raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_required_display() {
        let err = ParamError::required(Location::Query, "limit");
        assert_eq!(format!("{}", err), "missing required query parameter limit");
        assert_eq!(err.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn test_invalid_display_carries_value() {
        let err = ParamError::invalid(Location::Header, "x-flag", "notabool");
        assert_eq!(
            format!("{}", err),
            "header parameter x-flag was improperly formatted: notabool"
        );
        assert!(err.is_client_error());
    }

    #[test]
    fn test_configuration_is_server_error() {
        let err = ParamError::configuration("duplicate parameter 'id' in path");
        assert!(!err.is_client_error());
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            format!("{}", err),
            "Configuration Error: duplicate parameter 'id' in path"
        );
    }
}
