//! # Primitive Codec
//!
//! Scalar string <-> value conversion shared by every style.

use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind tag for a scalar value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScalarKind {
    /// `bool`
    #[display("bool")]
    Bool,
    /// `i8`
    #[display("i8")]
    I8,
    /// `i16`
    #[display("i16")]
    I16,
    /// `i32`
    #[display("i32")]
    I32,
    /// `i64`
    #[display("i64")]
    I64,
    /// `u8`
    #[display("u8")]
    U8,
    /// `u16`
    #[display("u16")]
    U16,
    /// `u32`
    #[display("u32")]
    U32,
    /// `u64`
    #[display("u64")]
    U64,
    /// `f32`
    #[display("f32")]
    F32,
    /// `f64`
    #[display("f64")]
    F64,
    /// `Complex<f32>`
    #[display("complex64")]
    Complex64,
    /// `Complex<f64>`
    #[display("complex128")]
    Complex128,
    /// `String`
    #[display("string")]
    String,
}

impl FromStr for ScalarKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let kind = match s.to_ascii_lowercase().as_str() {
            "bool" | "boolean" => ScalarKind::Bool,
            "i8" => ScalarKind::I8,
            "i16" => ScalarKind::I16,
            "i32" | "int" | "integer" => ScalarKind::I32,
            "i64" => ScalarKind::I64,
            "u8" => ScalarKind::U8,
            "u16" => ScalarKind::U16,
            "u32" => ScalarKind::U32,
            "u64" => ScalarKind::U64,
            "f32" => ScalarKind::F32,
            "f64" | "number" => ScalarKind::F64,
            "complex64" => ScalarKind::Complex64,
            "complex128" => ScalarKind::Complex128,
            "string" | "str" => ScalarKind::String,
            other => return Err(format!("unknown scalar kind: {}", other)),
        };
        Ok(kind)
    }
}

/// A complex number with `re` and `im` parts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Complex<F> {
    /// Real part.
    pub re: F,
    /// Imaginary part.
    pub im: F,
}

impl<F> Complex<F> {
    /// Creates a complex number.
    pub fn new(re: F, im: F) -> Self {
        Self { re, im }
    }
}

impl<F: fmt::Display> fmt::Display for Complex<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let im = self.im.to_string();
        if im.starts_with('-') || im.starts_with('+') {
            write!(f, "({}{}i)", self.re, im)
        } else {
            write!(f, "({}+{}i)", self.re, im)
        }
    }
}

impl<F: FromStr + Default + Copy + std::ops::Neg<Output = F> + From<u8>> FromStr for Complex<F> {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let body = match s.strip_prefix('(') {
            Some(inner) => inner.strip_suffix(')').ok_or(())?,
            None => s,
        };
        if body.is_empty() {
            return Err(());
        }
        let Some(imaginary) = body.strip_suffix('i') else {
            let re = body.parse::<F>().map_err(|_| ())?;
            return Ok(Self::new(re, F::default()));
        };

        // Split at the last sign that is not the leading sign or part of an exponent.
        let bytes = imaginary.as_bytes();
        let split = (1..bytes.len()).rev().find(|&i| {
            (bytes[i] == b'+' || bytes[i] == b'-') && !matches!(bytes[i - 1], b'e' | b'E')
        });
        let (re, im) = match split {
            Some(i) => (
                imaginary[..i].parse::<F>().map_err(|_| ())?,
                parse_imaginary::<F>(&imaginary[i..])?,
            ),
            None => (F::default(), parse_imaginary::<F>(imaginary)?),
        };
        Ok(Self::new(re, im))
    }
}

fn parse_imaginary<F: FromStr + Copy + std::ops::Neg<Output = F> + From<u8>>(
    s: &str,
) -> Result<F, ()> {
    match s {
        "" | "+" => Ok(F::from(1)),
        "-" => Ok(-F::from(1)),
        other => other.parse::<F>().map_err(|_| ()),
    }
}

/// A dynamically typed scalar.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Scalar {
    /// `bool`
    Bool(bool),
    /// `i8`
    I8(i8),
    /// `i16`
    I16(i16),
    /// `i32`
    I32(i32),
    /// `i64`
    I64(i64),
    /// `u8`
    U8(u8),
    /// `u16`
    U16(u16),
    /// `u32`
    U32(u32),
    /// `u64`
    U64(u64),
    /// `f32`
    F32(f32),
    /// `f64`
    F64(f64),
    /// `Complex<f32>`
    C64(Complex<f32>),
    /// `Complex<f64>`
    C128(Complex<f64>),
    /// `String`
    Str(String),
}

impl Scalar {
    /// Kind tag of this value.
    pub fn kind(&self) -> ScalarKind {
        match self {
            Scalar::Bool(_) => ScalarKind::Bool,
            Scalar::I8(_) => ScalarKind::I8,
            Scalar::I16(_) => ScalarKind::I16,
            Scalar::I32(_) => ScalarKind::I32,
            Scalar::I64(_) => ScalarKind::I64,
            Scalar::U8(_) => ScalarKind::U8,
            Scalar::U16(_) => ScalarKind::U16,
            Scalar::U32(_) => ScalarKind::U32,
            Scalar::U64(_) => ScalarKind::U64,
            Scalar::F32(_) => ScalarKind::F32,
            Scalar::F64(_) => ScalarKind::F64,
            Scalar::C64(_) => ScalarKind::Complex64,
            Scalar::C128(_) => ScalarKind::Complex128,
            Scalar::Str(_) => ScalarKind::String,
        }
    }
}

/// A raw value that does not parse as the requested kind.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
#[display("invalid {kind} value: {raw:?}")]
pub struct ScalarError {
    /// Requested kind.
    pub kind: ScalarKind,
    /// Offending input.
    pub raw: String,
}

impl std::error::Error for ScalarError {}

/// Parses `raw` as a scalar of `kind`.
pub fn decode_scalar(raw: &str, kind: ScalarKind) -> Result<Scalar, ScalarError> {
    let fail = || ScalarError {
        kind,
        raw: raw.to_string(),
    };
    let scalar = match kind {
        ScalarKind::Bool => match raw {
            "true" => Scalar::Bool(true),
            "false" => Scalar::Bool(false),
            _ => return Err(fail()),
        },
        ScalarKind::I8 => Scalar::I8(raw.parse().map_err(|_| fail())?),
        ScalarKind::I16 => Scalar::I16(raw.parse().map_err(|_| fail())?),
        ScalarKind::I32 => Scalar::I32(raw.parse().map_err(|_| fail())?),
        ScalarKind::I64 => Scalar::I64(raw.parse().map_err(|_| fail())?),
        ScalarKind::U8 => Scalar::U8(raw.parse().map_err(|_| fail())?),
        ScalarKind::U16 => Scalar::U16(raw.parse().map_err(|_| fail())?),
        ScalarKind::U32 => Scalar::U32(raw.parse().map_err(|_| fail())?),
        ScalarKind::U64 => Scalar::U64(raw.parse().map_err(|_| fail())?),
        ScalarKind::F32 => Scalar::F32(raw.parse().map_err(|_| fail())?),
        ScalarKind::F64 => Scalar::F64(raw.parse().map_err(|_| fail())?),
        ScalarKind::Complex64 => Scalar::C64(raw.parse().map_err(|_| fail())?),
        ScalarKind::Complex128 => Scalar::C128(raw.parse().map_err(|_| fail())?),
        ScalarKind::String => Scalar::Str(raw.to_string()),
    };
    Ok(scalar)
}

/// Canonical text form of a scalar.
pub fn encode_scalar(scalar: &Scalar) -> String {
    match scalar {
        Scalar::Bool(v) => v.to_string(),
        Scalar::I8(v) => v.to_string(),
        Scalar::I16(v) => v.to_string(),
        Scalar::I32(v) => v.to_string(),
        Scalar::I64(v) => v.to_string(),
        Scalar::U8(v) => v.to_string(),
        Scalar::U16(v) => v.to_string(),
        Scalar::U32(v) => v.to_string(),
        Scalar::U64(v) => v.to_string(),
        Scalar::F32(v) => v.to_string(),
        Scalar::F64(v) => v.to_string(),
        Scalar::C64(v) => v.to_string(),
        Scalar::C128(v) => v.to_string(),
        Scalar::Str(v) => v.clone(),
    }
}

/// A Rust type that maps onto exactly one scalar kind.
///
/// Property values and slice elements are restricted to this trait, which
/// keeps parameter objects one level deep.
pub trait Primitive: Sized + Default + Clone + Send + Sync + 'static {
    /// The scalar kind this type decodes from.
    const KIND: ScalarKind;

    /// Converts into the dynamic scalar.
    fn to_scalar(&self) -> Scalar;

    /// Converts from a dynamic scalar of kind `KIND`.
    fn from_scalar(scalar: Scalar) -> Option<Self>;
}

macro_rules! impl_primitive {
    ($($ty:ty => $kind:ident / $variant:ident),* $(,)?) => {
        $(
            impl Primitive for $ty {
                const KIND: ScalarKind = ScalarKind::$kind;

                fn to_scalar(&self) -> Scalar {
                    Scalar::$variant(self.clone())
                }

                fn from_scalar(scalar: Scalar) -> Option<Self> {
                    match scalar {
                        Scalar::$variant(v) => Some(v),
                        _ => None,
                    }
                }
            }
        )*
    };
}

impl_primitive! {
    bool => Bool / Bool,
    i8 => I8 / I8,
    i16 => I16 / I16,
    i32 => I32 / I32,
    i64 => I64 / I64,
    u8 => U8 / U8,
    u16 => U16 / U16,
    u32 => U32 / U32,
    u64 => U64 / U64,
    f32 => F32 / F32,
    f64 => F64 / F64,
    Complex<f32> => Complex64 / C64,
    Complex<f64> => Complex128 / C128,
    String => String / Str,
}
