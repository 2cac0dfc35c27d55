//! Typed values produced by coercion and assigned to record fields.

use std::any::Any;
use std::fmt;

use chrono::NaiveDateTime;
use thiserror::Error;

/// A coerced field value.
pub enum Value {
    /// A null literal on a nullable field.
    Null,
    Integer(i64),
    String(String),
    Boolean(bool),
    Timestamp(NaiveDateTime),
    /// A value of a type without a built-in rule, produced by a converter.
    Other(Box<dyn Any + Send>),
}

impl Value {
    /// Wraps an arbitrary value, typically from a converter.
    pub fn other<T: Any + Send>(value: T) -> Self {
        Self::Other(Box::new(value))
    }

    /// Returns the name of the variant, used in mismatch errors.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Integer(_) => "integer",
            Self::String(_) => "string",
            Self::Boolean(_) => "boolean",
            Self::Timestamp(_) => "timestamp",
            Self::Other(_) => "other",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("Null"),
            Self::Integer(v) => f.debug_tuple("Integer").field(v).finish(),
            Self::String(v) => f.debug_tuple("String").field(v).finish(),
            Self::Boolean(v) => f.debug_tuple("Boolean").field(v).finish(),
            Self::Timestamp(v) => f.debug_tuple("Timestamp").field(v).finish(),
            Self::Other(_) => f.write_str("Other(..)"),
        }
    }
}

impl PartialEq for Value {
    /// `Other` values are opaque and never compare equal.
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Integer(a), Self::Integer(b)) => a == b,
            (Self::String(a), Self::String(b)) => a == b,
            (Self::Boolean(a), Self::Boolean(b)) => a == b,
            (Self::Timestamp(a), Self::Timestamp(b)) => a == b,
            _ => false,
        }
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(value: NaiveDateTime) -> Self {
        Self::Timestamp(value)
    }
}

/// Errors raised when a [`Value`] cannot be stored in a field.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValueError {
    /// The value variant does not fit the field type.
    #[error("expected {expected} value, found {found}")]
    Mismatch {
        expected: &'static str,
        found: &'static str,
    },

    /// The integer does not fit the field's integer width.
    #[error("integer {value} out of range for {target}")]
    OutOfRange { value: i64, target: &'static str },

    /// The record has no field with this handle.
    #[error("record has no field with handle {0}")]
    UnknownField(usize),
}

/// Conversion from a [`Value`] into a field type with a built-in rule.
///
/// `Other` values holding exactly `Self` are accepted too, so a converter may
/// return either the matching variant or the boxed field value.
pub trait FromValue: Sized {
    fn from_value(value: Value) -> Result<Self, ValueError>;
}

fn mismatch(expected: &'static str, value: &Value) -> ValueError {
    ValueError::Mismatch {
        expected,
        found: value.kind_name(),
    }
}

fn downcast_boxed<T: Any>(expected: &'static str, value: Value) -> Result<T, ValueError> {
    match value {
        Value::Other(boxed) => boxed
            .downcast::<T>()
            .map(|boxed| *boxed)
            .map_err(|_| ValueError::Mismatch {
                expected,
                found: "other",
            }),
        other => Err(mismatch(expected, &other)),
    }
}

macro_rules! impl_from_value_int {
    ($($ty:ty),* $(,)?) => {
        $(
            impl FromValue for $ty {
                fn from_value(value: Value) -> Result<Self, ValueError> {
                    match value {
                        Value::Integer(n) => <$ty>::try_from(n).map_err(|_| ValueError::OutOfRange {
                            value: n,
                            target: stringify!($ty),
                        }),
                        other => downcast_boxed::<$ty>("integer", other),
                    }
                }
            }
        )*
    };
}

impl_from_value_int!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl FromValue for String {
    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::String(s) => Ok(s),
            other => downcast_boxed::<String>("string", other),
        }
    }
}

impl FromValue for bool {
    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Boolean(b) => Ok(b),
            other => downcast_boxed::<bool>("boolean", other),
        }
    }
}

impl FromValue for NaiveDateTime {
    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Timestamp(ts) => Ok(ts),
            other => downcast_boxed::<NaiveDateTime>("timestamp", other),
        }
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

/// Extracts a converter-produced value for a field without a built-in rule.
pub fn from_other<T: Any>(value: Value) -> Result<T, ValueError> {
    downcast_boxed::<T>(std::any::type_name::<T>(), value)
}

/// Like [`from_other`], mapping [`Value::Null`] to `None`.
pub fn from_optional_other<T: Any>(value: Value) -> Result<Option<T>, ValueError> {
    match value {
        Value::Null => Ok(None),
        other => from_other::<T>(other).map(Some),
    }
}
