//! Error types for record decoding.

use thiserror::Error;

use crate::schema::ColumnKey;

/// Boxed error returned by row sources and caller-supplied converters.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors raised while constructing a [`Decoder`](crate::Decoder).
#[derive(Debug, Error)]
pub enum ConstructionError {
    /// Header mode is enabled but the source ended before the first row.
    #[error("header row missing: row source is empty")]
    MissingHeader,

    /// The row source failed while reading the header row.
    #[error("failed to read header row: {source}")]
    HeaderRead {
        #[source]
        source: BoxError,
    },
}

/// Errors raised by a single decode call.
///
/// None of these poison the decoder: the next call reads the next row.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The target is absent or its schema does not describe a record.
    #[error("invalid decode target: {reason}")]
    InvalidTarget { reason: String },

    /// The raw value cannot be parsed as, or assigned to, the field's type.
    #[error("cannot parse {value:?} into {type_name} for field `{field}` (column {column}): {reason}")]
    TypeMismatch {
        field: &'static str,
        column: ColumnKey,
        type_name: &'static str,
        value: String,
        reason: String,
    },

    /// The field's type has no built-in rule and no converter was registered.
    #[error("unsupported type {type_name} for field `{field}` (column {column}): no converter registered")]
    UnsupportedType {
        field: &'static str,
        column: ColumnKey,
        type_name: &'static str,
    },

    /// A caller-supplied converter returned an error.
    #[error("converter for field `{field}` (column {column}) failed: {source}")]
    ConverterFailure {
        field: &'static str,
        column: ColumnKey,
        #[source]
        source: BoxError,
    },

    /// The row source failed to produce the next row.
    #[error("failed to read row {row}: {source}")]
    Read {
        row: u64,
        #[source]
        source: BoxError,
    },
}

/// Fieldless discriminant of [`DecodeError`], convenient for matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DecodeErrorKind {
    InvalidTarget,
    TypeMismatch,
    UnsupportedType,
    ConverterFailure,
    Read,
}

impl DecodeError {
    /// Returns the kind of this error.
    pub fn kind(&self) -> DecodeErrorKind {
        match self {
            Self::InvalidTarget { .. } => DecodeErrorKind::InvalidTarget,
            Self::TypeMismatch { .. } => DecodeErrorKind::TypeMismatch,
            Self::UnsupportedType { .. } => DecodeErrorKind::UnsupportedType,
            Self::ConverterFailure { .. } => DecodeErrorKind::ConverterFailure,
            Self::Read { .. } => DecodeErrorKind::Read,
        }
    }

    /// Returns the name of the field the error refers to, if any.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            Self::TypeMismatch { field, .. }
            | Self::UnsupportedType { field, .. }
            | Self::ConverterFailure { field, .. } => Some(*field),
            Self::InvalidTarget { .. } | Self::Read { .. } => None,
        }
    }

    /// Returns the column identity the error refers to, if any.
    pub fn column(&self) -> Option<&ColumnKey> {
        match self {
            Self::TypeMismatch { column, .. }
            | Self::UnsupportedType { column, .. }
            | Self::ConverterFailure { column, .. } => Some(column),
            Self::InvalidTarget { .. } | Self::Read { .. } => None,
        }
    }

    pub(crate) fn invalid_target(reason: impl Into<String>) -> Self {
        Self::InvalidTarget {
            reason: reason.into(),
        }
    }
}
