//! Decoder configuration.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::convert::{Converter, Converters};
use crate::schema::{ColumnKey, SemanticType};

/// Default timestamp layout (strftime syntax).
pub const DEFAULT_TIME_LAYOUT: &str = "%Y-%m-%d %H:%M:%S";

/// Raw values decoded as `true` unless configured otherwise.
pub const DEFAULT_BOOLEAN_LITERALS: [&str; 2] = ["1", "true"];

/// Raw values decoded as null on nullable fields unless configured otherwise.
pub const DEFAULT_NULL_LITERALS: [&str; 2] = ["null", "NULL"];

/// Configuration fixed at decoder construction.
///
/// Converters are code, not data, so they are skipped by serde; a config
/// loaded from a file starts with no converters registered.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DecoderConfig {
    /// Read the first row as the header and match columns by name.
    pub header_mode: bool,

    /// strftime layout for timestamp fields.
    pub time_layout: String,

    /// Raw values decoded as `true`; anything else is `false`.
    pub boolean_literals: BTreeSet<String>,

    /// Raw values decoded as null on nullable fields.
    pub null_literals: BTreeSet<String>,

    #[serde(skip)]
    pub converters: Converters,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            header_mode: true,
            time_layout: DEFAULT_TIME_LAYOUT.to_string(),
            boolean_literals: DEFAULT_BOOLEAN_LITERALS.iter().map(|s| (*s).to_string()).collect(),
            null_literals: DEFAULT_NULL_LITERALS.iter().map(|s| (*s).to_string()).collect(),
            converters: Converters::default(),
        }
    }
}

impl DecoderConfig {
    /// Enable or disable header mode.
    #[must_use]
    pub fn with_header_mode(mut self, enabled: bool) -> Self {
        self.header_mode = enabled;
        self
    }

    /// Set the timestamp layout.
    #[must_use]
    pub fn with_time_layout(mut self, layout: impl Into<String>) -> Self {
        self.time_layout = layout.into();
        self
    }

    /// Replace the boolean literal set.
    #[must_use]
    pub fn with_boolean_literals<I, S>(mut self, literals: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.boolean_literals = literals.into_iter().map(Into::into).collect();
        self
    }

    /// Replace the null literal set.
    #[must_use]
    pub fn with_null_literals<I, S>(mut self, literals: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.null_literals = literals.into_iter().map(Into::into).collect();
        self
    }

    /// Register a field-level converter for a column identity.
    #[must_use]
    pub fn with_field_converter(
        mut self,
        column: impl Into<ColumnKey>,
        converter: impl Converter + 'static,
    ) -> Self {
        self.converters.insert_field(column, converter);
        self
    }

    /// Register a type-level converter for a semantic type.
    #[must_use]
    pub fn with_type_converter(
        mut self,
        semantic_type: SemanticType,
        converter: impl Converter + 'static,
    ) -> Self {
        self.converters.insert_type(semantic_type, converter);
        self
    }

    pub fn is_true_literal(&self, raw: &str) -> bool {
        self.boolean_literals.contains(raw)
    }

    pub fn is_null_literal(&self, raw: &str) -> bool {
        self.null_literals.contains(raw)
    }
}
