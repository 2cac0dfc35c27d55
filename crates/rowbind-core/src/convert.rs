//! Caller-supplied conversion overrides.
//!
//! A [`Converter`] replaces the built-in coercion rule for a column
//! (field-level) or for every field of a semantic type (type-level).
//! Field-level converters always win over type-level ones.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::error::BoxError;
use crate::schema::{ColumnKey, SemanticType};
use crate::value::Value;

/// Converts one raw field string into a [`Value`].
pub trait Converter: Send + Sync {
    fn convert(&self, raw: &str) -> Result<Value, BoxError>;
}

/// A [`Converter`] backed by a closure. Built with [`from_fn`].
#[derive(Clone)]
pub struct FnConverter<F>(F);

impl<F> Converter for FnConverter<F>
where
    F: Fn(&str) -> Result<Value, BoxError> + Send + Sync,
{
    fn convert(&self, raw: &str) -> Result<Value, BoxError> {
        (self.0)(raw)
    }
}

/// Adapts a closure into a [`Converter`].
///
/// ```
/// use rowbind_core::{Value, convert::from_fn};
///
/// let upper = from_fn(|raw| Ok(Value::from(raw.to_uppercase())));
/// # let _ = upper;
/// ```
pub fn from_fn<F>(f: F) -> FnConverter<F>
where
    F: Fn(&str) -> Result<Value, BoxError> + Send + Sync,
{
    FnConverter(f)
}

/// Field-level and type-level converter tables.
#[derive(Clone, Default)]
pub struct Converters {
    by_column: HashMap<ColumnKey, Arc<dyn Converter>>,
    by_type: HashMap<SemanticType, Arc<dyn Converter>>,
}

impl Converters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a converter for one column identity, replacing any previous one.
    pub fn insert_field(
        &mut self,
        column: impl Into<ColumnKey>,
        converter: impl Converter + 'static,
    ) -> &mut Self {
        self.by_column.insert(column.into(), Arc::new(converter));
        self
    }

    /// Registers a converter for a semantic type, replacing any previous one.
    pub fn insert_type(
        &mut self,
        semantic_type: SemanticType,
        converter: impl Converter + 'static,
    ) -> &mut Self {
        self.by_type.insert(semantic_type, Arc::new(converter));
        self
    }

    pub fn for_column(&self, column: &ColumnKey) -> Option<&dyn Converter> {
        self.by_column.get(column).map(Arc::as_ref)
    }

    pub fn for_type(&self, semantic_type: SemanticType) -> Option<&dyn Converter> {
        self.by_type.get(&semantic_type).map(Arc::as_ref)
    }

    /// Returns the converter that overrides coercion for this column and
    /// type: the field-level one if registered, else the type-level one.
    pub fn lookup(
        &self,
        column: &ColumnKey,
        semantic_type: SemanticType,
    ) -> Option<&dyn Converter> {
        self.for_column(column)
            .or_else(|| self.for_type(semantic_type))
    }

    pub fn is_empty(&self) -> bool {
        self.by_column.is_empty() && self.by_type.is_empty()
    }
}

impl fmt::Debug for Converters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut columns: Vec<&ColumnKey> = self.by_column.keys().collect();
        columns.sort();
        let mut types: Vec<&'static str> = self.by_type.keys().map(SemanticType::name).collect();
        types.sort_unstable();
        f.debug_struct("Converters")
            .field("by_column", &columns)
            .field("by_type", &types)
            .finish()
    }
}
