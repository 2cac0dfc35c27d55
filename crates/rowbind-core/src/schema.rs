//! Record schemas and column-to-field resolution.
//!
//! A [`Schema`] is the static description of a record type: its fields in
//! declaration order, each with a column annotation and a semantic type.
//! Schemas are normally produced by `#[derive(Record)]`, but can be built by
//! hand for types that cannot use the derive:
//!
//! ```
//! use rowbind_core::{FieldDef, Schema, SemanticType};
//!
//! let schema = Schema::new("User")
//!     .field(FieldDef::new("id", "i64", SemanticType::Integer).column("id"))
//!     .field(FieldDef::new("name", "String", SemanticType::String).column("user_name"));
//! assert_eq!(schema.len(), 2);
//! ```

use std::collections::HashMap;
use std::fmt;

/// Column identity: a header name in header mode, a zero-based position otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ColumnKey {
    /// Header name.
    Name(String),
    /// Zero-based column position.
    Position(usize),
}

impl ColumnKey {
    /// Returns the header name, if this is a named key.
    pub fn as_name(&self) -> Option<&str> {
        match self {
            Self::Name(name) => Some(name.as_str()),
            Self::Position(_) => None,
        }
    }

    /// Returns the position, if this is a positional key.
    pub fn as_position(&self) -> Option<usize> {
        match self {
            Self::Name(_) => None,
            Self::Position(index) => Some(*index),
        }
    }
}

impl fmt::Display for ColumnKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name(name) => f.write_str(name),
            Self::Position(index) => write!(f, "{index}"),
        }
    }
}

impl From<&str> for ColumnKey {
    fn from(name: &str) -> Self {
        Self::Name(name.to_string())
    }
}

impl From<String> for ColumnKey {
    fn from(name: String) -> Self {
        Self::Name(name)
    }
}

impl From<usize> for ColumnKey {
    fn from(index: usize) -> Self {
        Self::Position(index)
    }
}

/// Value kind of a field, used to pick a coercion rule or a type converter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SemanticType {
    Integer,
    String,
    Boolean,
    Timestamp,
    /// Any other type, identified by its declared name. Needs a converter.
    Other(&'static str),
}

impl SemanticType {
    /// Returns the display name of the semantic type.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Integer => "integer",
            Self::String => "string",
            Self::Boolean => "boolean",
            Self::Timestamp => "timestamp",
            Self::Other(name) => *name,
        }
    }

    /// Returns true if a built-in coercion rule exists for this type.
    pub fn is_builtin(&self) -> bool {
        !matches!(self, Self::Other(_))
    }
}

impl fmt::Display for SemanticType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Column annotation declared on a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnAnnotation {
    /// Bound to the header column with this name.
    Named(&'static str),
    /// Explicitly ignored in header mode.
    Ignored,
    /// No annotation; only reachable in positional mode.
    Unannotated,
}

/// Stable handle of a field: its zero-based declaration index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldHandle(usize);

impl FieldHandle {
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    pub fn index(self) -> usize {
        self.0
    }
}

/// Declaration of a single record field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDef {
    handle: FieldHandle,
    name: &'static str,
    type_name: &'static str,
    annotation: ColumnAnnotation,
    semantic_type: SemanticType,
    nullable: bool,
}

impl FieldDef {
    /// Creates an unannotated, non-nullable field.
    ///
    /// The handle is assigned when the field is added to a [`Schema`].
    pub fn new(name: &'static str, type_name: &'static str, semantic_type: SemanticType) -> Self {
        Self {
            handle: FieldHandle(0),
            name,
            type_name,
            annotation: ColumnAnnotation::Unannotated,
            semantic_type,
            nullable: false,
        }
    }

    /// Binds the field to a header column. The name `"-"` ignores the field.
    #[must_use]
    pub fn column(mut self, name: &'static str) -> Self {
        self.annotation = match name {
            "" => ColumnAnnotation::Unannotated,
            "-" => ColumnAnnotation::Ignored,
            name => ColumnAnnotation::Named(name),
        };
        self
    }

    /// Marks the field as ignored in header mode.
    #[must_use]
    pub fn skip(mut self) -> Self {
        self.annotation = ColumnAnnotation::Ignored;
        self
    }

    /// Marks the field as accepting null literals.
    #[must_use]
    pub fn nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    pub fn handle(&self) -> FieldHandle {
        self.handle
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Rust type as written on the field, e.g. `NaiveDateTime`.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn annotation(&self) -> ColumnAnnotation {
        self.annotation
    }

    pub fn semantic_type(&self) -> SemanticType {
        self.semantic_type
    }

    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    /// Header column this field is bound to, if any.
    pub fn column_name(&self) -> Option<&'static str> {
        match self.annotation {
            ColumnAnnotation::Named(name) => Some(name),
            ColumnAnnotation::Ignored | ColumnAnnotation::Unannotated => None,
        }
    }
}

/// Ordered field declarations of a record type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    record: &'static str,
    fields: Vec<FieldDef>,
}

impl Schema {
    /// Creates an empty schema for the named record type.
    pub fn new(record: &'static str) -> Self {
        Self {
            record,
            fields: Vec::new(),
        }
    }

    /// Appends a field; its handle becomes its declaration index.
    #[must_use]
    pub fn field(mut self, mut def: FieldDef) -> Self {
        def.handle = FieldHandle(self.fields.len());
        self.fields.push(def);
        self
    }

    pub fn record(&self) -> &'static str {
        self.record
    }

    pub fn fields(&self) -> &[FieldDef] {
        &self.fields
    }

    pub fn get(&self, handle: FieldHandle) -> Option<&FieldDef> {
        self.fields.get(handle.index())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// How columns are matched to fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveMode {
    /// Columns are matched by header name against field annotations.
    Header,
    /// Column `i` is matched to the `i`-th declared field.
    Positional,
}

/// Maps column identities to the fields they populate.
pub struct FieldResolver;

impl FieldResolver {
    /// Builds the column-to-field map for a schema.
    ///
    /// In header mode unannotated and ignored fields are left out; when two
    /// fields share an annotation the later declaration wins. In positional
    /// mode every field is reachable by its declaration index.
    pub fn resolve(schema: &Schema, mode: ResolveMode) -> HashMap<ColumnKey, &FieldDef> {
        match mode {
            ResolveMode::Header => schema
                .fields()
                .iter()
                .filter_map(|def| def.column_name().map(|name| (ColumnKey::from(name), def)))
                .collect(),
            ResolveMode::Positional => schema
                .fields()
                .iter()
                .enumerate()
                .map(|(index, def)| (ColumnKey::Position(index), def))
                .collect(),
        }
    }
}
