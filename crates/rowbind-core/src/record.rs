//! The schema introspection contract between record types and the decoder.

use crate::schema::{FieldHandle, Schema};
use crate::value::{Value, ValueError};

/// A type rows can be decoded into.
///
/// Usually derived with `#[derive(Record)]`. A hand-written impl must keep
/// [`schema`](Record::schema) and [`assign`](Record::assign) in agreement:
/// every handle in the schema must be accepted by `assign`.
///
/// ```
/// use rowbind_core::{FieldDef, FieldHandle, FromValue, Record, Schema, SemanticType, Value, ValueError};
///
/// #[derive(Default)]
/// struct Point {
///     x: i64,
///     y: i64,
/// }
///
/// impl Record for Point {
///     fn schema() -> Schema {
///         Schema::new("Point")
///             .field(FieldDef::new("x", "i64", SemanticType::Integer).column("x"))
///             .field(FieldDef::new("y", "i64", SemanticType::Integer).column("y"))
///     }
///
///     fn assign(&mut self, field: FieldHandle, value: Value) -> Result<(), ValueError> {
///         match field.index() {
///             0 => self.x = FromValue::from_value(value)?,
///             1 => self.y = FromValue::from_value(value)?,
///             other => return Err(ValueError::UnknownField(other)),
///         }
///         Ok(())
///     }
/// }
/// ```
pub trait Record {
    /// Describes the record's fields. Called once per decoded row.
    fn schema() -> Schema;

    /// Stores a coerced value in the field identified by `field`.
    fn assign(&mut self, field: FieldHandle, value: Value) -> Result<(), ValueError>;
}
