//! Raw string to typed value coercion.
//!
//! Resolution order for one column:
//!
//! 1. field-level converter registered for the column identity;
//! 2. type-level converter registered for the field's semantic type;
//! 3. the built-in rule for the semantic type.

use chrono::NaiveDateTime;
use chrono::format::{self, ParseResult, Parsed, StrftimeItems};

use crate::error::DecodeError;
use crate::options::DecoderConfig;
use crate::schema::{ColumnKey, FieldDef, SemanticType};
use crate::value::Value;

/// Coerces one raw value for `field`, read from `column`.
pub fn coerce(
    raw: &str,
    field: &FieldDef,
    column: &ColumnKey,
    config: &DecoderConfig,
) -> Result<Value, DecodeError> {
    if let Some(converter) = config.converters.lookup(column, field.semantic_type()) {
        return converter
            .convert(raw)
            .map_err(|source| DecodeError::ConverterFailure {
                field: field.name(),
                column: column.clone(),
                source,
            });
    }
    coerce_builtin(raw, field, column, config)
}

fn coerce_builtin(
    raw: &str,
    field: &FieldDef,
    column: &ColumnKey,
    config: &DecoderConfig,
) -> Result<Value, DecodeError> {
    if field.is_nullable() && config.is_null_literal(raw) {
        return Ok(Value::Null);
    }

    let mismatch = |reason: String| DecodeError::TypeMismatch {
        field: field.name(),
        column: column.clone(),
        type_name: field.type_name(),
        value: raw.to_string(),
        reason,
    };

    match field.semantic_type() {
        SemanticType::Integer => raw
            .parse::<i64>()
            .map(Value::Integer)
            .map_err(|e| mismatch(e.to_string())),
        SemanticType::String => Ok(Value::String(raw.to_string())),
        SemanticType::Boolean => Ok(Value::Boolean(config.is_true_literal(raw))),
        SemanticType::Timestamp => parse_timestamp(raw, &config.time_layout)
            .map(Value::Timestamp)
            .map_err(|e| mismatch(e.to_string())),
        SemanticType::Other(_) => Err(DecodeError::UnsupportedType {
            field: field.name(),
            column: column.clone(),
            type_name: field.type_name(),
        }),
    }
}

/// Parses a timestamp with a strftime layout.
///
/// Fields the layout leaves out take their zero value: year 0, January,
/// day 1, midnight. A parsed UTC offset is applied, so the result is the
/// UTC wall time of the instant.
pub fn parse_timestamp(raw: &str, layout: &str) -> ParseResult<NaiveDateTime> {
    let mut parsed = Parsed::new();
    format::parse(&mut parsed, raw, StrftimeItems::new(layout))?;

    if parsed.timestamp().is_none() {
        fill_missing_fields(&mut parsed)?;
    }
    match parsed.offset() {
        Some(_) => parsed.to_datetime().map(|dt| dt.naive_utc()),
        None => parsed.to_naive_datetime_with_offset(0),
    }
}

fn fill_missing_fields(parsed: &mut Parsed) -> ParseResult<()> {
    let has_year = parsed.year().is_some()
        || parsed.year_div_100().is_some()
        || parsed.year_mod_100().is_some()
        || parsed.isoyear().is_some();
    if !has_year {
        parsed.set_year(0)?;
    }

    let has_week_or_ordinal = parsed.ordinal().is_some()
        || parsed.isoweek().is_some()
        || parsed.week_from_sun().is_some()
        || parsed.week_from_mon().is_some();
    if !has_week_or_ordinal {
        if parsed.month().is_none() {
            parsed.set_month(1)?;
        }
        if parsed.day().is_none() {
            parsed.set_day(1)?;
        }
    }

    match (parsed.hour_div_12(), parsed.hour_mod_12()) {
        (None, None) => parsed.set_hour(0)?,
        (Some(_), None) => parsed.set_hour12(12)?,
        _ => {}
    }
    if parsed.minute().is_none() {
        parsed.set_minute(0)?;
    }
    Ok(())
}
