//! Row-at-a-time CSV decoding into statically described records.
//!
//! This crate maps the rows of a tabular text stream onto Rust structs, one
//! row per call, coercing raw strings into integers, strings, booleans and
//! timestamps, with caller-supplied converters for anything else.
//!
//! # Features
//!
//! - **Schemas**: `#[derive(Record)]` describes a struct's fields, their
//!   column names and their value kinds at compile time
//! - **Header and positional modes**: columns matched by header name or by
//!   declaration order
//! - **Converters**: per-column and per-type overrides of the built-in rules
//! - **Row sources**: any tokenizer behind [`RowSource`]; [`CsvRowSource`]
//!   wraps the `csv` crate
//!
//! # Example
//!
//! ```
//! use chrono::NaiveDateTime;
//! use rowbind_core::{CsvRowSource, Decoder, DecoderConfig, Record};
//!
//! #[derive(Debug, Default, Record)]
//! struct User {
//!     #[csv(name = "id")]
//!     id: i64,
//!     #[csv(name = "first_name")]
//!     first_name: String,
//!     #[csv(name = "created_at")]
//!     created_at: NaiveDateTime,
//! }
//!
//! let data = "id,first_name,created_at\n1,Rob,2010-01-27 00:00:00\n";
//! let config = DecoderConfig::default().with_time_layout("%Y-%m-%d %H:%M:%S");
//! let mut decoder = Decoder::new(CsvRowSource::from_reader(data.as_bytes()), config)?;
//!
//! let mut user = User::default();
//! decoder.decode_next(&mut user)?;
//! assert_eq!(user.first_name, "Rob");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

extern crate self as rowbind_core;

pub mod coerce;
pub mod convert;
mod decoder;
mod error;
mod options;
mod record;
pub mod schema;
mod source;
pub mod value;

// === Decoding ===
pub use decoder::{DecodeStatus, Decoder};
pub use options::{
    DEFAULT_BOOLEAN_LITERALS, DEFAULT_NULL_LITERALS, DEFAULT_TIME_LAYOUT, DecoderConfig,
};

// === Error Types ===
pub use error::{BoxError, ConstructionError, DecodeError, DecodeErrorKind};

// === Schemas ===
pub use record::Record;
pub use rowbind_derive::Record;
pub use schema::{
    ColumnAnnotation, ColumnKey, FieldDef, FieldHandle, FieldResolver, ResolveMode, Schema,
    SemanticType,
};

// === Values and Converters ===
pub use convert::{Converter, Converters};
pub use value::{FromValue, Value, ValueError};

// === Row Sources ===
pub use source::{CsvRowSource, CsvSourceOptions, IterRowSource, RowSource, TrimMode};
