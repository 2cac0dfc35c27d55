//! Row-at-a-time decoding into records.

use std::collections::BTreeMap;

use tracing::{debug, trace};

use crate::coerce::coerce;
use crate::error::{ConstructionError, DecodeError};
use crate::options::DecoderConfig;
use crate::record::Record;
use crate::schema::{ColumnKey, FieldDef, FieldResolver, ResolveMode};
use crate::source::RowSource;

/// Outcome of a successful decode call.
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeStatus {
    /// A row was read and every mapped column was written to the target.
    Decoded,
    /// The row source is exhausted; the target was not touched.
    EndOfStream,
}

impl DecodeStatus {
    pub fn is_end_of_stream(self) -> bool {
        matches!(self, Self::EndOfStream)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Open,
    Exhausted,
}

/// Decodes rows from a [`RowSource`] into caller-owned records.
///
/// # Example
///
/// ```
/// use rowbind_core::{CsvRowSource, DecodeStatus, Decoder, DecoderConfig, Record};
///
/// #[derive(Debug, Default, Record)]
/// struct User {
///     #[csv(name = "id")]
///     id: i64,
///     #[csv(name = "username")]
///     username: String,
/// }
///
/// let data = "id,username\n1,rob\n2,ken\n";
/// let mut decoder = Decoder::new(CsvRowSource::from_reader(data.as_bytes()), DecoderConfig::default())?;
///
/// let mut user = User::default();
/// while decoder.decode_next(&mut user)? == DecodeStatus::Decoded {
///     println!("{user:?}");
/// }
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct Decoder<S> {
    source: S,
    header: Option<Vec<String>>,
    config: DecoderConfig,
    state: State,
    rows_read: u64,
}

impl<S: RowSource> Decoder<S> {
    /// Creates a decoder. In header mode the first row is consumed as the header.
    pub fn new(mut source: S, config: DecoderConfig) -> Result<Self, ConstructionError> {
        let header = if config.header_mode {
            let header = source
                .next_row()
                .map_err(|e| ConstructionError::HeaderRead { source: Box::new(e) })?
                .ok_or(ConstructionError::MissingHeader)?;
            debug!(columns = header.len(), "header row consumed");
            Some(header)
        } else {
            None
        };

        Ok(Self {
            source,
            header,
            config,
            state: State::Open,
            rows_read: 0,
        })
    }

    /// Decodes the next row into `target`.
    ///
    /// Columns are written as they are coerced. When a column fails, the
    /// error is returned and columns already written stay written; fields
    /// with no matching column are never touched.
    pub fn decode_next<R: Record>(&mut self, target: &mut R) -> Result<DecodeStatus, DecodeError> {
        self.decode_into(Some(target))
    }

    /// Like [`decode_next`](Self::decode_next), rejecting an absent target
    /// with [`DecodeError::InvalidTarget`] before any row is read.
    pub fn decode_into<R: Record>(
        &mut self,
        target: Option<&mut R>,
    ) -> Result<DecodeStatus, DecodeError> {
        let target = target.ok_or_else(|| DecodeError::invalid_target("target is absent"))?;
        let schema = R::schema();
        if schema.is_empty() {
            return Err(DecodeError::invalid_target(format!(
                "`{}` declares no fields",
                schema.record()
            )));
        }

        if self.state == State::Exhausted {
            return Ok(DecodeStatus::EndOfStream);
        }

        let row = match self.source.next_row() {
            Ok(Some(row)) => row,
            Ok(None) => {
                debug!(rows = self.rows_read, "row source exhausted");
                self.state = State::Exhausted;
                return Ok(DecodeStatus::EndOfStream);
            }
            Err(e) => {
                self.rows_read += 1;
                return Err(DecodeError::Read {
                    row: self.rows_read,
                    source: Box::new(e),
                });
            }
        };
        self.rows_read += 1;

        let mode = self.resolve_mode();
        let fields = FieldResolver::resolve(&schema, mode);
        for (column, raw) in self.column_map(&row) {
            let Some(field) = fields.get(&column) else {
                continue;
            };
            self.write_field(target, field, &column, raw)?;
        }

        trace!(row = self.rows_read, "row decoded");
        Ok(DecodeStatus::Decoded)
    }

    fn write_field<R: Record>(
        &self,
        target: &mut R,
        field: &FieldDef,
        column: &ColumnKey,
        raw: &str,
    ) -> Result<(), DecodeError> {
        let value = coerce(raw, field, column, &self.config)?;
        target
            .assign(field.handle(), value)
            .map_err(|e| DecodeError::TypeMismatch {
                field: field.name(),
                column: column.clone(),
                type_name: field.type_name(),
                value: raw.to_string(),
                reason: e.to_string(),
            })
    }

    fn resolve_mode(&self) -> ResolveMode {
        if self.header.is_some() {
            ResolveMode::Header
        } else {
            ResolveMode::Positional
        }
    }

    /// Keys each raw value by its column identity.
    ///
    /// In header mode values beyond the header and header names beyond the
    /// row are dropped. A repeated header name keeps its last value.
    fn column_map<'r>(&self, row: &'r [String]) -> BTreeMap<ColumnKey, &'r str> {
        match &self.header {
            Some(header) => header
                .iter()
                .zip(row)
                .map(|(name, value)| (ColumnKey::Name(name.clone()), value.as_str()))
                .collect(),
            None => row
                .iter()
                .enumerate()
                .map(|(index, value)| (ColumnKey::Position(index), value.as_str()))
                .collect(),
        }
    }
}

impl<S> Decoder<S> {
    /// Header row, when header mode is enabled.
    pub fn header(&self) -> Option<&[String]> {
        self.header.as_deref()
    }

    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    /// True once the source has reported end of stream.
    pub fn is_exhausted(&self) -> bool {
        self.state == State::Exhausted
    }

    /// Data rows pulled from the source so far, header excluded. Rows the
    /// source failed to produce are counted.
    pub fn rows_read(&self) -> u64 {
        self.rows_read
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    pub fn into_source(self) -> S {
        self.source
    }
}
