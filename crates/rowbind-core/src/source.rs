//! Row sources feeding the decoder.
//!
//! A [`RowSource`] yields rows as ordered raw field strings. Tokenizing
//! (delimiters, quoting, escaping) is the source's job; the decoder only
//! sees finished fields.

use std::convert::Infallible;
use std::fs::File;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// A lazy sequence of rows.
pub trait RowSource {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Returns the next row, or `None` at end of stream.
    fn next_row(&mut self) -> Result<Option<Vec<String>>, Self::Error>;
}

impl<S: RowSource + ?Sized> RowSource for &mut S {
    type Error = S::Error;

    fn next_row(&mut self) -> Result<Option<Vec<String>>, Self::Error> {
        (**self).next_row()
    }
}

/// Whitespace trimming applied by the CSV tokenizer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrimMode {
    #[default]
    None,
    Headers,
    Fields,
    All,
}

impl From<TrimMode> for csv::Trim {
    fn from(mode: TrimMode) -> Self {
        match mode {
            TrimMode::None => csv::Trim::None,
            TrimMode::Headers => csv::Trim::Headers,
            TrimMode::Fields => csv::Trim::Fields,
            TrimMode::All => csv::Trim::All,
        }
    }
}

/// Tokenizer settings for [`CsvRowSource`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CsvSourceOptions {
    /// Field delimiter byte.
    pub delimiter: u8,
    /// Quote byte.
    pub quote: u8,
    /// Whether quotes are interpreted at all.
    pub quoting: bool,
    pub trim: TrimMode,
    /// Allow rows with differing field counts.
    pub flexible: bool,
    /// Lines starting with this byte are skipped.
    pub comment: Option<u8>,
}

impl Default for CsvSourceOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            quote: b'"',
            quoting: true,
            trim: TrimMode::None,
            flexible: false,
            comment: None,
        }
    }
}

impl CsvSourceOptions {
    /// Set the delimiter byte.
    #[must_use]
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Allow or reject rows with differing field counts.
    #[must_use]
    pub fn with_flexible(mut self, flexible: bool) -> Self {
        self.flexible = flexible;
        self
    }

    /// Set the trimming mode.
    #[must_use]
    pub fn with_trim(mut self, trim: TrimMode) -> Self {
        self.trim = trim;
        self
    }

    /// Builds a `csv::ReaderBuilder`; header handling is left to the decoder.
    pub fn to_builder(&self) -> csv::ReaderBuilder {
        let mut builder = csv::ReaderBuilder::new();
        builder
            .has_headers(false)
            .delimiter(self.delimiter)
            .quote(self.quote)
            .quoting(self.quoting)
            .trim(self.trim.into())
            .flexible(self.flexible)
            .comment(self.comment);
        builder
    }
}

/// Row source over an RFC 4180 CSV stream, backed by `csv::Reader`.
pub struct CsvRowSource<R> {
    reader: csv::Reader<R>,
    record: csv::StringRecord,
}

impl CsvRowSource<File> {
    /// Opens a CSV file with default tokenizer settings.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, csv::Error> {
        Self::from_path_with_options(path, &CsvSourceOptions::default())
    }

    /// Opens a CSV file with the given tokenizer settings.
    pub fn from_path_with_options(
        path: impl AsRef<Path>,
        options: &CsvSourceOptions,
    ) -> Result<Self, csv::Error> {
        let reader = options.to_builder().from_path(path)?;
        Ok(Self::from_csv_reader(reader))
    }
}

impl<R: io::Read> CsvRowSource<R> {
    /// Wraps a reader with default tokenizer settings.
    pub fn from_reader(rdr: R) -> Self {
        Self::with_options(&CsvSourceOptions::default(), rdr)
    }

    /// Wraps a reader with the given tokenizer settings.
    pub fn with_options(options: &CsvSourceOptions, rdr: R) -> Self {
        Self::from_csv_reader(options.to_builder().from_reader(rdr))
    }

    /// Wraps an already configured `csv::Reader`.
    ///
    /// The reader should be built with `has_headers(false)`; otherwise its
    /// first record never reaches the decoder.
    pub fn from_csv_reader(reader: csv::Reader<R>) -> Self {
        Self {
            reader,
            record: csv::StringRecord::new(),
        }
    }

    pub fn reader(&self) -> &csv::Reader<R> {
        &self.reader
    }

    pub fn reader_mut(&mut self) -> &mut csv::Reader<R> {
        &mut self.reader
    }

    pub fn into_reader(self) -> csv::Reader<R> {
        self.reader
    }
}

impl<R: io::Read> RowSource for CsvRowSource<R> {
    type Error = csv::Error;

    fn next_row(&mut self) -> Result<Option<Vec<String>>, Self::Error> {
        if !self.reader.read_record(&mut self.record)? {
            return Ok(None);
        }
        Ok(Some(self.record.iter().map(str::to_owned).collect()))
    }
}

/// Row source over in-memory rows.
#[derive(Debug, Clone)]
pub struct IterRowSource<I> {
    rows: I,
    consumed: usize,
}

impl<I> IterRowSource<I> {
    pub fn new<T>(rows: T) -> Self
    where
        T: IntoIterator<IntoIter = I>,
    {
        Self {
            rows: rows.into_iter(),
            consumed: 0,
        }
    }

    /// Number of rows handed out so far.
    pub fn rows_consumed(&self) -> usize {
        self.consumed
    }
}

impl<I> RowSource for IterRowSource<I>
where
    I: Iterator,
    I::Item: IntoIterator,
    <I::Item as IntoIterator>::Item: Into<String>,
{
    type Error = Infallible;

    fn next_row(&mut self) -> Result<Option<Vec<String>>, Self::Error> {
        let Some(row) = self.rows.next() else {
            return Ok(None);
        };
        self.consumed += 1;
        Ok(Some(row.into_iter().map(Into::into).collect()))
    }
}
