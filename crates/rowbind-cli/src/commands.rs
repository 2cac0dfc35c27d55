use std::io::{self, Write};

use anyhow::{Context, Result};
use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{ContentArrangement, Table};
use rowbind_core::{
    ColumnAnnotation, CsvRowSource, DEFAULT_TIME_LAYOUT, DecodeError, DecodeStatus, Decoder,
    Record, RowSource,
};
use tracing::{info, info_span, warn};

use crate::cli::{DecodeArgs, OutputFormatArg};
use crate::config::FileConfig;
use crate::student::Student;

/// Counts reported after a decode run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecodeSummary {
    pub rows_decoded: usize,
    pub rows_failed: usize,
}

impl DecodeSummary {
    pub fn has_errors(&self) -> bool {
        self.rows_failed > 0
    }
}

/// Decodes `args.file` into students, writing records to `out` and row
/// failures to `diagnostics`.
///
/// A failing row is reported and skipped, or aborts the run with
/// `--fail-fast`. An I/O failure of the underlying file always aborts.
pub fn run_decode(
    args: &DecodeArgs,
    out: &mut impl Write,
    diagnostics: &mut impl Write,
) -> Result<DecodeSummary> {
    let span = info_span!("decode", file = %args.file.display());
    let _guard = span.enter();

    let config = FileConfig::from_args(args)?;
    let source = CsvRowSource::from_path_with_options(&args.file, &config.csv)
        .with_context(|| format!("open {}", args.file.display()))?;
    let decoder = Decoder::new(source, config.decoder)
        .with_context(|| format!("read header of {}", args.file.display()))?;

    let summary = decode_students(decoder, args, out, diagnostics)?;
    info!(
        decoded = summary.rows_decoded,
        failed = summary.rows_failed,
        "decode finished"
    );
    Ok(summary)
}

fn decode_students<S: RowSource>(
    mut decoder: Decoder<S>,
    args: &DecodeArgs,
    out: &mut impl Write,
    diagnostics: &mut impl Write,
) -> Result<DecodeSummary> {
    let mut summary = DecodeSummary::default();
    let mut decoded = Vec::new();
    loop {
        let mut student = Student::default();
        match decoder.decode_next(&mut student) {
            Ok(DecodeStatus::EndOfStream) => break,
            Ok(DecodeStatus::Decoded) => {
                summary.rows_decoded += 1;
                match args.format {
                    OutputFormatArg::Json => write_json_line(out, &student)?,
                    OutputFormatArg::Table => decoded.push(student),
                }
            }
            Err(error) => {
                let row = decoder.rows_read();
                if args.fail_fast || is_io_failure(&error) {
                    return Err(anyhow::Error::new(error).context(format!("row {row}")));
                }
                summary.rows_failed += 1;
                warn!(row, %error, "skipping row");
                writeln!(diagnostics, "row {row}: {error}")?;
            }
        }
    }

    if args.format == OutputFormatArg::Table {
        writeln!(out, "{}", students_table(&decoded))?;
    }
    Ok(summary)
}

/// A read error caused by the file itself rather than by its contents.
/// Retrying the same reader would fail again.
fn is_io_failure(error: &DecodeError) -> bool {
    let DecodeError::Read { source, .. } = error else {
        return false;
    };
    if let Some(csv_error) = source.downcast_ref::<csv::Error>() {
        return csv_error.is_io_error();
    }
    source.is::<io::Error>()
}

/// Writes the demo record's schema as a table.
pub fn run_schema(out: &mut impl Write) -> Result<()> {
    let schema = Student::schema();
    let mut table = Table::new();
    table.set_header(vec!["Position", "Field", "Column", "Type", "Kind", "Nullable"]);
    apply_table_style(&mut table);
    for (position, field) in schema.fields().iter().enumerate() {
        let column = match field.annotation() {
            ColumnAnnotation::Named(name) => name.to_string(),
            ColumnAnnotation::Ignored => "-".to_string(),
            ColumnAnnotation::Unannotated => String::new(),
        };
        table.add_row(vec![
            position.to_string(),
            field.name().to_string(),
            column,
            field.type_name().to_string(),
            field.semantic_type().to_string(),
            if field.is_nullable() { "yes" } else { "no" }.to_string(),
        ]);
    }
    writeln!(out, "{table}")?;
    Ok(())
}

fn write_json_line(out: &mut impl Write, student: &Student) -> Result<()> {
    serde_json::to_writer(&mut *out, student).context("serialize student")?;
    writeln!(out)?;
    Ok(())
}

fn students_table(students: &[Student]) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["ID", "First name", "Last name", "Username", "Created at"]);
    apply_table_style(&mut table);
    for student in students {
        table.add_row(vec![
            student.id.to_string(),
            student.first_name.clone(),
            student.last_name.clone(),
            student.username.clone(),
            student.created_at.format(DEFAULT_TIME_LAYOUT).to_string(),
        ]);
    }
    table
}

fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}
