//! Record validation ahead of the Polars reader.
//!
//! The `csv` crate does the tokenizing, so quoting follows RFC 4180: a quote
//! only opens a quoted field at the start of a field, and anywhere else it is
//! an ordinary character.

use crate::error::LoadError;
use csv::{ReaderBuilder, StringRecord, Terminator, WriterBuilder};

/// One logical CSV record (may span several physical lines when quoted).
#[derive(Debug, Clone)]
pub(crate) struct Record {
    /// 1-based physical line the record starts on.
    pub line: usize,
    pub fields: StringRecord,
}

impl Record {
    fn len(&self) -> usize {
        self.fields.len()
    }
}

/// Split `text` into records, skipping blank lines.
pub(crate) fn scan_records(text: &str, delimiter: u8) -> Result<Vec<Record>, LoadError> {
    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut records = Vec::new();
    let mut last_start = 0usize;

    for result in reader.records() {
        let fields = result.map_err(|e| LoadError::Parse(e.to_string()))?;
        if is_blank(&fields) {
            continue;
        }
        let (line, byte) = fields
            .position()
            .map(|p| (p.line() as usize, p.byte() as usize))
            .unwrap_or((0, 0));
        last_start = byte;
        records.push(Record { line, fields });
    }

    if let Some(last) = records.last() {
        check_closed(last, text.get(last_start..).unwrap_or(""))?;
    }

    Ok(records)
}

fn is_blank(fields: &StringRecord) -> bool {
    fields.len() <= 1 && fields.iter().all(|f| f.trim().is_empty())
}

/// An open quote runs to the end of input, so only the last record can be
/// unterminated. A line break in its last field means that field was quoted,
/// and a closed quoted field ends the raw record with `"`.
fn check_closed(record: &Record, raw: &str) -> Result<(), LoadError> {
    let last_field = record.fields.iter().last().unwrap_or("");
    let spans_lines = last_field.contains(['\n', '\r']);
    if spans_lines && !raw.trim_end().ends_with('"') {
        return Err(LoadError::UnterminatedQuote { line: record.line });
    }
    Ok(())
}

/// Check that every record has as many fields as the header.
pub(crate) fn check_rectangular(records: &[Record]) -> Result<(), LoadError> {
    let Some(header) = records.first() else {
        return Err(LoadError::Empty);
    };

    for record in &records[1..] {
        if record.len() != header.len() {
            return Err(LoadError::RaggedRow {
                line: record.line,
                expected: header.len(),
                found: record.len(),
            });
        }
    }
    Ok(())
}

/// Re-serialize validated records with canonical quoting.
pub(crate) fn write_records(records: &[Record], delimiter: u8) -> Result<Vec<u8>, LoadError> {
    let mut writer = WriterBuilder::new()
        .delimiter(delimiter)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    for record in records {
        writer
            .write_record(&record.fields)
            .map_err(|e| LoadError::Parse(e.to_string()))?;
    }
    writer
        .into_inner()
        .map_err(|e| LoadError::Parse(e.to_string()))
}
