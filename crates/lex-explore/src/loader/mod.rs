//! CSV ingestion.
//!
//! Turns an uploaded byte stream into a [`Table`]. Input is validated before
//! it reaches the Polars reader:
//! - it must be UTF-8 (a leading BOM is dropped)
//! - it must contain at least a header
//! - every record must have as many fields as the header
//!
//! Failures surface as [`LoadError`]; nothing past this boundary panics on
//! bad input.

mod scan;

use crate::config::ExplorerConfig;
use crate::error::{ExploreError, LoadError, Result};
use crate::types::Table;
use polars::io::csv::read::{CsvParseOptions, CsvReadOptions, NullValues};
use polars::prelude::*;
use std::io::Cursor;
use std::path::Path;
use tracing::{debug, info};

const DELIMITER: u8 = b',';
const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Parses delimited text into tables.
#[derive(Debug, Clone, Default)]
pub struct TableLoader {
    config: ExplorerConfig,
}

impl TableLoader {
    pub fn new(config: ExplorerConfig) -> Self {
        Self { config }
    }

    /// Parse CSV bytes into a table.
    pub fn load(&self, bytes: &[u8]) -> std::result::Result<Table, LoadError> {
        let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
        let text = std::str::from_utf8(bytes).map_err(|e| LoadError::Encoding {
            offset: e.valid_up_to(),
        })?;

        if text.trim().is_empty() {
            return Err(LoadError::Empty);
        }

        let records = scan::scan_records(text, DELIMITER)?;
        scan::check_rectangular(&records)?;
        debug!(
            "Validated {} records with {} fields each",
            records.len(),
            records.first().map(|r| r.fields.len()).unwrap_or(0)
        );

        let normalized = scan::write_records(&records, DELIMITER)?;

        let df = self
            .read_csv(normalized)
            .map_err(|e| LoadError::Parse(e.to_string()))?;

        info!("Dataset loaded: {} rows x {} columns", df.height(), df.width());
        Ok(Table::new(df))
    }

    /// Read and parse a CSV file.
    pub fn load_path(&self, path: impl AsRef<Path>) -> Result<Table> {
        let path = path.as_ref();
        info!("Loading dataset from: {}", path.display());
        let bytes = std::fs::read(path)?;
        self.load(&bytes).map_err(ExploreError::from)
    }

    fn read_csv(&self, content: Vec<u8>) -> PolarsResult<DataFrame> {
        let null_values: Vec<PlSmallStr> = self
            .config
            .null_values
            .iter()
            .map(|s| PlSmallStr::from(s.as_str()))
            .collect();
        let null_values = (!null_values.is_empty()).then_some(NullValues::AllColumns(null_values));

        let parse_options = CsvParseOptions::default()
            .with_separator(DELIMITER)
            .with_quote_char(Some(b'"'))
            .with_try_parse_dates(self.config.try_parse_dates)
            .with_null_values(null_values);

        CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(self.config.infer_schema_length)
            .with_parse_options(parse_options)
            .into_reader_with_file_handle(Cursor::new(content))
            .finish()
    }
}

/// Parse CSV bytes with the default configuration.
pub fn load(bytes: &[u8]) -> std::result::Result<Table, LoadError> {
    TableLoader::default().load(bytes)
}

/// Parse CSV bytes with a custom configuration.
pub fn load_with_config(
    bytes: &[u8],
    config: &ExplorerConfig,
) -> std::result::Result<Table, LoadError> {
    TableLoader::new(config.clone()).load(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::ColumnKind;

    #[test]
    fn test_load_infers_numeric_and_text() {
        let table = load(b"age,city\n25,A\n,A\n25,B\n25,A\n").unwrap();
        assert_eq!(table.height(), 4);
        assert_eq!(table.kind("age").unwrap(), ColumnKind::Numeric);
        assert_eq!(table.kind("city").unwrap(), ColumnKind::Text);
        assert_eq!(table.series("age").unwrap().null_count(), 1);
    }

    #[test]
    fn test_load_mixed_values_become_text() {
        // a single non-numeric value late in the file keeps the column textual
        let mut csv = String::from("code\n");
        for i in 0..500 {
            csv.push_str(&format!("{}\n", i));
        }
        csv.push_str("X12\n");
        let table = load(csv.as_bytes()).unwrap();
        assert_eq!(table.kind("code").unwrap(), ColumnKind::Text);
    }

    #[test]
    fn test_load_null_markers() {
        let table = load(b"x,y\n1,NA\nNaN,b\n3,\n").unwrap();
        assert_eq!(table.kind("x").unwrap(), ColumnKind::Numeric);
        assert_eq!(table.series("x").unwrap().null_count(), 1);
        assert_eq!(table.series("y").unwrap().null_count(), 2);
    }

    #[test]
    fn test_load_with_custom_null_markers() {
        let config = ExplorerConfig::builder().null_values(["-"]).build().unwrap();
        let table = load_with_config(b"x\n1\n-\nNA\n", &config).unwrap();
        // "NA" is no longer a marker, so the column stays textual
        assert_eq!(table.kind("x").unwrap(), ColumnKind::Text);
        assert_eq!(table.series("x").unwrap().null_count(), 1);
    }

    #[test]
    fn test_load_boolean_column() {
        let table = load(b"flag\ntrue\nfalse\ntrue\n").unwrap();
        assert_eq!(table.kind("flag").unwrap(), ColumnKind::Boolean);
    }

    #[test]
    fn test_load_strips_bom_and_blank_lines() {
        let mut bytes = UTF8_BOM.to_vec();
        bytes.extend_from_slice(b"a,b\n\n1,2\n\n3,4\n");
        let table = load(&bytes).unwrap();
        assert_eq!(table.column_names(), vec!["a", "b"]);
        assert_eq!(table.height(), 2);
    }

    #[test]
    fn test_load_quoted_fields() {
        let table = load(b"name,score\n\"Smith, J\",1\n\"Doe\",2\n").unwrap();
        assert_eq!(table.height(), 2);
        let names = table.series("name").unwrap();
        assert_eq!(names.str().unwrap().get(0), Some("Smith, J"));
    }

    #[test]
    fn test_load_stray_quote_inside_field() {
        let table = load(b"a,b\n1,x\"y\n2,z\n").unwrap();
        assert_eq!(table.height(), 2);
        let b = table.series("b").unwrap();
        assert_eq!(b.str().unwrap().get(0), Some("x\"y"));
        assert_eq!(b.str().unwrap().get(1), Some("z"));
    }

    #[test]
    fn test_load_header_only() {
        let table = load(b"a,b\n").unwrap();
        assert_eq!(table.height(), 0);
        assert_eq!(table.width(), 2);
    }

    #[test]
    fn test_load_empty_input() {
        assert_eq!(load(b"").unwrap_err(), LoadError::Empty);
        assert_eq!(load(b"  \n\n").unwrap_err(), LoadError::Empty);
    }

    #[test]
    fn test_load_invalid_utf8() {
        let err = load(&[b'a', b'\n', 0xFF, 0xFE]).unwrap_err();
        assert_eq!(err, LoadError::Encoding { offset: 2 });
    }

    #[test]
    fn test_load_ragged_rows() {
        let err = load(b"a,b\n1,2\n3\n").unwrap_err();
        assert_eq!(
            err,
            LoadError::RaggedRow {
                line: 3,
                expected: 2,
                found: 1
            }
        );
    }

    #[test]
    fn test_load_path_missing_file() {
        let err = TableLoader::default()
            .load_path("/definitely/not/here.csv")
            .unwrap_err();
        assert_eq!(err.error_code(), "IO_ERROR");
    }
}
