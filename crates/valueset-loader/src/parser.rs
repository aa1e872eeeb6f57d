//! Generic delimited spreadsheet parser.
//!
//! Provides a streaming parser for spreadsheet exports whose first row is a
//! header. Columns are located by name, so exports with extra or reordered
//! columns still parse.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::marker::PhantomData;
use std::path::Path;

use csv::{Reader, ReaderBuilder, StringRecord};
use tracing::{info, trace};

use crate::types::{LoaderError, LoaderResult, SheetConfig};

/// Trait for types that can be parsed from a spreadsheet row.
pub trait SheetRecord: Sized {
    /// Columns that must be present in the header.
    const REQUIRED_COLUMNS: &'static [&'static str];

    /// Parse a record from a header-indexed row.
    fn from_row(row: &SheetRow<'_>) -> LoaderResult<Self>;
}

/// Normalizes a header name: lowercase ASCII alphanumerics only.
///
/// `"Value Set OID"`, `"value_set_oid"` and `"\u{feff}ValueSetOid"` all
/// normalize to `"valuesetoid"`.
pub fn normalize_column(name: &str) -> String {
    name.chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Header index mapping normalized column names to positions.
#[derive(Debug, Clone, Default)]
pub struct Columns {
    index: HashMap<String, usize>,
}

impl Columns {
    /// Builds the index from a header record. The first occurrence of a name wins.
    pub fn from_header(header: &StringRecord) -> Self {
        let mut index = HashMap::with_capacity(header.len());
        for (position, name) in header.iter().enumerate() {
            index.entry(normalize_column(name)).or_insert(position);
        }
        Self { index }
    }

    /// Returns the position of a column.
    pub fn position(&self, column: &str) -> Option<usize> {
        self.index.get(&normalize_column(column)).copied()
    }

    /// Fails with `MissingColumn` for the first absent column.
    pub fn require(&self, columns: &[&str]) -> LoaderResult<()> {
        match columns.iter().find(|c| self.position(c).is_none()) {
            Some(column) => Err(LoaderError::MissingColumn {
                column: column.to_string(),
            }),
            None => Ok(()),
        }
    }
}

/// A data row with access to fields by column name.
pub struct SheetRow<'a> {
    record: &'a StringRecord,
    columns: &'a Columns,
}

impl<'a> SheetRow<'a> {
    /// Creates a row view.
    pub fn new(record: &'a StringRecord, columns: &'a Columns) -> Self {
        Self { record, columns }
    }

    /// Returns the trimmed field, or `""` when the column or field is absent.
    pub fn get(&self, column: &str) -> &'a str {
        self.columns
            .position(column)
            .and_then(|i| self.record.get(i))
            .map(str::trim)
            .unwrap_or("")
    }

    /// Returns the trimmed field, or `None` when it is absent or empty.
    pub fn optional(&self, column: &str) -> Option<String> {
        let value = self.get(column);
        (!value.is_empty()).then(|| value.to_string())
    }
}

/// A streaming parser for delimited spreadsheet exports.
pub struct SheetParser<R: Read, T: SheetRecord> {
    reader: Reader<R>,
    columns: Columns,
    config: SheetConfig,
    rows_read: usize,
    _marker: PhantomData<T>,
}

impl<T: SheetRecord> SheetParser<BufReader<File>, T> {
    /// Creates a new parser from a file path.
    ///
    /// # Errors
    /// Returns an error if the file cannot be opened or lacks required columns.
    pub fn from_path<P: AsRef<Path>>(path: P, config: SheetConfig) -> LoaderResult<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(LoaderError::FileNotFound {
                path: path.display().to_string(),
            });
        }

        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file), config)
    }
}

impl<R: Read, T: SheetRecord> SheetParser<R, T> {
    /// Creates a new parser from a reader.
    pub fn from_reader(reader: R, config: SheetConfig) -> LoaderResult<Self> {
        let mut csv_reader = ReaderBuilder::new()
            .delimiter(config.delimiter)
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::None)
            .from_reader(reader);

        let columns = Columns::from_header(csv_reader.headers()?);
        columns.require(T::REQUIRED_COLUMNS)?;

        Ok(Self {
            reader: csv_reader,
            columns,
            config,
            rows_read: 0,
            _marker: PhantomData,
        })
    }

    /// Returns the number of data rows read so far, blank rows included.
    pub fn rows_read(&self) -> usize {
        self.rows_read
    }

    /// Parses all records into a Vec, stopping at the first bad row.
    pub fn parse_all(self) -> LoaderResult<Vec<T>> {
        self.collect()
    }

    fn log_row(&self, message: &str) {
        if self.config.verbose {
            info!(row = self.rows_read, "{}", message);
        } else {
            trace!(row = self.rows_read, "{}", message);
        }
    }
}

impl<R: Read, T: SheetRecord> Iterator for SheetParser<R, T> {
    type Item = LoaderResult<T>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let mut record = StringRecord::new();
            match self.reader.read_record(&mut record) {
                Ok(true) => {
                    self.rows_read += 1;

                    if record.iter().all(|f| f.trim().is_empty()) {
                        self.log_row("skipping blank row");
                        continue;
                    }

                    let parsed = T::from_row(&SheetRow::new(&record, &self.columns));
                    if parsed.is_ok() {
                        self.log_row("parsed row");
                    }
                    return Some(parsed);
                }
                Ok(false) => return None,
                Err(e) => return Some(Err(e.into())),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Pair {
        key: String,
        value: Option<String>,
    }

    impl SheetRecord for Pair {
        const REQUIRED_COLUMNS: &'static [&'static str] = &["Key"];

        fn from_row(row: &SheetRow<'_>) -> LoaderResult<Self> {
            Ok(Pair {
                key: row.get("Key").to_string(),
                value: row.optional("Value"),
            })
        }
    }

    #[test]
    fn test_normalize_column() {
        assert_eq!(normalize_column("Value Set OID"), "valuesetoid");
        assert_eq!(normalize_column("value_set_oid"), "valuesetoid");
        assert_eq!(normalize_column("\u{feff}ValueSetOid"), "valuesetoid");
    }

    #[test]
    fn test_columns_located_by_name() {
        let data = "Extra,value,KEY\nx, b ,a\n";
        let parser =
            SheetParser::<_, Pair>::from_reader(data.as_bytes(), SheetConfig::default()).unwrap();
        let rows = parser.parse_all().unwrap();
        assert_eq!(
            rows,
            vec![Pair {
                key: "a".to_string(),
                value: Some("b".to_string()),
            }]
        );
    }

    #[test]
    fn test_missing_required_column() {
        let data = "Value\n1\n";
        let result = SheetParser::<_, Pair>::from_reader(data.as_bytes(), SheetConfig::default());
        match result {
            Err(LoaderError::MissingColumn { column }) => assert_eq!(column, "Key"),
            other => panic!("expected MissingColumn, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_blank_rows_skipped_and_counted() {
        let data = "Key\tValue\n\t\na\t\n\n b \t c\n";
        let mut parser =
            SheetParser::<_, Pair>::from_reader(data.as_bytes(), SheetConfig::tab_delimited())
                .unwrap();
        let first = parser.next().unwrap().unwrap();
        assert_eq!(first.key, "a");
        assert_eq!(first.value, None);
        let second = parser.next().unwrap().unwrap();
        assert_eq!(second.key, "b");
        assert!(parser.next().is_none());
        assert_eq!(parser.rows_read(), 3);
    }

    #[test]
    fn test_from_path_missing_file() {
        let result = SheetParser::<_, Pair>::from_path(
            "/nonexistent/value_sets.csv",
            SheetConfig::default(),
        );
        assert!(matches!(result, Err(LoaderError::FileNotFound { .. })));
    }
}
