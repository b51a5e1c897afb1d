//! Minimal RFC 4180 CSV reading and writing
//!
//! Ground-truth records and generated query tables are small, header-indexed
//! CSV files. Quoted fields may contain commas, doubled quotes and line breaks.

use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CsvError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("unterminated quoted field starting on line {0}")]
    UnterminatedQuote(usize),
    #[error("row {row} has {found} fields, header has {expected}")]
    RaggedRow {
        row: usize,
        found: usize,
        expected: usize,
    },
    #[error("file has no header row")]
    MissingHeader,
}

/// A parsed CSV file: header plus data rows of equal width
#[derive(Debug, Clone, Default)]
pub struct CsvTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl CsvTable {
    pub fn read_path(path: &Path) -> Result<Self, CsvError> {
        let text = std::fs::read_to_string(path).map_err(|source| CsvError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse(&text)
    }

    pub fn parse(text: &str) -> Result<Self, CsvError> {
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);
        let mut records = parse_records(text)?.into_iter();

        let headers: Vec<String> = records
            .next()
            .ok_or(CsvError::MissingHeader)?
            .into_iter()
            .map(|h| h.trim().to_string())
            .collect();

        let mut rows = Vec::new();
        for (i, record) in records.enumerate() {
            if record.len() != headers.len() {
                return Err(CsvError::RaggedRow {
                    row: i + 1,
                    found: record.len(),
                    expected: headers.len(),
                });
            }
            rows.push(record);
        }

        Ok(Self { headers, rows })
    }

    /// Index of the named column
    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// All values of the named column, in row order
    pub fn column_values(&self, name: &str) -> Option<Vec<&str>> {
        let idx = self.column(name)?;
        Some(self.rows.iter().map(|r| r[idx].as_str()).collect())
    }
}

/// Split text into records, dropping blank lines outside quotes
fn parse_records(text: &str) -> Result<Vec<Vec<String>>, CsvError> {
    let mut records = Vec::new();
    let mut record: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut quote_line = 0;
    let mut line = 1;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if matches!(chars.peek(), Some('"')) => {
                    chars.next();
                    field.push('"');
                }
                '"' => in_quotes = false,
                '\n' => {
                    line += 1;
                    field.push(c);
                }
                _ => field.push(c),
            }
            continue;
        }

        match c {
            '"' if field.is_empty() => {
                in_quotes = true;
                quote_line = line;
            }
            ',' => record.push(std::mem::take(&mut field)),
            '\r' if matches!(chars.peek(), Some('\n')) => {}
            '\n' => {
                line += 1;
                finish_record(&mut records, &mut record, &mut field);
            }
            _ => field.push(c),
        }
    }

    if in_quotes {
        return Err(CsvError::UnterminatedQuote(quote_line));
    }
    finish_record(&mut records, &mut record, &mut field);

    Ok(records)
}

fn finish_record(records: &mut Vec<Vec<String>>, record: &mut Vec<String>, field: &mut String) {
    if record.is_empty() && field.is_empty() {
        return;
    }
    record.push(std::mem::take(field));
    records.push(std::mem::take(record));
}

/// Quote a field when it contains a delimiter, quote or line break
pub fn escape_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Append one CSV row (terminated by `\n`) to `out`
pub fn write_row<S: AsRef<str>>(out: &mut String, fields: &[S]) {
    let line = fields
        .iter()
        .map(|f| escape_field(f.as_ref()))
        .collect::<Vec<_>>()
        .join(",");
    out.push_str(&line);
    out.push('\n');
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_table() {
        let table = CsvTable::parse("level,component,timestamp,reason\nnode,os_018,1614841200,CPU fault\n")
            .unwrap();
        assert_eq!(table.headers, vec!["level", "component", "timestamp", "reason"]);
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.column("timestamp"), Some(2));
        assert_eq!(
            table.column_values("component").unwrap(),
            vec!["os_018"]
        );
        assert!(table.column("missing").is_none());
    }

    #[test]
    fn test_parse_quoted_fields() {
        let text = "a,b\n\"x, y\",\"say \"\"hi\"\"\nthere\"\r\n\n";
        let table = CsvTable::parse(text).unwrap();
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.rows[0][0], "x, y");
        assert_eq!(table.rows[0][1], "say \"hi\"\nthere");
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            CsvTable::parse("a,b\n\"open,1\n"),
            Err(CsvError::UnterminatedQuote(2))
        ));
        assert!(matches!(
            CsvTable::parse("a,b\n1,2,3\n"),
            Err(CsvError::RaggedRow { row: 1, found: 3, expected: 2 })
        ));
        assert!(matches!(CsvTable::parse(""), Err(CsvError::MissingHeader)));
    }

    #[test]
    fn test_write_row_quotes_when_needed() {
        let mut out = String::new();
        write_row(&mut out, &["task_1", "line one\nline two", "a \"quoted\" word", "plain"]);
        assert_eq!(
            out,
            "task_1,\"line one\nline two\",\"a \"\"quoted\"\" word\",plain\n"
        );

        let table = CsvTable::parse(&format!("a,b,c,d\n{}", out)).unwrap();
        assert_eq!(table.rows[0][1], "line one\nline two");
        assert_eq!(table.rows[0][2], "a \"quoted\" word");
    }
}
