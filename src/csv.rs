//! Minimal CSV/TSV loader that produces a schema and a [`LocalDataSource`].
//!
//! The first non-empty line is the header row.

use crate::data::{schema_from_headers, LocalDataSource};
use crate::error::{GridError, Result};
use crate::types::{CellValue, ColumnSchema};

/// Delimiter for parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delimiter {
    Comma,
    Tab,
}

impl Delimiter {
    /// Pick a delimiter from a file name, defaulting to comma.
    pub fn from_path(path: &str) -> Self {
        if path.ends_with(".tsv") || path.ends_with(".tab") {
            Self::Tab
        } else {
            Self::Comma
        }
    }

    fn as_char(self) -> char {
        match self {
            Self::Comma => ',',
            Self::Tab => '\t',
        }
    }
}

/// A loaded table
#[derive(Debug, Clone)]
pub struct Table {
    pub schema: Vec<ColumnSchema>,
    pub data: LocalDataSource,
}

/// Parse CSV/TSV bytes into a schema plus typed rows.
///
/// # Errors
/// Returns [`GridError::Csv`] if a quoted field is never closed.
pub fn parse_delimited(data: &[u8], delim: Delimiter) -> Result<Table> {
    let text = String::from_utf8_lossy(data);
    let sep = delim.as_char();

    let mut lines = text
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty());

    let headers = match lines.next() {
        Some((line_no, line)) => split_csv_line(line, sep, line_no)?,
        None => Vec::new(),
    };
    let schema = schema_from_headers(&headers);

    let mut table = LocalDataSource::new();
    for (line_no, line) in lines {
        let mut row: Vec<CellValue> = split_csv_line(line, sep, line_no)?
            .iter()
            .map(|field| CellValue::parse(field))
            .collect();
        row.resize(schema.len().max(row.len()), CellValue::Empty);
        table.push_row(row);
    }

    tracing::debug!(
        target: "vgrid::csv",
        columns = schema.len(),
        "loaded delimited table"
    );
    Ok(Table {
        schema,
        data: table,
    })
}

/// Split a CSV line respecting quoted fields.
fn split_csv_line(line: &str, sep: char, line_no: usize) -> Result<Vec<String>> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(ch) = chars.next() {
        if in_quotes {
            if ch == '"' {
                if chars.peek() == Some(&'"') {
                    // Escaped quote
                    current.push('"');
                    chars.next();
                } else {
                    in_quotes = false;
                }
            } else {
                current.push(ch);
            }
        } else if ch == '"' {
            in_quotes = true;
        } else if ch == sep {
            fields.push(std::mem::take(&mut current));
        } else {
            current.push(ch);
        }
    }
    if in_quotes {
        return Err(GridError::Csv(format!(
            "unterminated quote on line {}",
            line_no + 1
        )));
    }
    fields.push(current);
    Ok(fields)
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp
)]
mod tests {
    use super::*;
    use crate::data::DataSource;

    #[test]
    fn test_parse_csv_basic() {
        let data = b"Name,Age,City\nAlice,30,NYC\nBob,25,LA";
        let table = parse_delimited(data, Delimiter::Comma).unwrap();
        assert_eq!(table.schema.len(), 3);
        assert_eq!(table.schema[1].name, "Age");
        assert_eq!(table.data.row_count(), 2);
        assert_eq!(table.data.get_value(0, 0), CellValue::Text("Alice".into()));
        assert_eq!(table.data.get_value(1, 1), CellValue::Number(25.0));
    }

    #[test]
    fn test_parse_tsv() {
        let data = b"A\tB\n1\t2";
        let table = parse_delimited(data, Delimiter::Tab).unwrap();
        assert_eq!(table.schema.len(), 2);
        assert_eq!(table.data.get_value(1, 0), CellValue::Number(2.0));
    }

    #[test]
    fn test_quoted_csv() {
        let data = b"a,b\n\"Hello, World\",42\n\"She said \"\"hi\"\"\",0";
        let table = parse_delimited(data, Delimiter::Comma).unwrap();
        assert_eq!(
            table.data.get_value(0, 0),
            CellValue::Text("Hello, World".into())
        );
        assert_eq!(
            table.data.get_value(0, 1),
            CellValue::Text("She said \"hi\"".into())
        );
    }

    #[test]
    fn test_short_rows_are_padded() {
        let table = parse_delimited(b"a,b,c\n1", Delimiter::Comma).unwrap();
        assert_eq!(table.data.get_value(2, 0), CellValue::Empty);
    }

    #[test]
    fn test_unterminated_quote_is_an_error() {
        let err = parse_delimited(b"a,b\n\"open,1", Delimiter::Comma).unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn test_empty_csv() {
        let table = parse_delimited(b"", Delimiter::Comma).unwrap();
        assert!(table.schema.is_empty());
        assert_eq!(table.data.row_count(), 0);
    }
}
