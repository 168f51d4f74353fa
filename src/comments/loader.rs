// Spreadsheet loading: .xlsx/.xls/.ods through calamine, .csv through csv.
//
// The first worksheet's first row is the header. Every cell is coerced to a
// string; the comment column becomes CommentRecord::comment_text and all other
// columns ride along in CommentRecord::extra.

use std::path::Path;

use calamine::{open_workbook_auto, DataType, Reader};
use tracing::{debug, info, warn};

use super::record::{CommentRecord, CommentTable, COMMENT_COLUMN};
use crate::error::{Error, Result};

/// Loader behavior switches.
#[derive(Debug, Clone, Copy)]
pub struct LoadOptions {
    /// Fail with DataLoad when `comment_text` is absent. When false the table
    /// loads with empty comments and topic fitting is skipped downstream.
    pub require_comment_column: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            require_comment_column: true,
        }
    }
}

/// Load a comment table, requiring the `comment_text` column.
pub fn load(path: &Path) -> Result<CommentTable> {
    load_with(path, LoadOptions::default())
}

/// Load a comment table with explicit options.
pub fn load_with(path: &Path, options: LoadOptions) -> Result<CommentTable> {
    if !path.exists() {
        return Err(Error::data_load(path, "file not found"));
    }

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    let (headers, rows) = match extension.as_str() {
        "csv" => read_csv(path)?,
        "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => read_workbook(path)?,
        other => {
            return Err(Error::data_load(
                path,
                format!("unsupported file type '{other}' (expected .xlsx, .xls, .ods or .csv)"),
            ))
        }
    };

    let table = build_table(path, headers, rows, options)?;
    info!(
        rows = table.len(),
        columns = table.columns.len(),
        path = %path.display(),
        "Loaded comment data"
    );
    Ok(table)
}

fn read_workbook(path: &Path) -> Result<(Vec<String>, Vec<Vec<String>>)> {
    let mut workbook = open_workbook_auto(path)
        .map_err(|e| Error::data_load(path, format!("unable to open workbook: {e}")))?;

    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| Error::data_load(path, "workbook contains no worksheets"))?;

    let range = workbook
        .worksheet_range(&sheet_name)
        .ok_or_else(|| Error::data_load(path, format!("worksheet '{sheet_name}' not found")))?
        .map_err(|e| Error::data_load(path, format!("unable to read worksheet: {e}")))?;

    let mut rows_iter = range.rows();
    let headers: Vec<String> = rows_iter
        .next()
        .ok_or_else(|| Error::data_load(path, "worksheet is empty"))?
        .iter()
        .map(|cell| cell_to_string(cell).trim().to_string())
        .collect();

    let rows = rows_iter
        .map(|row| row.iter().map(cell_to_string).collect())
        .collect();

    debug!(sheet = %sheet_name, "Read worksheet");
    Ok((headers, rows))
}

fn read_csv(path: &Path) -> Result<(Vec<String>, Vec<Vec<String>>)> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .map_err(|e| Error::data_load(path, format!("unable to open CSV: {e}")))?;

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| Error::data_load(path, format!("unable to read CSV header: {e}")))?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    if headers.iter().all(String::is_empty) {
        return Err(Error::data_load(path, "CSV file has no header row"));
    }

    let mut rows = Vec::new();
    for (i, record) in reader.records().enumerate() {
        let record = record.map_err(|e| {
            Error::data_load(path, format!("malformed CSV record {}: {e}", i + 1))
        })?;
        rows.push(record.iter().map(str::to_string).collect());
    }

    Ok((headers, rows))
}

/// Cell values are kept as-is; only header names are trimmed.
fn cell_to_string(cell: &DataType) -> String {
    match cell {
        DataType::Empty => String::new(),
        _ => cell.to_string(),
    }
}

fn build_table(
    path: &Path,
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
    options: LoadOptions,
) -> Result<CommentTable> {
    let comment_idx = headers.iter().position(|h| h == COMMENT_COLUMN);

    if comment_idx.is_none() {
        if options.require_comment_column {
            return Err(Error::data_load(
                path,
                format!("missing required column '{COMMENT_COLUMN}'"),
            ));
        }
        warn!(
            path = %path.display(),
            "No '{COMMENT_COLUMN}' column; loading without comments"
        );
    }

    let records = rows
        .into_iter()
        .filter(|values| values.iter().any(|v| !v.is_empty()))
        .map(|values| {
            let comment = comment_idx
                .and_then(|idx| values.get(idx).cloned())
                .unwrap_or_default();
            let mut record = CommentRecord::new(comment);
            for (idx, header) in headers.iter().enumerate() {
                if Some(idx) == comment_idx || header.is_empty() {
                    continue;
                }
                let value = values.get(idx).cloned().unwrap_or_default();
                record.extra.insert(header.clone(), value);
            }
            record
        })
        .collect();

    let columns = headers.into_iter().filter(|h| !h.is_empty()).collect();
    Ok(CommentTable::new(columns, records))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_build_table_splits_comment_and_extra() {
        let table = build_table(
            Path::new("x.csv"),
            headers(&["author", "comment_text"]),
            vec![vec!["ann".into(), "nice".into()]],
            LoadOptions::default(),
        )
        .unwrap();

        assert_eq!(table.rows[0].comment_text, "nice");
        assert_eq!(table.rows[0].extra["author"], "ann");
        assert!(!table.rows[0].extra.contains_key("comment_text"));
    }

    #[test]
    fn test_build_table_skips_blank_rows_and_pads_short_rows() {
        let table = build_table(
            Path::new("x.csv"),
            headers(&["comment_text", "likes"]),
            vec![
                vec!["".into(), "".into()],
                vec!["only comment".into()],
            ],
            LoadOptions::default(),
        )
        .unwrap();

        assert_eq!(table.len(), 1);
        assert_eq!(table.rows[0].extra["likes"], "");
    }

    #[test]
    fn test_build_table_strict_missing_column_fails() {
        let err = build_table(
            Path::new("x.csv"),
            headers(&["text"]),
            vec![vec!["hi".into()]],
            LoadOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, Error::DataLoad { .. }));
    }

    #[test]
    fn test_build_table_lenient_missing_column_loads() {
        let table = build_table(
            Path::new("x.csv"),
            headers(&["text"]),
            vec![vec!["hi".into()]],
            LoadOptions {
                require_comment_column: false,
            },
        )
        .unwrap();
        assert_eq!(table.len(), 1);
        assert!(!table.has_comment_column());
        assert_eq!(table.rows[0].comment_text, "");
    }

    #[test]
    fn test_cell_to_string_coerces_numbers() {
        assert_eq!(cell_to_string(&DataType::Float(3.0)), "3");
        assert_eq!(cell_to_string(&DataType::Int(7)), "7");
        assert_eq!(cell_to_string(&DataType::Empty), "");
        assert_eq!(cell_to_string(&DataType::String("  hi ".into())), "  hi ");
    }
}
