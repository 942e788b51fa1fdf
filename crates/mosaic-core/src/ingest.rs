//! CSV ingestion: delimited text → raw rows → normalized records.
//!
//! Failures here are load failures; nothing partial is returned.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::config::MosaicConfig;
use crate::error::{MosaicError, MosaicResult};
use crate::record::{normalize_row, ColumnMap, RawRow, Record};

fn decode(cell: &[u8]) -> String {
    String::from_utf8_lossy(cell).into_owned()
}

/// Read every data row under the header. Cells are trimmed; short rows are
/// padded with empty cells. Bytes that are not valid UTF-8 decode to U+FFFD
/// instead of failing the load.
pub fn read_rows<R: Read>(reader: R, delimiter: u8) -> MosaicResult<(Vec<String>, Vec<RawRow>)> {
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let headers: Vec<String> = rdr.byte_headers()?.iter().map(decode).collect();
    if headers.iter().all(|h| h.is_empty()) {
        return Err(MosaicError::missing_column("header row"));
    }

    let mut rows = Vec::new();
    for result in rdr.byte_records() {
        let record = result?;
        if std::str::from_utf8(record.as_slice()).is_err() {
            let line = record.position().map(|p| p.line());
            tracing::debug!(line = ?line, "invalid utf-8 replaced");
        }
        let row: RawRow = headers
            .iter()
            .enumerate()
            .map(|(i, h)| (h.clone(), record.get(i).map(decode).unwrap_or_default()))
            .collect();
        rows.push(row);
    }
    Ok((headers, rows))
}

fn check_columns(headers: &[String], columns: &ColumnMap) -> MosaicResult<()> {
    match columns.required().into_iter().find(|c| !headers.iter().any(|h| h == c)) {
        Some(missing) => Err(MosaicError::missing_column(missing)),
        None => Ok(()),
    }
}

/// Parse and normalize delimited text.
pub fn read_records<R: Read>(reader: R, cfg: &MosaicConfig) -> MosaicResult<Vec<Record>> {
    let (headers, rows) = read_rows(reader, cfg.delimiter_byte())?;
    check_columns(&headers, &cfg.columns)?;

    let mut records = Vec::with_capacity(rows.len());
    for (i, row) in rows.iter().enumerate() {
        match normalize_row(row, &cfg.columns) {
            Some(record) => {
                if !record.qualifies() {
                    tracing::debug!(
                        row = i + 1,
                        country = %record.country,
                        gdp = record.gdp,
                        "record excluded: no positive gdp"
                    );
                }
                records.push(record);
            }
            None => tracing::debug!(row = i + 1, "record dropped: blank row"),
        }
    }
    let qualifying = records.iter().filter(|r| r.qualifies()).count();
    tracing::info!(rows = rows.len(), records = records.len(), qualifying, "records loaded");
    Ok(records)
}

pub fn parse_records(text: &str, cfg: &MosaicConfig) -> MosaicResult<Vec<Record>> {
    read_records(text.as_bytes(), cfg)
}

pub fn load_records(path: impl AsRef<Path>, cfg: &MosaicConfig) -> MosaicResult<Vec<Record>> {
    let path = path.as_ref();
    tracing::debug!(path = %path.display(), "opening data file");
    read_records(File::open(path)?, cfg)
}
