//! CSV-backed student file
//!
//! An append/read sidecar over a plain delimited text file with a header
//! row. Appends are serialized through a mutex so concurrent requests cannot
//! interleave at the byte level; the read path parses whatever is on disk.

use crate::error::AppError;
use serde_json::{Map, Value};
use std::path::PathBuf;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

pub struct StudentFile {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl StudentFile {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            write_lock: Mutex::new(()),
        }
    }

    /// Append one row: a leading newline plus the comma-joined values, the
    /// same byte layout the source service produced.
    pub async fn append_row(&self, line: &str) -> Result<(), AppError> {
        let _guard = self.write_lock.lock().await;
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(format!("\n{}", line).as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }

    /// Read every row, with field names taken from the header row
    pub async fn read_all(&self) -> Result<Vec<Map<String, Value>>, AppError> {
        let contents = tokio::fs::read(&self.path).await?;
        parse_rows(&contents)
    }
}

/// Parse delimited bytes into header-keyed rows. Short rows are tolerated
/// (the writer never quotes, so ragged lines can occur).
fn parse_rows(contents: &[u8]) -> Result<Vec<Map<String, Value>>, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(contents);

    let headers = reader.headers()?.clone();
    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let mut row = Map::new();
        for (i, header) in headers.iter().enumerate() {
            let value = record.get(i).unwrap_or_default();
            row.insert(header.to_string(), Value::String(value.to_string()));
        }
        rows.push(row);
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn temp_csv(contents: &str) -> (tempfile::TempDir, StudentFile) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("students5.csv");
        std::fs::write(&path, contents).unwrap();
        (dir, StudentFile::new(path))
    }

    const HEADER: &str = "Nombre,Apellido,Calificacion,PuntosExtras";

    #[tokio::test]
    async fn read_all_keys_rows_by_header() {
        let (_dir, file) = temp_csv(&format!("{}\nAna,Diaz,9,0", HEADER));
        let rows = file.read_all().await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["Nombre"], json!("Ana"));
        assert_eq!(rows[0]["PuntosExtras"], json!("0"));
    }

    #[tokio::test]
    async fn append_then_read_includes_new_row() {
        let (_dir, file) = temp_csv(&format!("{}\nLuis,Mora,8,2", HEADER));
        file.append_row("Ana,Diaz,9,0").await.unwrap();

        let rows = file.read_all().await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1]["Apellido"], json!("Diaz"));
        assert_eq!(rows[1]["Calificacion"], json!("9"));
    }

    #[tokio::test]
    async fn read_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let file = StudentFile::new(dir.path().join("nope.csv"));
        assert!(file.read_all().await.is_err());
    }

    #[test]
    fn short_rows_fill_missing_fields_with_empty() {
        let rows = parse_rows(format!("{}\nAna,Diaz,9", HEADER).as_bytes()).unwrap();
        assert_eq!(rows[0]["PuntosExtras"], json!(""));
    }
}
