use crate::core::{Storage, Table};
use crate::utils::error::{ReporterError, Result};

/// Writes tables as `{name}.csv` through a [`Storage`] backend.
pub struct CsvSink<S: Storage> {
    storage: S,
}

impl<S: Storage> CsvSink<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    /// Encodes `table` and writes it, replacing any file with the same name.
    /// Returns the path that was written.
    pub async fn write(&self, table: &Table, destination_name: &str) -> Result<String> {
        let data = encode(table)?;
        let file_name = format!("{}.csv", destination_name);

        tracing::debug!(
            "Writing {} rows ({} bytes) to {}",
            table.rows.len(),
            data.len(),
            file_name
        );
        self.storage.write_file(&file_name, &data).await
    }
}

/// Standard CSV quoting: cells holding a comma, quote or line break are
/// quoted and embedded quotes are doubled.
pub fn encode(table: &Table) -> Result<Vec<u8>> {
    // 沒有欄位時整個檔案為空，零寬度的資料列也不輸出
    if table.header.is_empty() {
        return Ok(Vec::new());
    }

    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    writer.write_record(&table.header)?;
    for row in &table.rows {
        writer.write_record(row)?;
    }

    writer
        .into_inner()
        .map_err(|e| ReporterError::IoError(e.into_error()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{tabulator, ColumnPolicy, Record};
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    #[derive(Clone)]
    struct MockStorage {
        files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    }

    impl MockStorage {
        fn new() -> Self {
            Self {
                files: Arc::new(Mutex::new(HashMap::new())),
            }
        }

        async fn get_file(&self, path: &str) -> Option<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned()
        }
    }

    impl Storage for MockStorage {
        async fn write_file(&self, path: &str, data: &[u8]) -> Result<String> {
            let mut files = self.files.lock().await;
            files.insert(path.to_string(), data.to_vec());
            Ok(path.to_string())
        }
    }

    fn table(header: &[&str], rows: &[&[&str]]) -> Table {
        Table {
            header: header.iter().map(|s| s.to_string()).collect(),
            rows: rows
                .iter()
                .map(|row| row.iter().map(|s| s.to_string()).collect())
                .collect(),
        }
    }

    #[test]
    fn test_encode_quotes_special_cells() {
        let t = table(&["Name", "Note"], &[&["a,b", "say \"hi\""], &["plain", "two\nlines"]]);

        let text = String::from_utf8(encode(&t).unwrap()).unwrap();

        assert_eq!(
            text,
            "Name,Note\n\"a,b\",\"say \"\"hi\"\"\"\nplain,\"two\nlines\"\n"
        );
    }

    #[test]
    fn test_encode_round_trips_through_reader() {
        let t = table(
            &["Database", "ContentType"],
            &[&["uploads", "text/csv; charset=\"utf-8\""], &["a,b", "x\r\ny"], &["", ""]],
        );

        let data = encode(&t).unwrap();
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(data.as_slice());

        let header: Vec<String> = reader.headers().unwrap().iter().map(str::to_string).collect();
        let rows: Vec<Vec<String>> = reader
            .records()
            .map(|r| r.unwrap().iter().map(str::to_string).collect())
            .collect();

        assert_eq!(header, t.header);
        assert_eq!(rows, t.rows);
    }

    #[test]
    fn test_encode_empty_table_is_empty() {
        assert!(encode(&Table::default()).unwrap().is_empty());
    }

    #[test]
    fn test_encode_zero_width_rows_is_empty() {
        let records = vec![Record::new(), Record::new().with("a", 1i64)];
        let t = tabulator::build(&records, &ColumnPolicy::DeriveFromFirst);

        assert_eq!(t.rows.len(), 2);
        assert!(encode(&t).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_write_appends_csv_suffix() {
        let storage = MockStorage::new();
        let sink = CsvSink::new(storage.clone());
        let t = table(&["Name"], &[&["zebra"]]);

        let path = sink.write(&t, "billing_clusterinfo_20240115103000").await.unwrap();

        assert_eq!(path, "billing_clusterinfo_20240115103000.csv");
        let data = storage.get_file(&path).await.unwrap();
        assert_eq!(String::from_utf8(data).unwrap(), "Name\nzebra\n");
    }
}
