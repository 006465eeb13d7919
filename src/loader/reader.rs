//! Line-by-line reader for JSON Lines exports.
//!
//! Only one line is held in memory at a time, so exports larger than RAM
//! stream through.

use super::record::BigtableRecord;
use crate::error::{KitError, Result};
use std::path::Path;
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, BufReader};

/// One item produced by the reader.
#[derive(Debug)]
pub enum ReadItem {
    /// A parsed record with its 1-based line number.
    Record {
        record: BigtableRecord,
        line_number: usize,
    },
    /// A line that was not valid UTF-8 or not valid JSON for a record.
    Malformed { line_number: usize, message: String },
}

/// Streams records from a JSON Lines file.
pub struct RecordReader {
    input: BufReader<File>,
    buf: Vec<u8>,
    file_size: u64,
    bytes_read: u64,
    line_number: usize,
}

impl RecordReader {
    /// Opens `path` for streaming.
    pub async fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .await
            .map_err(|e| KitError::input(format!("Cannot open {}: {e}", path.display())))?;
        let file_size = file.metadata().await?.len();

        Ok(Self {
            input: BufReader::new(file),
            buf: Vec::new(),
            file_size,
            bytes_read: 0,
            line_number: 0,
        })
    }

    /// Returns the next non-blank line as a record, or `None` at end of file.
    pub async fn next_item(&mut self) -> Result<Option<ReadItem>> {
        loop {
            self.buf.clear();
            let read = self.input.read_until(b'\n', &mut self.buf).await?;
            if read == 0 {
                return Ok(None);
            }
            self.line_number += 1;
            self.bytes_read += read as u64;

            let line = match std::str::from_utf8(&self.buf) {
                Ok(line) => line,
                Err(e) => {
                    return Ok(Some(ReadItem::Malformed {
                        line_number: self.line_number,
                        message: format!("Malformed JSON on line {}: {e}", self.line_number),
                    }));
                }
            };

            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            let item = match serde_json::from_str::<BigtableRecord>(trimmed) {
                Ok(record) => ReadItem::Record {
                    record,
                    line_number: self.line_number,
                },
                Err(e) => ReadItem::Malformed {
                    line_number: self.line_number,
                    message: format!("Malformed JSON on line {}: {e}", self.line_number),
                },
            };
            return Ok(Some(item));
        }
    }

    /// Percentage of the file consumed so far.
    pub fn progress(&self) -> f64 {
        if self.file_size == 0 {
            return 100.0;
        }
        (self.bytes_read.min(self.file_size) as f64 / self.file_size as f64) * 100.0
    }

    /// Number of lines consumed so far, blank ones included.
    pub fn lines_read(&self) -> usize {
        self.line_number
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_export(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[tokio::test]
    async fn test_reads_records_and_skips_blank_lines() {
        let file = write_export(
            "{\"row_key\":\"a\",\"cells\":[]}\n\n   \n{\"row_key\":\"b\",\"cells\":[]}\n",
        );
        let mut reader = RecordReader::open(file.path()).await.unwrap();

        match reader.next_item().await.unwrap() {
            Some(ReadItem::Record {
                record,
                line_number,
            }) => {
                assert_eq!(record.row_key.as_deref(), Some("a"));
                assert_eq!(line_number, 1);
            }
            other => panic!("unexpected item: {other:?}"),
        }

        match reader.next_item().await.unwrap() {
            Some(ReadItem::Record { line_number, .. }) => assert_eq!(line_number, 4),
            other => panic!("unexpected item: {other:?}"),
        }

        assert!(reader.next_item().await.unwrap().is_none());
        assert_eq!(reader.lines_read(), 4);
        assert!((reader.progress() - 100.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_malformed_line_is_reported() {
        let file = write_export("{not json}\n{\"row_key\":\"ok\"}");
        let mut reader = RecordReader::open(file.path()).await.unwrap();

        match reader.next_item().await.unwrap() {
            Some(ReadItem::Malformed {
                line_number,
                message,
            }) => {
                assert_eq!(line_number, 1);
                assert!(message.starts_with("Malformed JSON on line 1:"));
            }
            other => panic!("unexpected item: {other:?}"),
        }

        assert!(matches!(
            reader.next_item().await.unwrap(),
            Some(ReadItem::Record { .. })
        ));
        assert!(reader.progress() > 99.0);
    }

    #[tokio::test]
    async fn test_invalid_utf8_line_is_malformed() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"{\"row_key\":\"a\",\"cells\":[]}\n\xff\xfe garbage\n{\"row_key\":\"b\",\"cells\":[]}\n")
            .unwrap();
        file.flush().unwrap();
        let mut reader = RecordReader::open(file.path()).await.unwrap();

        assert!(matches!(
            reader.next_item().await.unwrap(),
            Some(ReadItem::Record { line_number: 1, .. })
        ));
        match reader.next_item().await.unwrap() {
            Some(ReadItem::Malformed {
                line_number,
                message,
            }) => {
                assert_eq!(line_number, 2);
                assert!(message.starts_with("Malformed JSON on line 2:"));
            }
            other => panic!("unexpected item: {other:?}"),
        }
        assert!(matches!(
            reader.next_item().await.unwrap(),
            Some(ReadItem::Record { line_number: 3, .. })
        ));
        assert!(reader.next_item().await.unwrap().is_none());
        assert!((reader.progress() - 100.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_missing_file_is_input_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = RecordReader::open(&dir.path().join("absent.json"))
            .await
            .err()
            .unwrap();
        assert_eq!(err.category(), "Input Error");
    }
}
