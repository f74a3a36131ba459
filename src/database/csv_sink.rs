//! CSV export of extracted ad details

use std::collections::HashSet;
use std::io::ErrorKind;
use std::path::PathBuf;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::info;

use crate::models::DetailRecord;
use crate::traits::RecordSink;

/// Keeps a CSV file with columns `url, price, expenses, neighbourhood,
/// surface, rooms`, one row per ad URL.
pub struct CsvSink {
    path: PathBuf,
}

impl CsvSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub async fn load(&self) -> Result<Vec<DetailRecord>> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("Failed to read {}", self.path.display()));
            }
        };

        let mut reader = csv::Reader::from_reader(bytes.as_slice());
        reader
            .deserialize()
            .collect::<Result<Vec<DetailRecord>, _>>()
            .with_context(|| format!("Malformed CSV in {}", self.path.display()))
    }
}

#[async_trait]
impl RecordSink for CsvSink {
    fn name(&self) -> &'static str {
        "csv"
    }

    async fn append(&self, records: &[DetailRecord]) -> Result<()> {
        if records.is_empty() {
            return Ok(());
        }

        // Within the batch the last record for a url wins
        let mut batch_urls = HashSet::new();
        let mut incoming: Vec<&DetailRecord> = records
            .iter()
            .rev()
            .filter(|record| batch_urls.insert(record.url.as_str()))
            .collect();
        incoming.reverse();

        let existing = self.load().await?;
        let kept = existing
            .iter()
            .filter(|record| !batch_urls.contains(record.url.as_str()));

        let mut writer = csv::Writer::from_writer(Vec::new());
        for record in kept.chain(incoming) {
            writer.serialize(record)?;
        }
        let bytes = writer.into_inner().context("Failed to flush CSV writer")?;

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&self.path, bytes)
            .await
            .with_context(|| format!("Failed to write {}", self.path.display()))?;

        info!(
            "Appended {} properties to {}",
            records.len(),
            self.path.display()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn record(url: &str, rooms: Option<&str>) -> DetailRecord {
        DetailRecord {
            url: url.to_string(),
            rooms: rooms.map(str::to_string),
            ..DetailRecord::default()
        }
    }

    #[tokio::test]
    async fn test_header_and_empty_fields() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out").join("scraped_properties.csv");
        let sink = CsvSink::new(&path);

        sink.append(&[record("u1", Some("2"))]).await.unwrap();

        let contents = tokio::fs::read_to_string(&path).await.unwrap();
        assert_eq!(
            contents,
            "url,price,expenses,neighbourhood,surface,rooms\nu1,,,,,2\n"
        );
        assert_eq!(sink.load().await.unwrap(), vec![record("u1", Some("2"))]);
    }

    #[tokio::test]
    async fn test_reappended_url_replaces_row() {
        let dir = TempDir::new().unwrap();
        let sink = CsvSink::new(dir.path().join("scraped_properties.csv"));

        sink.append(&[record("u1", Some("2")), record("u2", None)])
            .await
            .unwrap();
        sink.append(&[record("u1", Some("3")), record("u3", None), record("u3", Some("1"))])
            .await
            .unwrap();

        assert_eq!(
            sink.load().await.unwrap(),
            vec![
                record("u2", None),
                record("u1", Some("3")),
                record("u3", Some("1")),
            ]
        );
    }
}
