// src/exports/mod.rs

//! CSV export store.
//!
//! Writes finished lead runs to a flat directory of CSV files and serves
//! the listing/read/delete operations the job surface exposes. Writes are
//! atomic (temp file + rename) so a listing never sees a half-written
//! export.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};
use crate::models::LeadRecord;
use crate::utils::slugify;

/// Metadata for one export file.
#[derive(Debug, Clone, Serialize)]
pub struct ExportEntry {
    pub name: String,
    pub size_bytes: u64,
    pub modified: DateTime<Utc>,
}

/// Flat-directory store for exported CSV files.
#[derive(Clone)]
pub struct ExportStore {
    root: PathBuf,
}

impl ExportStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Write a finished run as a CSV file and return its name.
    pub async fn write_records(&self, query: &str, records: &[LeadRecord]) -> Result<String> {
        let name = format!(
            "leads_{}_{}.csv",
            slugify(query),
            Utc::now().format("%Y%m%d_%H%M%S")
        );

        let mut out = String::new();
        out.push_str(&LeadRecord::HEADERS.join(","));
        out.push('\n');
        for record in records {
            let row: Vec<String> = record.row().iter().map(|field| escape_csv(field)).collect();
            out.push_str(&row.join(","));
            out.push('\n');
        }

        self.write_atomic(&name, out.as_bytes()).await?;
        Ok(name)
    }

    /// List exports, newest first.
    pub async fn list(&self) -> Result<Vec<ExportEntry>> {
        let mut entries = Vec::new();

        let mut dir = match tokio::fs::read_dir(&self.root).await {
            Ok(dir) => dir,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(entries),
            Err(e) => return Err(AppError::Io(e)),
        };

        while let Some(entry) = dir.next_entry().await? {
            let name = entry.file_name().to_string_lossy().to_string();
            if !name.ends_with(".csv") {
                continue;
            }
            let metadata = entry.metadata().await?;
            let modified = metadata
                .modified()
                .map(DateTime::<Utc>::from)
                .unwrap_or_else(|_| Utc::now());
            entries.push(ExportEntry {
                name,
                size_bytes: metadata.len(),
                modified,
            });
        }

        entries.sort_by(|a, b| b.modified.cmp(&a.modified).then(b.name.cmp(&a.name)));
        Ok(entries)
    }

    /// Read one export, `None` if absent.
    pub async fn read(&self, name: &str) -> Result<Option<Vec<u8>>> {
        validate_name(name)?;
        match tokio::fs::read(self.root.join(name)).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::Io(e)),
        }
    }

    /// Delete one export; true when a file was removed.
    pub async fn delete(&self, name: &str) -> Result<bool> {
        validate_name(name)?;
        match tokio::fs::remove_file(self.root.join(name)).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(AppError::Io(e)),
        }
    }

    /// Write bytes atomically (write to temp, then rename).
    async fn write_atomic(&self, name: &str, bytes: &[u8]) -> Result<()> {
        validate_name(name)?;
        tokio::fs::create_dir_all(&self.root).await?;

        let path = self.root.join(name);
        let tmp = path.with_extension("tmp");

        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        drop(file);

        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }
}

/// Reject names that could escape the export directory.
fn validate_name(name: &str) -> Result<()> {
    if name.is_empty()
        || name.contains('/')
        || name.contains('\\')
        || name.contains("..")
    {
        return Err(AppError::export(format!("invalid export name: {name:?}")));
    }
    Ok(())
}

/// Escape a field for CSV output.
fn escape_csv(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ContactBundle, ListingDetail, ListingStub};
    use tempfile::TempDir;

    fn record(name: &str, emails: &[&str]) -> LeadRecord {
        let stub = ListingStub {
            display_name: name.to_string(),
            detail_link: format!("https://maps.example.com/place/{}", slugify(name)),
        };
        let mut detail = ListingDetail::from_stub(&stub);
        detail.contacts = ContactBundle {
            emails: emails.iter().map(|s| s.to_string()).collect(),
            ..ContactBundle::default()
        };
        LeadRecord::from_detail(&detail)
    }

    #[tokio::test]
    async fn test_write_then_read_round_trip() {
        let tmp = TempDir::new().unwrap();
        let store = ExportStore::new(tmp.path());

        let records = vec![record("Corner Bakery", &["a@b.co", "c@d.co"])];
        let name = store.write_records("bakery", &records).await.unwrap();
        assert!(name.starts_with("leads_bakery_"));

        let bytes = store.read(&name).await.unwrap().unwrap();
        let content = String::from_utf8(bytes).unwrap();
        let mut lines = content.lines();
        assert_eq!(
            lines.next().unwrap(),
            "Business Name,Phone,Website,Rating,Reviews,Emails,Facebook,Instagram,Maps Link"
        );
        // joined emails contain a comma, so the field is quoted
        assert!(lines.next().unwrap().contains("\"a@b.co, c@d.co\""));
    }

    #[tokio::test]
    async fn test_list_orders_newest_first() {
        let tmp = TempDir::new().unwrap();
        let store = ExportStore::new(tmp.path());

        store.write_records("first", &[]).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        let newest = store.write_records("second", &[]).await.unwrap();

        let listed = store.list().await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].name, newest);
    }

    #[tokio::test]
    async fn test_list_missing_dir_is_empty() {
        let tmp = TempDir::new().unwrap();
        let store = ExportStore::new(tmp.path().join("never-created"));
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_reports_presence() {
        let tmp = TempDir::new().unwrap();
        let store = ExportStore::new(tmp.path());

        let name = store.write_records("bakery", &[]).await.unwrap();
        assert!(store.delete(&name).await.unwrap());
        assert!(!store.delete(&name).await.unwrap());
    }

    #[tokio::test]
    async fn test_traversal_names_are_rejected() {
        let tmp = TempDir::new().unwrap();
        let store = ExportStore::new(tmp.path());

        assert!(store.read("../etc/passwd").await.is_err());
        assert!(store.delete("a/b.csv").await.is_err());
    }

    #[test]
    fn test_escape_csv() {
        assert_eq!(escape_csv("plain"), "plain");
        assert_eq!(escape_csv("a,b"), "\"a,b\"");
        assert_eq!(escape_csv("say \"hi\""), "\"say \"\"hi\"\"\"");
    }
}
