//! Configuration snapshots read from a directory.
//!
//! A snapshot directory holds one `*.json` document per configuration key.
//! Each readable document becomes a [`ConfigEntry`] named after its file.
//! Documents that cannot be read or are not binding content are reported
//! as [`SkippedDocument`]s so callers can see exactly what was left out.
//! Invalid elements inside an otherwise readable array stay with their
//! entry as rejected records.

use std::{
    collections::BTreeSet,
    fs,
    path::{Path, PathBuf},
};

use log::{debug, info, warn};

use bindflow_core::record::ConfigEntry;

use crate::BindflowError;

const DOCUMENT_EXTENSION: &str = "json";

/// A snapshot document that was not loaded, and why.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedDocument {
    source_id: String,
    reason: String,
}

impl SkippedDocument {
    pub fn source_id(&self) -> &str {
        &self.source_id
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }
}

/// Result of reading one snapshot document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentOutcome {
    Loaded(ConfigEntry),
    Skipped(SkippedDocument),
}

/// Everything read from a snapshot directory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SnapshotReport {
    entries: Vec<ConfigEntry>,
    skipped: Vec<SkippedDocument>,
}

impl SnapshotReport {
    /// Loaded entries, in file-name order.
    pub fn entries(&self) -> &[ConfigEntry] {
        &self.entries
    }

    /// Documents that were not loaded.
    pub fn skipped(&self) -> &[SkippedDocument] {
        &self.skipped
    }

    pub fn loaded_count(&self) -> usize {
        self.entries.len()
    }

    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }

    /// Number of array elements left out of loaded documents.
    pub fn rejected_count(&self) -> usize {
        self.entries.iter().map(|entry| entry.rejected().len()).sum()
    }
}

impl FromIterator<DocumentOutcome> for SnapshotReport {
    fn from_iter<I: IntoIterator<Item = DocumentOutcome>>(iter: I) -> Self {
        let mut report = Self::default();
        for outcome in iter {
            match outcome {
                DocumentOutcome::Loaded(entry) => report.entries.push(entry),
                DocumentOutcome::Skipped(skipped) => report.skipped.push(skipped),
            }
        }
        report
    }
}

/// A directory of snapshot documents.
#[derive(Debug, Clone)]
pub struct SnapshotDir {
    path: PathBuf,
}

impl SnapshotDir {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Checks that the directory exists and is not empty.
    ///
    /// # Errors
    ///
    /// - [`BindflowError::NotFound`] if the directory does not exist.
    /// - [`BindflowError::Validation`] if it contains no files at all.
    /// - [`BindflowError::Io`] if it cannot be listed.
    pub fn check(&self) -> Result<(), BindflowError> {
        if !self.path.is_dir() {
            return Err(BindflowError::not_found(&self.path));
        }

        let mut listing = fs::read_dir(&self.path)
            .map_err(|err| BindflowError::io("listing", &self.path, err))?;
        if listing.next().is_none() {
            return Err(BindflowError::validation(format!(
                "snapshot directory {} is empty, run data extraction first",
                self.path.display()
            )));
        }

        Ok(())
    }

    /// Reads every `*.json` document in file-name order.
    ///
    /// # Errors
    ///
    /// Fails as [`SnapshotDir::check`] does, or with [`BindflowError::Io`]
    /// if the directory listing breaks off. Individual documents never fail
    /// the read; they are reported as skipped instead.
    pub fn read(&self) -> Result<SnapshotReport, BindflowError> {
        self.check()?;

        let mut files = Vec::new();
        for dir_entry in fs::read_dir(&self.path)
            .map_err(|err| BindflowError::io("listing", &self.path, err))?
        {
            let dir_entry =
                dir_entry.map_err(|err| BindflowError::io("listing", &self.path, err))?;
            let path = dir_entry.path();
            if path.is_file()
                && path.extension().and_then(|ext| ext.to_str()) == Some(DOCUMENT_EXTENSION)
            {
                files.push(path);
            }
        }
        files.sort();
        info!(path = self.path.display().to_string(), files = files.len(); "Reading snapshot");

        let report: SnapshotReport = files.iter().map(|path| read_document(path)).collect();
        info!(
            loaded = report.loaded_count(),
            skipped = report.skipped_count(),
            rejected = report.rejected_count();
            "Snapshot read"
        );

        Ok(report)
    }
}

fn read_document(path: &Path) -> DocumentOutcome {
    let source_id = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    let parsed = fs::read_to_string(path)
        .map_err(|err| err.to_string())
        .and_then(|text| {
            ConfigEntry::from_json(source_id.as_str(), &text).map_err(|err| err.to_string())
        });

    match parsed {
        Ok(entry) => {
            debug!(
                source_id = source_id.as_str(),
                records = entry.records().len(),
                rejected = entry.rejected().len();
                "Loaded document"
            );
            DocumentOutcome::Loaded(entry)
        }
        Err(reason) => {
            warn!(source_id = source_id.as_str(), reason = reason.as_str(); "Skipping document");
            DocumentOutcome::Skipped(SkippedDocument { source_id, reason })
        }
    }
}

/// Lists the distinct exchanges bound in `entries`.
///
/// When `prefix` is given, only exchanges starting with it (ignoring ASCII
/// case) are kept. The result is sorted ignoring case, with exact byte
/// order breaking ties.
pub fn list_exchanges(entries: &[ConfigEntry], prefix: Option<&str>) -> Vec<String> {
    let prefix = prefix.map(str::to_ascii_lowercase);

    let distinct: BTreeSet<&str> = entries
        .iter()
        .flat_map(|entry| entry.records())
        .map(|record| record.exchange())
        .filter(|exchange| !exchange.is_empty())
        .filter(|exchange| {
            prefix
                .as_deref()
                .is_none_or(|prefix| exchange.to_ascii_lowercase().starts_with(prefix))
        })
        .collect();

    let mut exchanges: Vec<String> = distinct.into_iter().map(str::to_string).collect();
    exchanges.sort_by_cached_key(|exchange| exchange.to_ascii_lowercase());
    exchanges
}

#[cfg(test)]
mod tests {
    use bindflow_core::record::BindingRecord;
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn test_missing_directory() {
        let dir = tempdir().unwrap();
        let snapshot = SnapshotDir::new(dir.path().join("absent"));

        assert!(matches!(
            snapshot.read(),
            Err(BindflowError::NotFound { .. })
        ));
    }

    #[test]
    fn test_empty_directory() {
        let dir = tempdir().unwrap();
        let snapshot = SnapshotDir::new(dir.path());

        assert!(matches!(
            snapshot.read(),
            Err(BindflowError::Validation(_))
        ));
    }

    #[test]
    fn test_read_classifies_documents() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("b.json"),
            r#"[{"Exchange": "orders", "BindingKey": "k1"}, {"Exchange": "billing", "BindingKey": "k2"}]"#,
        )
        .unwrap();
        fs::write(
            dir.path().join("a.json"),
            r#"{"Exchange": "orders", "BindingKey": "k0"}"#,
        )
        .unwrap();
        fs::write(dir.path().join("broken.json"), "{oops").unwrap();
        fs::write(dir.path().join("plain.json"), r#""not a binding""#).unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let report = SnapshotDir::new(dir.path()).read().unwrap();

        let ids: Vec<_> = report.entries().iter().map(ConfigEntry::source_id).collect();
        assert_eq!(ids, ["a.json", "b.json"]);
        assert_eq!(report.loaded_count(), 2);
        assert_eq!(report.skipped_count(), 2);

        let skipped: Vec<_> = report.skipped().iter().map(SkippedDocument::source_id).collect();
        assert_eq!(skipped, ["broken.json", "plain.json"]);
        assert!(report.skipped()[0].reason().starts_with("invalid JSON"));
    }

    #[test]
    fn test_read_keeps_valid_array_elements() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("mixed.json"),
            r#"[{"Exchange": "orders", "BindingKey": "k1"}, null, {"Exchange": "orders", "BindingKey": "k2"}]"#,
        )
        .unwrap();

        let report = SnapshotDir::new(dir.path()).read().unwrap();

        assert_eq!(report.loaded_count(), 1);
        assert_eq!(report.skipped_count(), 0);
        assert_eq!(report.rejected_count(), 1);
        assert_eq!(report.entries()[0].records().len(), 2);
        assert_eq!(report.entries()[0].rejected()[0].index(), 1);
    }

    #[test]
    fn test_list_exchanges() {
        let entries = vec![
            ConfigEntry::new(
                "a.json",
                vec![
                    BindingRecord::new("moirai.orders", "k"),
                    BindingRecord::new("billing", "k"),
                    BindingRecord::new("Moirai.Audit", "k"),
                ],
            ),
            ConfigEntry::new("b.json", BindingRecord::new("moirai.orders", "k")),
        ];

        assert_eq!(
            list_exchanges(&entries, None),
            ["billing", "Moirai.Audit", "moirai.orders"]
        );
        assert_eq!(
            list_exchanges(&entries, Some("MOIRAI")),
            ["Moirai.Audit", "moirai.orders"]
        );
        assert!(list_exchanges(&entries, Some("zzz")).is_empty());
    }
}
