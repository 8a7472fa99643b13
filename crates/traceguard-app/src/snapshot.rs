//! Snapshot importer: the concrete extractor behind the `sync` use case.
//!
//! Imports work records from a JSONL source into a JSON snapshot store
//! keyed by record id, counting inserted / updated / unchanged rows and
//! deactivating entries that disappeared from the source.

use crate::batch::WorkRecord;
use crate::sync::{Extract, SyncSummary};
use anyhow::Context;
use camino::Utf8Path;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
struct SnapshotEntry {
    name: String,
    digest: String,
    active: bool,
}

type SnapshotStore = BTreeMap<String, SnapshotEntry>;

pub struct SnapshotImporter<'a> {
    source: &'a Utf8Path,
    store_path: &'a Utf8Path,
}

impl<'a> SnapshotImporter<'a> {
    pub fn new(source: &'a Utf8Path, store_path: &'a Utf8Path) -> Self {
        Self { source, store_path }
    }
}

impl Extract for SnapshotImporter<'_> {
    fn extract(&mut self) -> anyhow::Result<SyncSummary> {
        let text = fs::read_to_string(self.source)
            .with_context(|| format!("read sync source: {}", self.source))?;
        let records = parse_records(&text)?;

        let mut store = load_store(self.store_path)?;
        let mut summary = SyncSummary {
            run_id: run_id(&text),
            ..SyncSummary::default()
        };

        let mut seen: BTreeSet<String> = BTreeSet::new();
        for record in &records {
            seen.insert(record.record_id.clone());
            let digest = record_digest(record);

            match store.entry(record.record_id.clone()) {
                Entry::Vacant(slot) => {
                    summary.inserted += 1;
                    slot.insert(SnapshotEntry {
                        name: record.name.clone(),
                        digest,
                        active: true,
                    });
                }
                Entry::Occupied(mut slot) => {
                    let entry = slot.get_mut();
                    if entry.digest == digest && entry.active {
                        summary.unchanged += 1;
                    } else {
                        summary.updated += 1;
                        entry.name = record.name.clone();
                        entry.digest = digest;
                        entry.active = true;
                    }
                }
            }
        }

        for (record_id, entry) in store.iter_mut() {
            if entry.active && !seen.contains(record_id) {
                entry.active = false;
                summary.deactivated += 1;
            }
        }

        save_store(self.store_path, &store)?;
        Ok(summary)
    }
}

/// Parse one work record per non-empty line.
pub fn parse_records(text: &str) -> anyhow::Result<Vec<WorkRecord>> {
    let mut records = Vec::new();
    for (index, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let record: WorkRecord = serde_json::from_str(line)
            .with_context(|| format!("parse work record on line {}", index + 1))?;
        records.push(record);
    }
    Ok(records)
}

fn load_store(path: &Utf8Path) -> anyhow::Result<SnapshotStore> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(SnapshotStore::new()),
        Err(err) => return Err(err).with_context(|| format!("read snapshot store: {path}")),
    };
    serde_json::from_str(&text).with_context(|| format!("parse snapshot store: {path}"))
}

fn save_store(path: &Utf8Path, store: &SnapshotStore) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("create snapshot directory: {parent}"))?;
    }
    let text = serde_json::to_string_pretty(store).context("serialize snapshot store")?;
    fs::write(path, text).with_context(|| format!("write snapshot store: {path}"))?;
    Ok(())
}

fn record_digest(record: &WorkRecord) -> String {
    let mut hasher = Sha256::new();
    hasher.update(record.name.as_bytes());
    hasher.update([0]);
    hasher.update(record.body.as_bytes());
    hex::encode(hasher.finalize())
}

fn run_id(source_text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(source_text.as_bytes());
    let digest = hex::encode(hasher.finalize());
    format!("sync-{}", &digest[..12])
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::Utf8PathBuf;

    fn utf8(path: std::path::PathBuf) -> Utf8PathBuf {
        Utf8PathBuf::from_path_buf(path).expect("utf8 path")
    }

    fn write_source(path: &Utf8Path, rows: &[(&str, &str, &str)]) {
        let text: String = rows
            .iter()
            .map(|(id, name, body)| {
                format!(
                    "{}\n",
                    serde_json::json!({"record_id": id, "name": name, "body": body})
                )
            })
            .collect();
        fs::write(path, text).expect("write source");
    }

    #[test]
    fn first_import_inserts_everything() {
        let dir = tempfile::tempdir().expect("tempdir");
        let source = utf8(dir.path().join("source.jsonl"));
        let store_path = utf8(dir.path().join("store.json"));
        write_source(&source, &[("1", "alpha", "a"), ("2", "beta", "b")]);

        let mut importer = SnapshotImporter::new(&source, &store_path);
        let summary = importer.extract().expect("extract");

        assert_eq!(summary.inserted, 2);
        assert_eq!(summary.updated, 0);
        assert_eq!(summary.unchanged, 0);
        assert_eq!(summary.deactivated, 0);
        assert!(summary.run_id.starts_with("sync-"));
    }

    #[test]
    fn reimport_counts_unchanged_updated_and_deactivated() {
        let dir = tempfile::tempdir().expect("tempdir");
        let source = utf8(dir.path().join("source.jsonl"));
        let store_path = utf8(dir.path().join("store.json"));

        write_source(
            &source,
            &[("1", "alpha", "a"), ("2", "beta", "b"), ("3", "gamma", "c")],
        );
        SnapshotImporter::new(&source, &store_path)
            .extract()
            .expect("first import");

        // Row 1 unchanged, row 2 edited, row 3 gone, row 4 new.
        write_source(&source, &[("1", "alpha", "a"), ("2", "beta", "B2"), ("4", "delta", "d")]);
        let summary = SnapshotImporter::new(&source, &store_path)
            .extract()
            .expect("second import");

        assert_eq!(summary.inserted, 1);
        assert_eq!(summary.updated, 1);
        assert_eq!(summary.unchanged, 1);
        assert_eq!(summary.deactivated, 1);
    }

    #[test]
    fn reactivated_records_count_as_updated() {
        let dir = tempfile::tempdir().expect("tempdir");
        let source = utf8(dir.path().join("source.jsonl"));
        let store_path = utf8(dir.path().join("store.json"));

        write_source(&source, &[("1", "alpha", "a")]);
        SnapshotImporter::new(&source, &store_path)
            .extract()
            .expect("first import");

        write_source(&source, &[("2", "beta", "b")]);
        SnapshotImporter::new(&source, &store_path)
            .extract()
            .expect("drop row 1");

        write_source(&source, &[("1", "alpha", "a"), ("2", "beta", "b")]);
        let summary = SnapshotImporter::new(&source, &store_path)
            .extract()
            .expect("bring row 1 back");

        assert_eq!(summary.updated, 1);
        assert_eq!(summary.unchanged, 1);
        assert_eq!(summary.inserted, 0);
    }

    #[test]
    fn malformed_source_line_fails_loudly() {
        assert!(parse_records("{\"record_id\":\"1\",\"name\":\"a\"}\nnot json\n").is_err());
        assert_eq!(parse_records("\n\n").expect("empty ok").len(), 0);
    }
}
