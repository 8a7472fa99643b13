use crate::{IncidentStore, StoreError, build_incident};
use camino::{Utf8Path, Utf8PathBuf};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::sync::Mutex;
use traceguard_types::{Incident, PolicyContext};

/// Append-only JSONL ledger: one incident per line.
///
/// The id counter is reseeded from the existing file at open, so reopening
/// a ledger continues the sequence instead of reusing ids. The append is
/// flushed before `record` returns — there are no fire-and-forget writes.
#[derive(Debug)]
pub struct JsonlLedger {
    path: Utf8PathBuf,
    next_id: Mutex<u64>,
}

impl JsonlLedger {
    pub fn open(path: impl Into<Utf8PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let max_id = read_incidents(&path)?
            .iter()
            .map(|i| i.id)
            .max()
            .unwrap_or(0);

        Ok(Self {
            path,
            next_id: Mutex::new(max_id + 1),
        })
    }

    pub fn path(&self) -> &Utf8Path {
        &self.path
    }
}

fn read_incidents(path: &Utf8Path) -> Result<Vec<Incident>, StoreError> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(err) => return Err(err.into()),
    };

    let mut incidents = Vec::new();
    for line in text.lines() {
        if line.trim().is_empty() {
            continue;
        }
        incidents.push(serde_json::from_str(line)?);
    }
    Ok(incidents)
}

impl IncidentStore for JsonlLedger {
    fn record(
        &self,
        rule_code: &str,
        reasons: &[String],
        context: &PolicyContext,
    ) -> Result<Incident, StoreError> {
        let mut next_id = self.next_id.lock().map_err(|_| StoreError::Poisoned)?;

        let incident = build_incident(*next_id, rule_code, reasons, context);
        let line = serde_json::to_string(&incident)?;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{line}")?;
        file.flush()?;

        *next_id += 1;
        Ok(incident)
    }

    fn get(&self, id: u64) -> Result<Option<Incident>, StoreError> {
        let _lock = self.next_id.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(read_incidents(&self.path)?.into_iter().find(|i| i.id == id))
    }

    fn recent(&self, limit: usize) -> Result<Vec<Incident>, StoreError> {
        let _lock = self.next_id.lock().map_err(|_| StoreError::Poisoned)?;
        let mut incidents = read_incidents(&self.path)?;
        incidents.reverse();
        incidents.truncate(limit);
        Ok(incidents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn context() -> PolicyContext {
        PolicyContext {
            source: "jobs.unit_test".to_string(),
            entity_id: "work-1".to_string(),
            requirement_id: "REQ-001".to_string(),
            requirement_refs: Vec::new(),
            plan_refs: Vec::new(),
            design_refs: Vec::new(),
            monitoring_enabled: true,
            enforce_contract: true,
            test_tags: BTreeSet::new(),
        }
    }

    #[test]
    fn records_append_one_line_each() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = Utf8PathBuf::from_path_buf(dir.path().join("incidents.jsonl")).expect("utf8");

        let ledger = JsonlLedger::open(path.clone()).expect("open");
        ledger
            .record("missing_requirement_refs", &["refs empty".to_string()], &context())
            .expect("record");
        ledger
            .record("missing_plan_refs", &["plan empty".to_string()], &context())
            .expect("record");

        let text = fs::read_to_string(&path).expect("read");
        assert_eq!(text.lines().count(), 2);
    }

    #[test]
    fn reopening_continues_the_id_sequence() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = Utf8PathBuf::from_path_buf(dir.path().join("incidents.jsonl")).expect("utf8");

        let first = JsonlLedger::open(path.clone()).expect("open");
        let a = first.record("missing_req_id", &[], &context()).expect("record");
        let b = first.record("missing_req_id", &[], &context()).expect("record");
        drop(first);

        let reopened = JsonlLedger::open(path).expect("reopen");
        let c = reopened.record("missing_req_id", &[], &context()).expect("record");

        assert_eq!(a.id, 1);
        assert_eq!(b.id, 2);
        assert_eq!(c.id, 3);
    }

    #[test]
    fn get_and_recent_read_back_persisted_records() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = Utf8PathBuf::from_path_buf(dir.path().join("incidents.jsonl")).expect("utf8");

        let ledger = JsonlLedger::open(path).expect("open");
        let recorded = ledger
            .record("missing_plan_refs", &["plan empty".to_string()], &context())
            .expect("record");

        let fetched = ledger.get(recorded.id).expect("get").expect("found");
        assert_eq!(fetched, recorded);

        let recent = ledger.recent(10).expect("recent");
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].id, recorded.id);
    }

    #[test]
    fn missing_file_reads_as_empty() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = Utf8PathBuf::from_path_buf(dir.path().join("none.jsonl")).expect("utf8");

        let ledger = JsonlLedger::open(path).expect("open");
        assert!(ledger.get(1).expect("get").is_none());
        assert!(ledger.recent(5).expect("recent").is_empty());
    }
}
