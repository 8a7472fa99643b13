use crate::{IncidentStore, StoreError, build_incident};
use std::sync::Mutex;
use traceguard_types::{Incident, PolicyContext};

/// In-process ledger for tests and embedded use.
#[derive(Debug, Default)]
pub struct MemoryLedger {
    inner: Mutex<MemoryState>,
}

#[derive(Debug)]
struct MemoryState {
    next_id: u64,
    incidents: Vec<Incident>,
}

impl Default for MemoryState {
    fn default() -> Self {
        Self {
            next_id: 1,
            incidents: Vec::new(),
        }
    }
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().map(|s| s.incidents.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl IncidentStore for MemoryLedger {
    fn record(
        &self,
        rule_code: &str,
        reasons: &[String],
        context: &PolicyContext,
    ) -> Result<Incident, StoreError> {
        let mut state = self.inner.lock().map_err(|_| StoreError::Poisoned)?;
        let incident = build_incident(state.next_id, rule_code, reasons, context);
        state.next_id += 1;
        state.incidents.push(incident.clone());
        Ok(incident)
    }

    fn get(&self, id: u64) -> Result<Option<Incident>, StoreError> {
        let state = self.inner.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(state.incidents.iter().find(|i| i.id == id).cloned())
    }

    fn recent(&self, limit: usize) -> Result<Vec<Incident>, StoreError> {
        let state = self.inner.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(state.incidents.iter().rev().take(limit).cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;
    use traceguard_types::PolicyContext;

    fn context() -> PolicyContext {
        PolicyContext {
            source: "jobs.unit_test".to_string(),
            entity_id: "work-1".to_string(),
            requirement_id: "REQ-001".to_string(),
            requirement_refs: vec!["docs/requirements.md#REQ-001".to_string()],
            plan_refs: Vec::new(),
            design_refs: Vec::new(),
            monitoring_enabled: true,
            enforce_contract: true,
            test_tags: BTreeSet::new(),
        }
    }

    #[test]
    fn ids_are_strictly_increasing() {
        let ledger = MemoryLedger::new();
        let mut previous = 0;
        for _ in 0..5 {
            let incident = ledger
                .record("missing_plan_refs", &["plan_refs is empty".to_string()], &context())
                .expect("record");
            assert!(incident.id > previous);
            previous = incident.id;
        }
        assert_eq!(ledger.len(), 5);
    }

    #[test]
    fn recorded_incident_is_retrievable() {
        let ledger = MemoryLedger::new();
        let incident = ledger
            .record("missing_req_id", &["bad token".to_string()], &context())
            .expect("record");

        let fetched = ledger.get(incident.id).expect("get").expect("found");
        assert_eq!(fetched, incident);
        assert!(ledger.get(9999).expect("get").is_none());
    }

    #[test]
    fn recent_returns_newest_first() {
        let ledger = MemoryLedger::new();
        for _ in 0..4 {
            ledger
                .record("missing_plan_refs", &[], &context())
                .expect("record");
        }
        let recent = ledger.recent(2).expect("recent");
        assert_eq!(recent.len(), 2);
        assert!(recent[0].id > recent[1].id);
    }
}
