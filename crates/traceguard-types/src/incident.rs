use crate::context::PolicyContext;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Severity is intentionally small: `Error` blocks, `Warning` only surfaces.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

/// One broken contract term.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Violation {
    pub severity: Severity,
    pub rule_id: String,
    pub code: String,
    pub reason: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Pass,
    Warn,
    Block,
}

/// Permanent audit record of a hard-blocked decision.
///
/// Created once, never updated or deleted. The ledger assigns `id` at record
/// time; ids are strictly increasing within a store.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Incident {
    pub id: u64,
    pub rule_code: String,
    pub reasons: Vec<String>,
    pub context: PolicyContext,
    #[schemars(with = "String")]
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Caller-visible outcome of every `enforce` call.
///
/// `incident_id` is 0 unless a hard block persisted an incident.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct GuardResult {
    pub blocked: bool,
    pub incident_id: u64,
    pub rule_code: String,
    pub reasons: Vec<String>,
}

impl GuardResult {
    pub fn pass() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pass_result_carries_no_incident() {
        let result = GuardResult::pass();
        assert!(!result.blocked);
        assert_eq!(result.incident_id, 0);
        assert!(result.rule_code.is_empty());
        assert!(result.reasons.is_empty());
    }

    #[test]
    fn incident_round_trips_with_rfc3339_timestamp() {
        let incident = Incident {
            id: 7,
            rule_code: "missing_plan_refs".to_string(),
            reasons: vec!["plan_refs must not be empty".to_string()],
            context: PolicyContext {
                source: "jobs.nightly".to_string(),
                entity_id: "job-42".to_string(),
                requirement_id: "REQ-001".to_string(),
                requirement_refs: vec!["docs/requirements.md#REQ-001".to_string()],
                plan_refs: Vec::new(),
                design_refs: Vec::new(),
                monitoring_enabled: true,
                enforce_contract: true,
                test_tags: Default::default(),
            },
            created_at: OffsetDateTime::from_unix_timestamp(1_750_000_000).expect("timestamp"),
        };

        let line = serde_json::to_string(&incident).expect("serialize");
        assert!(line.contains("\"created_at\":\""));
        let back: Incident = serde_json::from_str(&line).expect("deserialize");
        assert_eq!(back, incident);
    }
}
