//! Uniform guard application across a sequence of work records.
//!
//! Row order is preserved and processing continues across blocked rows:
//! the guard protects per-row correctness, not pipeline continuation.

use crate::guard::{GuardError, GuardService};
use serde::{Deserialize, Serialize};
use traceguard_ledger::IncidentStore;
use traceguard_types::RawContext;

/// One input row. `scenario` is a domain-owned override tag used by
/// fixtures to synthesize missing or violating context fields.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkRecord {
    pub record_id: String,
    pub name: String,
    #[serde(default)]
    pub body: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scenario: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RowStatus {
    Ok,
    Blocked,
}

/// One output row: the input fields plus audit annotations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchRow {
    pub record_id: String,
    pub name: String,
    pub scenario: String,
    pub status: RowStatus,
    pub score: u64,
    pub incident_id: u64,
    pub rule_code: String,
    pub reasons: Vec<String>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub total: usize,
    pub passed: usize,
    pub blocked: usize,
}

#[derive(Clone, Debug)]
pub struct BatchOutput {
    pub rows: Vec<BatchRow>,
    pub summary: BatchSummary,
}

/// Apply the guard to every record, hard-block mode, in input order.
pub fn apply_batch<S: IncidentStore>(
    service: &GuardService<'_, S>,
    source: &str,
    records: &[WorkRecord],
) -> Result<BatchOutput, GuardError> {
    let mut rows = Vec::with_capacity(records.len());
    let mut summary = BatchSummary {
        total: records.len(),
        ..BatchSummary::default()
    };

    for record in records {
        let scenario = record
            .scenario
            .as_deref()
            .unwrap_or("ok")
            .trim()
            .to_string();
        let context = row_context(source, record, &scenario);
        let result = service.enforce(&context, true)?;

        if result.blocked {
            summary.blocked += 1;
            rows.push(BatchRow {
                record_id: record.record_id.clone(),
                name: record.name.clone(),
                scenario,
                status: RowStatus::Blocked,
                score: 0,
                incident_id: result.incident_id,
                rule_code: result.rule_code,
                reasons: result.reasons,
            });
            continue;
        }

        summary.passed += 1;
        rows.push(BatchRow {
            record_id: record.record_id.clone(),
            name: record.name.clone(),
            scenario,
            status: RowStatus::Ok,
            score: score_body(&record.body),
            incident_id: 0,
            rule_code: String::new(),
            reasons: Vec::new(),
        });
    }

    Ok(BatchOutput { rows, summary })
}

/// Scenario-tag -> synthesized context mapping.
///
/// This mapping belongs to the calling domain, not the guard contract.
/// `consistency_off` models a legacy per-row opt-out channel the guard
/// does not honor: the context stays monitored but carries no refs, so
/// the row blocks.
fn row_context(source: &str, record: &WorkRecord, scenario: &str) -> RawContext {
    let mut ctx = RawContext::for_source(source, &format!("batch:{}", record.record_id));
    match scenario {
        "missing_requirement_refs" => ctx.requirement_refs = Some(Vec::new()),
        "missing_plan_refs" => ctx.plan_refs = Some(Vec::new()),
        "missing_req_id" => ctx.requirement_id = Some(String::new()),
        "consistency_off" => {
            ctx.requirement_refs = Some(Vec::new());
            ctx.plan_refs = Some(Vec::new());
        }
        // Unknown tags take the contract defaults.
        _ => {}
    }
    ctx
}

/// Row-local quality score; domain-defined, independent of the guard.
fn score_body(body: &str) -> u64 {
    body.trim().chars().count() as u64
}
