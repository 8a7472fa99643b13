//! Durable, append-only stores for blocked decisions.
//!
//! Incidents are permanent audit records: created once, never updated or
//! deleted. A store that cannot persist fails loudly — a silently lost
//! incident would defeat the guard.

#![forbid(unsafe_code)]

mod jsonl;
mod memory;

pub use jsonl::JsonlLedger;
pub use memory::MemoryLedger;

use traceguard_types::{Incident, PolicyContext};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("incident store I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("incident record could not be encoded or decoded: {0}")]
    Codec(#[from] serde_json::Error),

    #[error("incident store lock poisoned")]
    Poisoned,
}

/// Write-once incident persistence.
///
/// `record` assigns the next id atomically: no two callers receive the same
/// id, and ids are strictly increasing within a store.
pub trait IncidentStore: Send + Sync {
    fn record(
        &self,
        rule_code: &str,
        reasons: &[String],
        context: &PolicyContext,
    ) -> Result<Incident, StoreError>;

    fn get(&self, id: u64) -> Result<Option<Incident>, StoreError>;

    /// Most recent incidents first.
    fn recent(&self, limit: usize) -> Result<Vec<Incident>, StoreError>;
}

fn build_incident(
    id: u64,
    rule_code: &str,
    reasons: &[String],
    context: &PolicyContext,
) -> Incident {
    Incident {
        id,
        rule_code: rule_code.to_string(),
        reasons: reasons.to_vec(),
        context: context.clone(),
        created_at: time::OffsetDateTime::now_utc(),
    }
}
