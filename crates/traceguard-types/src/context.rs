use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Caller-supplied partial work context.
///
/// Every field is optional; `normalize` (in `traceguard-domain`) fills the
/// gaps with contract defaults. Unknown keys are ignored on deserialization
/// so callers can pass richer payloads than the guard recognizes.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct RawContext {
    /// Module or job path of the caller. Audit-only; rules never read it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    /// Identifier of the unit of work. Audit-only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_id: Option<String>,

    /// Identifier of the governing requirement.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requirement_id: Option<String>,

    /// Pointers into a requirements document.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requirement_refs: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan_refs: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub design_refs: Option<Vec<String>>,

    /// Explicit opt-out: `Some(false)` makes every rule pass trivially.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monitoring_enabled: Option<bool>,

    /// When false, missing refs are warnings rather than blocks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enforce_contract: Option<bool>,

    /// Informational labels describing the scope of this work unit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_tags: Option<BTreeSet<String>>,
}

/// Fully-normalized work context: no absent fields reach the rule engine.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct PolicyContext {
    pub source: String,
    pub entity_id: String,
    pub requirement_id: String,
    pub requirement_refs: Vec<String>,
    pub plan_refs: Vec<String>,
    pub design_refs: Vec<String>,
    pub monitoring_enabled: bool,
    pub enforce_contract: bool,
    pub test_tags: BTreeSet<String>,
}

impl RawContext {
    /// Context for a named caller, everything else left to contract defaults.
    pub fn for_source(source: &str, entity_id: &str) -> Self {
        Self {
            source: Some(source.to_string()),
            entity_id: Some(entity_id.to_string()),
            ..Self::default()
        }
    }
}
