use crate::policy::ContractDefaults;
use traceguard_types::{PolicyContext, RawContext};

/// Fill a caller-supplied partial context with contract defaults.
///
/// Pure: the input is not mutated. Explicit caller values always win, even
/// falsy ones — `Some(false)` for `monitoring_enabled` survives verbatim,
/// and an explicit empty string or list is kept for the rules to judge.
pub fn normalize(raw: &RawContext, defaults: &ContractDefaults) -> PolicyContext {
    PolicyContext {
        source: raw
            .source
            .clone()
            .unwrap_or_else(|| "unknown".to_string()),
        entity_id: raw
            .entity_id
            .clone()
            .unwrap_or_else(|| "unknown".to_string()),
        requirement_id: raw
            .requirement_id
            .clone()
            .unwrap_or_else(|| defaults.requirement_id.clone()),
        requirement_refs: raw
            .requirement_refs
            .clone()
            .unwrap_or_else(|| defaults.requirement_refs.clone()),
        plan_refs: raw
            .plan_refs
            .clone()
            .unwrap_or_else(|| defaults.plan_refs.clone()),
        design_refs: raw
            .design_refs
            .clone()
            .unwrap_or_else(|| defaults.design_refs.clone()),
        monitoring_enabled: raw.monitoring_enabled.unwrap_or(true),
        enforce_contract: raw.enforce_contract.unwrap_or(true),
        test_tags: raw
            .test_tags
            .clone()
            .unwrap_or_else(|| defaults.test_tags.clone()),
    }
}
