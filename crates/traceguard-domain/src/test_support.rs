use crate::policy::{ContractDefaults, EffectiveConfig, RulePolicy};
use std::collections::BTreeMap;
use traceguard_types::{PolicyContext, ids};

pub fn valid_context() -> PolicyContext {
    PolicyContext {
        source: "jobs.unit_test".to_string(),
        entity_id: "work-test-001".to_string(),
        requirement_id: "REQ-001".to_string(),
        requirement_refs: vec![
            "docs/requirements.md#REQ-001".to_string(),
            "docs/requirements.md#REQ-002".to_string(),
        ],
        plan_refs: vec!["docs/plans/monitoring-guard-implementation.md".to_string()],
        design_refs: vec!["docs/plans/monitoring-guard-design.md".to_string()],
        monitoring_enabled: true,
        enforce_contract: true,
        test_tags: ["monitoring-guard".to_string(), "unit-test".to_string()].into(),
    }
}

pub fn strict_config() -> EffectiveConfig {
    let mut rules = BTreeMap::new();
    for rule_id in ids::all_rule_ids() {
        rules.insert(rule_id.to_string(), RulePolicy::enabled());
    }
    EffectiveConfig {
        profile: "test".to_string(),
        hard_block: true,
        defaults: ContractDefaults::default(),
        rules,
    }
}

pub fn config_with_rule(rule_id: &str) -> EffectiveConfig {
    let mut rules = BTreeMap::new();
    rules.insert(rule_id.to_string(), RulePolicy::enabled());
    EffectiveConfig {
        profile: "test".to_string(),
        hard_block: true,
        defaults: ContractDefaults::default(),
        rules,
    }
}
