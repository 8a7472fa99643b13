use std::collections::{BTreeMap, BTreeSet};

#[derive(Clone, Debug)]
pub struct RulePolicy {
    pub enabled: bool,
}

impl RulePolicy {
    pub fn enabled() -> Self {
        Self { enabled: true }
    }

    pub fn disabled() -> Self {
        Self { enabled: false }
    }
}

/// Contract defaults applied by the normalizer to absent context fields.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContractDefaults {
    pub requirement_id: String,
    pub requirement_refs: Vec<String>,
    pub plan_refs: Vec<String>,
    pub design_refs: Vec<String>,
    pub test_tags: BTreeSet<String>,
}

impl Default for ContractDefaults {
    fn default() -> Self {
        Self {
            requirement_id: "REQ-001".to_string(),
            requirement_refs: vec!["docs/requirements.md#REQ-001".to_string()],
            plan_refs: vec!["docs/plans/monitoring-guard-implementation.md".to_string()],
            design_refs: vec![
                "docs/plans/monitoring-guard-design.md".to_string(),
                "docs/plans/monitoring-guard-implementation.md".to_string(),
            ],
            test_tags: BTreeSet::from(["monitoring-guard".to_string()]),
        }
    }
}

#[derive(Clone, Debug)]
pub struct EffectiveConfig {
    pub profile: String,

    /// Default enforcement mode for entrypoints that don't choose per call.
    pub hard_block: bool,

    pub defaults: ContractDefaults,

    /// Map of rule_id -> policy.
    pub rules: BTreeMap<String, RulePolicy>,
}

impl EffectiveConfig {
    pub fn rule_policy(&self, rule_id: &str) -> Option<&RulePolicy> {
        self.rules.get(rule_id).filter(|p| p.enabled)
    }
}
