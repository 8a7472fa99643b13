use std::collections::BTreeMap;
use traceguard_domain::policy::{ContractDefaults, EffectiveConfig, RulePolicy};
use traceguard_types::ids;

/// Preset profiles are opinionated defaults.
///
/// Keep these small and readable. Anything complex should go into repo config.
pub fn preset(profile: &str) -> EffectiveConfig {
    match profile {
        "observe" => observe_profile(),
        // default
        _ => strict_profile(),
    }
}

fn strict_profile() -> EffectiveConfig {
    EffectiveConfig {
        profile: "strict".to_string(),
        hard_block: true,
        defaults: ContractDefaults::default(),
        rules: default_rules(),
    }
}

/// Observe mode surfaces blocks without recording incidents by default.
fn observe_profile() -> EffectiveConfig {
    EffectiveConfig {
        profile: "observe".to_string(),
        hard_block: false,
        defaults: ContractDefaults::default(),
        rules: default_rules(),
    }
}

fn default_rules() -> BTreeMap<String, RulePolicy> {
    let mut m = BTreeMap::new();
    for rule_id in ids::all_rule_ids() {
        m.insert(rule_id.to_string(), RulePolicy::enabled());
    }
    m
}
