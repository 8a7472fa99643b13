use crate::{model::GuardConfigV1, presets};
use traceguard_domain::policy::{EffectiveConfig, RulePolicy};

#[derive(Clone, Debug, Default)]
pub struct Overrides {
    pub profile: Option<String>,
    pub mode: Option<String>,
}

#[derive(Clone, Debug)]
pub struct ResolvedConfig {
    pub effective: EffectiveConfig,
}

pub fn resolve_config(cfg: GuardConfigV1, overrides: Overrides) -> anyhow::Result<ResolvedConfig> {
    let profile = overrides
        .profile
        .clone()
        .or(cfg.profile.clone())
        .unwrap_or_else(|| "strict".to_string());

    let mut effective = presets::preset(&profile);

    // Enforcement mode
    if let Some(mode) = overrides.mode.clone().or(cfg.mode.clone()) {
        effective.hard_block = parse_mode(&mode)?;
    }

    // Contract defaults
    if let Some(contract) = &cfg.contract {
        if let Some(requirement_id) = &contract.requirement_id {
            effective.defaults.requirement_id = requirement_id.clone();
        }
        if let Some(requirement_refs) = &contract.requirement_refs {
            effective.defaults.requirement_refs = requirement_refs.clone();
        }
        if let Some(plan_refs) = &contract.plan_refs {
            effective.defaults.plan_refs = plan_refs.clone();
        }
        if let Some(design_refs) = &contract.design_refs {
            effective.defaults.design_refs = design_refs.clone();
        }
        if let Some(test_tags) = &contract.test_tags {
            effective.defaults.test_tags = test_tags.iter().cloned().collect();
        }
    }

    // per-rule overrides
    for (rule_id, rc) in cfg.rules.iter() {
        let entry = effective
            .rules
            .entry(rule_id.clone())
            .or_insert_with(RulePolicy::disabled);

        if let Some(enabled) = rc.enabled {
            entry.enabled = enabled;
        }
    }

    Ok(ResolvedConfig { effective })
}

fn parse_mode(v: &str) -> anyhow::Result<bool> {
    match v {
        "hard" => Ok(true),
        "soft" => Ok(false),
        other => anyhow::bail!("unknown mode: {other} (expected 'hard' or 'soft')"),
    }
}
