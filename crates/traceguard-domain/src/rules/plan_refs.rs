use crate::policy::EffectiveConfig;
use traceguard_types::{PolicyContext, Severity, Violation, ids};

pub fn run(ctx: &PolicyContext, cfg: &EffectiveConfig, out: &mut Vec<Violation>) {
    let Some(_policy) = cfg.rule_policy(ids::RULE_PLAN_REFS) else {
        return;
    };

    if ctx.plan_refs.iter().all(|r| r.trim().is_empty()) {
        let severity = if ctx.enforce_contract {
            Severity::Error
        } else {
            Severity::Warning
        };
        out.push(Violation {
            severity,
            rule_id: ids::RULE_PLAN_REFS.to_string(),
            code: ids::CODE_MISSING_PLAN_REFS.to_string(),
            reason: "plan_refs is empty; monitored work must reference its plan".to_string(),
        });
    }
}
