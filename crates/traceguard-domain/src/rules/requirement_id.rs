use crate::policy::EffectiveConfig;
use traceguard_types::{PolicyContext, Severity, Violation, ids};

pub fn run(ctx: &PolicyContext, cfg: &EffectiveConfig, out: &mut Vec<Violation>) {
    let Some(_policy) = cfg.rule_policy(ids::RULE_REQUIREMENT_ID) else {
        return;
    };

    if !is_requirement_token(&ctx.requirement_id) {
        out.push(Violation {
            severity: Severity::Error,
            rule_id: ids::RULE_REQUIREMENT_ID.to_string(),
            code: ids::CODE_MISSING_REQ_ID.to_string(),
            reason: format!(
                "requirement_id '{}' is not a valid requirement token",
                ctx.requirement_id
            ),
        });
    }
}

/// Non-empty ASCII alphanumeric-with-dash token, no leading or trailing dash.
pub fn is_requirement_token(id: &str) -> bool {
    !id.is_empty()
        && id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
        && !id.starts_with('-')
        && !id.ends_with('-')
}
