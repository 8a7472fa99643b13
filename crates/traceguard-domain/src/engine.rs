use crate::policy::EffectiveConfig;
use crate::rules;
use traceguard_types::{PolicyContext, Severity, Verdict, Violation};

/// Result of evaluating one normalized context against the rule table.
#[derive(Clone, Debug)]
pub struct Evaluation {
    pub verdict: Verdict,
    pub violations: Vec<Violation>,
}

impl Evaluation {
    pub fn pass() -> Self {
        Self {
            verdict: Verdict::Pass,
            violations: Vec::new(),
        }
    }

    pub fn is_blocked(&self) -> bool {
        self.verdict == Verdict::Block
    }

    /// Tie-break for single-code reporting: the first rule in declared
    /// table order that produced a violation.
    pub fn primary_code(&self) -> &str {
        self.violations.first().map(|v| v.code.as_str()).unwrap_or("")
    }

    pub fn reasons(&self) -> Vec<String> {
        self.violations.iter().map(|v| v.reason.clone()).collect()
    }
}

/// Evaluate a fully-normalized context. Deterministic, no I/O, no mutation.
///
/// `monitoring_enabled == false` short-circuits the whole table: an
/// explicit, auditable opt-out passes regardless of every other field.
/// Otherwise every enabled rule runs — `reasons` reflects all broken
/// contract terms, not just the first.
pub fn evaluate(ctx: &PolicyContext, cfg: &EffectiveConfig) -> Evaluation {
    if !ctx.monitoring_enabled {
        return Evaluation::pass();
    }

    let mut violations: Vec<Violation> = Vec::new();
    rules::run_all(ctx, cfg, &mut violations);

    let verdict = compute_verdict(&violations);
    Evaluation {
        verdict,
        violations,
    }
}

fn compute_verdict(violations: &[Violation]) -> Verdict {
    if violations.iter().any(|v| v.severity == Severity::Error) {
        return Verdict::Block;
    }
    if violations.is_empty() {
        Verdict::Pass
    } else {
        Verdict::Warn
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{strict_config, valid_context};
    use traceguard_types::ids;

    #[test]
    fn valid_context_passes() {
        let eval = evaluate(&valid_context(), &strict_config());
        assert_eq!(eval.verdict, Verdict::Pass);
        assert!(eval.violations.is_empty());
        assert_eq!(eval.primary_code(), "");
    }

    #[test]
    fn monitoring_off_short_circuits_every_rule() {
        let mut ctx = valid_context();
        ctx.monitoring_enabled = false;
        ctx.requirement_id.clear();
        ctx.requirement_refs.clear();
        ctx.plan_refs.clear();

        let eval = evaluate(&ctx, &strict_config());
        assert_eq!(eval.verdict, Verdict::Pass);
        assert!(eval.violations.is_empty());
    }

    #[test]
    fn all_rules_report_not_just_the_first() {
        let mut ctx = valid_context();
        ctx.requirement_id.clear();
        ctx.requirement_refs.clear();
        ctx.plan_refs.clear();

        let eval = evaluate(&ctx, &strict_config());
        assert_eq!(eval.verdict, Verdict::Block);
        assert_eq!(eval.violations.len(), 3);
        // Declared order decides the reported code.
        assert_eq!(eval.primary_code(), ids::CODE_MISSING_REQ_ID);
        assert_eq!(eval.reasons().len(), 3);
    }

    #[test]
    fn unenforced_contract_downgrades_refs_to_warnings() {
        let mut ctx = valid_context();
        ctx.enforce_contract = false;
        ctx.requirement_refs.clear();
        ctx.plan_refs.clear();

        let eval = evaluate(&ctx, &strict_config());
        assert_eq!(eval.verdict, Verdict::Warn);
        assert!(!eval.is_blocked());
        assert_eq!(eval.violations.len(), 2);
    }
}
