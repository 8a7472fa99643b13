use crate::policy::EffectiveConfig;
use traceguard_types::{PolicyContext, Violation};

mod plan_refs;
mod requirement_id;
mod requirement_refs;


/// Declared rule order. The first violating rule supplies the reported code.
pub fn run_all(ctx: &PolicyContext, cfg: &EffectiveConfig, out: &mut Vec<Violation>) {
    requirement_id::run(ctx, cfg, out);
    requirement_refs::run(ctx, cfg, out);
    plan_refs::run(ctx, cfg, out);
}
