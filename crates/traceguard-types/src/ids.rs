//! Stable identifiers for contract rules and violation codes.
//!
//! `rule_id` is a dotted namespace. `code` is a short snake_case discriminator.

// Rules
pub const RULE_REQUIREMENT_ID: &str = "contract.requirement_id";
pub const RULE_REQUIREMENT_REFS: &str = "contract.requirement_refs";
pub const RULE_PLAN_REFS: &str = "contract.plan_refs";

// Codes: contract.requirement_id
pub const CODE_MISSING_REQ_ID: &str = "missing_req_id";

// Codes: contract.requirement_refs
pub const CODE_MISSING_REQUIREMENT_REFS: &str = "missing_requirement_refs";

// Codes: contract.plan_refs
pub const CODE_MISSING_PLAN_REFS: &str = "missing_plan_refs";

/// List all known rule IDs, in declared evaluation order.
pub fn all_rule_ids() -> &'static [&'static str] {
    &[RULE_REQUIREMENT_ID, RULE_REQUIREMENT_REFS, RULE_PLAN_REFS]
}

/// List all known codes.
pub fn all_codes() -> &'static [&'static str] {
    &[
        CODE_MISSING_REQ_ID,
        CODE_MISSING_REQUIREMENT_REFS,
        CODE_MISSING_PLAN_REFS,
    ]
}
