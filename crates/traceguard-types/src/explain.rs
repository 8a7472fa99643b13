//! Explain registry for rules and codes.
//!
//! Maps rule IDs and violation codes to human-readable explanations with
//! remediation guidance.

use crate::ids;

/// Explanation entry for a rule or code.
#[derive(Debug, Clone)]
pub struct Explanation {
    /// Short description of the rule/code.
    pub title: &'static str,
    /// What the rule checks and why it exists.
    pub description: &'static str,
    /// How to fix violations.
    pub remediation: &'static str,
    /// Before/after context examples.
    pub examples: ExamplePair,
}

/// Before and after context examples.
#[derive(Debug, Clone)]
pub struct ExamplePair {
    /// A context that would trigger a violation.
    pub before: &'static str,
    /// A context that passes the rule.
    pub after: &'static str,
}

/// Look up an explanation by rule_id or code.
///
/// Returns `None` if the identifier is not recognized.
pub fn lookup_explanation(identifier: &str) -> Option<Explanation> {
    // Try rule_id first, then code
    match identifier {
        // Rule IDs
        ids::RULE_REQUIREMENT_ID => Some(explain_requirement_id()),
        ids::RULE_REQUIREMENT_REFS => Some(explain_requirement_refs()),
        ids::RULE_PLAN_REFS => Some(explain_plan_refs()),

        // Codes
        ids::CODE_MISSING_REQ_ID => Some(explain_missing_req_id()),
        ids::CODE_MISSING_REQUIREMENT_REFS => Some(explain_missing_requirement_refs()),
        ids::CODE_MISSING_PLAN_REFS => Some(explain_missing_plan_refs()),

        _ => None,
    }
}

// --- Rule-level explanations ---

fn explain_requirement_id() -> Explanation {
    Explanation {
        title: "Requirement Identifier Present",
        description: "\
Every monitored unit of work must name the requirement that governs it.

Without a requirement id:
- blocked decisions cannot be traced back to a requirement document
- incident review has no anchor for deciding whether the block was correct
- downstream tooling cannot group incidents by requirement",
        remediation: "\
Set `requirement_id` in the work context to the governing requirement's
token, e.g. `REQ-001`. The id must be a non-empty alphanumeric-with-dash
token with no leading or trailing dash. Omitting the field entirely applies
the contract default from `traceguard.toml`; an explicit empty string is a
violation.",
        examples: ExamplePair {
            before: r#"{"requirement_id": ""}"#,
            after: r#"{"requirement_id": "REQ-001"}"#,
        },
    }
}

fn explain_requirement_refs() -> Explanation {
    Explanation {
        title: "Requirement References Present",
        description: "\
Monitored work must point into the requirements document it implements.

Empty `requirement_refs` while the contract is enforced means the work unit
cannot prove which requirement text it satisfies, so the guard blocks it.
When `enforce_contract` is false the same condition is surfaced as a
warning instead of a block.",
        remediation: "\
List at least one requirement reference in the context, e.g.
`docs/requirements.md#REQ-001`. If this caller genuinely has no
requirement linkage yet, run it with `enforce_contract = false` until the
references exist, and treat the surfaced warnings as the backlog.",
        examples: ExamplePair {
            before: r#"{"requirement_refs": []}"#,
            after: r#"{"requirement_refs": ["docs/requirements.md#REQ-001"]}"#,
        },
    }
}

fn explain_plan_refs() -> Explanation {
    Explanation {
        title: "Plan References Present",
        description: "\
Monitored work must point at the plan document that scheduled it.

Empty `plan_refs` while the contract is enforced blocks the work: an
unplanned change reaching a governed pipeline is exactly the situation the
guard exists to catch.",
        remediation: "\
List at least one plan reference, e.g.
`docs/plans/monitoring-guard-implementation.md`. Contract defaults from
`traceguard.toml` apply when the field is omitted entirely.",
        examples: ExamplePair {
            before: r#"{"plan_refs": []}"#,
            after: r#"{"plan_refs": ["docs/plans/monitoring-guard-implementation.md"]}"#,
        },
    }
}

// --- Code-level explanations ---

fn explain_missing_req_id() -> Explanation {
    Explanation {
        title: "Missing Requirement Id",
        description: "\
The context's `requirement_id` is empty or is not a valid token
(alphanumeric characters and dashes, no leading or trailing dash).",
        remediation: "\
Provide the governing requirement's token (e.g. `REQ-001`) or omit the
field to accept the contract default.",
        examples: ExamplePair {
            before: r#"{"requirement_id": "-REQ"}"#,
            after: r#"{"requirement_id": "REQ-001"}"#,
        },
    }
}

fn explain_missing_requirement_refs() -> Explanation {
    Explanation {
        title: "Missing Requirement References",
        description: "\
`requirement_refs` is empty while the requirement contract is enforced.",
        remediation: "\
Add the references that trace this work to requirement text, or run the
caller with `enforce_contract = false` to downgrade the violation to a
warning while the linkage is backfilled.",
        examples: ExamplePair {
            before: r#"{"enforce_contract": true, "requirement_refs": []}"#,
            after: r#"{"enforce_contract": true, "requirement_refs": ["docs/requirements.md#REQ-001"]}"#,
        },
    }
}

fn explain_missing_plan_refs() -> Explanation {
    Explanation {
        title: "Missing Plan References",
        description: "\
`plan_refs` is empty while the requirement contract is enforced.",
        remediation: "\
Add the plan document reference that scheduled this work.",
        examples: ExamplePair {
            before: r#"{"enforce_contract": true, "plan_refs": []}"#,
            after: r#"{"enforce_contract": true, "plan_refs": ["docs/plans/monitoring-guard-implementation.md"]}"#,
        },
    }
}
