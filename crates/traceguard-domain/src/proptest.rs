//! Property-based tests for the domain crate.
//!
//! These tests use proptest to verify invariants around:
//! - Normalization totality and preservation of explicit values
//! - Evaluation determinism
//! - The monitoring-off short-circuit

use crate::engine::evaluate;
use crate::normalize::normalize;
use crate::policy::ContractDefaults;
use crate::test_support::strict_config;
use proptest::prelude::*;
use traceguard_types::{RawContext, Verdict};

// ============================================================================
// Strategies for generating arbitrary values
// ============================================================================

/// Strategy for requirement-id-shaped strings, valid and invalid alike.
fn arb_requirement_id() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(String::new()),
        prop::string::string_regex("[A-Z]{2,4}-[0-9]{1,4}").unwrap(),
        prop::string::string_regex("[a-zA-Z0-9 _#-]{0,16}").unwrap(),
    ]
}

fn arb_refs() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(
        prop::string::string_regex("docs/[a-z]{1,12}\\.md#REQ-[0-9]{1,3}").unwrap(),
        0..4,
    )
}

prop_compose! {
    fn arb_raw_context()(
        requirement_id in prop::option::of(arb_requirement_id()),
        requirement_refs in prop::option::of(arb_refs()),
        plan_refs in prop::option::of(arb_refs()),
        design_refs in prop::option::of(arb_refs()),
        monitoring_enabled in prop::option::of(any::<bool>()),
        enforce_contract in prop::option::of(any::<bool>()),
    ) -> RawContext {
        RawContext {
            source: None,
            entity_id: None,
            requirement_id,
            requirement_refs,
            plan_refs,
            design_refs,
            monitoring_enabled,
            enforce_contract,
            test_tags: None,
        }
    }
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    /// Explicit caller values survive normalization verbatim; absent ones
    /// take the contract defaults.
    #[test]
    fn normalization_preserves_explicit_values(raw in arb_raw_context()) {
        let defaults = ContractDefaults::default();
        let ctx = normalize(&raw, &defaults);

        match &raw.requirement_id {
            Some(id) => prop_assert_eq!(&ctx.requirement_id, id),
            None => prop_assert_eq!(&ctx.requirement_id, &defaults.requirement_id),
        }
        match &raw.requirement_refs {
            Some(refs) => prop_assert_eq!(&ctx.requirement_refs, refs),
            None => prop_assert_eq!(&ctx.requirement_refs, &defaults.requirement_refs),
        }
        prop_assert_eq!(ctx.monitoring_enabled, raw.monitoring_enabled.unwrap_or(true));
        prop_assert_eq!(ctx.enforce_contract, raw.enforce_contract.unwrap_or(true));
    }

    /// Normalizing twice is the same as normalizing once: a normalized
    /// context re-wrapped as explicit input maps to itself.
    #[test]
    fn normalization_is_idempotent(raw in arb_raw_context()) {
        let defaults = ContractDefaults::default();
        let once = normalize(&raw, &defaults);
        let rewrapped = RawContext {
            source: Some(once.source.clone()),
            entity_id: Some(once.entity_id.clone()),
            requirement_id: Some(once.requirement_id.clone()),
            requirement_refs: Some(once.requirement_refs.clone()),
            plan_refs: Some(once.plan_refs.clone()),
            design_refs: Some(once.design_refs.clone()),
            monitoring_enabled: Some(once.monitoring_enabled),
            enforce_contract: Some(once.enforce_contract),
            test_tags: Some(once.test_tags.clone()),
        };
        prop_assert_eq!(normalize(&rewrapped, &defaults), once);
    }

    /// Monitoring-off contexts never block, whatever else they carry.
    #[test]
    fn monitoring_off_always_passes(raw in arb_raw_context()) {
        let mut raw = raw;
        raw.monitoring_enabled = Some(false);
        let ctx = normalize(&raw, &ContractDefaults::default());

        let eval = evaluate(&ctx, &strict_config());
        prop_assert_eq!(eval.verdict, Verdict::Pass);
        prop_assert!(eval.violations.is_empty());
    }

    /// Evaluation is deterministic: identical inputs, identical outputs.
    #[test]
    fn evaluation_is_deterministic(raw in arb_raw_context()) {
        let ctx = normalize(&raw, &ContractDefaults::default());
        let cfg = strict_config();

        let first = evaluate(&ctx, &cfg);
        let second = evaluate(&ctx, &cfg);
        prop_assert_eq!(first.verdict, second.verdict);
        prop_assert_eq!(first.violations, second.violations);
    }

    /// A block always comes with at least one reason and a primary code.
    #[test]
    fn blocked_implies_reasons(raw in arb_raw_context()) {
        let ctx = normalize(&raw, &ContractDefaults::default());
        let eval = evaluate(&ctx, &strict_config());

        if eval.is_blocked() {
            prop_assert!(!eval.reasons().is_empty());
            prop_assert!(!eval.primary_code().is_empty());
        }
    }
}
