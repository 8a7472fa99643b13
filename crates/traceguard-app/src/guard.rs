//! The `enforce` use case: the single entrypoint callers use to ask
//! "is this unit of work compliant, and what do I do if not?"

use traceguard_domain::policy::EffectiveConfig;
use traceguard_domain::{evaluate, normalize};
use traceguard_ledger::{IncidentStore, StoreError};
use traceguard_runtime::GuardRegistry;
use traceguard_types::{GuardResult, RawContext};

#[derive(Debug, thiserror::Error)]
pub enum GuardError {
    /// Opt-in abort signal for callers using [`GuardService::require`].
    /// Expected policy outcomes otherwise stay data in [`GuardResult`].
    #[error("work blocked by rule '{rule_code}' (incident {incident_id})")]
    Blocked {
        incident_id: u64,
        rule_code: String,
        reasons: Vec<String>,
    },

    /// The ledger could not persist an incident. Never swallowed: a lost
    /// incident would undermine the audit guarantee.
    #[error(transparent)]
    Store(#[from] StoreError),
}

pub struct GuardService<'a, S: IncidentStore> {
    store: &'a S,
    config: &'a EffectiveConfig,
    registry: &'a GuardRegistry,
}

impl<'a, S: IncidentStore> GuardService<'a, S> {
    pub fn new(store: &'a S, config: &'a EffectiveConfig, registry: &'a GuardRegistry) -> Self {
        Self {
            store,
            config,
            registry,
        }
    }

    pub fn config(&self) -> &EffectiveConfig {
        self.config
    }

    /// Evaluate one unit of work.
    ///
    /// The runtime registry is marked called before anything else, so the
    /// fail-closed net never misreports a call that did occur — even one
    /// that later fails on persistence.
    ///
    /// Blocked outcomes are data, not errors; only a storage failure on
    /// the hard-block path surfaces as `Err`.
    pub fn enforce(&self, raw: &RawContext, hard_block: bool) -> Result<GuardResult, GuardError> {
        self.registry.mark_called();

        let ctx = normalize(raw, &self.config.defaults);
        let eval = evaluate(&ctx, self.config);

        if !eval.is_blocked() {
            // Pass, or warnings only: surfaced but not blocking.
            return Ok(GuardResult {
                blocked: false,
                incident_id: 0,
                rule_code: eval.primary_code().to_string(),
                reasons: eval.reasons(),
            });
        }

        if hard_block {
            let incident = self
                .store
                .record(eval.primary_code(), &eval.reasons(), &ctx)?;
            Ok(GuardResult {
                blocked: true,
                incident_id: incident.id,
                rule_code: incident.rule_code,
                reasons: incident.reasons,
            })
        } else {
            Ok(GuardResult {
                blocked: true,
                incident_id: 0,
                rule_code: eval.primary_code().to_string(),
                reasons: eval.reasons(),
            })
        }
    }

    /// Hard-block enforcement for callers that want abort-style control
    /// flow: a blocked decision becomes [`GuardError::Blocked`].
    pub fn require(&self, raw: &RawContext) -> Result<GuardResult, GuardError> {
        let result = self.enforce(raw, true)?;
        if result.blocked {
            return Err(GuardError::Blocked {
                incident_id: result.incident_id,
                rule_code: result.rule_code,
                reasons: result.reasons,
            });
        }
        Ok(result)
    }
}
