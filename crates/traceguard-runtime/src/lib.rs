//! Fail-closed runtime net for guarded entrypoints.
//!
//! An entrypoint registers itself, does its work, and is expected to call
//! the monitoring guard before exiting. If the process reaches its exit
//! path without the guard ever having been called, the net terminates the
//! process with a reserved status so the omission cannot pass as success.
//!
//! The registry is an ordinary constructor-created value with an injectable
//! terminator, so tests can observe forced exits instead of dying; the
//! process-wide singleton wraps one registry around `std::process::exit`.

#![forbid(unsafe_code)]

use std::sync::{Arc, Mutex, MutexGuard, OnceLock};

/// Reserved status for "registered but never called the guard".
///
/// Distinct from ordinary error exits and from the "guard blocked the
/// work" status, so operators can tell the three apart.
pub const FAIL_CLOSED_EXIT_CODE: i32 = 97;

/// Environment switch for the whole net. Trimmed `"0"` or `"false"`
/// disables it (fail-open) for explicitly-opted-out runs; anything else or
/// absence leaves it enabled. Read once, when the process registry is
/// first touched.
pub const RUNTIME_GUARD_ENV: &str = "TRACEGUARD_RUNTIME_GUARD";

/// Process-termination seam.
pub trait Terminate: Send + Sync {
    fn terminate(&self, code: i32);
}

/// Default terminator: ends the process immediately.
#[derive(Clone, Copy, Debug, Default)]
pub struct ProcessTerminate;

impl Terminate for ProcessTerminate {
    fn terminate(&self, code: i32) {
        std::process::exit(code);
    }
}

#[derive(Debug, Default)]
struct RegistryState {
    registered: bool,
    called: bool,
    entrypoint: String,
    hook_installed: bool,
    hook_ran: bool,
}

/// Lifecycle tracker for one protection domain (normally: one process).
///
/// State machine: unregistered -> registered -> (called | uncalled-at-exit).
pub struct GuardRegistry {
    disabled: bool,
    state: Mutex<RegistryState>,
    terminator: Arc<dyn Terminate>,
}

impl GuardRegistry {
    pub fn new(terminator: Arc<dyn Terminate>) -> Self {
        Self {
            disabled: false,
            state: Mutex::new(RegistryState::default()),
            terminator,
        }
    }

    /// Build a registry honoring the disable switch value.
    pub fn from_switch(switch: Option<&str>, terminator: Arc<dyn Terminate>) -> Self {
        let disabled = matches!(switch.map(str::trim), Some("0") | Some("false") | Some("False"));
        Self {
            disabled,
            ..Self::new(terminator)
        }
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    /// Register an entrypoint for fail-closed protection.
    ///
    /// Returns the exit hook on the first effective call; `None` when the
    /// net is disabled or a hook is already installed. Idempotent: repeated
    /// calls never install a second hook or overwrite the entrypoint name.
    pub fn register(&self, entrypoint: &str) -> Option<ExitHook<'_>> {
        if self.disabled {
            return None;
        }
        let mut state = self.lock_state();
        if !state.registered {
            state.registered = true;
            state.entrypoint = if entrypoint.is_empty() {
                "unknown".to_string()
            } else {
                entrypoint.to_string()
            };
        }
        if state.hook_installed {
            return None;
        }
        state.hook_installed = true;
        Some(ExitHook { registry: self })
    }

    /// Record that the monitoring guard was invoked.
    ///
    /// Safe to call repeatedly, and safe to call without a prior
    /// `register` (a no-op observation).
    pub fn mark_called(&self) {
        self.lock_state().called = true;
    }

    pub fn is_registered(&self) -> bool {
        self.lock_state().registered
    }

    pub fn was_called(&self) -> bool {
        self.lock_state().called
    }

    /// Termination-hook body. Runs at most once per registry, however many
    /// times it is invoked; terminates with [`FAIL_CLOSED_EXIT_CODE`] iff
    /// the registry was registered and the guard never called.
    pub fn verify_exit(&self) {
        let (fire, entrypoint) = {
            let mut state = self.lock_state();
            if state.hook_ran {
                return;
            }
            state.hook_ran = true;
            (
                state.registered && !state.called,
                state.entrypoint.clone(),
            )
        };

        if !fire {
            return;
        }

        eprintln!(
            "[traceguard][fail-closed] monitoring call missing before process exit: {entrypoint}"
        );
        self.terminator.terminate(FAIL_CLOSED_EXIT_CODE);
    }

    // The hook may run while another thread is panicking; a poisoned lock
    // must still fail closed.
    fn lock_state(&self) -> MutexGuard<'_, RegistryState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

/// Explicit shutdown hook: dropping it runs the exit verification.
///
/// Entrypoints hold this for the duration of their work; it fires on the
/// normal return path and during unwinding alike.
#[must_use = "the exit hook verifies the guard was called when dropped"]
pub struct ExitHook<'a> {
    registry: &'a GuardRegistry,
}

impl Drop for ExitHook<'_> {
    fn drop(&mut self) {
        self.registry.verify_exit();
    }
}

static PROCESS_REGISTRY: OnceLock<GuardRegistry> = OnceLock::new();

/// The process-wide registry. The disable switch is read from the
/// environment exactly once, on first access.
pub fn process_registry() -> &'static GuardRegistry {
    PROCESS_REGISTRY.get_or_init(|| {
        GuardRegistry::from_switch(
            std::env::var(RUNTIME_GUARD_ENV).ok().as_deref(),
            Arc::new(ProcessTerminate),
        )
    })
}

/// Register the current process's entrypoint for fail-closed protection.
pub fn register_process(entrypoint: &str) -> Option<ExitHook<'static>> {
    process_registry().register(entrypoint)
}

/// Mark the process-wide registry as called.
pub fn mark_process_called() {
    process_registry().mark_called();
}
