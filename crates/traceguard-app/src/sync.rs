//! Change-detected sync runner.
//!
//! A registry-protected job that re-extracts from a source file only when
//! its content fingerprint changed since the last recorded run. The guard
//! is enforced before anything else: a blocked job never touches the
//! extractor.

use crate::guard::GuardService;
use anyhow::Context;
use camino::Utf8Path;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::io;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use traceguard_ledger::IncidentStore;
use traceguard_types::RawContext;

pub const RESULT_SYNCED: &str = "synced";
pub const RESULT_SKIPPED_NO_CHANGE: &str = "skipped_no_change";

/// Identity of a source file's content at a point in time.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceFingerprint {
    pub sha256: String,
    pub size: u64,
    pub modified: String,
}

/// Counters returned by an extractor, recorded verbatim in the state file.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncSummary {
    pub run_id: String,
    pub inserted: u32,
    pub updated: u32,
    pub unchanged: u32,
    pub deactivated: u32,
}

/// Persisted between runs; missing or corrupt state loads as default.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_checked_at: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_synced_at: Option<String>,

    #[serde(default)]
    pub last_result: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_source: Option<SourceFingerprint>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_sync: Option<SyncSummary>,

    #[serde(default)]
    pub mode: String,
}

/// The expensive part of a sync job, invoked only on changed sources.
pub trait Extract {
    fn extract(&mut self) -> anyhow::Result<SyncSummary>;
}

#[derive(Clone, Debug)]
pub struct SyncRequest<'a> {
    /// Job name reported to the guard and the fail-closed net.
    pub job: &'a str,
    pub source: &'a Utf8Path,
    pub state_path: &'a Utf8Path,
    /// Run the extractor even when the source fingerprint is unchanged.
    pub force: bool,
    pub scheduled: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SyncOutcome {
    Blocked {
        incident_id: u64,
        rule_code: String,
        reasons: Vec<String>,
    },
    MissingSource,
    SkippedNoChange,
    Synced(SyncSummary),
}

pub fn run_sync<S: IncidentStore, E: Extract>(
    service: &GuardService<'_, S>,
    request: &SyncRequest<'_>,
    extractor: &mut E,
) -> anyhow::Result<SyncOutcome> {
    let entity_id = format!("sync:{}", request.source);
    let guard = service
        .enforce(&RawContext::for_source(request.job, &entity_id), true)
        .context("enforce monitoring guard")?;
    if guard.blocked {
        return Ok(SyncOutcome::Blocked {
            incident_id: guard.incident_id,
            rule_code: guard.rule_code,
            reasons: guard.reasons,
        });
    }

    if !request.source.exists() {
        // Guard already called; the caller maps this to its input-error exit.
        return Ok(SyncOutcome::MissingSource);
    }

    let current = fingerprint(request.source)?;
    let mut state = load_state(request.state_path);
    let changed = state.last_source.as_ref() != Some(&current);

    if !request.force && !changed {
        state.last_checked_at = Some(now_rfc3339()?);
        state.last_result = RESULT_SKIPPED_NO_CHANGE.to_string();
        save_state(request.state_path, &state)?;
        return Ok(SyncOutcome::SkippedNoChange);
    }

    let summary = extractor.extract().context("run extractor")?;

    let now = now_rfc3339()?;
    state.last_checked_at = Some(now.clone());
    state.last_synced_at = Some(now);
    state.last_result = RESULT_SYNCED.to_string();
    state.last_source = Some(current);
    state.last_sync = Some(summary.clone());
    state.mode = if request.scheduled {
        "scheduled".to_string()
    } else {
        "manual".to_string()
    };
    save_state(request.state_path, &state)?;

    Ok(SyncOutcome::Synced(summary))
}

pub fn fingerprint(path: &Utf8Path) -> anyhow::Result<SourceFingerprint> {
    let metadata =
        fs::metadata(path).with_context(|| format!("stat sync source: {path}"))?;

    let mut file =
        fs::File::open(path).with_context(|| format!("open sync source: {path}"))?;
    let mut hasher = Sha256::new();
    io::copy(&mut file, &mut hasher).with_context(|| format!("hash sync source: {path}"))?;
    let sha256 = hex::encode(hasher.finalize());

    let modified = OffsetDateTime::from(metadata.modified()?)
        .format(&Rfc3339)
        .context("format source mtime")?;

    Ok(SourceFingerprint {
        sha256,
        size: metadata.len(),
        modified,
    })
}

pub fn load_state(path: &Utf8Path) -> SyncState {
    // Unreadable or corrupt state never aborts a sync; it just forces a run.
    fs::read_to_string(path)
        .ok()
        .and_then(|text| serde_json::from_str(&text).ok())
        .unwrap_or_default()
}

pub fn save_state(path: &Utf8Path, state: &SyncState) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).with_context(|| format!("create state directory: {parent}"))?;
    }
    let text = serde_json::to_string_pretty(state).context("serialize sync state")?;
    fs::write(path, text).with_context(|| format!("write sync state: {path}"))?;
    Ok(())
}

fn now_rfc3339() -> anyhow::Result<String> {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .context("format current time")
}
