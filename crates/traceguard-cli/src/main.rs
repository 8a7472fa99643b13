//! CLI entry point for traceguard.
//!
//! This module is intentionally thin: it handles argument parsing, I/O, and exit codes.
//! All business logic lives in the `traceguard-app` crate.

use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use clap::{Parser, Subcommand};
use traceguard_app::{
    ExplainOutput, GuardService, SnapshotImporter, SyncOutcome, SyncRequest, apply_batch,
    format_explanation, format_not_found, run_explain, run_sync, snapshot::parse_records,
};
use traceguard_ledger::{IncidentStore, JsonlLedger};
use traceguard_settings::Overrides;
use traceguard_types::RawContext;

/// Guard explicitly blocked the work in hard mode.
const EXIT_BLOCKED: i32 = 3;
/// Input or source file missing; the guard was still called.
const EXIT_INPUT: i32 = 2;

#[derive(Parser, Debug)]
#[command(
    name = "traceguard",
    version,
    about = "Fail-closed consistency-monitoring guard for governed entrypoints"
)]
struct Cli {
    /// Path to traceguard config TOML.
    #[arg(long, default_value = "traceguard.toml")]
    config: Utf8PathBuf,

    /// Override profile (strict|observe).
    #[arg(long)]
    profile: Option<String>,

    /// Override enforcement mode (hard|soft).
    #[arg(long)]
    mode: Option<String>,

    /// Path to the append-only incident ledger (JSONL).
    #[arg(long, default_value = "artifacts/traceguard/incidents.jsonl")]
    ledger: Utf8PathBuf,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Enforce the guard for a single work context.
    Check {
        /// Path to the work context JSON.
        #[arg(long)]
        context: Utf8PathBuf,

        /// Report violations without blocking or recording an incident.
        #[arg(long)]
        soft: bool,
    },

    /// Apply the guard across JSONL work records.
    Batch {
        /// Input records, one JSON object per line.
        #[arg(long)]
        input: Utf8PathBuf,

        /// Where to write the annotated rows.
        #[arg(long)]
        output: Utf8PathBuf,

        /// Caller name recorded in each row's context.
        #[arg(long, default_value = "traceguard.batch")]
        source_name: String,
    },

    /// Run the change-detected snapshot sync.
    Sync {
        /// Source records, one JSON object per line.
        #[arg(long)]
        source: Utf8PathBuf,

        /// Snapshot store the source is imported into.
        #[arg(long, default_value = "artifacts/traceguard/snapshot.json")]
        store: Utf8PathBuf,

        /// Where run state (fingerprint, last result) is kept.
        #[arg(long, default_value = "artifacts/traceguard/sync_state.json")]
        state: Utf8PathBuf,

        /// Run the import even when the source fingerprint is unchanged.
        #[arg(long)]
        force: bool,

        /// Set when launched by a scheduler.
        #[arg(long)]
        scheduled: bool,

        /// Append the outcome line to this log file.
        #[arg(long)]
        log: Option<Utf8PathBuf>,
    },

    /// List recent incidents from the ledger, newest first.
    Incidents {
        #[arg(long, default_value = "20")]
        limit: usize,
    },

    /// Explain a rule_id or code with remediation guidance.
    Explain {
        /// The rule_id (e.g. "contract.plan_refs") or code (e.g. "missing_plan_refs").
        identifier: String,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match &cli.cmd {
        Commands::Check { .. } | Commands::Batch { .. } | Commands::Sync { .. } => {
            run_guarded(&cli)
        }
        Commands::Incidents { limit } => cmd_incidents(&cli, *limit),
        Commands::Explain { identifier } => cmd_explain(identifier),
    }
}

/// Run a registry-protected subcommand.
///
/// The exit hook is dropped before the process exits: a run that got this
/// far without ever calling the guard dies with the fail-closed status
/// instead of its ordinary exit code.
fn run_guarded(cli: &Cli) -> anyhow::Result<()> {
    let entrypoint = match &cli.cmd {
        Commands::Check { .. } => "traceguard::check",
        Commands::Batch { .. } => "traceguard::batch",
        Commands::Sync { .. } => "traceguard::sync",
        _ => unreachable!("only guarded subcommands reach here"),
    };
    let hook = traceguard_runtime::register_process(entrypoint);

    let result = match &cli.cmd {
        Commands::Check { context, soft } => cmd_check(cli, context, *soft),
        Commands::Batch {
            input,
            output,
            source_name,
        } => cmd_batch(cli, input, output, source_name),
        Commands::Sync {
            source,
            store,
            state,
            force,
            scheduled,
            log,
        } => cmd_sync(cli, source, store, state, *force, *scheduled, log.as_deref()),
        _ => unreachable!("only guarded subcommands reach here"),
    };

    let code = match result {
        Ok(code) => code,
        Err(err) => {
            eprintln!("traceguard error: {err:#}");
            1
        }
    };

    drop(hook);
    std::process::exit(code);
}

fn resolve_effective(cli: &Cli) -> anyhow::Result<traceguard_settings::ResolvedConfig> {
    // Missing config file is allowed; defaults apply.
    let cfg_text = std::fs::read_to_string(&cli.config).unwrap_or_default();
    let cfg = if cfg_text.trim().is_empty() {
        traceguard_settings::GuardConfigV1::default()
    } else {
        traceguard_settings::parse_config_toml(&cfg_text).context("parse config")?
    };
    let overrides = Overrides {
        profile: cli.profile.clone(),
        mode: cli.mode.clone(),
    };
    traceguard_settings::resolve_config(cfg, overrides).context("resolve config")
}

fn cmd_check(cli: &Cli, context_path: &Utf8Path, soft: bool) -> anyhow::Result<i32> {
    let resolved = resolve_effective(cli)?;
    let hard_block = !soft && resolved.effective.hard_block;

    let text = std::fs::read_to_string(context_path)
        .with_context(|| format!("read context: {context_path}"))?;
    let raw: RawContext =
        serde_json::from_str(&text).with_context(|| format!("parse context: {context_path}"))?;

    let ledger = JsonlLedger::open(cli.ledger.clone()).context("open incident ledger")?;
    let service = GuardService::new(
        &ledger,
        &resolved.effective,
        traceguard_runtime::process_registry(),
    );

    let result = service.enforce(&raw, hard_block)?;
    println!("{}", serde_json::to_string(&result).context("serialize result")?);

    if result.blocked && hard_block {
        eprintln!(
            "traceguard: blocked incident_id={} rule={} reasons={}",
            result.incident_id,
            result.rule_code,
            result.reasons.join("|")
        );
        return Ok(EXIT_BLOCKED);
    }
    Ok(0)
}

fn cmd_batch(
    cli: &Cli,
    input: &Utf8Path,
    output: &Utf8Path,
    source_name: &str,
) -> anyhow::Result<i32> {
    let resolved = resolve_effective(cli)?;

    if !input.exists() {
        traceguard_runtime::mark_process_called();
        eprintln!("traceguard: input file not found: {input}");
        return Ok(EXIT_INPUT);
    }

    let text =
        std::fs::read_to_string(input).with_context(|| format!("read batch input: {input}"))?;
    let records = match parse_records(&text) {
        Ok(records) => records,
        Err(err) => {
            // Malformed rows are a monitored failure, not a forgotten guard.
            traceguard_runtime::mark_process_called();
            return Err(err).context("parse batch input");
        }
    };

    if records.is_empty() {
        traceguard_runtime::mark_process_called();
        write_lines(output, &[])?;
        println!("[done] total=0 passed=0 blocked=0 output={output}");
        return Ok(0);
    }

    let ledger = JsonlLedger::open(cli.ledger.clone()).context("open incident ledger")?;
    let service = GuardService::new(
        &ledger,
        &resolved.effective,
        traceguard_runtime::process_registry(),
    );

    let batch = apply_batch(&service, source_name, &records)?;

    let lines = batch
        .rows
        .iter()
        .map(|row| serde_json::to_string(row).context("serialize batch row"))
        .collect::<anyhow::Result<Vec<_>>>()?;
    write_lines(output, &lines)?;

    println!(
        "[done] total={} passed={} blocked={} output={}",
        batch.summary.total, batch.summary.passed, batch.summary.blocked, output
    );
    Ok(0)
}

fn cmd_sync(
    cli: &Cli,
    source: &Utf8Path,
    store: &Utf8Path,
    state: &Utf8Path,
    force: bool,
    scheduled: bool,
    log: Option<&Utf8Path>,
) -> anyhow::Result<i32> {
    let resolved = resolve_effective(cli)?;

    let ledger = JsonlLedger::open(cli.ledger.clone()).context("open incident ledger")?;
    let service = GuardService::new(
        &ledger,
        &resolved.effective,
        traceguard_runtime::process_registry(),
    );

    let request = SyncRequest {
        job: "traceguard::sync",
        source,
        state_path: state,
        force,
        scheduled,
    };
    let mut importer = SnapshotImporter::new(source, store);
    let outcome = run_sync(&service, &request, &mut importer)?;

    let (line, code) = match &outcome {
        SyncOutcome::Blocked {
            incident_id,
            rule_code,
            reasons,
        } => (
            format!(
                "[blocked] incident_id={incident_id} rule={rule_code} reasons={}",
                reasons.join("|")
            ),
            EXIT_BLOCKED,
        ),
        SyncOutcome::MissingSource => (format!("[error] source not found: {source}"), EXIT_INPUT),
        SyncOutcome::SkippedNoChange => (format!("[skip] no_change source={source}"), 0),
        SyncOutcome::Synced(summary) => (
            format!(
                "[sync] run_id={} inserted={} updated={} unchanged={} deactivated={}",
                summary.run_id,
                summary.inserted,
                summary.updated,
                summary.unchanged,
                summary.deactivated
            ),
            0,
        ),
    };

    println!("{line}");
    if let Some(log_path) = log {
        append_log(log_path, &line)?;
    }
    Ok(code)
}

fn cmd_incidents(cli: &Cli, limit: usize) -> anyhow::Result<()> {
    let ledger = JsonlLedger::open(cli.ledger.clone()).context("open incident ledger")?;
    for incident in ledger.recent(limit).context("read incidents")? {
        println!(
            "{}",
            serde_json::to_string(&incident).context("serialize incident")?
        );
    }
    Ok(())
}

fn cmd_explain(identifier: &str) -> anyhow::Result<()> {
    match run_explain(identifier) {
        ExplainOutput::Found(exp) => {
            print!("{}", format_explanation(&exp));
            Ok(())
        }
        ExplainOutput::NotFound {
            identifier,
            available_rule_ids,
            available_codes,
        } => {
            eprint!(
                "{}",
                format_not_found(&identifier, available_rule_ids, available_codes)
            );
            std::process::exit(1);
        }
    }
}

fn write_lines(path: &Utf8Path, lines: &[String]) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create directory: {parent}"))?;
    }
    let mut text = lines.join("\n");
    if !text.is_empty() {
        text.push('\n');
    }
    std::fs::write(path, text).with_context(|| format!("write output: {path}"))?;
    Ok(())
}

fn append_log(path: &Utf8Path, line: &str) -> anyhow::Result<()> {
    use std::io::Write;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create log directory: {parent}"))?;
    }
    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("open log: {path}"))?;
    writeln!(file, "{line}").with_context(|| format!("append log: {path}"))?;
    Ok(())
}
