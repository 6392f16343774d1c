//! guard: command-line front end for the guardrail policy engine.
//!
//! Validates policy documents and evaluates contexts against them.
//!
//! Usage:
//!   guard check policies/workstation.yaml
//!   guard eval policies/workstation.yaml --tool bash --mode background
//!   guard explain policies/workstation.yaml --tool view --json
//!   guard policies policies/workstation.yaml

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use guard_contracts::{
    error::{GuardError, GuardResult},
    EvaluationContext, PolicySet,
};
use guard_policy::{loader, PolicyEngine};
use guard_schema::{duplicate_policy_ids, PolicySetValidator};

// ── CLI definition ────────────────────────────────────────────────────────────

/// Guardrail policy evaluator for agent tool invocations.
#[derive(Parser)]
#[command(
    name = "guard",
    version,
    about = "Evaluate agent tool invocations against a guardrail policy set",
    long_about = "Loads a YAML, JSON or TOML policy set and decides how an attempted\n\
                  tool invocation should be handled: allowed, denied, or routed to\n\
                  an approval strategy on a delivery channel."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Validate a policy document against the schema and load it.
    Check {
        /// Policy document (.yaml, .yml, .json or .toml).
        file: PathBuf,
    },
    /// Evaluate one context and print the verdict.
    Eval {
        file: PathBuf,
        #[command(flatten)]
        context: ContextArgs,
        /// Print the verdict as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Show how every policy relates to one context, in priority order.
    Explain {
        file: PathBuf,
        #[command(flatten)]
        context: ContextArgs,
        /// Print the diagnostic rows as JSON.
        #[arg(long)]
        json: bool,
    },
    /// List the loaded policies in priority order and the fallback map.
    Policies { file: PathBuf },
}

/// Context facts. An omitted flag leaves the fact unset.
#[derive(Args, Debug, Default)]
struct ContextArgs {
    #[arg(long)]
    mode: Option<String>,
    #[arg(long)]
    model: Option<String>,
    /// Channel the request arrived on.
    #[arg(long)]
    channel: Option<String>,
    #[arg(long)]
    tool: Option<String>,
    #[arg(long)]
    mcp_server: Option<String>,
    #[arg(long)]
    risk: Option<String>,
    #[arg(long)]
    user: Option<String>,
    #[arg(long)]
    session: Option<String>,
}

impl From<ContextArgs> for EvaluationContext {
    fn from(args: ContextArgs) -> Self {
        EvaluationContext {
            mode: args.mode,
            model: args.model,
            channel: args.channel,
            tool: args.tool,
            mcp_server: args.mcp_server,
            risk: args.risk,
            user: args.user,
            session: args.session,
        }
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() {
    // Set RUST_LOG=debug to watch matching and fallback decisions.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Command::Check { file } => run_check(&file),
        Command::Eval {
            file,
            context,
            json,
        } => run_eval(&file, context.into(), json),
        Command::Explain {
            file,
            context,
            json,
        } => run_explain(&file, context.into(), json),
        Command::Policies { file } => run_policies(&file),
    };

    match result {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::exit(1);
        }
    }
}

// ── Subcommands ───────────────────────────────────────────────────────────────
//
// Each returns Ok(false) when it ran but found problems (exit status 1
// without an `error:` line).

fn run_check(file: &Path) -> GuardResult<bool> {
    let document = loader::read_document(file)?;

    let report = PolicySetValidator::new()?.validate(&document);
    if !report.passed {
        println!(
            "{}: {} schema violation(s)",
            file.display(),
            report.failures.len()
        );
        for failure in &report.failures {
            let path = if failure.path.is_empty() {
                "/"
            } else {
                failure.path.as_str()
            };
            println!("  {}  {}", path, failure.message);
        }
        return Ok(false);
    }

    let set = loader::policy_set_from_value(document)?;
    let duplicates = duplicate_policy_ids(&set);
    for id in &duplicates {
        println!("warning: policy id '{}' is declared more than once", id);
    }

    print_summary(file, &set);
    Ok(true)
}

fn run_eval(file: &Path, ctx: EvaluationContext, json: bool) -> GuardResult<bool> {
    let engine = PolicyEngine::from_file(file)?;
    debug!(?ctx, "evaluating context");
    let verdict = engine.evaluate(&ctx);

    if json {
        print_json(&verdict)?;
    } else {
        println!("effect:  {}", verdict.effect);
        println!("channel: {}", verdict.channel);
        println!(
            "policy:  {}",
            verdict.policy_id.as_deref().unwrap_or("(defaults)")
        );
    }
    Ok(true)
}

fn run_explain(file: &Path, ctx: EvaluationContext, json: bool) -> GuardResult<bool> {
    let engine = PolicyEngine::from_file(file)?;
    let rows = engine.evaluate_all(&ctx);

    if json {
        print_json(&rows)?;
        return Ok(true);
    }

    if rows.is_empty() {
        println!("(no policies)");
        return Ok(true);
    }

    let width = rows.iter().map(|r| r.policy_id.len()).max().unwrap_or(0).max(2);
    println!(
        "{:>8}  {:<width$}  {:<10}  {:<7}  MATCHED",
        "PRIORITY",
        "ID",
        "EFFECT",
        "ENABLED",
        width = width
    );
    for row in &rows {
        println!(
            "{:>8}  {:<width$}  {:<10}  {:<7}  {}",
            row.priority,
            row.policy_id,
            row.effect,
            yes_no(row.enabled),
            yes_no(row.matched),
            width = width
        );
    }
    Ok(true)
}

fn run_policies(file: &Path) -> GuardResult<bool> {
    let engine = PolicyEngine::from_file(file)?;
    let defaults = engine.defaults();

    println!(
        "defaults: effect={} channel={}",
        defaults.effect_or_ask(),
        defaults.channel_or_chat()
    );
    println!();

    for policy in engine.policies() {
        let channel = policy
            .channel
            .as_ref()
            .map(|c| c.as_str().to_string())
            .unwrap_or_else(|| "(chat)".to_string());
        let state = if policy.enabled { "" } else { "  [disabled]" };
        println!(
            "{:>5}  {}  effect={} channel={}{}",
            policy.priority, policy.id, policy.effect, channel, state
        );
        if let Some(name) = &policy.name {
            println!("       {}", name);
        }
    }

    let fallbacks = engine.context_fallbacks();
    if !fallbacks.is_empty() {
        println!();
        println!("context fallbacks:");
        for (from, to) in &fallbacks {
            println!("  {} -> {}", display_mode(from), display_mode(to));
        }
    }
    Ok(true)
}

// ── Output helpers ────────────────────────────────────────────────────────────

fn print_summary(file: &Path, set: &PolicySet) {
    println!("{}: ok", file.display());
    println!("  name:      {}", set.metadata.name);
    if let Some(version) = &set.metadata.version {
        println!("  version:   {}", version);
    }
    println!("  policies:  {}", set.policies.len());
    println!("  fallbacks: {}", set.context_fallbacks.len());
}

fn print_json<T: Serialize>(value: &T) -> GuardResult<()> {
    let rendered = serde_json::to_string_pretty(value).map_err(|e| GuardError::ConfigError {
        reason: format!("failed to render JSON output: {}", e),
    })?;
    println!("{}", rendered);
    Ok(())
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "yes"
    } else {
        "no"
    }
}

fn display_mode(mode: &str) -> &str {
    if mode.is_empty() {
        "(unset)"
    } else {
        mode
    }
}
