//! Alqvimia CLI
//!
//! Headless harness for the action schema registry and the workflow recorder.
//!
//! Usage from workspace root:
//!   cargo run --bin alqvimia -- schemas --category excel
//!   cargo run --bin alqvimia -- schema rest_put
//!   cargo run --bin alqvimia -- visible web_click --values '{"clickType":"double"}'
//!   cargo run --bin alqvimia -- encode workflow.json -o workflow.wfl
//!   cargo run --bin alqvimia -- decode workflow.wfl
//!   cargo run --bin alqvimia -- replay events.jsonl --name "Invoice run"

use alqvimia_actions::{visible_fields_with, ActionRegistry};
use alqvimia_workflow_recorder::{
    decode_value, encode_value, import_workflows, RecorderConfig, RecorderConfigOptions,
};
use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tracing::debug;

mod replay;

#[derive(Parser)]
#[command(name = "alqvimia")]
#[command(about = "🧪 Alqvimia CLI - action schemas and workflow recordings")]
struct Cli {
    /// Recorder configuration (JSON, camelCase keys)
    #[arg(long, global = true, env = "ALQVIMIA_RECORDER_CONFIG")]
    config: Option<PathBuf>,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List registered action types
    Schemas {
        /// Only this palette category (e.g. `excel`)
        #[arg(long)]
        category: Option<String>,
    },
    /// Print the resolved schema of an action type as JSON
    Schema { action_type: String },
    /// Print the fields visible for the given values
    Visible {
        action_type: String,
        /// Current values as a JSON object
        #[arg(long, default_value = "{}")]
        values: String,
        /// Include advanced fields
        #[arg(long)]
        advanced: bool,
    },
    /// Wrap a workflow JSON file into a .wfl file
    Encode {
        input: PathBuf,
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Print the JSON inside a .wfl file
    Decode { input: PathBuf },
    /// List the workflows in a .alqzip, .wfl or JSON file
    Import { input: PathBuf },
    /// Drive a recording session from a JSON-lines capture log
    Replay(replay::ReplayArgs),
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::EnvFilter;
    let default = if verbose { "debug" } else { "info" };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into()))
        .with_writer(std::io::stderr)
        .try_init();
}

fn load_config(path: Option<&Path>) -> Result<RecorderConfig> {
    let Some(path) = path else {
        return Ok(RecorderConfig::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    let options: RecorderConfigOptions = serde_json::from_str(&text)
        .with_context(|| format!("Invalid recorder config {}", path.display()))?;
    debug!("Loaded recorder config from {}", path.display());
    Ok(options.to_recorder_config())
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("{} {:#}", "❌".red(), e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Schemas { category } => list_schemas(category.as_deref()),
        Commands::Schema { action_type } => show_schema(&action_type),
        Commands::Visible {
            action_type,
            values,
            advanced,
        } => show_visible(&action_type, &values, advanced),
        Commands::Encode { input, output } => encode(&input, output),
        Commands::Decode { input } => decode(&input),
        Commands::Import { input } => import(&input),
        Commands::Replay(args) => {
            let config = load_config(cli.config.as_deref())?;
            replay::run(args, config).await
        }
    }
}

fn list_schemas(category: Option<&str>) -> Result<()> {
    let registry = ActionRegistry::builtin();
    let print_type = |action_type: &str| {
        let title = registry
            .schema(action_type)
            .map(|s| s.title.as_str())
            .unwrap_or("");
        println!("  {:<28} {}", action_type.green(), title);
    };

    if let Some(id) = category {
        let Some(category) = registry.category(id) else {
            bail!("Unknown category '{id}'");
        };
        println!("{}", category.name.cyan().bold());
        category.action_types.iter().for_each(|t| print_type(t));
        return Ok(());
    }

    for category in registry.categories() {
        println!("{} ({})", category.name.cyan().bold(), category.id.dimmed());
        category.action_types.iter().for_each(|t| print_type(t));
    }
    let mut other: Vec<_> = registry
        .action_types()
        .filter(|t| registry.category_of(t).is_none())
        .collect();
    if !other.is_empty() {
        other.sort_unstable();
        println!("{}", "Other".cyan().bold());
        other.into_iter().for_each(print_type);
    }
    Ok(())
}

fn show_schema(action_type: &str) -> Result<()> {
    let schema = ActionRegistry::builtin().resolve(action_type);
    if schema.is_fallback {
        eprintln!(
            "{} '{}' is not registered; showing the blank panel",
            "⚠️".yellow(),
            action_type
        );
    }
    println!("{}", serde_json::to_string_pretty(&*schema)?);
    Ok(())
}

fn show_visible(action_type: &str, values: &str, advanced: bool) -> Result<()> {
    let values: Map<String, Value> =
        serde_json::from_str(values).context("--values must be a JSON object")?;
    let schema = ActionRegistry::builtin().resolve(action_type);
    for field in visible_fields_with(&schema, &values, advanced) {
        let marker = if field.required { "*" } else { " " };
        println!("{marker} {:<24} {}", field.key.green(), field.label);
    }
    Ok(())
}

fn encode(input: &Path, output: Option<PathBuf>) -> Result<()> {
    let text = std::fs::read_to_string(input)
        .with_context(|| format!("Failed to read {}", input.display()))?;
    let payload: Value = serde_json::from_str(&text)
        .with_context(|| format!("{} is not valid JSON", input.display()))?;
    let encoded = encode_value(&payload)?;
    let output = output.unwrap_or_else(|| input.with_extension("wfl"));
    std::fs::write(&output, encoded)
        .with_context(|| format!("Failed to write {}", output.display()))?;
    println!("{} Wrote {}", "✅".green(), output.display());
    Ok(())
}

fn decode(input: &Path) -> Result<()> {
    let bytes =
        std::fs::read(input).with_context(|| format!("Failed to read {}", input.display()))?;
    let value = decode_value(&bytes).with_context(|| format!("Cannot open {}", input.display()))?;
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}

fn import(input: &Path) -> Result<()> {
    let bytes =
        std::fs::read(input).with_context(|| format!("Failed to read {}", input.display()))?;
    let documents =
        import_workflows(&bytes).with_context(|| format!("Cannot import {}", input.display()))?;
    for document in &documents {
        println!(
            "{}  {}  ({} actions)",
            document.id.dimmed(),
            document.name.bold(),
            document.actions.len()
        );
    }
    Ok(())
}
