use alqvimia_workflow_recorder::{
    encode_workflow, CaptureEvent, ChannelBackend, EventOutcome, MemorySink, RecorderConfig,
    RecordingSession, SessionHandle,
};
use anyhow::{bail, Context, Result};
use clap::Parser;
use colored::*;
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, warn};

#[derive(Parser, Debug)]
pub struct ReplayArgs {
    /// Capture log, one JSON event per line. The first event must be
    /// `window-selected`.
    pub events: PathBuf,

    /// Workflow name
    #[arg(long)]
    pub name: String,

    /// Window variable (defaults to the suggested one)
    #[arg(long)]
    pub window_var: Option<String>,

    /// Workflow description
    #[arg(long, default_value = "")]
    pub description: String,

    /// Where to write the .wfl file (defaults to `<name>.wfl`)
    #[arg(long, short)]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Default, PartialEq)]
struct ReplayStats {
    appended: usize,
    dropped: usize,
    ignored: usize,
    rejected: usize,
}

pub async fn run(args: ReplayArgs, config: RecorderConfig) -> Result<()> {
    let text = tokio::fs::read_to_string(&args.events)
        .await
        .with_context(|| format!("Failed to read {}", args.events.display()))?;
    let mut lines = text
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty());

    let Some((_, first)) = lines.next() else {
        bail!("{} has no events", args.events.display());
    };
    let window = match CaptureEvent::from_json(first).context("Invalid first event")? {
        CaptureEvent::WindowSelected(window) => window,
        other => bail!(
            "The first event must be window-selected, got {}",
            other.name()
        ),
    };

    let (backend, mut commands) = ChannelBackend::new();
    tokio::spawn(async move {
        while let Some(command) = commands.recv().await {
            debug!("Capture backend received {:?}", command);
        }
    });

    let session = RecordingSession::new(config, Arc::new(backend));
    let handle = SessionHandle::spawn(session, Arc::new(MemorySink::new()));

    handle.start().await?;
    let suggested = handle.select_window(window).await?;
    let window_var = args.window_var.unwrap_or(suggested);
    handle
        .configure(&args.name, &window_var, &args.description)
        .await?;
    info!("Replaying {} into '{}'", args.events.display(), args.name);

    let mut stats = ReplayStats::default();
    for (index, line) in lines {
        let event: Value = match serde_json::from_str(line) {
            Ok(event) => event,
            Err(e) => {
                warn!("Line {}: not JSON: {}", index + 1, e);
                stats.rejected += 1;
                continue;
            }
        };
        match handle.push_event(event).await {
            Ok(EventOutcome::Appended(_)) => stats.appended += 1,
            Ok(EventOutcome::Dropped) => stats.dropped += 1,
            Ok(EventOutcome::Ignored) | Ok(EventOutcome::Transitioned(_)) => stats.ignored += 1,
            Err(e) => {
                debug!("Line {}: {}", index + 1, e);
                stats.rejected += 1;
            }
        }
    }

    handle.stop().await?;
    let document = handle.document().await?;
    let output = args
        .output
        .unwrap_or_else(|| PathBuf::from(document.export_file_name()));
    tokio::fs::write(&output, encode_workflow(&document)?)
        .await
        .with_context(|| format!("Failed to write {}", output.display()))?;

    println!(
        "{} Recorded {} actions ({} captured, {} dropped, {} ignored, {} rejected)",
        "✅".green(),
        document.actions.len().to_string().bold(),
        stats.appended,
        stats.dropped,
        stats.ignored,
        stats.rejected
    );
    println!("   Window variable: {}", window_var.cyan());
    println!("   Wrote {}", output.display());
    Ok(())
}
