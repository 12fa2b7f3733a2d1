//! Line-oriented front end for the workbench. Intents arrive as JSON lines on
//! stdin; replies and background events leave as JSON lines on stdout. Logs go
//! to stderr so they never interleave with replies.

pub mod intents;
pub mod state;

use anyhow::{Context, Result};
use cutbench_core::policy::TimelinePolicy;
use intents::{Intent, ShellEvent};
use serde_json::{json, Value};
use state::EditorState;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;

/// Environment variable naming a JSON policy file.
pub const POLICY_ENV: &str = "CUTBENCH_POLICY";

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// Defaults, unless `CUTBENCH_POLICY` points at a policy file.
pub fn load_policy() -> Result<TimelinePolicy> {
    match std::env::var_os(POLICY_ENV) {
        Some(path) => TimelinePolicy::load_from_file(&path)
            .with_context(|| format!("loading policy from {}", path.to_string_lossy())),
        None => Ok(TimelinePolicy::default()),
    }
}

/// Decode and apply one input line.
pub fn dispatch_line(
    state: &mut EditorState,
    line: &str,
    events: &mpsc::UnboundedSender<ShellEvent>,
) -> Value {
    let outcome = serde_json::from_str::<Intent>(line)
        .context("malformed intent")
        .and_then(|intent| intents::handle(state, intent, events));
    match outcome {
        Ok(reply) => reply,
        Err(e) => {
            tracing::warn!(error = %format!("{e:#}"), "intent failed");
            json!({ "error": format!("{e:#}") })
        }
    }
}

pub async fn run() -> Result<()> {
    init_tracing();
    let policy = load_policy()?;
    tracing::info!(?policy, "cutbench shell starting");

    let mut state = EditorState::new(policy);
    let (tx, mut rx) = mpsc::unbounded_channel::<ShellEvent>();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    loop {
        let out = tokio::select! {
            line = lines.next_line() => {
                match line.context("reading stdin")? {
                    Some(line) if line.trim().is_empty() => continue,
                    Some(line) => Some(dispatch_line(&mut state, &line, &tx)),
                    None => break,
                }
            }
            Some(event) = rx.recv() => intents::on_event(&mut state, event),
        };
        if let Some(value) = out {
            let mut text = serde_json::to_string(&value)?;
            text.push('\n');
            stdout.write_all(text.as_bytes()).await?;
            stdout.flush().await?;
        }
    }

    tracing::info!("stdin closed, shutting down");
    Ok(())
}
