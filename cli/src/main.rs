//! `ember-prompts`: replays a prompt scenario against the lifecycle
//! controller and prints what the renderer would have seen.

mod scenario;

use std::env;
use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use ember_config::{EmberConfig, ember_dir};

use crate::scenario::Scenario;

const USAGE: &str = "usage: ember-prompts <scenario.toml>";

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let config = EmberConfig::load()?;
    init_tracing(config.logging.filter.as_deref());

    let Some(path) = env::args_os().nth(1).map(PathBuf::from) else {
        anyhow::bail!(USAGE);
    };
    let content = fs::read_to_string(&path)
        .with_context(|| format!("failed to read scenario {}", path.display()))?;
    let scenario = Scenario::parse(&content)?;

    tracing::info!(path = %path.display(), steps = scenario.steps.len(), "Replaying scenario");
    let transcript = scenario::run(scenario, config.prompts).await?;
    for line in transcript {
        println!("{line}");
    }
    Ok(())
}

fn init_tracing(configured: Option<&str>) {
    let env_filter = EnvFilter::try_from_default_env()
        .ok()
        .or_else(|| configured.and_then(|directive| EnvFilter::try_new(directive).ok()))
        .unwrap_or_else(|| EnvFilter::new("info"));

    let (log_file, init_warnings) = open_log_file();

    if let Some((log_path, file)) = log_file {
        tracing_subscriber::registry()
            .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
            .with(env_filter)
            .init();

        tracing::info!(path = %log_path.display(), "Logging initialized");
        for warning in init_warnings {
            tracing::warn!("{warning}");
        }
        return;
    }

    // Transcript goes to stdout; logs must not interleave with it.
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(env_filter)
        .init();
    for warning in init_warnings {
        tracing::warn!("{warning}");
    }
}

fn open_log_file() -> (Option<(PathBuf, fs::File)>, Vec<String>) {
    let mut warnings = Vec::new();

    for candidate in log_file_candidates() {
        if let Some(parent) = candidate.parent()
            && let Err(e) = fs::create_dir_all(parent)
        {
            warnings.push(format!(
                "Failed to create log dir {}: {e}",
                parent.display()
            ));
            continue;
        }

        match OpenOptions::new().create(true).append(true).open(&candidate) {
            Ok(file) => return (Some((candidate, file)), warnings),
            Err(e) => {
                warnings.push(format!(
                    "Failed to open log file {}: {e}",
                    candidate.display()
                ));
            }
        }
    }

    (None, warnings)
}

fn log_file_candidates() -> Vec<PathBuf> {
    let mut candidates = Vec::new();

    // Primary: ~/.ember/logs/ember.log
    if let Some(dir) = ember_dir() {
        candidates.push(dir.join("logs").join("ember.log"));
    }

    // Fallback: ./.ember/logs/ember.log
    candidates.push(PathBuf::from(".ember").join("logs").join("ember.log"));

    candidates
}
