use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use tokio::sync::mpsc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use ax_adapter::{AccessTree, FixtureTree};
use axprogress_cli::display::TerminalDisplay;
use axprogress_cli::settings::{
    self, Settings, DEFAULT_INTERVAL_SECS, MAX_INTERVAL_SECS, MIN_INTERVAL_SECS,
};
use axprogress_session::{
    DisplaySink, ProgressSession, SessionCommand, SessionConfig, NO_PROGRESS_MESSAGE,
};
use perceiver_progress::{find_progress_indicators, message_for};

#[derive(Parser)]
#[command(
    name = "axprogress",
    version,
    about = "Watches an accessibility tree for progress indicators and reads their percentages"
)]
struct Cli {
    /// Settings file location (defaults to the platform config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Walk a tree document once and print every progress reading
    Scan {
        /// JSON tree document standing in for the live host tree
        #[arg(long)]
        tree: PathBuf,
    },
    /// Open the auto-refreshing progress display (Ctrl-C closes it)
    Watch {
        /// JSON tree document standing in for the live host tree
        #[arg(long)]
        tree: PathBuf,
        /// Refresh interval override in seconds (1-300)
        #[arg(long)]
        interval: Option<u64>,
    },
    /// Persist a new refresh interval
    SetInterval {
        /// Interval in seconds (1-300)
        seconds: Option<u64>,
        /// Reset to the default interval instead
        #[arg(long, conflicts_with = "seconds")]
        reset: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config_path = cli.config.clone().unwrap_or_else(settings::default_path);

    match cli.command {
        Commands::Scan { tree } => scan(&tree),
        Commands::Watch { tree, interval } => watch(&tree, interval, &config_path).await,
        Commands::SetInterval { seconds, reset } => set_interval(seconds, reset, &config_path),
    }
}

fn load_tree(path: &Path) -> Result<FixtureTree> {
    let document = std::fs::read_to_string(path)
        .with_context(|| format!("reading tree document {}", path.display()))?;
    FixtureTree::from_json(&document).context("decoding tree document")
}

fn scan(tree_path: &Path) -> Result<()> {
    let tree = load_tree(tree_path)?;
    let root = tree.foreground()?;
    let candidates = find_progress_indicators(root);
    if candidates.is_empty() {
        println!("{NO_PROGRESS_MESSAGE}");
        return Ok(());
    }
    for candidate in &candidates {
        println!("{}", message_for(candidate));
    }
    Ok(())
}

async fn watch(tree_path: &Path, interval: Option<u64>, config_path: &Path) -> Result<()> {
    let settings = Settings::load(config_path);
    let seconds = match interval {
        Some(seconds) => {
            validate_interval(seconds)?;
            seconds
        }
        None => settings.refresh_interval,
    };

    let tree = Arc::new(load_tree(tree_path)?);
    let display = Arc::new(TerminalDisplay::new());
    let session = ProgressSession::new(
        tree as Arc<dyn AccessTree>,
        Arc::clone(&display) as Arc<dyn DisplaySink>,
        SessionConfig::new(Duration::from_secs(seconds)),
    );

    let (commands, inbox) = mpsc::channel(8);
    let event_loop = tokio::spawn(session.run(inbox));

    commands
        .send(SessionCommand::Toggle)
        .await
        .map_err(|_| anyhow!("session loop stopped before opening"))?;
    info!(interval = seconds, "watching; press Ctrl-C to close");

    tokio::signal::ctrl_c()
        .await
        .context("waiting for Ctrl-C")?;

    commands
        .send(SessionCommand::Shutdown)
        .await
        .map_err(|_| anyhow!("session loop already stopped"))?;
    event_loop.await.context("session loop panicked")?;
    Ok(())
}

fn set_interval(seconds: Option<u64>, reset: bool, config_path: &Path) -> Result<()> {
    let target = if reset {
        DEFAULT_INTERVAL_SECS
    } else {
        let Some(seconds) = seconds else {
            bail!("provide an interval in seconds, or --reset");
        };
        validate_interval(seconds)?;
        seconds
    };

    let mut settings = Settings::load(config_path);
    settings.refresh_interval = target;
    settings.save(config_path);
    println!("Refresh interval set to {target} s");
    Ok(())
}

fn validate_interval(seconds: u64) -> Result<()> {
    if !(MIN_INTERVAL_SECS..=MAX_INTERVAL_SECS).contains(&seconds) {
        bail!("invalid interval: expected {MIN_INTERVAL_SECS}-{MAX_INTERVAL_SECS} seconds");
    }
    Ok(())
}
