use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use boardbot::config::BotConfig;
use boardbot::github::GitHubClient;
use boardbot::mirror::BoardMirror;
use boardbot::policy::PolicyEngine;
use boardbot::server::{self, AppState};
use boardbot::teams::TeamDirectory;

#[derive(Parser)]
#[command(name = "boardbot")]
#[command(version, about = "Webhook bot that mirrors a GitHub project board")]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, default_value = "boardbot.toml")]
    config: PathBuf,

    /// Override the configured listen port.
    #[arg(short, long)]
    port: Option<u16>,

    /// Log at debug level (RUST_LOG still takes precedence).
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    let config = BotConfig::load(&cli.config)?;
    let problems = config.validate();
    if !problems.is_empty() {
        bail!("invalid configuration: {}", problems.join("; "));
    }
    let port = cli.port.unwrap_or(config.port);

    let api = Arc::new(GitHubClient::new(&config)?);

    // Bootstrap. Failure here is fatal: the supervisor restarts the
    // process rather than letting it serve from a partial snapshot.
    let teams = TeamDirectory::load(api.as_ref(), &config.qa_team, &config.dev_team)
        .await
        .context("failed to load team metadata")?;
    let mirror = Arc::new(BoardMirror::new(api));
    mirror
        .refresh(&config.organization, &config.project)
        .await
        .context("failed to bootstrap the board mirror")?;
    tracing::info!("initialized successfully");

    let policy = PolicyEngine::new(
        mirror.clone(),
        teams,
        config.developing_column.clone(),
        config.testing_column.clone(),
    );
    let state = Arc::new(AppState {
        mirror,
        policy,
        webhook_secret: config.webhook_secret.clone(),
        organization: config.organization.clone(),
    });

    server::serve(state, port).await
}
