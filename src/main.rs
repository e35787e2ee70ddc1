use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Local;
use clap::{Parser, Subcommand};
use tokio::sync::RwLock;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use coh3_overlay::api::{build_router, state::AppState};
use coh3_overlay::config::AppConfig;
use coh3_overlay::fetch::{StatsClient, StatsClientConfig, StatsSource};
use coh3_overlay::overlay::{OverlayPoller, OverlayState};
use coh3_overlay::parse_duration;
use coh3_overlay::session::{AutoSnapshot, SessionService};
use coh3_overlay::storage::{PidFile, StorageConfig};
use coh3_overlay::ProfileId;

#[derive(Parser)]
#[command(name = "coh3-overlay")]
#[command(about = "Company of Heroes 3 session win/loss overlay")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(long, default_value = "./config.toml")]
    config: PathBuf,

    /// Data directory path (overrides config)
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// Output logs as JSON
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the overlay server
    Serve {
        /// Bind address
        #[arg(long)]
        host: Option<String>,

        /// Port number
        #[arg(long)]
        port: Option<u16>,

        /// Serve the API without refreshing the overlay in the background
        #[arg(long)]
        no_poll: bool,
    },

    /// Print the overlay line on every refresh
    Watch {
        /// Refresh interval (e.g., "15s", "1m")
        #[arg(long)]
        interval: Option<String>,

        /// Also write each line to this file
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Start a new session from the player's current stats
    Snapshot {
        /// Player profile id (defaults to the stored player)
        #[arg(long)]
        id: Option<String>,
    },

    /// Set the tracked player
    SetPlayer {
        /// Player profile id
        id: String,
    },

    /// Render the overlay line once
    Show,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load_or_default(&cli.config)
        .with_context(|| format!("Failed to load config from {:?}", cli.config))?;
    if let Some(dir) = &cli.data_dir {
        config.data_dir = dir.clone();
    }
    let log_level = cli.log_level.as_deref().unwrap_or(&config.log_level);

    init_tracing(log_level, cli.json_logs);

    tracing::info!("Starting coh3-overlay v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Commands::Serve {
            host,
            port,
            no_poll,
        } => {
            let mut server = config.server.clone();
            if let Some(host) = host {
                server.host = host;
            }
            if let Some(port) = port {
                server.port = port;
            }

            let session = build_session(&config)?;
            let _pid = PidFile::create(session.storage().pid_file())?;

            match session
                .auto_snapshot(&Local::now(), config.overlay.auto_snapshot_hour)
                .await
            {
                Ok(AutoSnapshot::Created(started)) => tracing::info!(
                    "Daily snapshot taken ({} leaderboards)",
                    started.leaderboards
                ),
                Ok(_) => {}
                Err(e) => tracing::warn!("Automatic snapshot failed: {}", e),
            }

            let poller = Arc::new(
                build_poller(&config, session.clone(), poll_interval(&config, None)?)
                    .with_output_file(config.overlay.output_file.clone()),
            );
            if no_poll {
                tracing::info!("Background refresh disabled");
            } else {
                tokio::spawn(poller.clone().run_periodic());
            }

            let app = build_router(AppState { session, poller }, &server);
            let addr = format!("{}:{}", server.host, server.port);
            let listener = tokio::net::TcpListener::bind(&addr).await?;
            tracing::info!("Overlay: http://{}", addr);
            axum::serve(listener, app)
                .with_graceful_shutdown(shutdown_signal())
                .await?;
            tracing::info!("Server stopped");
        }
        Commands::Watch { interval, output } => {
            let session = build_session(&config)?;
            let every = poll_interval(&config, interval.as_deref())?;
            let poller = build_poller(&config, session, every)
                .with_output_file(output.or_else(|| config.overlay.output_file.clone()))
                .with_echo(true);

            tokio::select! {
                _ = Arc::new(poller).run_periodic() => {}
                _ = shutdown_signal() => {}
            }
        }
        Commands::Snapshot { id } => {
            let session = build_session(&config)?;
            let player = match id {
                Some(raw) => parse_profile_id(&raw)?,
                None => session.player_id()?,
            };
            let started = session.start_session(player).await?;
            println!(
                "Session started for {} at {} ({} leaderboards)",
                started.player,
                started.started_at.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S"),
                started.leaderboards
            );
        }
        Commands::SetPlayer { id } => {
            let session = build_session(&config)?;
            let player = session.set_player(parse_profile_id(&id)?).await?;
            println!("Player set to {}", player.id);
        }
        Commands::Show => {
            let session = build_session(&config)?;
            let every = poll_interval(&config, None)?;
            let rendered = build_poller(&config, session, every).tick().await;
            println!("{}", rendered.line);
        }
    }

    Ok(())
}

fn init_tracing(level: &str, json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

fn build_session(config: &AppConfig) -> Result<Arc<SessionService>> {
    let client = StatsClient::new(StatsClientConfig::from(&config.api))?;
    let source: Arc<dyn StatsSource> = Arc::new(client);
    let storage = StorageConfig::new(config.data_dir.clone());
    tracing::debug!("Data directory: {:?}", config.data_dir);
    Ok(Arc::new(SessionService::new(
        source,
        storage,
        config.overlay.default_player(),
    )))
}

fn build_poller(config: &AppConfig, session: Arc<SessionService>, every: Duration) -> OverlayPoller {
    OverlayPoller::new(
        session,
        config.overlay.default_preferences(),
        Arc::new(RwLock::new(OverlayState::default())),
        every,
    )
}

fn poll_interval(config: &AppConfig, raw: Option<&str>) -> Result<Duration> {
    let every = match raw {
        Some(s) => parse_duration(s).with_context(|| format!("Invalid interval: {}", s))?,
        None => Duration::from_secs(config.overlay.poll_interval_seconds),
    };
    if every.is_zero() {
        anyhow::bail!("Refresh interval must be greater than 0");
    }
    Ok(every)
}

fn parse_profile_id(raw: &str) -> Result<ProfileId> {
    raw.parse::<ProfileId>().map_err(anyhow::Error::msg)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
