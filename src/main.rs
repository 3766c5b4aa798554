//! connectn - terminal client
//!
//! Connects to a peer, negotiates a color and plays moves typed on stdin.

#![warn(missing_docs)]

use anyhow::{Context, Result};
use clap::Parser;
use connectn::cli::{self, Cli, Command, Forwarded};
use connectn::{
    Board, ClientConfig, Coordinator, Notification, Outcome, Session, TcpConnection, negotiate,
};
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info, instrument, warn};
use tracing_subscriber::EnvFilter;

/// Environment variable naming a config file when `--config` is absent.
const CONFIG_ENV: &str = "CONNECTN_CONFIG";

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let overrides = cli.command.overrides();

    match cli.command {
        Command::Play { config, json, .. } => {
            let config = load_config(config)?.with_overrides(overrides);
            config.validate()?;
            let outcome = play(config, json).await?;
            println!("Game over: {outcome}");
            Ok(())
        }
        Command::CheckConfig { path } => check_config(path),
    }
}

/// Reads the config file if one was named, otherwise starts from defaults.
#[instrument]
fn load_config(path: Option<PathBuf>) -> Result<ClientConfig> {
    let path = path.or_else(|| std::env::var_os(CONFIG_ENV).map(PathBuf::from));
    match path {
        Some(path) => Ok(ClientConfig::from_file(&path)?),
        None => {
            debug!("No config file, using defaults");
            Ok(ClientConfig::default())
        }
    }
}

fn check_config(path: PathBuf) -> Result<()> {
    let config = ClientConfig::from_file(&path)?;
    config.validate()?;
    let rendered = toml::to_string_pretty(&config).context("Failed to render config")?;
    println!("{rendered}");
    Ok(())
}

/// Runs one game to completion.
#[instrument(skip(config), fields(host = %config.host(), port = config.port()))]
async fn play(config: ClientConfig, json: bool) -> Result<Outcome> {
    let mut connection = TcpConnection::connect(config.host(), *config.port())
        .await
        .with_context(|| format!("Failed to connect to {}:{}", config.host(), config.port()))?;

    let mut session = Session::new(config.player_color(), config.game().board()?);
    let mut board = session.board().clone();

    for notification in
        negotiate(&mut session, &mut connection, config.name(), config.negotiation()).await?
    {
        render(&mut board, &notification, json)?;
    }
    info!("Waiting for role assignment");

    let (handle, mut notifications) = Coordinator::start(session, connection);
    let mut stdin = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;

    loop {
        tokio::select! {
            notification = notifications.recv() => {
                let Some(notification) = notification else { break };
                render(&mut board, &notification, json)?;
            }
            line = stdin.next_line(), if stdin_open => {
                let line = line?;
                stdin_open = line.is_some();
                match cli::forward(&handle, line.as_deref()) {
                    Ok(Forwarded::Unrecognized) => {
                        eprintln!("Commands: <column>, drop <column>, end, quit");
                    }
                    Ok(Forwarded::InputClosed) => info!("Input closed, ending session"),
                    Ok(Forwarded::Sent) => {}
                    Err(err) => debug!(%err, "Session already closed"),
                }
            }
        }
    }

    Ok(handle.join().await?)
}

/// Prints a notification, and in text mode the board when a cell changes.
fn render(board: &mut Board, notification: &Notification, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string(notification)?);
        return Ok(());
    }
    println!("{notification}");
    if let Notification::CellFilled { column, color, .. } = notification {
        if let Err(err) = board.place_piece(*column, color) {
            warn!(%err, "Display board out of sync");
        }
        println!("{}", board.display());
    }
    Ok(())
}
