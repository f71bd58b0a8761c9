// src/main.rs
// Pinchat - chat with pinned PDFs using OpenAI and Pinata

use anyhow::Result;
use clap::Parser;
use pinchat::config::{self, Config};
use pinchat::web;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser)]
#[command(name = "pinchat")]
#[command(about = "Chat with pinned PDFs using OpenAI and Pinata")]
#[command(version)]
struct Cli {
    /// Port to listen on
    #[arg(short, long, default_value = "3000", env = "PINCHAT_PORT")]
    port: u16,

    /// Directory for chat history, feedback, and uploaded files
    #[arg(short, long, default_value = config::DEFAULT_DATA_DIR, env = "PINCHAT_DATA_DIR")]
    data_dir: PathBuf,
}

async fn run_server(port: u16, data_dir: PathBuf) -> Result<()> {
    let mut config = Config::load();
    config.data_dir = data_dir;

    let validation = config.validate();
    for warning in &validation.warnings {
        warn!("{}", warning);
    }

    // Data directories must exist before the first save
    std::fs::create_dir_all(config.files_dir())?;

    let state = web::state::AppState::new(&config);
    {
        let mut session = state.session.lock().await;
        session.restore_history(&state.chat_history_path);
        if !session.history.is_empty() {
            info!(turns = session.history.len(), "Chat history restored");
        }
    }

    let app = web::create_router(state);

    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!("Pinchat running on http://localhost:{}", port);
    println!("Pinchat running on http://localhost:{}", port);

    axum::serve(listener, app).await?;

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env from the current directory before reading any config
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    run_server(cli.port, cli.data_dir).await
}
