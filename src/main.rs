use anyhow::Result;
use clap::{Parser, Subcommand};
use deskmind::{create_router, AgentConfig, DeskDaemon};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "deskmind")]
#[command(about = "Desktop automation agent with pluggable AI brains")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    Run {
        #[arg(short, long, default_value = "deskmind.toml")]
        config: PathBuf,
    },
    Init {
        #[arg(short, long, default_value = "deskmind.toml")]
        config: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "deskmind=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run { config: config_path } => {
            run_daemon(config_path).await?;
        }
        Commands::Init { config: config_path } => {
            init_config(config_path)?;
        }
    }

    Ok(())
}

async fn run_daemon(config_path: PathBuf) -> Result<()> {
    if config_path.exists() {
        info!("Loading config from {:?}", config_path);
    } else {
        info!("Config file not found, using defaults");
    }
    let config = AgentConfig::load_or_default(&config_path)?;

    let daemon = Arc::new(DeskDaemon::new(config.clone())?);
    let router = create_router(daemon.pipeline().clone(), daemon.notifier().clone());

    let listener = TcpListener::bind(&config.listen_addr()).await?;
    info!("API server listening on {}", config.listen_addr());

    let api_handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, router).await {
            error!("API server error: {}", e);
        }
    });

    let daemon_clone = daemon.clone();
    let daemon_handle = tokio::spawn(async move {
        if let Err(e) = daemon_clone.run().await {
            error!("Daemon error: {}", e);
        }
    });

    tokio::signal::ctrl_c().await?;
    info!("Shutting down...");
    daemon.shutdown();
    api_handle.abort();

    let _ = tokio::time::timeout(std::time::Duration::from_secs(5), async {
        let _ = daemon_handle.await;
        let _ = api_handle.await;
    })
    .await;

    Ok(())
}

fn init_config(config_path: PathBuf) -> Result<()> {
    if config_path.exists() {
        anyhow::bail!("Config file already exists: {:?}", config_path);
    }

    let config = AgentConfig::default();
    config.save(&config_path)?;
    println!("Created config file: {:?}", config_path);
    println!("\nEdit the config file to:");
    println!("  - Point [brains.local] at your Ollama server");
    println!("  - Export the API key variables named in [brains.cloud_a] and [brains.cloud_b]");
    println!("  - Adjust the safety policy and worker pool size");

    Ok(())
}
