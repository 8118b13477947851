use std::path::PathBuf;

use clap::Parser;
use lesson_server::config::Config;
use lesson_server::utils::init_log;
use lesson_server::{MIGRATOR, api};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to database file
    #[arg(short, long)]
    database: Option<PathBuf>,

    /// Address to bind
    #[arg(short = 'H', long)]
    host: Option<String>,

    /// Port to bind
    #[arg(short, long)]
    port: Option<u16>,

    /// Optional TOML config file; flags given here override its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory for daily-rotated log files (stdout when absent)
    #[arg(short, long)]
    log_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    let args = Cli::parse();
    let mut config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    if let Some(database) = args.database {
        config.database = database;
    }
    if let Some(host) = args.host {
        config.host = host;
    }
    if let Some(port) = args.port {
        config.port = port;
    }
    if let Some(log_dir) = args.log_dir {
        config.log_dir = Some(log_dir);
    }
    let _guard = init_log(config.log_dir.clone());

    let options = SqliteConnectOptions::new()
        .filename(&config.database)
        .create_if_missing(true)
        .foreign_keys(true);
    let database = SqlitePoolOptions::new().connect_with(options).await?;
    MIGRATOR.run(&database).await?;

    let addr = format!("{}:{}", config.host, config.port);
    tracing::info!("lesson server listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, api::router(database)).await?;

    Ok(())
}
