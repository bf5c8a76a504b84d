use actix_web::{middleware::Logger, web, App, HttpServer};
use census::{CensusManager, SqliteStorage};
use census_api::config::ApiConfig;
use census_api::{handlers, AppState};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "census-api")]
#[command(about = "Serve census questions and collect replies over HTTP", long_about = None)]
struct Args {
    /// Path to a configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Address to bind, overrides server.host
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on, overrides server.port
    #[arg(short, long)]
    port: Option<u16>,
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = ApiConfig::load(args.config.as_deref())?;
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .init();

    let storage = SqliteStorage::open(&config.database.path)?;
    info!(path = %config.database.path.display(), "Database initialized");

    let state = web::Data::new(AppState::new(CensusManager::new(Arc::new(storage))));

    let (host, port) = config.bind_address();
    info!("Starting census-api server at http://{}:{}", host, port);

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(state.clone())
            .configure(handlers::configure)
    })
    .bind((host, port))?
    .run()
    .await?;

    Ok(())
}
