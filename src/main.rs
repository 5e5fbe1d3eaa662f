use anyhow::{Context, Result};
use clap::Parser;

mod config;
mod db;
mod error;
mod logging;
mod middleware;
mod models;
mod pagination;
mod routes;
mod seed;
mod services;
mod validation;

use config::{Cli, Command, Config};
use db::Database;
use routes::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    logging::init(&cli.config.log_level, cli.config.log_mode)?;

    let db = Database::open(&cli.config.database)?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(&cli.config, db).await,
        Command::Seed { count } => {
            let inserted = seed::seed_todos(&db, count).await.context("seeding todos")?;
            tracing::info!(inserted, "seeding completed");
            Ok(())
        }
    }
}

async fn serve(config: &Config, db: Database) -> Result<()> {
    let app = routes::router(AppState::new(db, config.csrf()));

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("binding {}", config.bind))?;
    tracing::info!(addr = %config.bind, database = %config.database.display(), "todo-api listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
