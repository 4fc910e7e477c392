use std::{sync::Arc, time::Duration};

use migration::{Migrator, MigratorTrait};
use settings::Database;

mod settings;
mod wiring;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let settings = settings::Settings::new()?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "finlit={level},server={level},engine={level},plaid={level}",
            level = settings.app.level
        ))
        .init();

    let Some(server) = settings.server else {
        tracing::warn!("no server settings found, nothing to run");
        return Ok(());
    };

    let verifier = wiring::build_verifier(&settings.identity)?;

    let db = parse_database(&settings.database).await?;
    let mut builder = engine::Engine::builder().database(db);
    if let Some(plaid) = settings.plaid {
        tracing::info!("Found plaid settings for {}...", plaid.environment);
        let timeout = Duration::from_secs(plaid.timeout_secs);
        let link = wiring::link_config(&plaid);
        let client =
            plaid::PlaidClient::new(plaid.environment, plaid.client_id, plaid.secret, timeout)?
                .with_link_config(link);
        builder = builder.provider(Arc::new(client)).provider_timeout(timeout);
    }
    if let Some(cipher) = wiring::token_cipher(&settings.security)? {
        builder = builder.token_cipher(cipher);
    }
    let engine = builder.build().await?;

    let bind = server.bind.unwrap_or_else(|| "127.0.0.1".to_string());
    let addr = format!("{}:{}", bind, server.port);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    server::run_with_listener(engine, verifier, listener).await?;

    Ok(())
}

async fn parse_database(
    config: &Database,
) -> Result<sea_orm::DatabaseConnection, Box<dyn std::error::Error + Send + Sync>> {
    let url = match config {
        Database::Memory => String::from("sqlite::memory:"),
        Database::Sqlite(path) => format!("sqlite:{}?mode=rwc", path),
    };

    let database = sea_orm::Database::connect(url).await?;
    Migrator::up(&database, None).await?;
    Ok(database)
}
