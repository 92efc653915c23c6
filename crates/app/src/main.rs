use std::{future::Future, sync::Arc};

use migration::{Migrator, MigratorTrait};
use narrative::{AnthropicClient, Narrator};
use server::ServerState;
use settings::Database;
use tokio::sync::watch;

mod agent;
mod settings;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    let settings = settings::Settings::new()?;
    let mut tasks = tokio::task::JoinSet::new();

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "lif3={level},server={level},ledger={level},narrative={level},knowledge_sync={level}",
            level = settings.app.level
        ))
        .init();

    let tz = settings.timezone()?;
    let db = parse_database(&settings.database).await?;
    let ledger = ledger::Ledger::builder().database(db).build().await?;
    if settings.app.seed && ledger.seed_if_empty().await? {
        tracing::info!("empty ledger, loaded starter accounts and goals");
    }

    let api_key = std::env::var("ANTHROPIC_API_KEY")
        .ok()
        .filter(|key| !key.trim().is_empty());
    if api_key.is_none() {
        tracing::warn!("ANTHROPIC_API_KEY is not set, briefings will use the built-in template");
    }
    let client = AnthropicClient::new(&settings.narrator, api_key)?;
    let narrator = Narrator::new(Arc::new(client), &settings.narrator);
    let mut state = ServerState::new(Arc::new(ledger), Arc::new(narrator), tz);
    if settings.agent.enabled {
        state = state.with_briefings_dir(settings.agent.briefings_dir.clone());
    }

    let (stop, stopped) = watch::channel(false);
    let stop = Arc::new(stop);

    if let Some(server) = settings.server {
        let state = state.clone();
        let shutdown = shutdown_signal(stopped.clone());
        tasks.spawn(async move {
            tracing::info!("Found server settings...");
            let bind = server.bind.unwrap_or_else(|| "127.0.0.1".to_string());
            let addr = format!("{}:{}", bind, server.port);
            let listener = match tokio::net::TcpListener::bind(addr).await {
                Ok(listener) => listener,
                Err(err) => {
                    tracing::error!("failed to bind server listener: {err}");
                    return;
                }
            };
            if let Err(err) = server::run_with_listener(state, listener, shutdown).await {
                tracing::error!("server failed: {err}");
            }
        });
    }

    if settings.agent.enabled {
        let agent = agent::Agent::new(state.clone(), settings.agent);
        let shutdown = shutdown_signal(stopped.clone());
        tasks.spawn(agent.run(shutdown));
    }

    if settings.sync.enabled {
        let config = settings.sync;
        let shutdown = shutdown_signal(stopped.clone());
        tasks.spawn(async move {
            tracing::info!("Found sync settings...");
            if let Err(err) = knowledge_sync::run(config, shutdown).await {
                tracing::error!("knowledge sync failed: {err}");
            }
        });
    }

    if tasks.is_empty() {
        tracing::warn!("nothing to run, enable the server, agent or sync in settings");
        return Ok(());
    }

    let ctrl_c = stop.clone();
    tokio::spawn(async move {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to listen for ctrl-c: {err}");
            return;
        }
        tracing::info!("shutting down");
        ctrl_c.send_replace(true);
    });

    // The first task to end takes the others down with it.
    if tasks.join_next().await.is_some() {
        stop.send_replace(true);
        while tasks.join_next().await.is_some() {}
    }

    Ok(())
}

fn shutdown_signal(mut stopped: watch::Receiver<bool>) -> impl Future<Output = ()> + Send + 'static {
    async move {
        let _ = stopped.wait_for(|stop| *stop).await;
    }
}

async fn parse_database(config: &Database) -> Result<sea_orm::DatabaseConnection, BoxError> {
    let url = match config {
        Database::Memory => String::from("sqlite::memory:"),
        Database::Sqlite(path) => format!("sqlite:{}?mode=rwc", path),
    };

    let database = sea_orm::Database::connect(url).await?;
    Migrator::up(&database, None).await?;
    Ok(database)
}
