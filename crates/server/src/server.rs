use api_types::relay::RelayResponse;
use axum::{
    Router,
    routing::{get, post},
};
use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use ledger::{Ledger, LedgerError, MetricsReport};
use narrative::Narrator;
use tokio::sync::broadcast;

use std::{
    future::Future,
    path::{Path, PathBuf},
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
};

use crate::{accounts, commands, goals, relay, reports, revenue, transactions};

#[derive(Clone)]
pub struct ServerState {
    pub ledger: Arc<Ledger>,
    pub narrator: Arc<Narrator>,
    /// Local timezone that decides what "today" is.
    pub tz: Tz,
    relay: broadcast::Sender<RelayResponse>,
    connections: Arc<AtomicUsize>,
    briefings_dir: Option<PathBuf>,
}

/// Where the daily briefing for `date` is kept under `dir`.
pub fn briefing_path(dir: &Path, date: NaiveDate) -> PathBuf {
    dir.join(format!("briefing_{}.md", date.format("%Y-%m-%d")))
}

impl ServerState {
    pub fn new(ledger: Arc<Ledger>, narrator: Arc<Narrator>, tz: Tz) -> Self {
        Self {
            ledger,
            narrator,
            tz,
            relay: broadcast::channel(100).0,
            connections: Arc::new(AtomicUsize::new(0)),
            briefings_dir: None,
        }
    }

    /// Serves today's daily briefing from `dir` when one has been written.
    pub fn with_briefings_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.briefings_dir = Some(dir.into());
        self
    }

    pub fn today(&self) -> NaiveDate {
        Utc::now().with_timezone(&self.tz).date_naive()
    }

    pub async fn report(&self) -> Result<MetricsReport, LedgerError> {
        self.ledger.report(self.today()).await
    }

    /// Sends a message to every connected dashboard. Returns how many
    /// received it.
    pub fn publish(&self, message: RelayResponse) -> usize {
        self.relay.send(message).unwrap_or(0)
    }

    pub fn connections(&self) -> usize {
        self.connections.load(Ordering::Relaxed)
    }

    /// Today's stored daily briefing and when it was written.
    pub(crate) async fn stored_briefing(&self) -> Option<(String, DateTime<Utc>)> {
        let path = briefing_path(self.briefings_dir.as_deref()?, self.today());
        let text = match tokio::fs::read_to_string(&path).await {
            Ok(text) if !text.trim().is_empty() => text,
            Ok(_) => return None,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return None,
            Err(err) => {
                tracing::warn!(path = %path.display(), "could not read stored briefing: {err}");
                return None;
            }
        };
        let written = tokio::fs::metadata(&path)
            .await
            .and_then(|meta| meta.modified())
            .map(DateTime::<Utc>::from)
            .unwrap_or_else(|_| Utc::now());
        Some((text, written))
    }

    pub(crate) fn subscribe(&self) -> broadcast::Receiver<RelayResponse> {
        self.relay.subscribe()
    }

    pub(crate) fn connection_opened(&self) {
        self.connections.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn connection_closed(&self) {
        self.connections.fetch_sub(1, Ordering::Relaxed);
    }
}

pub fn router(state: ServerState) -> Router {
    Router::new()
        .route("/health", get(reports::health))
        .route("/status", get(reports::status))
        .route("/accounts", get(accounts::list).post(accounts::create))
        .route("/accounts/{id}/balance", post(accounts::set_balance))
        .route(
            "/transactions",
            get(transactions::list).post(transactions::create),
        )
        .route("/transactions/{id}/reverse", post(transactions::reverse))
        .route("/goals", get(goals::list).put(goals::upsert))
        .route("/goals/{goal}", get(goals::get))
        .route("/goals/{goal}/progress", post(goals::progress))
        .route("/goals/{goal}/status", post(goals::status))
        .route("/revenue", post(revenue::log))
        .route("/revenue/today", get(revenue::today))
        .route("/networth", get(revenue::net_worth))
        .route("/networth/update", post(revenue::update_net_worth))
        .route("/briefing", get(reports::briefing))
        .route("/analytics/progress", get(reports::progress))
        .route("/analytics/business", get(reports::business))
        .route("/commands", post(commands::execute))
        .route("/relay", get(relay::upgrade))
        .with_state(state)
}

pub async fn run_with_listener<F>(
    state: ServerState,
    listener: tokio::net::TcpListener,
    shutdown: F,
) -> Result<(), std::io::Error>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await
}

pub fn spawn_with_listener(
    state: ServerState,
    listener: tokio::net::TcpListener,
) -> Result<std::net::SocketAddr, std::io::Error> {
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(err) = run_with_listener(state, listener, std::future::pending::<()>()).await {
            tracing::error!("server failed: {err}");
        }
    });

    Ok(addr)
}
