//! Dashboard relay over WebSocket.
//!
//! Each connection gets replies to its own requests plus every message
//! published on the shared channel (daily briefings).

use api_types::relay::{RelayRequest, RelayResponse};
use axum::{
    extract::{
        State, WebSocketUpgrade,
        ws::{Message, WebSocket},
    },
    response::Response,
};
use chrono::Utc;
use futures_util::{SinkExt, StreamExt};
use narrative::{BriefingContext, BriefingKind};
use tokio::sync::{broadcast, mpsc};

use crate::server::ServerState;

pub async fn upgrade(ws: WebSocketUpgrade, State(state): State<ServerState>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: ServerState) {
    let (mut sender, mut receiver) = socket.split();
    let (out_tx, mut out_rx) = mpsc::channel::<RelayResponse>(32);
    let mut published = state.subscribe();
    state.connection_opened();
    tracing::info!(connections = state.connections(), "dashboard connected");

    let mut send_task = tokio::spawn(async move {
        loop {
            let message = tokio::select! {
                Some(message) = out_rx.recv() => message,
                res = published.recv() => match res {
                    Ok(message) => message,
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "dashboard lagging behind broadcasts");
                        continue;
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                },
                else => break,
            };
            let text = match serde_json::to_string(&message) {
                Ok(text) => text,
                Err(err) => {
                    tracing::error!("could not encode relay message: {err}");
                    continue;
                }
            };
            if sender.send(Message::Text(text.into())).await.is_err() {
                break;
            }
        }
    });

    let recv_state = state.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(message)) = receiver.next().await {
            match message {
                Message::Text(text) => respond(&recv_state, text.as_str(), &out_tx).await,
                Message::Close(_) => break,
                _ => {}
            }
        }
    });

    tokio::select! {
        _ = (&mut send_task) => recv_task.abort(),
        _ = (&mut recv_task) => send_task.abort(),
    };

    state.connection_closed();
    tracing::info!(connections = state.connections(), "dashboard disconnected");
}

async fn send(out: &mpsc::Sender<RelayResponse>, message: RelayResponse) {
    // Fails only once the socket is gone.
    let _ = out.send(message).await;
}

fn error(message: impl Into<String>) -> RelayResponse {
    RelayResponse::Error {
        message: message.into(),
    }
}

/// Answers one inbound frame. Malformed input gets an `error` reply and the
/// connection stays usable.
pub(crate) async fn respond(state: &ServerState, text: &str, out: &mpsc::Sender<RelayResponse>) {
    let request = match serde_json::from_str::<RelayRequest>(text) {
        Ok(request) => request,
        Err(err) => {
            tracing::debug!("invalid relay message: {err}");
            send(out, error(format!("invalid message: {err}"))).await;
            return;
        }
    };

    match request {
        RelayRequest::HealthCheck => {
            send(
                out,
                RelayResponse::HealthResponse {
                    status: "healthy".to_string(),
                    connections: state.connections(),
                    timestamp: Utc::now(),
                },
            )
            .await;
        }
        RelayRequest::FinancialQuery {
            query,
            context,
            session_id,
        } => {
            if query.trim().is_empty() {
                send(out, error("query must not be empty")).await;
                return;
            }
            send(
                out,
                RelayResponse::QueryProcessing {
                    session_id: session_id.clone(),
                    timestamp: Utc::now(),
                },
            )
            .await;

            let question = match context.filter(|c| !c.is_null()) {
                Some(context) => format!("{query}\n\nDashboard context: {context}"),
                None => query,
            };
            let report = match state.report().await {
                Ok(report) => report,
                Err(err) => {
                    tracing::error!("relay could not read ledger: {err}");
                    send(out, error("ledger unavailable")).await;
                    return;
                }
            };
            let briefing = state
                .narrator
                .compose(BriefingKind::Query(question), &report, BriefingContext::default())
                .await;
            send(
                out,
                RelayResponse::FinancialResponse {
                    session_id,
                    source: briefing.source_label().to_string(),
                    response: briefing.text,
                    timestamp: Utc::now(),
                },
            )
            .await;
        }
        RelayRequest::DashboardUpdate {
            metrics,
            update_type,
        } => {
            let report = match state.report().await {
                Ok(report) => report,
                Err(err) => {
                    tracing::error!("relay could not read ledger: {err}");
                    send(out, error("ledger unavailable")).await;
                    return;
                }
            };
            let briefing = state
                .narrator
                .compose(
                    BriefingKind::MetricsAnalysis(metrics.to_string()),
                    &report,
                    BriefingContext::default(),
                )
                .await;
            send(
                out,
                RelayResponse::MetricsAnalysis {
                    update_type: Some(update_type.unwrap_or_else(|| "manual".to_string())),
                    source: briefing.source_label().to_string(),
                    analysis: briefing.text,
                    timestamp: Utc::now(),
                },
            )
            .await;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use ledger::Ledger;
    use migration::MigratorTrait;
    use narrative::{AnthropicClient, Narrator, NarratorConfig};
    use sea_orm::Database;

    use super::*;

    async fn state() -> ServerState {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        migration::Migrator::up(&db, None).await.unwrap();
        let ledger = Ledger::builder().database(db).build().await.unwrap();
        let config = NarratorConfig::default();
        let narrator = Narrator::new(Arc::new(AnthropicClient::new(&config, None).unwrap()), &config);
        ServerState::new(Arc::new(ledger), Arc::new(narrator), chrono_tz::Africa::Johannesburg)
    }

    async fn replies(state: &ServerState, text: &str) -> Vec<RelayResponse> {
        let (tx, mut rx) = mpsc::channel(8);
        respond(state, text, &tx).await;
        drop(tx);
        let mut out = Vec::new();
        while let Some(message) = rx.recv().await {
            out.push(message);
        }
        out
    }

    #[tokio::test]
    async fn malformed_frame_gets_error_reply() {
        let state = state().await;
        let out = replies(&state, "not json").await;
        assert_eq!(out.len(), 1);
        assert!(matches!(&out[0], RelayResponse::Error { message } if message.starts_with("invalid message")));

        let out = replies(&state, r#"{"type":"launch_rockets"}"#).await;
        assert!(matches!(&out[0], RelayResponse::Error { .. }));
    }

    #[tokio::test]
    async fn health_check_reports_healthy() {
        let state = state().await;
        let out = replies(&state, r#"{"type":"health_check"}"#).await;
        assert!(matches!(
            &out[0],
            RelayResponse::HealthResponse { status, connections: 0, .. } if status == "healthy"
        ));
    }

    #[tokio::test]
    async fn query_is_acknowledged_then_answered() {
        let state = state().await;
        let out = replies(
            &state,
            r#"{"type":"financial_query","query":"How is my net worth?","session_id":"s1"}"#,
        )
        .await;

        assert_eq!(out.len(), 2);
        assert!(matches!(
            &out[0],
            RelayResponse::QueryProcessing { session_id: Some(id), .. } if id == "s1"
        ));
        match &out[1] {
            RelayResponse::FinancialResponse {
                session_id,
                source,
                response,
                ..
            } => {
                assert_eq!(session_id.as_deref(), Some("s1"));
                assert_eq!(source, "fallback");
                assert!(response.contains("## Executive Summary"));
            }
            other => panic!("unexpected reply: {other:?}"),
        }
    }

    #[tokio::test]
    async fn dashboard_update_gets_analysis() {
        let state = state().await;
        let out = replies(
            &state,
            r#"{"type":"dashboard_update","metrics":{"net_worth":239625}}"#,
        )
        .await;
        assert!(matches!(
            &out[0],
            RelayResponse::MetricsAnalysis { update_type: Some(kind), .. } if kind == "manual"
        ));
    }

    #[tokio::test]
    async fn publish_reaches_subscribers() {
        let state = state().await;
        assert_eq!(
            state.publish(RelayResponse::Error {
                message: "nobody listening".to_string()
            }),
            0
        );

        let mut rx = state.subscribe();
        let delivered = state.publish(RelayResponse::DailyBriefing {
            date: state.today(),
            briefing: "# Briefing".to_string(),
            source: "fallback".to_string(),
        });
        assert_eq!(delivered, 1);
        assert!(matches!(rx.recv().await.unwrap(), RelayResponse::DailyBriefing { .. }));
    }
}
