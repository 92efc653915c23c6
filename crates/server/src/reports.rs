//! Health, status, briefings and analytics

use api_types::{
    analytics::{BusinessAnalytics, ProgressAnalytics},
    briefing::{BriefingQuery, BriefingView},
    status::{Health, StatusView},
};
use axum::{Json, extract::State};
use ledger::{AccountFilter, Money};
use narrative::{BriefingContext, BriefingKind};

use crate::{ServerError, extract::QueryParams, server::ServerState, views::goal_view};

pub async fn health() -> Json<Health> {
    Json(Health {
        status: "healthy".to_string(),
    })
}

pub async fn status(State(state): State<ServerState>) -> Result<Json<StatusView>, ServerError> {
    let database = state.ledger.database().ping().await.is_ok();
    let report = state.report().await?;
    let accounts = state
        .ledger
        .accounts(&AccountFilter::default())
        .await?
        .len();

    Ok(Json(StatusView {
        status: "operational".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database,
        accounts,
        active_goals: report.active_goals().count(),
        generation_configured: state.narrator.is_configured(),
        relay_connections: state.connections(),
    }))
}

pub async fn briefing(
    State(state): State<ServerState>,
    QueryParams(query): QueryParams<BriefingQuery>,
) -> Result<Json<BriefingView>, ServerError> {
    let kind = match query.kind.as_deref() {
        Some(kind) => kind.parse::<BriefingKind>().map_err(ServerError::Generic)?,
        None => BriefingKind::Daily,
    };

    if kind == BriefingKind::Daily
        && query.project.is_none()
        && !query.refresh
        && let Some((text, generated_at)) = state.stored_briefing().await
    {
        return Ok(Json(BriefingView {
            kind: kind.as_str().to_string(),
            text,
            source: "stored".to_string(),
            fallback_reason: None,
            generated_at,
        }));
    }

    let report = state.report().await?;
    let context = BriefingContext {
        project: query.project.as_deref(),
        include_metrics: true,
    };

    let briefing = state.narrator.compose(kind, &report, context).await;
    Ok(Json(BriefingView {
        kind: briefing.kind.as_str().to_string(),
        source: briefing.source_label().to_string(),
        fallback_reason: briefing.fallback_reason().map(str::to_string),
        text: briefing.text,
        generated_at: briefing.generated_at,
    }))
}

pub async fn progress(
    State(state): State<ServerState>,
) -> Result<Json<ProgressAnalytics>, ServerError> {
    let report = state.report().await?;
    Ok(Json(ProgressAnalytics {
        as_of: report.as_of,
        net_worth_minor: report.net_worth.minor(),
        primary: report.primary_goal().map(goal_view),
        goals: report.active_goals().map(goal_view).collect(),
    }))
}

pub async fn business(
    State(state): State<ServerState>,
) -> Result<Json<BusinessAnalytics>, ServerError> {
    let report = state.report().await?;
    let b = report.business;
    Ok(Json(BusinessAnalytics {
        as_of: report.as_of,
        today_minor: b.today.minor(),
        month_to_date_minor: b.month_to_date.minor(),
        daily_target_minor: b.daily_target.map(Money::minor),
        monthly_target_minor: b.monthly_target.map(Money::minor),
        daily_progress_pct: b.daily_progress_pct,
        monthly_progress_pct: b.monthly_progress_pct,
    }))
}
