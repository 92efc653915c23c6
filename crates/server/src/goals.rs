//! Goal endpoints
//!
//! Goals are addressed by id or by title. Every response carries the
//! figures computed for today.

use api_types::goal::{GoalProgress, GoalQuery, GoalStatusUpdate, GoalUpsert, GoalView};
use axum::{
    Json,
    extract::{Path, State},
};
use ledger::{GoalRef, GoalSpec, GoalStatus, LedgerError, LifeCategory, Money};
use uuid::Uuid;

use crate::{
    ServerError,
    extract::{JsonBody, QueryParams},
    server::ServerState,
    views::{goal_view, parse, parse_opt},
};

async fn view_of(state: &ServerState, id: Uuid) -> Result<GoalView, ServerError> {
    let report = state.report().await?;
    report
        .goals
        .iter()
        .find(|g| g.goal.id == id)
        .map(goal_view)
        .ok_or_else(|| LedgerError::NotFound(GoalRef::Id(id).to_string()).into())
}

pub async fn list(
    State(state): State<ServerState>,
    QueryParams(query): QueryParams<GoalQuery>,
) -> Result<Json<Vec<GoalView>>, ServerError> {
    let life_category: Option<LifeCategory> = parse_opt(query.life_category.as_deref())?;
    let status: Option<GoalStatus> = parse_opt(query.status.as_deref())?;

    let report = state.report().await?;
    let goals = report
        .goals
        .iter()
        .filter(|g| life_category.is_none_or(|c| g.goal.life_category == c))
        .filter(|g| status.is_none_or(|s| g.goal.status == s))
        .map(goal_view)
        .collect();
    Ok(Json(goals))
}

pub async fn upsert(
    State(state): State<ServerState>,
    JsonBody(payload): JsonBody<GoalUpsert>,
) -> Result<Json<GoalView>, ServerError> {
    let mut spec = GoalSpec::new(
        payload.title,
        parse(&payload.life_category)?,
        Money::new(payload.target_minor),
    );
    spec.id = payload.id;
    spec.description = payload.description;
    spec.target_date = payload.target_date;
    if let Some(current) = payload.current_minor {
        spec.current_amount = Money::new(current);
    }
    if let Some(priority) = parse_opt(payload.priority.as_deref())? {
        spec.priority = priority;
    }
    if let Some(status) = parse_opt(payload.status.as_deref())? {
        spec.status = status;
    }
    if let Some(metric) = parse_opt(payload.metric.as_deref())? {
        spec.metric = metric;
    }

    let id = state.ledger.upsert_goal(spec).await?;
    Ok(Json(view_of(&state, id).await?))
}

pub async fn get(
    State(state): State<ServerState>,
    Path(goal): Path<String>,
) -> Result<Json<GoalView>, ServerError> {
    let goal_ref: GoalRef = parse(&goal)?;
    let goal = state.ledger.goal(&goal_ref).await?;
    Ok(Json(view_of(&state, goal.id).await?))
}

pub async fn progress(
    State(state): State<ServerState>,
    Path(goal): Path<String>,
    JsonBody(payload): JsonBody<GoalProgress>,
) -> Result<Json<GoalView>, ServerError> {
    let goal_ref: GoalRef = parse(&goal)?;
    let goal = state
        .ledger
        .update_goal_progress(&goal_ref, Money::new(payload.current_minor))
        .await?;
    Ok(Json(view_of(&state, goal.id).await?))
}

pub async fn status(
    State(state): State<ServerState>,
    Path(goal): Path<String>,
    JsonBody(payload): JsonBody<GoalStatusUpdate>,
) -> Result<Json<GoalView>, ServerError> {
    let goal_ref: GoalRef = parse(&goal)?;
    let goal = state
        .ledger
        .set_goal_status(&goal_ref, parse(&payload.status)?)
        .await?;
    Ok(Json(view_of(&state, goal.id).await?))
}
