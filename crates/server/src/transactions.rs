//! Transaction endpoints

use api_types::transaction::{
    TransactionCreated, TransactionNew, TransactionQuery, TransactionReverse, TransactionView,
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use ledger::{Money, NewTransaction, TransactionFilter};
use uuid::Uuid;

use crate::{
    ServerError,
    extract::{JsonBody, QueryParams},
    server::ServerState,
    views::{parse, parse_opt, transaction_view},
};

const DEFAULT_LIMIT: u64 = 50;
const MAX_LIMIT: u64 = 500;

pub async fn list(
    State(state): State<ServerState>,
    QueryParams(query): QueryParams<TransactionQuery>,
) -> Result<Json<Vec<TransactionView>>, ServerError> {
    let filter = TransactionFilter {
        account_id: query.account_id,
        life_category: parse_opt(query.life_category.as_deref())?,
        category: parse_opt(query.category.as_deref())?,
        from: query.from,
        to: query.to,
    };
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT);

    let txs = state.ledger.transactions(&filter, limit).await?;
    Ok(Json(txs.into_iter().map(transaction_view).collect()))
}

pub async fn create(
    State(state): State<ServerState>,
    JsonBody(payload): JsonBody<TransactionNew>,
) -> Result<(StatusCode, Json<TransactionCreated>), ServerError> {
    let mut cmd = NewTransaction::new(
        payload.account_id,
        Money::new(payload.amount_minor),
        payload.description,
        parse(&payload.category)?,
    );
    cmd.subcategory = payload.subcategory;
    cmd.life_category = parse_opt(payload.life_category.as_deref())?;
    cmd.date = Some(payload.date.unwrap_or_else(|| state.today()));
    cmd.recurrence = parse_opt(payload.recurrence.as_deref())?;
    cmd.notes = payload.notes;

    let id = state.ledger.apply_transaction(cmd).await?;
    Ok((StatusCode::CREATED, Json(TransactionCreated { id })))
}

pub async fn reverse(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    JsonBody(payload): JsonBody<TransactionReverse>,
) -> Result<(StatusCode, Json<TransactionCreated>), ServerError> {
    let id = state
        .ledger
        .reverse_transaction(id, payload.note.as_deref())
        .await?;
    Ok((StatusCode::CREATED, Json(TransactionCreated { id })))
}
