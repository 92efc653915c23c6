//! Account endpoints

use api_types::account::{AccountNew, AccountQuery, AccountView, BalanceSet, BalanceSetResponse};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use ledger::{AccountFilter, Currency, Money, NewAccount};
use uuid::Uuid;

use crate::{
    ServerError,
    extract::{JsonBody, QueryParams},
    server::ServerState,
    views::{account_view, parse, parse_opt},
};

pub async fn list(
    State(state): State<ServerState>,
    QueryParams(query): QueryParams<AccountQuery>,
) -> Result<Json<Vec<AccountView>>, ServerError> {
    let filter = AccountFilter {
        account_type: parse_opt(query.account_type.as_deref())?,
        category: parse_opt(query.category.as_deref())?,
        include_inactive: query.include_inactive.unwrap_or(false),
    };

    let accounts = state.ledger.accounts(&filter).await?;
    Ok(Json(accounts.into_iter().map(account_view).collect()))
}

pub async fn create(
    State(state): State<ServerState>,
    JsonBody(payload): JsonBody<AccountNew>,
) -> Result<(StatusCode, Json<AccountView>), ServerError> {
    let mut cmd = NewAccount::new(
        payload.name,
        parse(&payload.account_type)?,
        parse(&payload.category)?,
    )
    .opening_balance(Money::new(payload.opening_balance_minor.unwrap_or(0)));
    if let Some(code) = payload.currency.as_deref() {
        cmd = cmd.currency(Currency::try_from(code)?);
    }

    let id = state.ledger.create_account(cmd).await?;
    let account = state.ledger.account(id).await?;
    Ok((StatusCode::CREATED, Json(account_view(account))))
}

pub async fn set_balance(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    JsonBody(payload): JsonBody<BalanceSet>,
) -> Result<Json<BalanceSetResponse>, ServerError> {
    let transaction_id = state
        .ledger
        .set_account_balance(id, Money::new(payload.balance_minor), payload.note.as_deref())
        .await?;
    Ok(Json(BalanceSetResponse { transaction_id }))
}
