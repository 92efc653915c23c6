//! Revenue and net worth endpoints

use api_types::{
    networth::{NetWorthUpdate, NetWorthView},
    revenue::{RevenueNew, RevenueToday},
    transaction::TransactionCreated,
};
use axum::{Json, extract::State, http::StatusCode};
use ledger::{LifeCategory, Money, RevenueEntry};

use crate::{ServerError, extract::JsonBody, server::ServerState, views::parse_opt};

pub(crate) const DEFAULT_REVENUE_DESCRIPTION: &str = "43V3R revenue";

pub async fn log(
    State(state): State<ServerState>,
    JsonBody(payload): JsonBody<RevenueNew>,
) -> Result<(StatusCode, Json<TransactionCreated>), ServerError> {
    let line = parse_opt(payload.business_line.as_deref())?.unwrap_or(LifeCategory::TechBusiness);
    let description = payload
        .description
        .filter(|d| !d.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_REVENUE_DESCRIPTION.to_string());

    let mut entry = RevenueEntry::new(line, Money::new(payload.amount_minor), description)
        .date(payload.date.unwrap_or_else(|| state.today()));
    if let Some(client) = payload.client {
        entry = entry.client(client);
    }

    let id = state.ledger.log_revenue(entry).await?;
    Ok((StatusCode::CREATED, Json(TransactionCreated { id })))
}

pub async fn today(State(state): State<ServerState>) -> Result<Json<RevenueToday>, ServerError> {
    let report = state.report().await?;
    let business = report.business;
    Ok(Json(RevenueToday {
        date: report.as_of,
        total_minor: business.today.minor(),
        target_minor: business.daily_target.map(Money::minor),
        progress_pct: business.daily_progress_pct,
    }))
}

pub async fn net_worth(State(state): State<ServerState>) -> Result<Json<NetWorthView>, ServerError> {
    let report = state.report().await?;
    Ok(Json(NetWorthView {
        as_of: report.as_of,
        net_worth_minor: report.net_worth.minor(),
        currency: report.currency.code().to_string(),
        active_accounts: report.accounts.iter().filter(|a| a.is_active).count(),
    }))
}

/// Brings net worth in line with reality by setting one account's balance.
pub async fn update_net_worth(
    State(state): State<ServerState>,
    JsonBody(payload): JsonBody<NetWorthUpdate>,
) -> Result<Json<NetWorthView>, ServerError> {
    let account_id = match payload.account_id {
        Some(id) => id,
        None => state.ledger.primary_account(LifeCategory::Personal).await?.id,
    };
    state
        .ledger
        .set_account_balance(
            account_id,
            Money::new(payload.balance_minor),
            payload.note.as_deref(),
        )
        .await?;

    net_worth(State(state)).await
}
