//! Conversions between ledger types and wire types.

use std::str::FromStr;

use api_types::{
    account::AccountView,
    goal::{GoalView, PaceView},
    transaction::TransactionView,
};
use ledger::{Account, LedgerError, Transaction, metrics::GoalMetrics};

use crate::ServerError;

/// Parses a vocabulary value; unknown values are validation errors (422).
pub(crate) fn parse<T>(value: &str) -> Result<T, ServerError>
where
    T: FromStr<Err = LedgerError>,
{
    value.parse::<T>().map_err(ServerError::from)
}

pub(crate) fn parse_opt<T>(value: Option<&str>) -> Result<Option<T>, ServerError>
where
    T: FromStr<Err = LedgerError>,
{
    value.map(parse).transpose()
}

pub(crate) fn account_view(account: Account) -> AccountView {
    AccountView {
        id: account.id,
        name: account.name,
        account_type: account.account_type.as_str().to_string(),
        category: account.category.as_str().to_string(),
        balance_minor: account.balance.minor(),
        currency: account.currency.code().to_string(),
        is_active: account.is_active,
    }
}

pub(crate) fn transaction_view(tx: Transaction) -> TransactionView {
    TransactionView {
        id: tx.id,
        account_id: tx.account_id,
        amount_minor: tx.amount.minor(),
        description: tx.description,
        category: tx.category.as_str().to_string(),
        subcategory: tx.subcategory,
        life_category: tx.life_category.as_str().to_string(),
        date: tx.date,
        recurrence: tx.recurrence.map(|r| r.as_str().to_string()),
        notes: tx.notes,
    }
}

pub(crate) fn goal_view(metrics: &GoalMetrics) -> GoalView {
    let goal = &metrics.goal;
    GoalView {
        id: goal.id,
        title: goal.title.clone(),
        description: goal.description.clone(),
        life_category: goal.life_category.as_str().to_string(),
        target_minor: goal.target_amount.minor(),
        current_minor: goal.current_amount.minor(),
        target_date: goal.target_date,
        priority: goal.priority.as_str().to_string(),
        status: goal.status.as_str().to_string(),
        metric: goal.metric.as_str().to_string(),
        progress_pct: metrics.progress_pct,
        on_track: metrics.on_track,
        pace: metrics.pace.map(|pace| PaceView {
            days_remaining: pace.days_remaining,
            remaining_minor: pace.remaining.minor(),
            daily_minor: pace.daily.minor(),
            monthly_minor: pace.monthly.minor(),
            overdue: pace.overdue,
        }),
    }
}
