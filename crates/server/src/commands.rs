//! Tagged command endpoint

use api_types::command::{CommandOutcome, LedgerCommand};
use axum::{Json, extract::State};
use ledger::{GoalRef, GoalSpec, LifeCategory, Money, NewAccount, NewTransaction, RevenueEntry};

use crate::{
    ServerError,
    extract::JsonBody,
    revenue::DEFAULT_REVENUE_DESCRIPTION,
    server::ServerState,
    views::{parse, parse_opt},
};

pub async fn execute(
    State(state): State<ServerState>,
    JsonBody(command): JsonBody<LedgerCommand>,
) -> Result<Json<CommandOutcome>, ServerError> {
    command.validate().map_err(ServerError::Generic)?;
    let op = command.op().to_string();
    tracing::debug!(op = %op, "executing command");

    let ledger = &state.ledger;
    let id = match command {
        LedgerCommand::CreateAccount {
            name,
            account_type,
            category,
            opening_balance_minor,
        } => {
            let cmd = NewAccount::new(name, parse(&account_type)?, parse(&category)?)
                .opening_balance(Money::new(opening_balance_minor));
            Some(ledger.create_account(cmd).await?)
        }
        LedgerCommand::ApplyTransaction {
            account_id,
            amount_minor,
            description,
            category,
            date,
        } => {
            let cmd = NewTransaction::new(
                account_id,
                Money::new(amount_minor),
                description,
                parse(&category)?,
            )
            .date(date.unwrap_or_else(|| state.today()));
            Some(ledger.apply_transaction(cmd).await?)
        }
        LedgerCommand::SetAccountBalance {
            account_id,
            balance_minor,
            note,
        } => {
            ledger
                .set_account_balance(account_id, Money::new(balance_minor), note.as_deref())
                .await?
        }
        LedgerCommand::UpsertGoal {
            id,
            title,
            life_category,
            target_minor,
            target_date,
            metric,
        } => {
            let mut spec = GoalSpec::new(title, parse(&life_category)?, Money::new(target_minor));
            spec.id = id;
            spec.target_date = target_date;
            if let Some(metric) = parse_opt(metric.as_deref())? {
                spec.metric = metric;
            }
            Some(ledger.upsert_goal(spec).await?)
        }
        LedgerCommand::UpdateGoalProgress {
            goal,
            current_minor,
        } => {
            let goal_ref: GoalRef = parse(&goal)?;
            let goal = ledger
                .update_goal_progress(&goal_ref, Money::new(current_minor))
                .await?;
            Some(goal.id)
        }
        LedgerCommand::LogRevenue {
            amount_minor,
            description,
            business_line,
            client,
        } => {
            let line =
                parse_opt(business_line.as_deref())?.unwrap_or(LifeCategory::TechBusiness);
            let description =
                description.unwrap_or_else(|| DEFAULT_REVENUE_DESCRIPTION.to_string());
            let mut entry = RevenueEntry::new(line, Money::new(amount_minor), description)
                .date(state.today());
            if let Some(client) = client {
                entry = entry.client(client);
            }
            Some(ledger.log_revenue(entry).await?)
        }
    };

    Ok(Json(CommandOutcome { op, id }))
}
