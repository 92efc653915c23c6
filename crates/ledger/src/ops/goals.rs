use chrono::Utc;
use uuid::Uuid;

use sea_orm::{
    ActiveValue, ConnectionTrait, QueryFilter, QueryOrder, TransactionTrait,
    prelude::*,
    sea_query::{Expr, Func},
};

use crate::{
    Goal, GoalFilter, GoalRef, GoalSpec, GoalStatus, LedgerError, Money, ResultLedger, goals,
    util::{normalize_optional, normalize_required, parse_uuid},
};

use super::{Ledger, with_tx};

async fn find_goal<C: ConnectionTrait>(
    db: &C,
    goal_ref: &GoalRef,
) -> ResultLedger<Option<goals::Model>> {
    let query = match goal_ref {
        GoalRef::Id(id) => goals::Entity::find_by_id(id.to_string()),
        GoalRef::Title(title) => goals::Entity::find()
            .filter(Expr::expr(Func::lower(Expr::col(goals::Column::Title))).eq(title.to_lowercase()))
            .order_by_asc(goals::Column::CreatedAt),
    };
    Ok(query.one(db).await?)
}

async fn require_goal<C: ConnectionTrait>(db: &C, goal_ref: &GoalRef) -> ResultLedger<goals::Model> {
    find_goal(db, goal_ref)
        .await?
        .ok_or_else(|| LedgerError::NotFound(goal_ref.to_string()))
}

impl Ledger {
    /// Inserts a goal, or replaces the one with the same id (or, without an
    /// id, the same title). `created_at` of a replaced goal is kept.
    pub async fn upsert_goal(&self, spec: GoalSpec) -> ResultLedger<Uuid> {
        let title = normalize_required(&spec.title, "goal title")?;
        if spec.target_amount.is_negative() {
            return Err(LedgerError::validation("target amount must be >= 0"));
        }

        with_tx!(self, |db_tx| {
            let existing = match spec.id {
                Some(id) => find_goal(&db_tx, &GoalRef::Id(id)).await?,
                None => find_goal(&db_tx, &GoalRef::Title(title.clone())).await?,
            };
            let id = match &existing {
                Some(model) => parse_uuid(&model.id, "goal")?,
                None => spec.id.unwrap_or_else(Uuid::new_v4),
            };
            let now = Utc::now();

            let goal = Goal {
                id,
                title,
                description: normalize_optional(spec.description.as_deref()),
                life_category: spec.life_category,
                target_amount: spec.target_amount,
                current_amount: spec.current_amount,
                target_date: spec.target_date,
                priority: spec.priority,
                status: spec.status,
                metric: spec.metric,
                created_at: existing.as_ref().map_or(now, |m| m.created_at),
                updated_at: now,
            };

            let model = goals::ActiveModel::from(&goal);
            if existing.is_some() {
                model.update(&db_tx).await?;
                tracing::debug!("updated goal '{}'", goal.title);
            } else {
                model.insert(&db_tx).await?;
                tracing::info!("created goal '{}'", goal.title);
            }
            Ok(goal.id)
        })
    }

    /// Sets the current amount of a manual goal.
    ///
    /// Goals whose amount is derived from the ledger reject direct updates.
    /// Reaching the target does not change the status.
    pub async fn update_goal_progress(
        &self,
        goal_ref: &GoalRef,
        current: Money,
    ) -> ResultLedger<Goal> {
        with_tx!(self, |db_tx| {
            let mut goal = Goal::try_from(require_goal(&db_tx, goal_ref).await?)?;
            if goal.metric.is_derived() {
                return Err(LedgerError::Validation(format!(
                    "{goal_ref} tracks {} and cannot be updated by hand",
                    goal.metric
                )));
            }

            goal.current_amount = current;
            goal.updated_at = Utc::now();
            goals::ActiveModel {
                id: ActiveValue::Set(goal.id.to_string()),
                current_amount: ActiveValue::Set(current.minor()),
                updated_at: ActiveValue::Set(goal.updated_at),
                ..Default::default()
            }
            .update(&db_tx)
            .await?;
            Ok(goal)
        })
    }

    /// Marks a goal active, achieved or abandoned.
    pub async fn set_goal_status(
        &self,
        goal_ref: &GoalRef,
        status: GoalStatus,
    ) -> ResultLedger<Goal> {
        with_tx!(self, |db_tx| {
            let mut goal = Goal::try_from(require_goal(&db_tx, goal_ref).await?)?;
            goal.status = status;
            goal.updated_at = Utc::now();
            goals::ActiveModel {
                id: ActiveValue::Set(goal.id.to_string()),
                status: ActiveValue::Set(status.as_str().to_string()),
                updated_at: ActiveValue::Set(goal.updated_at),
                ..Default::default()
            }
            .update(&db_tx)
            .await?;
            tracing::info!("goal '{}' is now {status}", goal.title);
            Ok(goal)
        })
    }

    pub async fn goal(&self, goal_ref: &GoalRef) -> ResultLedger<Goal> {
        Goal::try_from(require_goal(&self.database, goal_ref).await?)
    }

    /// Lists goals, oldest first.
    pub async fn goals(&self, filter: &GoalFilter) -> ResultLedger<Vec<Goal>> {
        let mut query = goals::Entity::find();
        if let Some(life_category) = filter.life_category {
            query = query.filter(goals::Column::LifeCategory.eq(life_category.as_str()));
        }
        if let Some(status) = filter.status {
            query = query.filter(goals::Column::Status.eq(status.as_str()));
        }

        query
            .order_by_asc(goals::Column::CreatedAt)
            .order_by_asc(goals::Column::Title)
            .all(&self.database)
            .await?
            .into_iter()
            .map(Goal::try_from)
            .collect()
    }
}
