//! The module contains `Goal`, its vocabularies and its storage model.

use std::{fmt, str::FromStr};

use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::entity::{ActiveValue, prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    LedgerError, LifeCategory, Money,
    categories::str_enum,
    util::parse_uuid,
};

str_enum! {
    GoalStatus, "goal status" {
        Active => "active",
        Achieved => "achieved",
        Abandoned => "abandoned",
    }
}

str_enum! {
    GoalPriority, "goal priority" {
        Low => "low",
        Medium => "medium",
        High => "high",
    }
}

str_enum! {
    /// Where a goal's current amount comes from.
    ///
    /// `Manual` goals store their amount; the others are resolved from the
    /// ledger whenever a snapshot is taken and cannot be updated by hand.
    GoalMetric, "goal metric" {
        Manual => "manual",
        NetWorth => "net_worth",
        DailyRevenue => "daily_revenue",
        MonthlyRevenue => "monthly_revenue",
    }
}

impl GoalMetric {
    #[must_use]
    pub fn is_derived(self) -> bool {
        !matches!(self, Self::Manual)
    }
}

/// A financial or life target.
///
/// Progress is never stored: see [`crate::metrics::goal_progress`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Goal {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub life_category: LifeCategory,
    pub target_amount: Money,
    pub current_amount: Money,
    pub target_date: Option<NaiveDate>,
    pub priority: GoalPriority,
    pub status: GoalStatus,
    pub metric: GoalMetric,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// How callers point at a goal: by id, or by its (case-insensitive) title.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GoalRef {
    Id(Uuid),
    Title(String),
}

impl FromStr for GoalRef {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(LedgerError::Validation(
                "goal reference must not be empty".to_string(),
            ));
        }
        Ok(match Uuid::parse_str(trimmed) {
            Ok(id) => Self::Id(id),
            Err(_) => Self::Title(trimmed.to_string()),
        })
    }
}

impl From<Uuid> for GoalRef {
    fn from(value: Uuid) -> Self {
        Self::Id(value)
    }
}

impl fmt::Display for GoalRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => write!(f, "goal {id}"),
            Self::Title(title) => write!(f, "goal '{title}'"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "goals")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub life_category: String,
    pub target_amount: i64,
    pub current_amount: i64,
    pub target_date: Option<Date>,
    pub priority: String,
    pub status: String,
    pub metric: String,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Goal> for ActiveModel {
    fn from(goal: &Goal) -> Self {
        Self {
            id: ActiveValue::Set(goal.id.to_string()),
            title: ActiveValue::Set(goal.title.clone()),
            description: ActiveValue::Set(goal.description.clone()),
            life_category: ActiveValue::Set(goal.life_category.as_str().to_string()),
            target_amount: ActiveValue::Set(goal.target_amount.minor()),
            current_amount: ActiveValue::Set(goal.current_amount.minor()),
            target_date: ActiveValue::Set(goal.target_date),
            priority: ActiveValue::Set(goal.priority.as_str().to_string()),
            status: ActiveValue::Set(goal.status.as_str().to_string()),
            metric: ActiveValue::Set(goal.metric.as_str().to_string()),
            created_at: ActiveValue::Set(goal.created_at),
            updated_at: ActiveValue::Set(goal.updated_at),
        }
    }
}

impl TryFrom<Model> for Goal {
    type Error = LedgerError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "goal")?,
            life_category: LifeCategory::try_from(model.life_category.as_str())?,
            target_amount: Money::new(model.target_amount),
            current_amount: Money::new(model.current_amount),
            priority: GoalPriority::try_from(model.priority.as_str())?,
            status: GoalStatus::try_from(model.status.as_str())?,
            metric: GoalMetric::try_from(model.metric.as_str())?,
            title: model.title,
            description: model.description,
            target_date: model.target_date,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn goal_ref_prefers_uuid() {
        let id = Uuid::new_v4();
        assert_eq!(id.to_string().parse::<GoalRef>().unwrap(), GoalRef::Id(id));
        assert_eq!(
            " Get Out of Debt ".parse::<GoalRef>().unwrap(),
            GoalRef::Title("Get Out of Debt".to_string())
        );
        assert!("  ".parse::<GoalRef>().is_err());
    }

    #[test]
    fn only_manual_goals_take_direct_updates() {
        assert!(!GoalMetric::Manual.is_derived());
        assert!(GoalMetric::NetWorth.is_derived());
        assert!(GoalMetric::MonthlyRevenue.is_derived());
    }
}
