//! Command and filter structs for ledger operations.
//!
//! These group the parameters of writes and queries so call sites stay
//! readable and avoid long argument lists.

use chrono::NaiveDate;
use uuid::Uuid;

use crate::{
    AccountCategory, Currency, GoalMetric, GoalPriority, GoalStatus, LifeCategory, Money,
    Recurrence, TransactionCategory,
};

/// Create an account.
#[derive(Clone, Debug)]
pub struct NewAccount {
    pub name: String,
    pub account_type: LifeCategory,
    pub category: AccountCategory,
    pub currency: Currency,
    /// Recorded as an opening `adjustment` transaction when non-zero.
    pub opening_balance: Money,
}

impl NewAccount {
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        account_type: LifeCategory,
        category: AccountCategory,
    ) -> Self {
        Self {
            name: name.into(),
            account_type,
            category,
            currency: Currency::default(),
            opening_balance: Money::ZERO,
        }
    }

    #[must_use]
    pub fn currency(mut self, currency: Currency) -> Self {
        self.currency = currency;
        self
    }

    #[must_use]
    pub fn opening_balance(mut self, balance: Money) -> Self {
        self.opening_balance = balance;
        self
    }
}

/// Append a transaction to an account.
#[derive(Clone, Debug)]
pub struct NewTransaction {
    pub account_id: Uuid,
    pub amount: Money,
    pub description: String,
    pub category: TransactionCategory,
    pub subcategory: Option<String>,
    /// Defaults to the account type.
    pub life_category: Option<LifeCategory>,
    /// Defaults to today (UTC).
    pub date: Option<NaiveDate>,
    pub recurrence: Option<Recurrence>,
    pub notes: Option<String>,
}

impl NewTransaction {
    #[must_use]
    pub fn new(
        account_id: Uuid,
        amount: Money,
        description: impl Into<String>,
        category: TransactionCategory,
    ) -> Self {
        Self {
            account_id,
            amount,
            description: description.into(),
            category,
            subcategory: None,
            life_category: None,
            date: None,
            recurrence: None,
            notes: None,
        }
    }

    #[must_use]
    pub fn subcategory(mut self, subcategory: impl Into<String>) -> Self {
        self.subcategory = Some(subcategory.into());
        self
    }

    #[must_use]
    pub fn life_category(mut self, life_category: LifeCategory) -> Self {
        self.life_category = Some(life_category);
        self
    }

    #[must_use]
    pub fn date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    #[must_use]
    pub fn recurrence(mut self, recurrence: Recurrence) -> Self {
        self.recurrence = Some(recurrence);
        self
    }

    #[must_use]
    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

/// Insert or replace a goal. With `id: None` a new goal is created.
#[derive(Clone, Debug)]
pub struct GoalSpec {
    pub id: Option<Uuid>,
    pub title: String,
    pub description: Option<String>,
    pub life_category: LifeCategory,
    pub target_amount: Money,
    pub current_amount: Money,
    pub target_date: Option<NaiveDate>,
    pub priority: GoalPriority,
    pub status: GoalStatus,
    pub metric: GoalMetric,
}

impl GoalSpec {
    #[must_use]
    pub fn new(title: impl Into<String>, life_category: LifeCategory, target: Money) -> Self {
        Self {
            id: None,
            title: title.into(),
            description: None,
            life_category,
            target_amount: target,
            current_amount: Money::ZERO,
            target_date: None,
            priority: GoalPriority::Medium,
            status: GoalStatus::Active,
            metric: GoalMetric::Manual,
        }
    }

    #[must_use]
    pub fn id(mut self, id: Uuid) -> Self {
        self.id = Some(id);
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn current(mut self, current: Money) -> Self {
        self.current_amount = current;
        self
    }

    #[must_use]
    pub fn target_date(mut self, date: NaiveDate) -> Self {
        self.target_date = Some(date);
        self
    }

    #[must_use]
    pub fn priority(mut self, priority: GoalPriority) -> Self {
        self.priority = priority;
        self
    }

    #[must_use]
    pub fn status(mut self, status: GoalStatus) -> Self {
        self.status = status;
        self
    }

    #[must_use]
    pub fn metric(mut self, metric: GoalMetric) -> Self {
        self.metric = metric;
        self
    }
}

/// Record business revenue against a business line.
#[derive(Clone, Debug)]
pub struct RevenueEntry {
    pub line: LifeCategory,
    pub amount: Money,
    pub description: String,
    pub client: Option<String>,
    pub date: Option<NaiveDate>,
}

impl RevenueEntry {
    #[must_use]
    pub fn new(line: LifeCategory, amount: Money, description: impl Into<String>) -> Self {
        Self {
            line,
            amount,
            description: description.into(),
            client: None,
            date: None,
        }
    }

    #[must_use]
    pub fn client(mut self, client: impl Into<String>) -> Self {
        self.client = Some(client.into());
        self
    }

    #[must_use]
    pub fn date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }
}

#[derive(Clone, Debug, Default)]
pub struct AccountFilter {
    pub account_type: Option<LifeCategory>,
    pub category: Option<AccountCategory>,
    /// If true, includes inactive accounts (default: false).
    pub include_inactive: bool,
}

/// Filters for listing transactions. Both date bounds are inclusive.
#[derive(Clone, Debug, Default)]
pub struct TransactionFilter {
    pub account_id: Option<Uuid>,
    pub life_category: Option<LifeCategory>,
    pub category: Option<TransactionCategory>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

#[derive(Clone, Debug, Default)]
pub struct GoalFilter {
    pub life_category: Option<LifeCategory>,
    pub status: Option<GoalStatus>,
}
