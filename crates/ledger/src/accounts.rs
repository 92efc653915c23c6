//! The module contains `Account` and its storage model.

use chrono::{DateTime, Utc};
use sea_orm::entity::{ActiveValue, prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{AccountCategory, Currency, LedgerError, LifeCategory, Money, util::parse_uuid};

/// A place where money is kept: a bank account, a savings pot, a business
/// account or a debt.
///
/// `balance` is signed, debts are negative. It always equals the sum of the
/// account's transactions.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: Uuid,
    pub name: String,
    pub account_type: LifeCategory,
    pub category: AccountCategory,
    pub balance: Money,
    pub currency: Currency,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Account {
    pub(crate) fn new(
        name: String,
        account_type: LifeCategory,
        category: AccountCategory,
        currency: Currency,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            account_type,
            category,
            balance: Money::ZERO,
            currency,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "accounts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    pub account_type: String,
    pub category: String,
    pub balance: i64,
    pub currency: String,
    pub is_active: bool,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::transactions::Entity")]
    Transactions,
}

impl Related<super::transactions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transactions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Account> for ActiveModel {
    fn from(value: &Account) -> Self {
        Self {
            id: ActiveValue::Set(value.id.to_string()),
            name: ActiveValue::Set(value.name.clone()),
            account_type: ActiveValue::Set(value.account_type.as_str().to_string()),
            category: ActiveValue::Set(value.category.as_str().to_string()),
            balance: ActiveValue::Set(value.balance.minor()),
            currency: ActiveValue::Set(value.currency.code().to_string()),
            is_active: ActiveValue::Set(value.is_active),
            created_at: ActiveValue::Set(value.created_at),
            updated_at: ActiveValue::Set(value.updated_at),
        }
    }
}

impl TryFrom<Model> for Account {
    type Error = LedgerError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "account")?,
            account_type: LifeCategory::try_from(model.account_type.as_str())?,
            category: AccountCategory::try_from(model.category.as_str())?,
            balance: Money::new(model.balance),
            currency: Currency::try_from(model.currency.as_str())?,
            name: model.name,
            is_active: model.is_active,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}
