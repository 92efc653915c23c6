//! Transaction primitives.
//!
//! A `Transaction` is an append-only ledger row moving money in or out of a
//! single account. Corrections are new rows, never edits.

use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{LedgerError, LifeCategory, Money, Recurrence, TransactionCategory, util::parse_uuid};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: Uuid,
    pub account_id: Uuid,
    /// Positive = income, negative = expense.
    pub amount: Money,
    pub description: String,
    pub category: TransactionCategory,
    pub subcategory: Option<String>,
    pub life_category: LifeCategory,
    pub date: NaiveDate,
    pub recurrence: Option<Recurrence>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub account_id: String,
    pub amount: i64,
    pub description: String,
    pub category: String,
    pub subcategory: Option<String>,
    pub life_category: String,
    pub date: Date,
    pub recurrence: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::accounts::Entity",
        from = "Column::AccountId",
        to = "super::accounts::Column::Id",
        on_update = "NoAction",
        on_delete = "Restrict"
    )]
    Accounts,
}

impl Related<super::accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Accounts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Transaction> for ActiveModel {
    fn from(tx: &Transaction) -> Self {
        Self {
            id: ActiveValue::Set(tx.id.to_string()),
            account_id: ActiveValue::Set(tx.account_id.to_string()),
            amount: ActiveValue::Set(tx.amount.minor()),
            description: ActiveValue::Set(tx.description.clone()),
            category: ActiveValue::Set(tx.category.as_str().to_string()),
            subcategory: ActiveValue::Set(tx.subcategory.clone()),
            life_category: ActiveValue::Set(tx.life_category.as_str().to_string()),
            date: ActiveValue::Set(tx.date),
            recurrence: ActiveValue::Set(tx.recurrence.map(|r| r.as_str().to_string())),
            notes: ActiveValue::Set(tx.notes.clone()),
            created_at: ActiveValue::Set(tx.created_at),
        }
    }
}

impl TryFrom<Model> for Transaction {
    type Error = LedgerError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "transaction")?,
            account_id: parse_uuid(&model.account_id, "account")?,
            amount: Money::new(model.amount),
            category: TransactionCategory::try_from(model.category.as_str())?,
            life_category: LifeCategory::try_from(model.life_category.as_str())?,
            recurrence: model
                .recurrence
                .as_deref()
                .map(Recurrence::try_from)
                .transpose()?,
            description: model.description,
            subcategory: model.subcategory,
            date: model.date,
            notes: model.notes,
            created_at: model.created_at,
        })
    }
}
