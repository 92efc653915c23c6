use chrono::Utc;
use uuid::Uuid;

use sea_orm::{
    ActiveValue, ConnectionTrait, QueryFilter, QueryOrder, QuerySelect, TransactionTrait,
    prelude::*,
};

use crate::{
    LedgerError, NewTransaction, ResultLedger, Transaction, TransactionFilter, accounts,
    transactions,
    util::{normalize_optional, normalize_required},
};

use super::{Ledger, with_tx};

pub(super) const REVERSAL_SUBCATEGORY: &str = "reversal";

/// Load an account row or fail with `NotFound`.
pub(super) async fn require_account<C: ConnectionTrait>(
    db: &C,
    account_id: Uuid,
) -> ResultLedger<accounts::Model> {
    accounts::Entity::find_by_id(account_id.to_string())
        .one(db)
        .await?
        .ok_or_else(|| LedgerError::not_found(format!("account {account_id}")))
}

/// Insert `tx` and move the account balance by its amount.
///
/// Callers must run this inside a DB transaction so the row and the balance
/// change land together.
pub(super) async fn append<C: ConnectionTrait>(
    db: &C,
    account: &accounts::Model,
    tx: &Transaction,
) -> ResultLedger<()> {
    let balance = account
        .balance
        .checked_add(tx.amount.minor())
        .ok_or_else(|| LedgerError::validation("balance overflow"))?;

    transactions::ActiveModel::from(tx).insert(db).await?;
    accounts::ActiveModel {
        id: ActiveValue::Set(account.id.clone()),
        balance: ActiveValue::Set(balance),
        updated_at: ActiveValue::Set(tx.created_at),
        ..Default::default()
    }
    .update(db)
    .await?;

    Ok(())
}

/// Validate a `NewTransaction` against its account and build the row.
pub(super) fn build_transaction(
    account: &accounts::Model,
    cmd: NewTransaction,
) -> ResultLedger<Transaction> {
    if cmd.amount.is_zero() {
        return Err(LedgerError::validation("amount must not be zero"));
    }
    if !account.is_active {
        return Err(LedgerError::Validation(format!(
            "account '{}' is inactive",
            account.name
        )));
    }
    let description = normalize_required(&cmd.description, "description")?;
    let life_category = match cmd.life_category {
        Some(category) => category,
        None => crate::LifeCategory::try_from(account.account_type.as_str())?,
    };
    let now = Utc::now();

    Ok(Transaction {
        id: Uuid::new_v4(),
        account_id: cmd.account_id,
        amount: cmd.amount,
        description,
        category: cmd.category,
        subcategory: normalize_optional(cmd.subcategory.as_deref()),
        life_category,
        date: cmd.date.unwrap_or_else(|| now.date_naive()),
        recurrence: cmd.recurrence,
        notes: normalize_optional(cmd.notes.as_deref()),
        created_at: now,
    })
}

impl Ledger {
    /// Appends a transaction and moves the account balance by its amount.
    ///
    /// Fails with `NotFound` when the account does not exist and with
    /// `Validation` for a zero amount, a blank description or an inactive
    /// account. Nothing is written on failure.
    pub async fn apply_transaction(&self, cmd: NewTransaction) -> ResultLedger<Uuid> {
        with_tx!(self, |db_tx| {
            let account = require_account(&db_tx, cmd.account_id).await?;
            let tx = build_transaction(&account, cmd)?;
            append(&db_tx, &account, &tx).await?;
            tracing::debug!(
                "applied {} {} to account '{}'",
                tx.category,
                tx.amount,
                account.name
            );
            Ok(tx.id)
        })
    }

    /// Corrects a transaction by appending its negation.
    ///
    /// Reversals themselves cannot be reversed, and a transaction is reversed
    /// at most once.
    pub async fn reverse_transaction(
        &self,
        transaction_id: Uuid,
        note: Option<&str>,
    ) -> ResultLedger<Uuid> {
        let marker = format!("reverses {transaction_id}");
        with_tx!(self, |db_tx| {
            let original = transactions::Entity::find_by_id(transaction_id.to_string())
                .one(&db_tx)
                .await?
                .ok_or_else(|| LedgerError::not_found(format!("transaction {transaction_id}")))?;
            let original = Transaction::try_from(original)?;

            if original.subcategory.as_deref() == Some(REVERSAL_SUBCATEGORY) {
                return Err(LedgerError::validation("a reversal cannot be reversed"));
            }
            let already = transactions::Entity::find()
                .filter(transactions::Column::Subcategory.eq(REVERSAL_SUBCATEGORY))
                .filter(transactions::Column::Notes.starts_with(marker.as_str()))
                .one(&db_tx)
                .await?
                .is_some();
            if already {
                return Err(LedgerError::Validation(format!(
                    "transaction {transaction_id} is already reversed"
                )));
            }

            let account = require_account(&db_tx, original.account_id).await?;
            let notes = match normalize_optional(note) {
                Some(note) => format!("{marker}: {note}"),
                None => marker.clone(),
            };
            let amount = original
                .amount
                .checked_neg()
                .ok_or_else(|| LedgerError::validation("reversal amount is out of range"))?;
            let mut cmd = NewTransaction::new(
                original.account_id,
                amount,
                format!("Reversal: {}", original.description),
                original.category,
            )
            .subcategory(REVERSAL_SUBCATEGORY)
            .life_category(original.life_category)
            .notes(notes);
            cmd.date = Some(Utc::now().date_naive());

            let reversal = build_transaction(&account, cmd)?;
            append(&db_tx, &account, &reversal).await?;
            tracing::info!("reversed transaction {transaction_id}");
            Ok(reversal.id)
        })
    }

    /// Lists transactions matching `filter`, newest first.
    pub async fn transactions(
        &self,
        filter: &TransactionFilter,
        limit: u64,
    ) -> ResultLedger<Vec<Transaction>> {
        if let (Some(from), Some(to)) = (filter.from, filter.to)
            && from > to
        {
            return Err(LedgerError::validation("invalid range: from must be <= to"));
        }

        let mut query = transactions::Entity::find();
        if let Some(account_id) = filter.account_id {
            query = query.filter(transactions::Column::AccountId.eq(account_id.to_string()));
        }
        if let Some(life_category) = filter.life_category {
            query = query.filter(transactions::Column::LifeCategory.eq(life_category.as_str()));
        }
        if let Some(category) = filter.category {
            query = query.filter(transactions::Column::Category.eq(category.as_str()));
        }
        if let Some(from) = filter.from {
            query = query.filter(transactions::Column::Date.gte(from));
        }
        if let Some(to) = filter.to {
            query = query.filter(transactions::Column::Date.lte(to));
        }

        query
            .order_by_desc(transactions::Column::Date)
            .order_by_desc(transactions::Column::CreatedAt)
            .limit(limit)
            .all(&self.database)
            .await?
            .into_iter()
            .map(Transaction::try_from)
            .collect()
    }

    /// The most recent `limit` transactions across all accounts.
    pub async fn recent_transactions(&self, limit: u64) -> ResultLedger<Vec<Transaction>> {
        self.transactions(&TransactionFilter::default(), limit).await
    }
}
