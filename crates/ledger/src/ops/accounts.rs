use chrono::Utc;
use uuid::Uuid;

use sea_orm::{
    ActiveValue, ConnectionTrait, QueryFilter, QueryOrder, TransactionTrait,
    prelude::*,
    sea_query::{Expr, Func},
};

use crate::{
    Account, AccountCategory, AccountFilter, LedgerError, LifeCategory, Money, NewAccount,
    NewTransaction, ResultLedger, TransactionCategory, accounts, util::normalize_required,
};

use super::{
    Ledger,
    transactions::{append, build_transaction, require_account},
    with_tx,
};

const ADJUSTMENT_SUBCATEGORY: &str = "balance_adjustment";
const OPENING_SUBCATEGORY: &str = "opening";

/// First active account of a type, preferring checking accounts.
pub(super) async fn primary_account<C: ConnectionTrait>(
    db: &C,
    account_type: LifeCategory,
) -> ResultLedger<Option<accounts::Model>> {
    let candidates = accounts::Entity::find()
        .filter(accounts::Column::AccountType.eq(account_type.as_str()))
        .filter(accounts::Column::IsActive.eq(true))
        .order_by_asc(accounts::Column::CreatedAt)
        .order_by_asc(accounts::Column::Name)
        .all(db)
        .await?;

    let checking = candidates
        .iter()
        .position(|a| a.category == AccountCategory::Checking.as_str());
    Ok(match checking {
        Some(index) => candidates.into_iter().nth(index),
        None => candidates.into_iter().next(),
    })
}

impl Ledger {
    /// Adds an account.
    ///
    /// Names are unique (case-insensitive) within an account type. A non-zero
    /// opening balance is recorded as an `adjustment` transaction so the
    /// balance still equals the sum of the account's transactions.
    pub async fn create_account(&self, cmd: NewAccount) -> ResultLedger<Uuid> {
        let name = normalize_required(&cmd.name, "account name")?;
        with_tx!(self, |db_tx| {
            let exists = accounts::Entity::find()
                .filter(accounts::Column::AccountType.eq(cmd.account_type.as_str()))
                .filter(Expr::expr(Func::lower(Expr::col(accounts::Column::Name))).eq(name.to_lowercase()))
                .one(&db_tx)
                .await?
                .is_some();
            if exists {
                return Err(LedgerError::Validation(format!(
                    "account '{name}' already exists for {}",
                    cmd.account_type
                )));
            }

            let account = Account::new(
                name,
                cmd.account_type,
                cmd.category,
                cmd.currency,
                Utc::now(),
            );
            let model = accounts::ActiveModel::from(&account).insert(&db_tx).await?;

            if !cmd.opening_balance.is_zero() {
                let opening = NewTransaction::new(
                    account.id,
                    cmd.opening_balance,
                    format!("Opening balance for '{}'", account.name),
                    TransactionCategory::Adjustment,
                )
                .subcategory(OPENING_SUBCATEGORY);
                let tx = build_transaction(&model, opening)?;
                append(&db_tx, &model, &tx).await?;
            }

            tracing::info!("created account '{}' ({})", account.name, account.account_type);
            Ok(account.id)
        })
    }

    /// Overrides an account balance.
    ///
    /// The difference is recorded as an `adjustment` transaction; returns its
    /// id, or `None` when the balance already matched.
    pub async fn set_account_balance(
        &self,
        account_id: Uuid,
        new_balance: Money,
        note: Option<&str>,
    ) -> ResultLedger<Option<Uuid>> {
        with_tx!(self, |db_tx| {
            let account = require_account(&db_tx, account_id).await?;
            let delta = new_balance
                .checked_sub(Money::new(account.balance))
                .ok_or_else(|| LedgerError::validation("balance change is out of range"))?;
            if delta.is_zero() {
                return Ok(None);
            }

            let mut cmd = NewTransaction::new(
                account_id,
                delta,
                format!("Balance adjustment for '{}'", account.name),
                TransactionCategory::Adjustment,
            )
            .subcategory(ADJUSTMENT_SUBCATEGORY);
            cmd.notes = Some(match note {
                Some(note) if !note.trim().is_empty() => note.trim().to_string(),
                _ => format!("balance set to {new_balance}"),
            });

            let tx = build_transaction(&account, cmd)?;
            append(&db_tx, &account, &tx).await?;
            tracing::info!(
                "balance of '{}' set to {new_balance} (delta {delta})",
                account.name
            );
            Ok(Some(tx.id))
        })
    }

    /// Activates or deactivates an account. Inactive accounts are left out of
    /// net worth and reject new transactions.
    pub async fn set_account_active(&self, account_id: Uuid, active: bool) -> ResultLedger<()> {
        with_tx!(self, |db_tx| {
            require_account(&db_tx, account_id).await?;
            accounts::ActiveModel {
                id: ActiveValue::Set(account_id.to_string()),
                is_active: ActiveValue::Set(active),
                updated_at: ActiveValue::Set(Utc::now()),
                ..Default::default()
            }
            .update(&db_tx)
            .await?;
            Ok(())
        })
    }

    pub async fn account(&self, account_id: Uuid) -> ResultLedger<Account> {
        Account::try_from(require_account(&self.database, account_id).await?)
    }

    /// First active account of a type, preferring checking accounts.
    pub async fn primary_account(&self, account_type: LifeCategory) -> ResultLedger<Account> {
        primary_account(&self.database, account_type)
            .await?
            .ok_or_else(|| LedgerError::NotFound(format!("active {account_type} account")))
            .and_then(Account::try_from)
    }

    /// Lists accounts ordered by type and name.
    pub async fn accounts(&self, filter: &AccountFilter) -> ResultLedger<Vec<Account>> {
        let mut query = accounts::Entity::find();
        if let Some(account_type) = filter.account_type {
            query = query.filter(accounts::Column::AccountType.eq(account_type.as_str()));
        }
        if let Some(category) = filter.category {
            query = query.filter(accounts::Column::Category.eq(category.as_str()));
        }
        if !filter.include_inactive {
            query = query.filter(accounts::Column::IsActive.eq(true));
        }

        query
            .order_by_asc(accounts::Column::AccountType)
            .order_by_asc(accounts::Column::Name)
            .all(&self.database)
            .await?
            .into_iter()
            .map(Account::try_from)
            .collect()
    }

    /// Sum of balances over the active accounts matching `filter`.
    pub async fn sum_balances(&self, filter: &AccountFilter) -> ResultLedger<Money> {
        Ok(self
            .accounts(filter)
            .await?
            .iter()
            .filter(|a| a.is_active)
            .map(|a| a.balance)
            .sum())
    }
}
