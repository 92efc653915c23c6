use chrono::NaiveDate;
use uuid::Uuid;

use sea_orm::{QueryFilter, TransactionTrait, prelude::*};

use crate::{
    LedgerError, LifeCategory, Money, NewTransaction, ResultLedger, RevenueEntry,
    TransactionCategory, transactions, util::parse_uuid,
};

use super::{
    Ledger,
    accounts::primary_account,
    transactions::{append, build_transaction},
    with_tx,
};

const REVENUE_SUBCATEGORY: &str = "revenue";

impl Ledger {
    /// Records business revenue as income on the business line's primary
    /// account.
    pub async fn log_revenue(&self, entry: RevenueEntry) -> ResultLedger<Uuid> {
        if !entry.line.is_business() {
            return Err(LedgerError::Validation(format!(
                "{} is not a business line",
                entry.line
            )));
        }
        if !entry.amount.is_positive() {
            return Err(LedgerError::validation("revenue must be > 0"));
        }

        with_tx!(self, |db_tx| {
            let account = primary_account(&db_tx, entry.line)
                .await?
                .ok_or_else(|| LedgerError::NotFound(format!("active {} account", entry.line)))?;
            let account_id = parse_uuid(&account.id, "account")?;

            let mut cmd = NewTransaction::new(
                account_id,
                entry.amount,
                entry.description.clone(),
                TransactionCategory::Income,
            )
            .subcategory(REVENUE_SUBCATEGORY)
            .life_category(entry.line);
            cmd.date = entry.date;
            cmd.notes = entry.client.as_ref().map(|client| format!("client: {client}"));

            let tx = build_transaction(&account, cmd)?;
            append(&db_tx, &account, &tx).await?;
            tracing::info!("logged {} revenue of {}", entry.line, entry.amount);
            Ok(tx.id)
        })
    }

    /// Total business revenue dated between `from` and `to` (inclusive).
    ///
    /// Revenue is any `income` transaction on a business line; `line`
    /// narrows it to one of them.
    pub async fn revenue_between(
        &self,
        from: NaiveDate,
        to: NaiveDate,
        line: Option<LifeCategory>,
    ) -> ResultLedger<Money> {
        let lines: Vec<&str> = match line {
            Some(line) if line.is_business() => vec![line.as_str()],
            Some(line) => {
                return Err(LedgerError::Validation(format!(
                    "{line} is not a business line"
                )));
            }
            None => LifeCategory::ALL
                .iter()
                .filter(|c| c.is_business())
                .map(|c| c.as_str())
                .collect(),
        };

        let rows = transactions::Entity::find()
            .filter(transactions::Column::Category.eq(TransactionCategory::Income.as_str()))
            .filter(transactions::Column::LifeCategory.is_in(lines))
            .filter(transactions::Column::Date.gte(from))
            .filter(transactions::Column::Date.lte(to))
            .all(&self.database)
            .await?;

        Ok(rows.iter().map(|row| Money::new(row.amount)).sum())
    }
}
