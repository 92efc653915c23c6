use std::collections::HashMap;

use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;

use sea_orm::{ActiveValue, TransactionTrait, prelude::*};

use crate::{Money, ResultLedger, accounts, transactions, util::parse_uuid};

use super::{Ledger, with_tx};

/// An account whose stored balance disagreed with its transactions.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct BalanceDrift {
    pub account_id: Uuid,
    pub name: String,
    pub stored: Money,
    pub computed: Money,
}

impl Ledger {
    /// Recomputes every account balance from the ledger and persists it.
    ///
    /// Returns the accounts that had drifted; an empty list means the store
    /// was consistent.
    pub async fn recompute_balances(&self) -> ResultLedger<Vec<BalanceDrift>> {
        with_tx!(self, |db_tx| {
            let account_models = accounts::Entity::find().all(&db_tx).await?;
            let tx_models = transactions::Entity::find().all(&db_tx).await?;

            let mut totals: HashMap<&str, i64> = HashMap::new();
            for tx in &tx_models {
                *totals.entry(tx.account_id.as_str()).or_default() += tx.amount;
            }

            let mut drifts = Vec::new();
            for account in &account_models {
                let computed = totals.get(account.id.as_str()).copied().unwrap_or(0);
                if computed == account.balance {
                    continue;
                }

                tracing::warn!(
                    "account '{}' balance drifted: stored {}, ledger {}",
                    account.name,
                    Money::new(account.balance),
                    Money::new(computed)
                );
                accounts::ActiveModel {
                    id: ActiveValue::Set(account.id.clone()),
                    balance: ActiveValue::Set(computed),
                    updated_at: ActiveValue::Set(Utc::now()),
                    ..Default::default()
                }
                .update(&db_tx)
                .await?;

                drifts.push(BalanceDrift {
                    account_id: parse_uuid(&account.id, "account")?,
                    name: account.name.clone(),
                    stored: Money::new(account.balance),
                    computed: Money::new(computed),
                });
            }

            Ok(drifts)
        })
    }
}
