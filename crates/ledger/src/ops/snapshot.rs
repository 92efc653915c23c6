use chrono::{Datelike, NaiveDate};

use crate::{
    AccountFilter, GoalFilter, LedgerSnapshot, ResultLedger, RevenueTotals, metrics,
    MetricsReport,
};

use super::Ledger;

/// Transactions carried in a snapshot for context.
const SNAPSHOT_RECENT: u64 = 10;

impl Ledger {
    /// Reads everything the metrics need as of `as_of`.
    pub async fn snapshot(&self, as_of: NaiveDate) -> ResultLedger<LedgerSnapshot> {
        let accounts = self
            .accounts(&AccountFilter {
                include_inactive: true,
                ..Default::default()
            })
            .await?;
        let goals = self.goals(&GoalFilter::default()).await?;

        let month_start = as_of.with_day(1).unwrap_or(as_of);
        let revenue = RevenueTotals {
            today: self.revenue_between(as_of, as_of, None).await?,
            month_to_date: self.revenue_between(month_start, as_of, None).await?,
        };
        let recent_transactions = self.recent_transactions(SNAPSHOT_RECENT).await?;

        Ok(LedgerSnapshot {
            as_of,
            accounts,
            goals,
            revenue,
            recent_transactions,
        })
    }

    /// Snapshot and evaluate in one step.
    pub async fn report(&self, as_of: NaiveDate) -> ResultLedger<MetricsReport> {
        let snapshot = self.snapshot(as_of).await?;
        Ok(metrics::evaluate(&snapshot))
    }
}
