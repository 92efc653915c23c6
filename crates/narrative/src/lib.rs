//! Briefings and answers about the ledger, written by an external text
//! generator with a deterministic fallback.

pub use error::{GenerationError, KnowledgeError};
pub use generator::{AnthropicClient, Generation, TextGenerator};
pub use knowledge::KnowledgeBase;
pub use narrator::{Briefing, BriefingContext, BriefingSource, Narrator, NarratorConfig};
pub use prompt::{BriefingKind, Prompt, metrics_context};

pub mod fallback;

mod error;
mod generator;
mod knowledge;
mod narrator;
mod prompt;

#[cfg(test)]
mod testing {
    use chrono::{NaiveDate, TimeZone, Utc};
    use ledger::{
        Account, AccountCategory, Currency, Goal, GoalMetric, GoalPriority, GoalStatus,
        LedgerSnapshot, LifeCategory, MetricsReport, Money, RevenueTotals, metrics,
    };
    use uuid::Uuid;

    fn goal(title: &str, life: LifeCategory, target: i64, metric: GoalMetric) -> Goal {
        let created = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        Goal {
            id: Uuid::new_v4(),
            title: title.to_string(),
            description: None,
            life_category: life,
            target_amount: Money::from_major(target),
            current_amount: Money::ZERO,
            target_date: NaiveDate::from_ymd_opt(2026, 12, 31),
            priority: GoalPriority::High,
            status: GoalStatus::Active,
            metric,
            created_at: created,
            updated_at: created,
        }
    }

    /// R18,000 in cash, a R500K net worth goal and R1,000 revenue today
    /// against a R4,881 daily target.
    pub fn sample_report() -> MetricsReport {
        let now = Utc.with_ymd_and_hms(2026, 10, 18, 6, 0, 0).unwrap();
        let cash = Account {
            id: Uuid::new_v4(),
            name: "Liquid Cash".to_string(),
            account_type: LifeCategory::Personal,
            category: AccountCategory::Checking,
            balance: Money::from_major(18_000),
            currency: Currency::Zar,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        let snapshot = LedgerSnapshot {
            as_of: NaiveDate::from_ymd_opt(2026, 10, 18).unwrap(),
            accounts: vec![cash],
            goals: vec![
                goal("Net Worth R500K", LifeCategory::Personal, 500_000, GoalMetric::NetWorth),
                goal(
                    "43V3R Daily Revenue",
                    LifeCategory::TechBusiness,
                    4_881,
                    GoalMetric::DailyRevenue,
                ),
            ],
            revenue: RevenueTotals {
                today: Money::from_major(1_000),
                month_to_date: Money::from_major(5_000),
            },
            recent_transactions: Vec::new(),
        };
        metrics::evaluate(&snapshot)
    }
}
