use chrono::NaiveDate;
use sea_orm::{PaginatorTrait, prelude::*};

use crate::{
    AccountCategory, GoalMetric, GoalPriority, GoalSpec, LifeCategory, Money, NewAccount,
    ResultLedger, accounts,
};

use super::Ledger;

const ACCOUNTS: &[(&str, LifeCategory, AccountCategory, i64)] = &[
    ("Liquid Cash", LifeCategory::Personal, AccountCategory::Checking, 0),
    ("Emergency Fund", LifeCategory::Personal, AccountCategory::Savings, 0),
    ("Savings Account", LifeCategory::Personal, AccountCategory::Savings, 0),
    ("Current Debt", LifeCategory::Personal, AccountCategory::Debt, -7_000),
    ("43V3R Tech Business", LifeCategory::TechBusiness, AccountCategory::Checking, 0),
    ("43V3R Brand Business", LifeCategory::BrandBusiness, AccountCategory::Checking, 0),
    ("IT Engineering Income", LifeCategory::Work, AccountCategory::Checking, 0),
];

struct SeedGoal {
    title: &'static str,
    description: &'static str,
    life_category: LifeCategory,
    target: i64,
    due: Option<(i32, u32, u32)>,
    priority: GoalPriority,
    metric: GoalMetric,
}

const GOALS: &[SeedGoal] = &[
    SeedGoal {
        title: "Net Worth R500K by Dec 2025",
        description: "Primary financial goal - achieve R500,000 net worth",
        life_category: LifeCategory::Personal,
        target: 500_000,
        due: Some((2025, 12, 31)),
        priority: GoalPriority::High,
        metric: GoalMetric::NetWorth,
    },
    SeedGoal {
        title: "43V3R Daily Revenue",
        description: "Daily revenue needed to stay on the MRR trajectory",
        life_category: LifeCategory::TechBusiness,
        target: 4_881,
        due: None,
        priority: GoalPriority::High,
        metric: GoalMetric::DailyRevenue,
    },
    SeedGoal {
        title: "43V3R Tech R100K MRR",
        description: "Scale technology business to R100K monthly recurring revenue",
        life_category: LifeCategory::TechBusiness,
        target: 100_000,
        due: Some((2027, 12, 31)),
        priority: GoalPriority::High,
        metric: GoalMetric::MonthlyRevenue,
    },
    SeedGoal {
        title: "Get Out of Debt",
        description: "Eliminate R7,000 debt to be self-sustainable",
        life_category: LifeCategory::Personal,
        target: 7_000,
        due: Some((2025, 6, 30)),
        priority: GoalPriority::High,
        metric: GoalMetric::Manual,
    },
    SeedGoal {
        title: "Own a House",
        description: "Purchase own property",
        life_category: LifeCategory::Personal,
        target: 1_000_000,
        due: Some((2026, 12, 31)),
        priority: GoalPriority::High,
        metric: GoalMetric::Manual,
    },
    SeedGoal {
        title: "Million Dollar Startup",
        description: "Build 43V3R into million dollar company",
        life_category: LifeCategory::TechBusiness,
        target: 1_000_000,
        due: Some((2027, 12, 31)),
        priority: GoalPriority::High,
        metric: GoalMetric::Manual,
    },
    SeedGoal {
        title: "43V3R Brand Launch",
        description: "Launch futuristic dystopian clothing line",
        life_category: LifeCategory::BrandBusiness,
        target: 25_000,
        due: Some((2025, 9, 30)),
        priority: GoalPriority::Medium,
        metric: GoalMetric::Manual,
    },
    SeedGoal {
        title: "Advanced Diploma",
        description: "Complete advanced diploma in computer engineering",
        life_category: LifeCategory::Work,
        target: 50_000,
        due: Some((2026, 12, 31)),
        priority: GoalPriority::Medium,
        metric: GoalMetric::Manual,
    },
    SeedGoal {
        title: "Help Parents",
        description: "Be able to financially help parents",
        life_category: LifeCategory::Personal,
        target: 50_000,
        due: Some((2026, 12, 31)),
        priority: GoalPriority::Medium,
        metric: GoalMetric::Manual,
    },
];

impl Ledger {
    /// Loads the starter accounts and goals into an empty store.
    ///
    /// Returns `false` without touching anything when accounts already exist.
    pub async fn seed_if_empty(&self) -> ResultLedger<bool> {
        if accounts::Entity::find().count(&self.database).await? > 0 {
            return Ok(false);
        }

        for (name, account_type, category, balance) in ACCOUNTS {
            self.create_account(
                NewAccount::new(*name, *account_type, *category)
                    .opening_balance(Money::from_major(*balance)),
            )
            .await?;
        }

        for seed in GOALS {
            let mut spec = GoalSpec::new(seed.title, seed.life_category, Money::from_major(seed.target))
                .description(seed.description)
                .priority(seed.priority)
                .metric(seed.metric);
            spec.target_date = seed
                .due
                .and_then(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d));
            self.upsert_goal(spec).await?;
        }

        tracing::info!(
            "seeded {} accounts and {} goals",
            ACCOUNTS.len(),
            GOALS.len()
        );
        Ok(true)
    }
}
