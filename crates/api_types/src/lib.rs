//! Wire types shared by the HTTP layer, the dashboard relay and clients.
//!
//! Amounts are integer minor units (`*_minor`). Vocabulary fields (account
//! type, categories, statuses) travel as their snake_case storage strings
//! and are parsed by the server.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod account {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AccountNew {
        pub name: String,
        pub account_type: String,
        pub category: String,
        pub currency: Option<String>,
        pub opening_balance_minor: Option<i64>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AccountView {
        pub id: Uuid,
        pub name: String,
        pub account_type: String,
        pub category: String,
        pub balance_minor: i64,
        pub currency: String,
        pub is_active: bool,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct AccountQuery {
        pub account_type: Option<String>,
        pub category: Option<String>,
        pub include_inactive: Option<bool>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BalanceSet {
        pub balance_minor: i64,
        pub note: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BalanceSetResponse {
        /// The adjustment transaction, absent when the balance already matched.
        pub transaction_id: Option<Uuid>,
    }
}

pub mod transaction {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionNew {
        pub account_id: Uuid,
        pub amount_minor: i64,
        pub description: String,
        pub category: String,
        pub subcategory: Option<String>,
        pub life_category: Option<String>,
        pub date: Option<NaiveDate>,
        pub recurrence: Option<String>,
        pub notes: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionCreated {
        pub id: Uuid,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct TransactionReverse {
        pub note: Option<String>,
    }

    /// Query string of `GET /transactions`. Both dates are inclusive.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct TransactionQuery {
        pub account_id: Option<Uuid>,
        pub life_category: Option<String>,
        pub category: Option<String>,
        pub from: Option<NaiveDate>,
        pub to: Option<NaiveDate>,
        pub limit: Option<u64>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionView {
        pub id: Uuid,
        pub account_id: Uuid,
        pub amount_minor: i64,
        pub description: String,
        pub category: String,
        pub subcategory: Option<String>,
        pub life_category: String,
        pub date: NaiveDate,
        pub recurrence: Option<String>,
        pub notes: Option<String>,
    }
}

pub mod goal {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct GoalUpsert {
        pub id: Option<Uuid>,
        pub title: String,
        pub description: Option<String>,
        pub life_category: String,
        pub target_minor: i64,
        pub current_minor: Option<i64>,
        pub target_date: Option<NaiveDate>,
        pub priority: Option<String>,
        pub status: Option<String>,
        pub metric: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct GoalProgress {
        pub current_minor: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct GoalStatusUpdate {
        pub status: String,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct GoalQuery {
        pub life_category: Option<String>,
        pub status: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PaceView {
        pub days_remaining: i64,
        pub remaining_minor: i64,
        pub daily_minor: i64,
        pub monthly_minor: i64,
        pub overdue: bool,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct GoalView {
        pub id: Uuid,
        pub title: String,
        pub description: Option<String>,
        pub life_category: String,
        pub target_minor: i64,
        pub current_minor: i64,
        pub target_date: Option<NaiveDate>,
        pub priority: String,
        pub status: String,
        pub metric: String,
        pub progress_pct: f64,
        pub on_track: Option<bool>,
        pub pace: Option<PaceView>,
    }
}

pub mod revenue {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct RevenueNew {
        pub amount_minor: i64,
        pub description: Option<String>,
        /// `tech_business` (default) or `brand_business`.
        pub business_line: Option<String>,
        pub client: Option<String>,
        pub date: Option<NaiveDate>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct RevenueToday {
        pub date: NaiveDate,
        pub total_minor: i64,
        pub target_minor: Option<i64>,
        pub progress_pct: Option<f64>,
    }
}

pub mod networth {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct NetWorthView {
        pub as_of: NaiveDate,
        pub net_worth_minor: i64,
        pub currency: String,
        pub active_accounts: usize,
    }

    /// Sets the balance of one account so net worth reflects reality.
    ///
    /// Without `account_id` the primary personal account is adjusted.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct NetWorthUpdate {
        pub balance_minor: i64,
        pub account_id: Option<Uuid>,
        pub note: Option<String>,
    }
}

pub mod briefing {
    use super::*;

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct BriefingQuery {
        /// `daily` (default), `progress` or `business`.
        pub kind: Option<String>,
        pub project: Option<String>,
        /// Regenerate even when today's daily briefing is already on disk.
        #[serde(default)]
        pub refresh: bool,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BriefingView {
        pub kind: String,
        pub text: String,
        /// `generated`, `fallback` or `stored`.
        pub source: String,
        pub fallback_reason: Option<String>,
        pub generated_at: DateTime<Utc>,
    }
}

pub mod analytics {
    use super::*;
    use crate::goal::GoalView;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ProgressAnalytics {
        pub as_of: NaiveDate,
        pub net_worth_minor: i64,
        pub primary: Option<GoalView>,
        pub goals: Vec<GoalView>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BusinessAnalytics {
        pub as_of: NaiveDate,
        pub today_minor: i64,
        pub month_to_date_minor: i64,
        pub daily_target_minor: Option<i64>,
        pub monthly_target_minor: Option<i64>,
        pub daily_progress_pct: Option<f64>,
        pub monthly_progress_pct: Option<f64>,
    }
}

pub mod status {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct Health {
        pub status: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct StatusView {
        pub status: String,
        pub version: String,
        pub database: bool,
        pub accounts: usize,
        pub active_goals: usize,
        pub generation_configured: bool,
        pub relay_connections: usize,
    }
}

pub mod command;
pub mod relay;
