//! Derived figures over a ledger snapshot.
//!
//! Everything here is a pure function of its inputs and an explicit `as_of`
//! date, so the CLI, the HTTP layer, the relay and the briefing agent all see
//! the same numbers for the same snapshot.

use chrono::NaiveDate;
use serde::Serialize;

use crate::{Account, Currency, Goal, GoalMetric, GoalPriority, GoalStatus, Money, Transaction};

/// Average month length used to turn a daily pace into a monthly one.
pub const DAYS_PER_MONTH: f64 = 30.4;

/// Progress milestones are reported every this many percent.
pub const MILESTONE_STEP_PCT: f64 = 25.0;

/// Point-in-time copy of the ledger that metrics are computed from.
#[derive(Clone, Debug, Serialize)]
pub struct LedgerSnapshot {
    pub as_of: NaiveDate,
    pub accounts: Vec<Account>,
    pub goals: Vec<Goal>,
    pub revenue: RevenueTotals,
    pub recent_transactions: Vec<Transaction>,
}

/// Business revenue (income on business lines) around `as_of`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct RevenueTotals {
    pub today: Money,
    pub month_to_date: Money,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct RequiredPace {
    /// Days left until the target date; zero or negative once it has passed.
    pub days_remaining: i64,
    pub remaining: Money,
    pub daily: Money,
    pub monthly: Money,
    pub overdue: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GoalMetrics {
    /// The goal with derived current amounts already resolved.
    pub goal: Goal,
    pub progress_pct: f64,
    pub pace: Option<RequiredPace>,
    pub on_track: Option<bool>,
    /// Number of 25% steps reached, capped at 4.
    pub milestone: u8,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BusinessMetrics {
    pub today: Money,
    pub month_to_date: Money,
    pub daily_target: Option<Money>,
    pub monthly_target: Option<Money>,
    pub daily_progress_pct: Option<f64>,
    pub monthly_progress_pct: Option<f64>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MetricsReport {
    pub as_of: NaiveDate,
    pub currency: Currency,
    pub net_worth: Money,
    pub accounts: Vec<Account>,
    pub goals: Vec<GoalMetrics>,
    pub business: BusinessMetrics,
    pub recent_transactions: Vec<Transaction>,
}

impl MetricsReport {
    pub fn active_goals(&self) -> impl Iterator<Item = &GoalMetrics> {
        self.goals
            .iter()
            .filter(|g| g.goal.status == GoalStatus::Active)
    }

    /// The goal briefings lead with: the active net worth goal if there is
    /// one, otherwise the first active high-priority goal.
    #[must_use]
    pub fn primary_goal(&self) -> Option<&GoalMetrics> {
        self.active_goals()
            .find(|g| g.goal.metric == GoalMetric::NetWorth)
            .or_else(|| {
                self.active_goals()
                    .find(|g| g.goal.priority == GoalPriority::High)
            })
            .or_else(|| self.active_goals().next())
    }
}

/// Sum of balances over active accounts. Debts are negative balances.
#[must_use]
pub fn net_worth(accounts: &[Account]) -> Money {
    accounts
        .iter()
        .filter(|a| a.is_active)
        .map(|a| a.balance)
        .sum()
}

/// `current / target * 100`, or 0 when the target is not positive.
///
/// Not clamped: overshooting a target reports more than 100.
#[must_use]
pub fn goal_progress(current: Money, target: Money) -> f64 {
    if target.minor() <= 0 {
        return 0.0;
    }
    current.minor() as f64 / target.minor() as f64 * 100.0
}

/// What it takes per day and per month to close the gap by `target_date`.
///
/// The divisor is never below one day, so overdue goals ask for the whole
/// remaining amount at once instead of dividing by zero.
#[must_use]
pub fn required_pace(
    current: Money,
    target: Money,
    target_date: Option<NaiveDate>,
    as_of: NaiveDate,
) -> Option<RequiredPace> {
    let target_date = target_date?;
    let days_remaining = (target_date - as_of).num_days();
    let remaining = Money::new(target.minor().saturating_sub(current.minor()).max(0));

    let divisor = days_remaining.max(1);
    let rounds_up = i64::from(remaining.minor() % divisor != 0);
    let daily = Money::new(remaining.minor() / divisor + rounds_up);
    let monthly = Money::new((daily.minor() as f64 * DAYS_PER_MONTH).round() as i64);

    Some(RequiredPace {
        days_remaining,
        remaining,
        daily,
        monthly,
        overdue: days_remaining <= 0,
    })
}

/// Time-proportional check: a goal is on track when the share of the target
/// already reached is at least the share of the time window already elapsed.
///
/// The window runs from `start` (goal creation) to `target_date`. Goals
/// without a target date have no schedule to be on track against.
#[must_use]
pub fn on_track(
    current: Money,
    target: Money,
    start: NaiveDate,
    target_date: Option<NaiveDate>,
    as_of: NaiveDate,
) -> Option<bool> {
    let target_date = target_date?;
    if target.minor() <= 0 {
        return Some(true);
    }

    let window = (target_date - start).num_days();
    let elapsed = if window <= 0 {
        1.0
    } else {
        ((as_of - start).num_days() as f64 / window as f64).clamp(0.0, 1.0)
    };
    let reached = current.minor() as f64 / target.minor() as f64;

    Some(reached >= elapsed)
}

/// Number of 25% milestones covered by `progress_pct`, between 0 and 4.
#[must_use]
pub fn milestone(progress_pct: f64) -> u8 {
    if !progress_pct.is_finite() || progress_pct <= 0.0 {
        return 0;
    }
    (progress_pct / MILESTONE_STEP_PCT).floor().min(4.0) as u8
}

/// Current amount of a goal, reading derived metrics from the ledger figures.
#[must_use]
pub fn resolve_current(goal: &Goal, net_worth: Money, revenue: RevenueTotals) -> Money {
    match goal.metric {
        GoalMetric::Manual => goal.current_amount,
        GoalMetric::NetWorth => net_worth,
        GoalMetric::DailyRevenue => revenue.today,
        GoalMetric::MonthlyRevenue => revenue.month_to_date,
    }
}

#[must_use]
pub fn goal_metrics(goal: &Goal, net_worth: Money, revenue: RevenueTotals, as_of: NaiveDate) -> GoalMetrics {
    let mut goal = goal.clone();
    goal.current_amount = resolve_current(&goal, net_worth, revenue);

    let progress_pct = goal_progress(goal.current_amount, goal.target_amount);
    let pace = required_pace(goal.current_amount, goal.target_amount, goal.target_date, as_of);
    let on_track = on_track(
        goal.current_amount,
        goal.target_amount,
        goal.created_at.date_naive(),
        goal.target_date,
        as_of,
    );

    GoalMetrics {
        milestone: milestone(progress_pct),
        goal,
        progress_pct,
        pace,
        on_track,
    }
}

/// Revenue against the targets of active revenue goals.
#[must_use]
pub fn business_metrics(goals: &[Goal], revenue: RevenueTotals) -> BusinessMetrics {
    let target_for = |metric: GoalMetric| {
        goals
            .iter()
            .find(|g| g.metric == metric && g.status == GoalStatus::Active)
            .map(|g| g.target_amount)
    };
    let daily_target = target_for(GoalMetric::DailyRevenue);
    let monthly_target = target_for(GoalMetric::MonthlyRevenue);

    BusinessMetrics {
        today: revenue.today,
        month_to_date: revenue.month_to_date,
        daily_progress_pct: daily_target.map(|t| goal_progress(revenue.today, t)),
        monthly_progress_pct: monthly_target.map(|t| goal_progress(revenue.month_to_date, t)),
        daily_target,
        monthly_target,
    }
}

/// Computes every derived figure for a snapshot.
#[must_use]
pub fn evaluate(snapshot: &LedgerSnapshot) -> MetricsReport {
    let net_worth = net_worth(&snapshot.accounts);
    let goals = snapshot
        .goals
        .iter()
        .map(|g| goal_metrics(g, net_worth, snapshot.revenue, snapshot.as_of))
        .collect();
    let currency = snapshot
        .accounts
        .first()
        .map(|a| a.currency)
        .unwrap_or_default();

    MetricsReport {
        as_of: snapshot.as_of,
        currency,
        net_worth,
        accounts: snapshot.accounts.clone(),
        goals,
        business: business_metrics(&snapshot.goals, snapshot.revenue),
        recent_transactions: snapshot.recent_transactions.clone(),
    }
}
