//! Periodic agent: daily briefing, milestone alerts and revenue checks.
//!
//! The loop wakes every `interval_secs`, works out which tasks are due for
//! the local time and runs them. A task that fails is logged and stays due,
//! so the next wake-up retries it.

use std::{collections::HashMap, future::Future, path::PathBuf, time::Duration};

use api_types::relay::RelayResponse;
use chrono::{NaiveDate, NaiveDateTime, Timelike, Utc};
use ledger::{GoalMetric, LedgerError, Money};
use narrative::{BriefingContext, BriefingKind};
use serde::Deserialize;
use server::ServerState;
use uuid::Uuid;

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    pub enabled: bool,
    pub interval_secs: u64,
    /// Local hour from which the daily briefing is written.
    pub briefing_hour: u32,
    pub briefings_dir: PathBuf,
    /// Local hours at which today's revenue is compared with the floor.
    pub revenue_check_hours: Vec<u32>,
    pub revenue_floor_minor: i64,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_secs: 300,
            briefing_hour: 8,
            briefings_dir: PathBuf::from("briefings"),
            revenue_check_hours: vec![9, 13, 17],
            revenue_floor_minor: 100_000,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error("could not write briefing: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Task {
    DailyBriefing,
    MilestoneCheck,
    RevenueCheck,
}

/// What has already run, keyed by local date and hour.
#[derive(Debug, Default)]
pub struct Schedule {
    last_briefing: Option<NaiveDate>,
    last_milestone_check: Option<(NaiveDate, u32)>,
    last_revenue_check: Option<(NaiveDate, u32)>,
}

impl Schedule {
    fn mark(&mut self, task: Task, now: NaiveDateTime) {
        let slot = (now.date(), now.hour());
        match task {
            Task::DailyBriefing => self.last_briefing = Some(now.date()),
            Task::MilestoneCheck => self.last_milestone_check = Some(slot),
            Task::RevenueCheck => self.last_revenue_check = Some(slot),
        }
    }
}

/// Tasks due at local time `now`.
pub fn due_tasks(config: &AgentConfig, schedule: &Schedule, now: NaiveDateTime) -> Vec<Task> {
    let slot = (now.date(), now.hour());
    let mut due = Vec::new();

    if now.hour() >= config.briefing_hour && schedule.last_briefing != Some(now.date()) {
        due.push(Task::DailyBriefing);
    }
    if schedule.last_milestone_check != Some(slot) {
        due.push(Task::MilestoneCheck);
    }
    if config.revenue_check_hours.contains(&now.hour()) && schedule.last_revenue_check != Some(slot)
    {
        due.push(Task::RevenueCheck);
    }

    due
}

pub struct Agent {
    state: ServerState,
    config: AgentConfig,
    schedule: Schedule,
    /// Highest milestone announced per goal.
    milestones: HashMap<Uuid, u8>,
}

impl Agent {
    pub fn new(state: ServerState, config: AgentConfig) -> Self {
        Self {
            state,
            config,
            schedule: Schedule::default(),
            milestones: HashMap::new(),
        }
    }

    pub async fn run<F>(mut self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        let period = Duration::from_secs(self.config.interval_secs.max(1));
        let mut interval = tokio::time::interval(period);
        tokio::pin!(shutdown);

        tracing::info!(every = ?period, "agent started");
        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                _ = interval.tick() => {
                    let now = Utc::now().with_timezone(&self.state.tz).naive_local();
                    self.tick(now).await;
                }
            }
        }
        tracing::info!("agent stopped");
    }

    /// Runs every task due at `now` and returns the ones that succeeded.
    pub async fn tick(&mut self, now: NaiveDateTime) -> Vec<Task> {
        let mut done = Vec::new();
        for task in due_tasks(&self.config, &self.schedule, now) {
            let result = match task {
                Task::DailyBriefing => self.daily_briefing(now.date()).await.map(|_| ()),
                Task::MilestoneCheck => self.check_milestones().await.map(|_| ()).map_err(AgentError::from),
                Task::RevenueCheck => self.check_revenue().await.map(|_| ()).map_err(AgentError::from),
            };
            match result {
                Ok(()) => {
                    self.schedule.mark(task, now);
                    done.push(task);
                }
                Err(err) => tracing::error!(?task, "agent task failed: {err}"),
            }
        }
        done
    }

    /// Writes `briefing_YYYY-MM-DD.md` and pushes it to connected dashboards.
    pub async fn daily_briefing(&self, date: NaiveDate) -> Result<PathBuf, AgentError> {
        let report = self.state.report().await?;
        let briefing = self
            .state
            .narrator
            .compose(BriefingKind::Daily, &report, BriefingContext::default())
            .await;

        tokio::fs::create_dir_all(&self.config.briefings_dir).await?;
        let path = server::briefing_path(&self.config.briefings_dir, date);
        tokio::fs::write(&path, &briefing.text).await?;

        let delivered = self.state.publish(RelayResponse::DailyBriefing {
            date,
            source: briefing.source_label().to_string(),
            briefing: briefing.text,
        });
        tracing::info!(path = %path.display(), delivered, "daily briefing written");
        Ok(path)
    }

    /// Announces 25% milestones newly reached by net worth goals. Returns
    /// `(goal title, percent)` for each announcement.
    pub async fn check_milestones(&mut self) -> Result<Vec<(String, u8)>, LedgerError> {
        let report = self.state.report().await?;
        let mut reached = Vec::new();

        for metrics in report.active_goals() {
            if metrics.goal.metric != GoalMetric::NetWorth {
                continue;
            }
            let seen = self.milestones.entry(metrics.goal.id).or_insert(0);
            for milestone in (*seen + 1)..=metrics.milestone {
                let pct = milestone * 25;
                tracing::info!(
                    goal = %metrics.goal.title,
                    net_worth = %metrics.goal.current_amount.format(report.currency),
                    "milestone reached: {pct}%"
                );
                reached.push((metrics.goal.title.clone(), pct));
            }
            *seen = (*seen).max(metrics.milestone);
        }

        Ok(reached)
    }

    /// Warns when today's revenue is under the floor. Returns the shortfall.
    pub async fn check_revenue(&self) -> Result<Option<Money>, LedgerError> {
        let report = self.state.report().await?;
        let floor = Money::new(self.config.revenue_floor_minor);
        let today = report.business.today;

        if today >= floor {
            tracing::debug!(today = %today.format(report.currency), "revenue on track");
            return Ok(None);
        }

        let shortfall = floor - today;
        tracing::warn!(
            today = %today.format(report.currency),
            floor = %floor.format(report.currency),
            "revenue below floor, {} to go",
            shortfall.format(report.currency)
        );
        Ok(Some(shortfall))
    }
}
