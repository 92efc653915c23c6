use std::{fmt, str::FromStr};

use ledger::MetricsReport;

/// What a briefing is about.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BriefingKind {
    Daily,
    Progress,
    Business,
    /// Free-form question.
    Query(String),
    /// Commentary on figures pushed by a dashboard, as JSON text.
    MetricsAnalysis(String),
}

impl BriefingKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Progress => "progress",
            Self::Business => "business",
            Self::Query(_) => "query",
            Self::MetricsAnalysis(_) => "metrics_analysis",
        }
    }

    fn max_tokens(&self) -> u32 {
        match self {
            Self::Query(_) | Self::MetricsAnalysis(_) => 4000,
            _ => 2000,
        }
    }
}

impl fmt::Display for BriefingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parses the report kinds that need no payload.
impl FromStr for BriefingKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "daily" => Ok(Self::Daily),
            "progress" => Ok(Self::Progress),
            "business" => Ok(Self::Business),
            other => Err(format!("unknown briefing kind: {other}")),
        }
    }
}

const BRIEFING_SYSTEM: &str = "You are a financial advisor and business strategist for a Cape Town-based \
entrepreneur building wealth through the 43V3R AI startup. Provide actionable, specific advice.";

const QUERY_SYSTEM: &str = "You are an AI assistant integrated with the LIF3 financial management system. \
You have access to real-time figures from the LIF3 ledger, the LIF3 knowledge base and goal tracking.\n\n\
Your role is to help with:\n\
- Financial analysis and insights\n\
- Goal progress tracking\n\
- Business strategy for 43V3R\n\
- Daily financial decision making\n\n\
Respond with actionable insights and specific recommendations based on the current financial status.";

/// One request to the generation service: a system instruction and a single
/// user message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Prompt {
    pub system: String,
    pub user: String,
    pub max_tokens: u32,
}

impl Prompt {
    /// Builds the prompt for `kind`.
    ///
    /// The user message wraps the knowledge and the metrics context in a
    /// `<LIF3_CONTEXT>` block followed by the request. It never exceeds
    /// `max_chars` characters: knowledge is cut first, then the metrics
    /// context, then the request itself.
    pub fn build(
        kind: &BriefingKind,
        report: Option<&MetricsReport>,
        knowledge: Option<&str>,
        max_chars: usize,
    ) -> Self {
        let system = match kind {
            BriefingKind::Query(_) => QUERY_SYSTEM,
            _ => BRIEFING_SYSTEM,
        };
        let request = request_text(kind, report);
        let metrics = report.map(metrics_context).unwrap_or_default();
        let knowledge = knowledge.unwrap_or_default();

        let user = if metrics.is_empty() && knowledge.trim().is_empty() {
            truncate(&request, max_chars)
        } else {
            bounded_user(knowledge, &metrics, &request, max_chars)
        };

        Self {
            system: system.to_string(),
            user,
            max_tokens: kind.max_tokens(),
        }
    }
}

const OPEN: &str = "<LIF3_CONTEXT>\n";
const CLOSE: &str = "\n</LIF3_CONTEXT>\n\n";

fn bounded_user(knowledge: &str, metrics: &str, request: &str, max_chars: usize) -> String {
    let knowledge = knowledge.trim();
    let separator = if knowledge.is_empty() || metrics.is_empty() { "" } else { "\n\n" };
    let overhead = OPEN.len() + CLOSE.len() + separator.len();

    let request_len = request.chars().count();
    let metrics_len = metrics.chars().count();

    let budget = max_chars.saturating_sub(overhead);
    let request_budget = budget.min(request_len);
    let metrics_budget = budget.saturating_sub(request_budget).min(metrics_len);
    let knowledge_budget = budget.saturating_sub(request_budget + metrics_budget);

    let user = format!(
        "{OPEN}{}{separator}{}{CLOSE}{}",
        truncate(knowledge, knowledge_budget),
        truncate(metrics, metrics_budget),
        truncate(request, request_budget),
    );
    truncate(&user, max_chars)
}

fn truncate(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

fn request_text(kind: &BriefingKind, report: Option<&MetricsReport>) -> String {
    let date = report
        .map(|r| r.as_of.format("%A, %d %B %Y").to_string())
        .unwrap_or_else(|| "today".to_string());

    match kind {
        BriefingKind::Daily => format!(
            "Generate a comprehensive daily briefing for {date}. Include:\n\
             1. Executive summary of the financial position\n\
             2. Today's priority actions\n\
             3. 43V3R business recommendations\n\
             4. Financial optimization opportunities\n\
             5. Progress toward the primary goal\n\n\
             Keep it actionable and specific to the figures above."
        ),
        BriefingKind::Progress => format!(
            "Assess progress on every active goal as of {date}. For each goal state \
             whether it is on track, what pace is required and the single most useful next step."
        ),
        BriefingKind::Business => format!(
            "Review 43V3R business performance as of {date}: revenue today and this month \
             against targets, risks, and three concrete actions to grow revenue."
        ),
        BriefingKind::Query(query) => {
            format!("Based on the above LIF3 context, please answer: {query}")
        }
        BriefingKind::MetricsAnalysis(metrics) => format!(
            "Analyze these updated dashboard metrics and provide insights:\n{metrics}\n\n\
             Provide:\n\
             1. Progress assessment\n\
             2. Goal trajectory analysis\n\
             3. Strategic recommendations\n\
             4. Next action items"
        ),
    }
}

/// Plain-text rendering of a metrics report for the prompt context.
pub fn metrics_context(report: &MetricsReport) -> String {
    let cur = report.currency;
    let mut out = format!(
        "# CURRENT LIF3 FINANCIAL STATUS\nAs of: {}\nNet worth: {}\n",
        report.as_of,
        report.net_worth.format(cur)
    );

    out.push_str("\n## Active Goals\n");
    for g in report.active_goals() {
        out.push_str(&format!(
            "- **{}**: {} / {} ({:.1}%)",
            g.goal.title,
            g.goal.current_amount.format(cur),
            g.goal.target_amount.format(cur),
            g.progress_pct
        ));
        if let Some(on_track) = g.on_track {
            out.push_str(if on_track { ", on track" } else { ", behind schedule" });
        }
        if let Some(pace) = g.pace {
            out.push_str(&format!(
                ", needs {}/day ({}/month) over {} days",
                pace.daily.format(cur),
                pace.monthly.format(cur),
                pace.days_remaining.max(0)
            ));
        }
        out.push('\n');
    }

    let b = &report.business;
    out.push_str("\n## 43V3R Business\n");
    out.push_str(&format!("- Revenue today: {}", b.today.format(cur)));
    if let Some(target) = b.daily_target {
        out.push_str(&format!(" / {} target", target.format(cur)));
    }
    out.push_str(&format!("\n- Revenue this month: {}", b.month_to_date.format(cur)));
    if let Some(target) = b.monthly_target {
        out.push_str(&format!(" / {} target", target.format(cur)));
    }
    out.push('\n');

    if !report.recent_transactions.is_empty() {
        out.push_str("\n## Recent Transactions\n");
        for tx in &report.recent_transactions {
            out.push_str(&format!(
                "- {}: {} - {}\n",
                tx.date,
                tx.amount.format(cur),
                tx.description
            ));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::sample_report;

    #[test]
    fn query_prompt_wraps_context() {
        let report = sample_report();
        let prompt = Prompt::build(
            &BriefingKind::Query("Can I afford a laptop?".to_string()),
            Some(&report),
            Some("## Notes\nSaving hard."),
            50_000,
        );

        assert!(prompt.system.contains("LIF3 financial management system"));
        assert!(prompt.user.starts_with("<LIF3_CONTEXT>\n## Notes\nSaving hard.\n\n# CURRENT"));
        assert!(prompt.user.contains("Net worth: R18,000.00"));
        assert!(
            prompt
                .user
                .ends_with("</LIF3_CONTEXT>\n\nBased on the above LIF3 context, please answer: Can I afford a laptop?")
        );
        assert_eq!(prompt.max_tokens, 4000);
    }

    #[test]
    fn bare_query_has_no_context_block() {
        let prompt = Prompt::build(&BriefingKind::Query("hi".to_string()), None, None, 1000);
        assert_eq!(prompt.user, "Based on the above LIF3 context, please answer: hi");
    }

    #[test]
    fn knowledge_is_cut_before_metrics() {
        let report = sample_report();
        let knowledge = "k".repeat(10_000);
        let prompt = Prompt::build(&BriefingKind::Daily, Some(&report), Some(&knowledge), 3_000);

        assert!(prompt.user.chars().count() <= 3_000);
        assert!(prompt.user.contains("# CURRENT LIF3 FINANCIAL STATUS"));
        assert!(prompt.user.contains("Progress toward the primary goal"));
        assert!(prompt.user.contains("kkk"));
        assert_eq!(prompt.max_tokens, 2000);
    }

    #[test]
    fn tiny_budget_still_bounded() {
        let report = sample_report();
        let prompt = Prompt::build(&BriefingKind::Business, Some(&report), Some("abc"), 10);
        assert!(prompt.user.chars().count() <= 10);
    }

    #[test]
    fn parses_report_kinds() {
        assert_eq!("Daily".parse::<BriefingKind>(), Ok(BriefingKind::Daily));
        assert_eq!("business".parse::<BriefingKind>(), Ok(BriefingKind::Business));
        assert!("query".parse::<BriefingKind>().is_err());
    }
}
