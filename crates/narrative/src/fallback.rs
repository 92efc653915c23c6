//! Deterministic reports used whenever generation is unavailable.
//!
//! Output depends only on the kind and the metrics report.

use ledger::{
    GoalPriority, MetricsReport,
    metrics::{BusinessMetrics, GoalMetrics},
};

use crate::BriefingKind;

pub fn render(kind: &BriefingKind, report: &MetricsReport) -> String {
    match kind {
        BriefingKind::Daily => daily(report),
        BriefingKind::Progress => progress(report),
        BriefingKind::Business => business(report),
        BriefingKind::Query(_) => query(report),
        BriefingKind::MetricsAnalysis(_) => metrics_analysis(report),
    }
}

fn long_date(report: &MetricsReport) -> String {
    report.as_of.format("%A, %d %B %Y").to_string()
}

fn pct(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| format!("{v:.1}%"))
}

fn status_line(goal: &GoalMetrics) -> &'static str {
    match goal.on_track {
        Some(true) => "On track",
        Some(false) => "Behind schedule",
        None => "No deadline set",
    }
}

fn executive_summary(report: &MetricsReport) -> String {
    let cur = report.currency;
    let mut out = String::from("## Executive Summary\n");
    match report.primary_goal() {
        Some(goal) => {
            out.push_str(&format!(
                "**{}**: {} of {} ({:.1}%). {}.\n",
                goal.goal.title,
                goal.goal.current_amount.format(cur),
                goal.goal.target_amount.format(cur),
                goal.progress_pct,
                status_line(goal)
            ));
        }
        None => out.push_str("No active goals. Set one to start tracking progress.\n"),
    }
    out.push_str(&format!("Net worth: {}\n", report.net_worth.format(cur)));
    out
}

fn business_section(report: &MetricsReport) -> String {
    let cur = report.currency;
    let BusinessMetrics {
        today,
        month_to_date,
        daily_target,
        monthly_target,
        daily_progress_pct,
        monthly_progress_pct,
    } = &report.business;

    let target = |t: &Option<ledger::Money>| {
        t.map_or_else(|| "no target".to_string(), |m| format!("{} target", m.format(cur)))
    };

    format!(
        "## 43V3R Business Metrics\n\
         - Today's revenue: {} / {} ({})\n\
         - Month to date: {} / {} ({})\n",
        today.format(cur),
        target(daily_target),
        pct(*daily_progress_pct),
        month_to_date.format(cur),
        target(monthly_target),
        pct(*monthly_progress_pct),
    )
}

fn command_center(report: &MetricsReport) -> String {
    let cur = report.currency;
    let mut out = String::from("## Financial Command Center\n");
    let Some(goal) = report.primary_goal() else {
        out.push_str(&format!("- Current net worth: {}\n", report.net_worth.format(cur)));
        return out;
    };

    out.push_str(&format!(
        "- Current: {}\n- Target: {}\n",
        goal.goal.current_amount.format(cur),
        goal.goal.target_amount.format(cur)
    ));
    match goal.pace {
        Some(pace) => out.push_str(&format!(
            "- Remaining: {}\n- Progress: {:.1}%\n- Monthly growth required: {}\n",
            pace.remaining.format(cur),
            goal.progress_pct,
            pace.monthly.format(cur)
        )),
        None => out.push_str(&format!("- Progress: {:.1}%\n", goal.progress_pct)),
    }
    out
}

fn priorities(report: &MetricsReport) -> String {
    let mut out = String::from("## Today's Priorities\n");
    out.push_str("- [ ] Log today's 43V3R revenue\n");
    if let (Some(target), today) = (report.business.daily_target, report.business.today)
        && today < target
    {
        out.push_str(&format!(
            "- [ ] Close the revenue gap of {}\n",
            ledger::Money::new(target.minor() - today.minor()).format(report.currency)
        ));
    }
    for goal in report
        .active_goals()
        .filter(|g| g.goal.priority == GoalPriority::High)
    {
        out.push_str(&format!("- [ ] Move forward on: {}\n", goal.goal.title));
    }
    out.push_str("- [ ] Review spending against the plan\n");
    out
}

fn progress_analysis(report: &MetricsReport) -> String {
    let mut out = String::from("## Progress Analysis\n");
    match report.primary_goal().and_then(|g| g.pace) {
        Some(pace) if pace.overdue => {
            out.push_str(&format!(
                "- Target date passed {} days ago; {} still to go\n",
                -pace.days_remaining,
                pace.remaining.format(report.currency)
            ));
        }
        Some(pace) => {
            out.push_str(&format!(
                "- Days to goal: {}\n- Daily growth needed: {}\n",
                pace.days_remaining,
                pace.daily.format(report.currency)
            ));
        }
        None => out.push_str("- No target date set for the primary goal\n"),
    }
    out
}

fn goal_lines(report: &MetricsReport) -> String {
    let cur = report.currency;
    let mut out = String::new();
    for goal in report.active_goals() {
        out.push_str(&format!(
            "- **{}** ({}): {} / {} ({:.1}%), milestone {}%, {}",
            goal.goal.title,
            goal.goal.life_category,
            goal.goal.current_amount.format(cur),
            goal.goal.target_amount.format(cur),
            goal.progress_pct,
            u32::from(goal.milestone) * 25,
            status_line(goal).to_lowercase()
        ));
        if let Some(pace) = goal.pace
            && !pace.remaining.is_zero()
        {
            out.push_str(&format!(", {}/month needed", pace.monthly.format(cur)));
        }
        out.push('\n');
    }
    if out.is_empty() {
        out.push_str("- No active goals\n");
    }
    out
}

fn daily(report: &MetricsReport) -> String {
    format!(
        "# LIF3 Daily Command Center - {}\n\n{}\n{}\n{}\n{}\n{}",
        long_date(report),
        executive_summary(report),
        business_section(report),
        command_center(report),
        priorities(report),
        progress_analysis(report),
    )
}

fn progress(report: &MetricsReport) -> String {
    format!(
        "# LIF3 Goal Progress - {}\n\n{}\n## Goals\n{}",
        long_date(report),
        executive_summary(report),
        goal_lines(report),
    )
}

fn business(report: &MetricsReport) -> String {
    format!(
        "# 43V3R Business Report - {}\n\n{}",
        long_date(report),
        business_section(report),
    )
}

fn query(report: &MetricsReport) -> String {
    format!(
        "The assistant is unavailable right now. Current LIF3 position as of {}:\n\n{}\n{}",
        long_date(report),
        executive_summary(report),
        business_section(report),
    )
}

fn metrics_analysis(report: &MetricsReport) -> String {
    format!(
        "# Dashboard Metrics Analysis - {}\n\n{}\n{}\n## Goals\n{}",
        long_date(report),
        executive_summary(report),
        business_section(report),
        goal_lines(report),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::sample_report;

    #[test]
    fn daily_report_covers_every_section() {
        let text = render(&BriefingKind::Daily, &sample_report());

        assert!(text.starts_with("# LIF3 Daily Command Center - Sunday, 18 October 2026\n"));
        for section in [
            "## Executive Summary",
            "## 43V3R Business Metrics",
            "## Financial Command Center",
            "## Today's Priorities",
            "## Progress Analysis",
        ] {
            assert!(text.contains(section), "missing {section}");
        }
        assert!(text.contains("**Net Worth R500K**: R18,000.00 of R500,000.00 (3.6%)"));
        assert!(text.contains("- Today's revenue: R1,000.00 / R4,881.00 target (20.5%)"));
        assert!(text.contains("- [ ] Close the revenue gap of R3,881.00"));
    }

    #[test]
    fn rendering_is_deterministic() {
        let report = sample_report();
        for kind in [
            BriefingKind::Daily,
            BriefingKind::Progress,
            BriefingKind::Business,
            BriefingKind::Query("x".to_string()),
            BriefingKind::MetricsAnalysis("{}".to_string()),
        ] {
            assert_eq!(render(&kind, &report), render(&kind, &report));
        }
    }

    #[test]
    fn progress_lists_active_goals() {
        let text = render(&BriefingKind::Progress, &sample_report());
        assert!(text.contains("- **Net Worth R500K** (personal): R18,000.00 / R500,000.00 (3.6%), milestone 0%"));
        assert!(text.contains("- **43V3R Daily Revenue** (tech_business)"));
    }
}
