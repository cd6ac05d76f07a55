use std::collections::BTreeMap;

use crate::models::{AnalysisResult, WeekSummary};

/// Splits a `YYYY-Wnn` key into (year, week) for chronological sorting.
pub fn parse_week_key(key: &str) -> Option<(i32, u32)> {
    let (year, week) = key.split_once("-W")?;
    Some((year.parse().ok()?, week.parse().ok()?))
}

/// Week keys sorted chronologically by parsed (year, week), not lexically.
pub fn sorted_week_keys(weekly: &BTreeMap<String, WeekSummary>) -> Vec<&str> {
    let mut keys: Vec<&str> = weekly.keys().map(|k| k.as_str()).collect();
    keys.sort_by_key(|k| parse_week_key(k).unwrap_or((0, 0)));
    keys
}

/// Renders the full markdown step summary: overview stats, mermaid trend and
/// percentage charts, repository breakdown, and the weekly table. Repository
/// names in `result` are already privacy-masked.
pub fn render_summary(result: &AnalysisResult) -> String {
    let mut out = String::new();

    out.push_str(&render_overview(result));
    out.push_str("\n\n## 📈 Pull Request Trends\n\n");
    out.push_str(&render_trend_chart(&result.weekly_analysis));
    out.push_str("\n\n## 🤖 GitHub Copilot Usage Trends\n\n");
    out.push_str(&render_percentage_chart(&result.weekly_analysis));

    if result.analyzed_repository == "all_repositories" {
        out.push_str("\n\n## 📚 Repository Activity Breakdown\n\n");
        out.push_str(&render_repository_chart(result));
    }

    out.push_str("\n\n## 🗓 Weekly Breakdown\n\n");
    out.push_str(&render_weekly_table(&result.weekly_analysis));
    out.push('\n');

    out
}

fn render_overview(result: &AnalysisResult) -> String {
    let mut out = String::new();
    out.push_str("## 📊 Analysis Summary\n\n");
    out.push_str(&format!(
        "**Analysis Period:** {} to {}\n",
        result.period_start.format("%Y-%m-%d"),
        result.period_end.format("%Y-%m-%d")
    ));
    out.push_str(&format!("**Analyzed User:** {}\n", result.analyzed_user));
    out.push_str(&format!("**Scope:** {}\n\n", result.analyzed_repository));
    out.push_str(&format!("- **Total PRs:** {}\n", result.total_prs));
    out.push_str(&format!(
        "- **Copilot-Assisted PRs:** {}\n",
        result.total_copilot_prs
    ));
    out.push_str(&format!(
        "- **Dependency-Bot PRs:** {}\n",
        result.total_dependabot_prs
    ));

    if result.total_prs > 0 {
        let overall = 100.0 * result.total_copilot_prs as f64 / result.total_prs as f64;
        out.push_str(&format!("- **Overall Copilot Usage:** {:.1}%\n", overall));
    } else {
        out.push_str("- **Overall Copilot Usage:** 0%\n");
    }

    out
}

fn render_trend_chart(weekly: &BTreeMap<String, WeekSummary>) -> String {
    if weekly.is_empty() {
        return "No data available for trend chart".to_string();
    }

    let keys = sorted_week_keys(weekly);
    let max_total = weekly.values().map(|w| w.total_prs).max().unwrap_or(0);

    let mut lines = Vec::new();
    lines.push("```mermaid".to_string());
    lines.push("xychart-beta".to_string());
    lines.push("    title \"Pull Request Trends Over Time\"".to_string());
    lines.push(format!("    x-axis [{}]", quoted_list(&keys)));
    lines.push(format!("    y-axis \"Number of PRs\" 0 --> {}", max_total + 5));
    lines.push(format!(
        "    line \"Total PRs\" [{}]",
        number_list(&keys, weekly, |w| w.total_prs)
    ));
    lines.push(format!(
        "    line \"Copilot-Assisted PRs\" [{}]",
        number_list(&keys, weekly, |w| w.copilot_assisted_prs)
    ));
    lines.push(format!(
        "    line \"Dependency-Bot PRs\" [{}]",
        number_list(&keys, weekly, |w| w.dependabot_prs)
    ));
    lines.push("```".to_string());
    lines.join("\n")
}

fn render_percentage_chart(weekly: &BTreeMap<String, WeekSummary>) -> String {
    if weekly.is_empty() {
        return "No data available for percentage chart".to_string();
    }

    let keys = sorted_week_keys(weekly);

    let mut lines = Vec::new();
    lines.push("```mermaid".to_string());
    lines.push("xychart-beta".to_string());
    lines.push("    title \"Copilot and Dependency-Bot Share Over Time\"".to_string());
    lines.push(format!("    x-axis [{}]", quoted_list(&keys)));
    lines.push("    y-axis \"Percentage (%)\" 0 --> 100".to_string());

    let copilot: Vec<String> = keys
        .iter()
        .map(|k| format!("{}", weekly[*k].copilot_percentage))
        .collect();
    lines.push(format!("    line \"Copilot Usage %\" [{}]", copilot.join(", ")));

    let dependabot: Vec<String> = keys
        .iter()
        .map(|k| format!("{}", weekly[*k].dependabot_percentage))
        .collect();
    lines.push(format!(
        "    line \"Dependency-Bot %\" [{}]",
        dependabot.join(", ")
    ));

    lines.push("```".to_string());
    lines.join("\n")
}

/// Top repositories by PR count. Private repositories (per the privacy
/// lookup) are collapsed into one aggregate entry so the chart never names
/// them individually.
fn render_repository_chart(result: &AnalysisResult) -> String {
    let mut counts: BTreeMap<&str, u32> = BTreeMap::new();
    for week in result.weekly_analysis.values() {
        for pr in &week.pull_requests {
            *counts.entry(pr.repository.as_str()).or_default() += 1;
        }
    }

    if counts.is_empty() {
        return "No repository data available".to_string();
    }

    let mut public: Vec<(String, u32)> = Vec::new();
    let mut private_repos = 0u32;
    let mut private_prs = 0u32;

    for (name, count) in counts {
        if result.repository_privacy.get(name).copied().unwrap_or(false) {
            private_repos += 1;
            private_prs += count;
        } else {
            public.push((name.to_string(), count));
        }
    }

    if private_repos > 0 {
        public.push((format!("Private Repositories ({})", private_repos), private_prs));
    }

    public.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    public.truncate(10);

    let max_count = public.iter().map(|(_, c)| *c).max().unwrap_or(0);
    let names: Vec<&str> = public.iter().map(|(n, _)| n.as_str()).collect();
    let counts: Vec<String> = public.iter().map(|(_, c)| c.to_string()).collect();

    let mut lines = Vec::new();
    lines.push("```mermaid".to_string());
    lines.push("xychart-beta".to_string());
    lines.push("    title \"Top Repositories by PR Count (Last 3 Months)\"".to_string());
    lines.push(format!("    x-axis [{}]", quoted_list(&names)));
    lines.push(format!("    y-axis \"Number of PRs\" 0 --> {}", max_count + 5));
    lines.push(format!("    bar [{}]", counts.join(", ")));
    lines.push("```".to_string());
    lines.join("\n")
}

fn render_weekly_table(weekly: &BTreeMap<String, WeekSummary>) -> String {
    let mut out = String::new();
    out.push_str(
        "| Week | Total | Assisted | Review | Agent | Copilot % | Dep-Bot | Dep-Bot % | Collaborators |\n",
    );
    out.push_str(
        "|------|-------|----------|--------|-------|-----------|---------|-----------|---------------|\n",
    );

    for key in sorted_week_keys(weekly) {
        let w = &weekly[key];
        out.push_str(&format!(
            "| {} | {} | {} | {} | {} | {}% | {} | {}% | {} |\n",
            key,
            w.total_prs,
            w.copilot_assisted_prs,
            w.copilot_review_prs,
            w.copilot_agent_prs,
            w.copilot_percentage,
            w.dependabot_prs,
            w.dependabot_percentage,
            w.unique_collaborators,
        ));
    }

    out
}

fn quoted_list(items: &[&str]) -> String {
    items
        .iter()
        .map(|i| format!("\"{}\"", i))
        .collect::<Vec<_>>()
        .join(", ")
}

fn number_list(
    keys: &[&str],
    weekly: &BTreeMap<String, WeekSummary>,
    pick: impl Fn(&WeekSummary) -> u32,
) -> String {
    keys.iter()
        .map(|k| pick(&weekly[*k]).to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn summary(total: u32, assisted: u32, dependabot: u32) -> WeekSummary {
        WeekSummary {
            total_prs: total,
            copilot_assisted_prs: assisted,
            copilot_review_prs: assisted,
            copilot_agent_prs: 0,
            copilot_percentage: 0.0,
            dependabot_prs: dependabot,
            dependabot_percentage: 0.0,
            unique_collaborators: 1,
            collaborators: vec!["alice".to_string()],
            repositories: vec!["tool".to_string()],
            pull_requests: Vec::new(),
        }
    }

    fn result_with(weekly: BTreeMap<String, WeekSummary>) -> AnalysisResult {
        AnalysisResult {
            analysis_date: Utc::now(),
            period_start: Utc::now(),
            period_end: Utc::now(),
            analyzed_user: "alice".to_string(),
            analyzed_repository: "all_repositories".to_string(),
            total_prs: weekly.values().map(|w| w.total_prs).sum(),
            total_copilot_prs: weekly.values().map(|w| w.copilot_assisted_prs).sum(),
            total_dependabot_prs: weekly.values().map(|w| w.dependabot_prs).sum(),
            weekly_analysis: weekly,
            repository_privacy: BTreeMap::new(),
        }
    }

    #[test]
    fn test_parse_week_key() {
        assert_eq!(parse_week_key("2025-W07"), Some((2025, 7)));
        assert_eq!(parse_week_key("2024-W52"), Some((2024, 52)));
        assert_eq!(parse_week_key("garbage"), None);
    }

    #[test]
    fn test_weeks_sort_chronologically() {
        let mut weekly = BTreeMap::new();
        weekly.insert("2025-W02".to_string(), summary(1, 0, 0));
        weekly.insert("2024-W52".to_string(), summary(1, 0, 0));
        weekly.insert("2025-W10".to_string(), summary(1, 0, 0));

        let keys = sorted_week_keys(&weekly);
        assert_eq!(keys, vec!["2024-W52", "2025-W02", "2025-W10"]);
    }

    #[test]
    fn test_trend_chart_has_all_series() {
        let mut weekly = BTreeMap::new();
        weekly.insert("2025-W01".to_string(), summary(5, 2, 1));

        let chart = render_trend_chart(&weekly);
        assert!(chart.contains("xychart-beta"));
        assert!(chart.contains("line \"Total PRs\" [5]"));
        assert!(chart.contains("line \"Copilot-Assisted PRs\" [2]"));
        assert!(chart.contains("line \"Dependency-Bot PRs\" [1]"));
    }

    #[test]
    fn test_empty_weeks_render_placeholder() {
        let weekly = BTreeMap::new();
        assert!(render_trend_chart(&weekly).contains("No data"));
        assert!(render_percentage_chart(&weekly).contains("No data"));
    }

    #[test]
    fn test_private_repos_aggregated_in_breakdown() {
        let mut week = summary(2, 0, 0);
        week.pull_requests = vec![
            crate::models::PrDetail {
                number: 1,
                title: "a".to_string(),
                author: "alice".to_string(),
                repository: "private-repo".to_string(),
                created_at: Utc::now(),
                copilot_assisted: crate::models::Assistance::None,
                dependabot: false,
                url: String::new(),
            },
            crate::models::PrDetail {
                number: 2,
                title: "b".to_string(),
                author: "alice".to_string(),
                repository: "public-tool".to_string(),
                created_at: Utc::now(),
                copilot_assisted: crate::models::Assistance::None,
                dependabot: false,
                url: String::new(),
            },
        ];
        let mut weekly = BTreeMap::new();
        weekly.insert("2025-W01".to_string(), week);

        let mut result = result_with(weekly);
        result
            .repository_privacy
            .insert("private-repo".to_string(), true);
        result
            .repository_privacy
            .insert("public-tool".to_string(), false);

        let chart = render_summary(&result);
        assert!(chart.contains("Private Repositories (1)"));
        assert!(chart.contains("public-tool"));
    }
}
