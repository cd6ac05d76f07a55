use crate::models::AnalysisResult;
use crate::report::markdown::sorted_week_keys;

/// Flat tabular form: one row per week, chronological order.
pub fn render_csv(result: &AnalysisResult) -> String {
    let mut out = String::new();
    out.push_str(
        "Week,Total PRs,Copilot Assisted PRs,Copilot Percentage,Dependabot PRs,Dependabot Percentage,Unique Collaborators,Collaborators\n",
    );

    for key in sorted_week_keys(&result.weekly_analysis) {
        let week = &result.weekly_analysis[key];
        let collaborators = week.collaborators.join(", ");
        out.push_str(&format!(
            "{},{},{},{:.2},{},{:.2},{},{}\n",
            key,
            week.total_prs,
            week.copilot_assisted_prs,
            week.copilot_percentage,
            week.dependabot_prs,
            week.dependabot_percentage,
            week.unique_collaborators,
            escape(&collaborators),
        ));
    }

    out
}

fn escape(field: &str) -> String {
    if field.contains(',') || field.contains('"') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::WeekSummary;
    use chrono::Utc;
    use std::collections::BTreeMap;

    #[test]
    fn test_csv_rows_and_quoting() {
        let mut weekly = BTreeMap::new();
        weekly.insert(
            "2025-W01".to_string(),
            WeekSummary {
                total_prs: 4,
                copilot_assisted_prs: 1,
                copilot_review_prs: 1,
                copilot_agent_prs: 0,
                copilot_percentage: 25.0,
                dependabot_prs: 0,
                dependabot_percentage: 0.0,
                unique_collaborators: 2,
                collaborators: vec!["alice".to_string(), "bob".to_string()],
                repositories: vec!["tool".to_string()],
                pull_requests: Vec::new(),
            },
        );

        let result = AnalysisResult {
            analysis_date: Utc::now(),
            period_start: Utc::now(),
            period_end: Utc::now(),
            analyzed_user: "alice".to_string(),
            analyzed_repository: "tool".to_string(),
            total_prs: 4,
            total_copilot_prs: 1,
            total_dependabot_prs: 0,
            weekly_analysis: weekly,
            repository_privacy: BTreeMap::new(),
        };

        let csv = render_csv(&result);
        let mut lines = csv.lines();
        assert!(lines.next().unwrap().starts_with("Week,Total PRs"));
        assert_eq!(
            lines.next().unwrap(),
            "2025-W01,4,1,25.00,0,0.00,2,\"alice, bob\""
        );
    }
}
