use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, Utc};

use crate::models::{Assistance, Classification, PrDetail, PullRequest, WeekBucket, WeekSummary};

/// ISO-8601 calendar week of the creation instant, formatted `YYYY-Wnn`.
/// ISO week numbering matters at year edges: Dec 31 can land in week 01 of
/// the next year and Jan 1 in week 52/53 of the previous one.
pub fn week_key(instant: DateTime<Utc>) -> String {
    let iso = instant.iso_week();
    format!("{}-W{:02}", iso.year(), iso.week())
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Folds classified pull requests into per-week buckets. Single writer for
/// the whole run; buckets are created on first sight of a week key and only
/// ever mutated by `fold`.
#[derive(Debug, Default)]
pub struct WeeklyAggregator {
    buckets: BTreeMap<String, WeekBucket>,
}

impl WeeklyAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// `masked_repo` must already have passed privacy masking; the
    /// aggregator never sees an unmasked private repository name.
    pub fn fold(&mut self, pr: &PullRequest, classification: Classification, masked_repo: &str) {
        let bucket = self.buckets.entry(week_key(pr.created_at)).or_default();

        bucket.total_prs += 1;
        match classification.assistance {
            Assistance::Review => bucket.copilot_review_prs += 1,
            Assistance::Agent => bucket.copilot_agent_prs += 1,
            Assistance::None => {}
        }
        if classification.dependabot {
            bucket.dependabot_prs += 1;
        }
        if classification.assistance.is_assisted() && !classification.dependabot {
            bucket.assisted_non_dependabot_prs += 1;
        }

        bucket.collaborators.insert(pr.user.login.clone());
        for assignee in &pr.assignees {
            bucket.collaborators.insert(assignee.login.clone());
        }
        bucket.repositories.insert(masked_repo.to_string());

        bucket.pull_requests.push(PrDetail {
            number: pr.number,
            title: pr.title.clone(),
            author: pr.user.login.clone(),
            repository: masked_repo.to_string(),
            created_at: pr.created_at,
            copilot_assisted: classification.assistance,
            dependabot: classification.dependabot,
            url: pr.html_url.clone(),
        });
    }

    pub fn buckets(&self) -> &BTreeMap<String, WeekBucket> {
        &self.buckets
    }

    /// Independent sums across all weeks: (total, assisted, dependabot).
    /// Never derived from per-week percentages, which would compound
    /// rounding error.
    pub fn grand_totals(&self) -> (u32, u32, u32) {
        self.buckets.values().fold((0, 0, 0), |(t, a, d), b| {
            (
                t + b.total_prs,
                a + b.copilot_assisted_prs(),
                d + b.dependabot_prs,
            )
        })
    }

    /// Derives percentages and freezes each bucket. The copilot percentage
    /// excludes dependency-bot PRs from its denominator (they cannot be
    /// AI-assisted); the dependabot percentage runs against the full total.
    pub fn finalize(self) -> BTreeMap<String, WeekSummary> {
        self.buckets
            .into_iter()
            .map(|(key, bucket)| {
                let non_dependabot = bucket.total_prs - bucket.dependabot_prs;
                let copilot_percentage = if non_dependabot > 0 {
                    round2(100.0 * bucket.assisted_non_dependabot_prs as f64 / non_dependabot as f64)
                } else {
                    0.0
                };
                let dependabot_percentage = if bucket.total_prs > 0 {
                    round2(100.0 * bucket.dependabot_prs as f64 / bucket.total_prs as f64)
                } else {
                    0.0
                };

                let summary = WeekSummary {
                    total_prs: bucket.total_prs,
                    copilot_assisted_prs: bucket.copilot_assisted_prs(),
                    copilot_review_prs: bucket.copilot_review_prs,
                    copilot_agent_prs: bucket.copilot_agent_prs,
                    copilot_percentage,
                    dependabot_prs: bucket.dependabot_prs,
                    dependabot_percentage,
                    unique_collaborators: bucket.collaborators.len() as u32,
                    collaborators: bucket.collaborators.into_iter().collect(),
                    repositories: bucket.repositories.into_iter().collect(),
                    pull_requests: bucket.pull_requests,
                };
                (key, summary)
            })
            .collect()
    }
}
