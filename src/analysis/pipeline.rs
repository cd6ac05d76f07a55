use std::collections::BTreeMap;

use chrono::{Duration, Utc};
use indicatif::{ProgressBar, ProgressStyle};

use crate::analysis::aggregator::WeeklyAggregator;
use crate::analysis::classifier::classify;
use crate::analysis::scope::{involves_user, mask, resolve_scope};
use crate::config::OrgPolicy;
use crate::error::Result;
use crate::github::RepositorySource;
use crate::models::AnalysisResult;

/// The analysis window: pull requests created in the 90 days before the
/// invocation instant.
const ANALYSIS_WINDOW_DAYS: i64 = 90;

pub struct AnalysisPipeline<S: RepositorySource> {
    source: S,
    policy: OrgPolicy,
    automated_context: bool,
}

impl<S: RepositorySource> AnalysisPipeline<S> {
    pub fn new(source: S, policy: OrgPolicy, automated_context: bool) -> Self {
        Self {
            source,
            policy,
            automated_context,
        }
    }

    /// Runs the whole scan sequentially: resolve scope, list pull requests
    /// per repository, classify each, fold into weekly buckets. One failed
    /// repository never aborts the run; an authentication failure always
    /// does.
    pub async fn run(&self, owner: &str, explicit_repo: Option<&str>) -> Result<AnalysisResult> {
        let period_end = Utc::now();
        let period_start = period_end - Duration::days(ANALYSIS_WINDOW_DAYS);

        tracing::info!(
            "Analyzing pull requests for {} since {}",
            owner,
            period_start.date_naive()
        );

        let units = resolve_scope(&self.source, owner, explicit_repo, &self.policy).await?;
        tracing::info!("Scanning {} repositories", units.len());

        let pb = ProgressBar::new(units.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap()
                .progress_chars("#>-"),
        );

        let mut aggregator = WeeklyAggregator::new();
        let mut repository_privacy = BTreeMap::new();

        for unit in &units {
            let masked = mask(&unit.repo, unit.is_private, self.automated_context);
            pb.set_message(masked.clone());
            repository_privacy.insert(masked.clone(), unit.is_private);

            let prs = match self
                .source
                .list_pull_requests(&unit.owner, &unit.repo, period_start)
                .await
            {
                Ok(prs) => prs,
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => {
                    tracing::warn!("Could not fetch PRs from {}: {}", masked, e);
                    pb.inc(1);
                    continue;
                }
            };

            tracing::info!("Found {} PRs in {}", prs.len(), masked);

            for pr in &prs {
                if unit.narrow_to_user && !involves_user(pr, owner) {
                    continue;
                }
                let classification = classify(pr, &self.source).await?;
                aggregator.fold(pr, classification, &masked);
            }

            pb.inc(1);
        }

        pb.finish_with_message("Scan complete");

        let (total_prs, total_copilot_prs, total_dependabot_prs) = aggregator.grand_totals();
        tracing::info!(
            "Total: {} PRs, {} Copilot-assisted, {} dependency-bot",
            total_prs,
            total_copilot_prs,
            total_dependabot_prs
        );

        Ok(AnalysisResult {
            analysis_date: Utc::now(),
            period_start,
            period_end,
            analyzed_user: owner.to_string(),
            analyzed_repository: explicit_repo
                .map(|r| r.to_string())
                .unwrap_or_else(|| "all_repositories".to_string()),
            total_prs,
            total_copilot_prs,
            total_dependabot_prs,
            weekly_analysis: aggregator.finalize(),
            repository_privacy,
        })
    }
}
