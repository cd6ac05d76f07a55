use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// How a pull request was assisted by an AI tool. The categories are
/// mutually exclusive; classification picks exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Assistance {
    None,
    Review,
    Agent,
}

impl Assistance {
    pub fn is_assisted(&self) -> bool {
        !matches!(self, Assistance::None)
    }
}

impl std::fmt::Display for Assistance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Assistance::None => write!(f, "none"),
            Assistance::Review => write!(f, "review"),
            Assistance::Agent => write!(f, "agent"),
        }
    }
}

/// Assistance and dependency-bot origin are orthogonal facets; both are
/// always computed, independently of each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub assistance: Assistance,
    pub dependabot: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrDetail {
    pub number: u64,
    pub title: String,
    pub author: String,
    pub repository: String,
    pub created_at: DateTime<Utc>,
    pub copilot_assisted: Assistance,
    pub dependabot: bool,
    pub url: String,
}

/// Accumulator for one ISO week. Counts are folded incrementally;
/// percentages are derived only at finalization.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct WeekBucket {
    pub total_prs: u32,
    pub copilot_review_prs: u32,
    pub copilot_agent_prs: u32,
    pub dependabot_prs: u32,
    /// Numerator for the copilot percentage: assisted PRs that are not
    /// also dependency-bot PRs.
    pub assisted_non_dependabot_prs: u32,
    pub collaborators: BTreeSet<String>,
    pub repositories: BTreeSet<String>,
    pub pull_requests: Vec<PrDetail>,
}

impl WeekBucket {
    pub fn copilot_assisted_prs(&self) -> u32 {
        self.copilot_review_prs + self.copilot_agent_prs
    }

    pub fn unassisted_prs(&self) -> u32 {
        self.total_prs - self.copilot_assisted_prs()
    }
}

/// Finalized weekly statistics with stable field names for downstream
/// chart and summary tooling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeekSummary {
    pub total_prs: u32,
    pub copilot_assisted_prs: u32,
    pub copilot_review_prs: u32,
    pub copilot_agent_prs: u32,
    pub copilot_percentage: f64,
    pub dependabot_prs: u32,
    pub dependabot_percentage: f64,
    pub unique_collaborators: u32,
    pub collaborators: Vec<String>,
    pub repositories: Vec<String>,
    pub pull_requests: Vec<PrDetail>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub analysis_date: DateTime<Utc>,
    pub period_start: DateTime<Utc>,
    pub period_end: DateTime<Utc>,
    pub analyzed_user: String,
    pub analyzed_repository: String,
    pub total_prs: u32,
    pub total_copilot_prs: u32,
    pub total_dependabot_prs: u32,
    pub weekly_analysis: BTreeMap<String, WeekSummary>,
    /// Masked repository name -> visibility. Keys have already passed
    /// through privacy masking, so this is safe to serialize.
    pub repository_privacy: BTreeMap<String, bool>,
}
