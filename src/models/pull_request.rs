use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub login: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Repository {
    pub name: String,
    #[serde(default)]
    pub private: bool,
    pub owner: Account,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Organization {
    pub login: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PullRequest {
    pub number: u64,
    pub title: String,
    pub body: Option<String>,
    pub user: Account,
    #[serde(default)]
    pub assignees: Vec<Account>,
    #[serde(default)]
    pub requested_reviewers: Vec<Account>,
    pub created_at: DateTime<Utc>,
    pub html_url: String,
    /// Attached at fetch time; the list endpoint does not echo these back.
    #[serde(default)]
    pub repository_name: String,
    #[serde(default)]
    pub repository_owner: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Review {
    pub user: Option<Account>,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub body: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrCommit {
    pub commit: CommitDetails,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitDetails {
    pub message: String,
}
