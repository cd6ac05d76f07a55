pub mod cache;
pub mod client;
pub mod paginator;
pub mod rate_limiter;

pub use cache::ResponseCache;
pub use client::GitHubClient;
pub use paginator::Paginator;
pub use rate_limiter::RateLimiter;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::models::{Organization, PrCommit, PullRequest, Repository, Review};

/// The fetch contract the analysis core depends on. `GitHubClient` is the
/// production implementation; tests substitute an in-memory fake.
#[async_trait]
pub trait RepositorySource {
    async fn list_repositories(&self, owner: &str) -> Result<Vec<Repository>>;

    async fn list_organizations(&self) -> Result<Vec<Organization>>;

    async fn list_organization_repositories(&self, org: &str) -> Result<Vec<Repository>>;

    /// Only pull requests created at or after `since` are returned. The
    /// filter is applied after fetching because the list endpoint orders by
    /// update time, not creation time.
    async fn list_pull_requests(
        &self,
        owner: &str,
        repo: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<PullRequest>>;

    async fn list_reviews(&self, owner: &str, repo: &str, number: u64) -> Result<Vec<Review>>;

    async fn list_commits(&self, owner: &str, repo: &str, number: u64) -> Result<Vec<PrCommit>>;
}
