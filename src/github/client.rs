use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{header, Client};

use crate::error::Result;
use crate::github::cache::ResponseCache;
use crate::github::paginator::Paginator;
use crate::github::rate_limiter::RateLimiter;
use crate::github::RepositorySource;
use crate::models::{Organization, PrCommit, PullRequest, Repository, Review};

const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(600);

pub struct GitHubClient {
    client: Client,
    rate_limiter: RateLimiter,
    cache: ResponseCache,
    base_url: String,
}

impl GitHubClient {
    pub fn new(token: &str) -> Result<Self> {
        Self::with_cache_ttl(token, DEFAULT_CACHE_TTL)
    }

    pub fn with_cache_ttl(token: &str, cache_ttl: Duration) -> Result<Self> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            header::HeaderValue::from_str(&format!("Bearer {}", token))?,
        );
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(
            "X-GitHub-Api-Version",
            header::HeaderValue::from_static("2022-11-28"),
        );
        headers.insert(
            header::USER_AGENT,
            header::HeaderValue::from_static("pr-insights/0.1"),
        );

        let client = Client::builder().default_headers(headers).build()?;

        Ok(Self {
            client,
            rate_limiter: RateLimiter::new(),
            cache: ResponseCache::new(cache_ttl),
            base_url: "https://api.github.com".to_string(),
        })
    }

    fn paginator(&self) -> Paginator<'_> {
        Paginator::new(&self.client, &self.rate_limiter, &self.cache)
    }
}

#[async_trait]
impl RepositorySource for GitHubClient {
    async fn list_repositories(&self, owner: &str) -> Result<Vec<Repository>> {
        let url = format!("{}/users/{}/repos?type=all&sort=updated", self.base_url, owner);
        tracing::info!("Fetching repositories for: {}", owner);
        self.paginator().fetch_all(&url, 100).await
    }

    async fn list_organizations(&self) -> Result<Vec<Organization>> {
        // Membership of the authenticated user; public-only listings miss
        // concealed memberships.
        let url = format!("{}/user/orgs", self.base_url);
        tracing::info!("Fetching organization memberships");
        self.paginator().fetch_all(&url, 100).await
    }

    async fn list_organization_repositories(&self, org: &str) -> Result<Vec<Repository>> {
        let url = format!("{}/orgs/{}/repos?type=all&sort=updated", self.base_url, org);
        tracing::info!("Fetching repositories for organization: {}", org);
        self.paginator().fetch_all(&url, 100).await
    }

    async fn list_pull_requests(
        &self,
        owner: &str,
        repo: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<PullRequest>> {
        let url = format!(
            "{}/repos/{}/{}/pulls?state=all&sort=updated&direction=desc",
            self.base_url, owner, repo
        );
        tracing::debug!("Fetching pull requests for: {}/{}", owner, repo);

        // Deserialized per item so one malformed pull request (missing
        // timestamp, missing author) is dropped with a warning instead of
        // failing the whole repository.
        let raw: Vec<serde_json::Value> = self.paginator().fetch_all(&url, 100).await?;
        let prs: Vec<PullRequest> = raw
            .into_iter()
            .filter_map(|value| match serde_json::from_value(value) {
                Ok(pr) => Some(pr),
                Err(e) => {
                    tracing::warn!("Skipping malformed pull request in {}/{}: {}", owner, repo, e);
                    None
                }
            })
            .collect();

        Ok(prs
            .into_iter()
            .filter(|pr| pr.created_at >= since)
            .map(|mut pr| {
                pr.repository_name = repo.to_string();
                pr.repository_owner = owner.to_string();
                pr
            })
            .collect())
    }

    async fn list_reviews(&self, owner: &str, repo: &str, number: u64) -> Result<Vec<Review>> {
        let url = format!(
            "{}/repos/{}/{}/pulls/{}/reviews",
            self.base_url, owner, repo, number
        );
        tracing::debug!("Fetching reviews for: {}/{}#{}", owner, repo, number);
        self.paginator().fetch_all(&url, 100).await
    }

    async fn list_commits(&self, owner: &str, repo: &str, number: u64) -> Result<Vec<PrCommit>> {
        let url = format!(
            "{}/repos/{}/{}/pulls/{}/commits",
            self.base_url, owner, repo, number
        );
        tracing::debug!("Fetching commits for: {}/{}#{}", owner, repo, number);
        self.paginator().fetch_all(&url, 100).await
    }
}
