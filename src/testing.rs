//! In-memory fake of the fetch contract, for exercising the analysis core
//! without network access.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};

use crate::error::{Error, Result};
use crate::github::RepositorySource;
use crate::models::{Account, Organization, PrCommit, PullRequest, Repository, Review};

#[derive(Default)]
pub struct FakeSource {
    pub user_repos: HashMap<String, Vec<Repository>>,
    pub orgs: Vec<Organization>,
    pub org_repos: HashMap<String, Vec<Repository>>,
    /// Keyed by "owner/repo".
    pub prs: HashMap<String, Vec<PullRequest>>,
    pub review_lists: Vec<Review>,
    pub commit_lists: Vec<PrCommit>,
    pub failing_repos: HashSet<String>,
    pub failing_orgs: HashSet<String>,
    pub repo_listing_fails: bool,
    pub reviews_fail: bool,
    pub commits_fail: bool,
    pub auth_fails: bool,
}

impl FakeSource {
    pub fn reviews(mut self, reviews: Vec<Review>) -> Self {
        self.review_lists = reviews;
        self
    }

    pub fn commits(mut self, commits: Vec<PrCommit>) -> Self {
        self.commit_lists = commits;
        self
    }

    pub fn fail_reviews(mut self) -> Self {
        self.reviews_fail = true;
        self
    }

    pub fn fail_commits(mut self) -> Self {
        self.commits_fail = true;
        self
    }

    pub fn fail_auth(mut self) -> Self {
        self.auth_fails = true;
        self
    }

    pub fn with_user_repos(mut self, owner: &str, repos: Vec<Repository>) -> Self {
        self.user_repos.insert(owner.to_string(), repos);
        self
    }

    pub fn with_orgs(mut self, orgs: &[&str]) -> Self {
        self.orgs = orgs
            .iter()
            .map(|o| Organization {
                login: o.to_string(),
            })
            .collect();
        self
    }

    pub fn with_org_repos(mut self, org: &str, repos: Vec<Repository>) -> Self {
        self.org_repos.insert(org.to_string(), repos);
        self
    }

    pub fn with_prs(mut self, owner: &str, repo: &str, prs: Vec<PullRequest>) -> Self {
        self.prs.insert(format!("{}/{}", owner, repo), prs);
        self
    }

    pub fn fail_repo(mut self, owner: &str, repo: &str) -> Self {
        self.failing_repos.insert(format!("{}/{}", owner, repo));
        self
    }

    pub fn fail_repo_listing(mut self) -> Self {
        self.repo_listing_fails = true;
        self
    }
}

#[async_trait]
impl RepositorySource for FakeSource {
    async fn list_repositories(&self, owner: &str) -> Result<Vec<Repository>> {
        if self.repo_listing_fails {
            return Err(Error::GitHubApi("repository listing unavailable".to_string()));
        }
        Ok(self.user_repos.get(owner).cloned().unwrap_or_default())
    }

    async fn list_organizations(&self) -> Result<Vec<Organization>> {
        Ok(self.orgs.clone())
    }

    async fn list_organization_repositories(&self, org: &str) -> Result<Vec<Repository>> {
        if self.failing_orgs.contains(org) {
            return Err(Error::GitHubApi(format!("org {} unavailable", org)));
        }
        Ok(self.org_repos.get(org).cloned().unwrap_or_default())
    }

    async fn list_pull_requests(
        &self,
        owner: &str,
        repo: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<PullRequest>> {
        if self.auth_fails {
            return Err(Error::AuthFailure("bad token".to_string()));
        }
        let key = format!("{}/{}", owner, repo);
        if self.failing_repos.contains(&key) {
            return Err(Error::GitHubApi(format!("repo {} unavailable", key)));
        }
        Ok(self
            .prs
            .get(&key)
            .cloned()
            .unwrap_or_default()
            .into_iter()
            .filter(|pr| pr.created_at >= since)
            .map(|mut pr| {
                pr.repository_name = repo.to_string();
                pr.repository_owner = owner.to_string();
                pr
            })
            .collect())
    }

    async fn list_reviews(&self, _owner: &str, _repo: &str, _number: u64) -> Result<Vec<Review>> {
        if self.auth_fails {
            return Err(Error::AuthFailure("bad token".to_string()));
        }
        if self.reviews_fail {
            return Err(Error::GitHubApi("reviews unavailable".to_string()));
        }
        Ok(self.review_lists.clone())
    }

    async fn list_commits(&self, _owner: &str, _repo: &str, _number: u64) -> Result<Vec<PrCommit>> {
        if self.auth_fails {
            return Err(Error::AuthFailure("bad token".to_string()));
        }
        if self.commits_fail {
            return Err(Error::GitHubApi("commits unavailable".to_string()));
        }
        Ok(self.commit_lists.clone())
    }
}

/// Baseline human-authored pull request; the closure customizes it.
pub fn pr_with(build: impl FnOnce(&mut PullRequest)) -> PullRequest {
    let mut pr = PullRequest {
        number: 1,
        title: "Test PR".to_string(),
        body: Some("Test body".to_string()),
        user: Account {
            login: "human_user".to_string(),
        },
        assignees: Vec::new(),
        requested_reviewers: Vec::new(),
        created_at: Utc.with_ymd_and_hms(2025, 7, 15, 12, 0, 0).unwrap(),
        html_url: "https://github.com/test_owner/test-repo/pull/1".to_string(),
        repository_name: "test-repo".to_string(),
        repository_owner: "test_owner".to_string(),
    };
    build(&mut pr);
    pr
}

pub fn repo(name: &str, owner: &str, private: bool) -> Repository {
    Repository {
        name: name.to_string(),
        private,
        owner: Account {
            login: owner.to_string(),
        },
    }
}
