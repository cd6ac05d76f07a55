use std::collections::{HashMap, HashSet};
use std::env;
use std::path::Path;

use crate::error::{Error, Result};

#[derive(Debug, Clone)]
pub struct Config {
    pub github_token: String,
    pub owner: String,
    pub repo: Option<String>,
    pub output_format: String,
    pub analyze_all_repos: bool,
    /// True when running under GitHub Actions; enables privacy masking.
    pub automated_context: bool,
    pub org_filter_file: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let github_token = env::var("GITHUB_TOKEN")
            .map_err(|_| Error::Config("GITHUB_TOKEN environment variable not set".to_string()))?;

        let mut owner = env::var("GITHUB_REPOSITORY_OWNER").unwrap_or_default();
        let mut repo = env::var("GITHUB_REPOSITORY_NAME").ok();

        let analyze_all_repos = env::var("ANALYZE_ALL_REPOS")
            .ok()
            .map(|v| v.to_lowercase() == "true")
            .unwrap_or(true);

        // Under GitHub Actions GITHUB_REPOSITORY carries "owner/repo" for the
        // workflow's own repository; use it as the default scope.
        if let Ok(full_repo) = env::var("GITHUB_REPOSITORY") {
            if let Some((o, r)) = full_repo.split_once('/') {
                owner = o.to_string();
                if !analyze_all_repos {
                    repo = Some(r.to_string());
                }
            }
        }

        let output_format = env::var("OUTPUT_FORMAT").unwrap_or_else(|_| "json".to_string());

        let automated_context = env::var("GITHUB_ACTIONS")
            .map(|v| v.to_lowercase() == "true")
            .unwrap_or(false);

        let org_filter_file = env::var("ORG_FILTER_FILE").ok();

        Ok(Self {
            github_token,
            owner,
            repo,
            output_format,
            analyze_all_repos,
            automated_context,
            org_filter_file,
        })
    }
}

/// Static skip/include policy for organization scanning.
///
/// Entries come one per line: a bare `orgname` excludes the organization
/// entirely; `orgname:include:repo1,repo2` restricts it to the listed
/// repositories. Blank lines and `#` comments are ignored.
#[derive(Debug, Clone, Default)]
pub struct OrgPolicy {
    skipped: HashSet<String>,
    partial: HashMap<String, HashSet<String>>,
}

impl OrgPolicy {
    pub fn parse(input: &str) -> Result<Self> {
        let mut policy = OrgPolicy::default();

        for line in input.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            match line.split_once(':') {
                None => {
                    policy.skipped.insert(line.to_lowercase());
                }
                Some((org, rest)) => {
                    let repos = rest.strip_prefix("include:").ok_or_else(|| {
                        Error::Config(format!("invalid org filter entry: {}", line))
                    })?;
                    let set = repos
                        .split(',')
                        .map(|r| r.trim().to_lowercase())
                        .filter(|r| !r.is_empty())
                        .collect();
                    policy.partial.insert(org.trim().to_lowercase(), set);
                }
            }
        }

        Ok(policy)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    pub fn is_skipped(&self, org: &str) -> bool {
        self.skipped.contains(&org.to_lowercase())
    }

    /// Returns whether a repository of the given organization is in scope.
    pub fn includes_repo(&self, org: &str, repo: &str) -> bool {
        if self.is_skipped(org) {
            return false;
        }
        match self.partial.get(&org.to_lowercase()) {
            Some(included) => included.contains(&repo.to_lowercase()),
            None => true,
        }
    }
}
