use crate::config::OrgPolicy;
use crate::error::Result;
use crate::github::RepositorySource;
use crate::models::PullRequest;

/// Replacement token for private repository names in automated runs.
pub const PRIVATE_REPO_SENTINEL: &str = "private-repo";

/// Masks a repository identifier before it reaches any user-facing output:
/// detail records, repository sets, progress labels, log lines. Missing one
/// call site is a privacy leak, so callers mask once, early, and pass the
/// masked name downstream.
pub fn mask(repo_name: &str, is_private: bool, automated_context: bool) -> String {
    if automated_context && is_private {
        PRIVATE_REPO_SENTINEL.to_string()
    } else {
        repo_name.to_string()
    }
}

/// One (owner, repository) pair to scan. `narrow_to_user` is set for
/// organization repositories, where only pull requests involving the
/// analyzed user are in scope.
#[derive(Debug, Clone)]
pub struct ScopeUnit {
    pub owner: String,
    pub repo: String,
    pub is_private: bool,
    pub narrow_to_user: bool,
}

/// Expands the requested scope into concrete (owner, repo) pairs.
///
/// With an explicit repository the scope is exactly that pair. Otherwise it
/// is every repository owned by the user plus the repositories of each
/// organization the user belongs to, filtered through the skip/include
/// policy. A failed organization listing is logged and skipped; the scan
/// continues.
pub async fn resolve_scope<S: RepositorySource>(
    source: &S,
    owner: &str,
    explicit_repo: Option<&str>,
    policy: &OrgPolicy,
) -> Result<Vec<ScopeUnit>> {
    if let Some(repo) = explicit_repo {
        // The list endpoint carries the visibility flag; when the lookup
        // misses we assume private so masking errs toward hiding.
        let is_private = match source.list_repositories(owner).await {
            Ok(repos) => repos
                .iter()
                .find(|r| r.name.eq_ignore_ascii_case(repo))
                .map(|r| r.private)
                .unwrap_or(true),
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => {
                // The repo is about to be treated as private; naming it here
                // would leak the very identifier masking protects.
                tracing::warn!("Could not determine visibility of a repository of {}: {}", owner, e);
                true
            }
        };
        return Ok(vec![ScopeUnit {
            owner: owner.to_string(),
            repo: repo.to_string(),
            is_private,
            narrow_to_user: false,
        }]);
    }

    let mut units = Vec::new();

    for repo in source.list_repositories(owner).await? {
        units.push(ScopeUnit {
            owner: owner.to_string(),
            repo: repo.name,
            is_private: repo.private,
            narrow_to_user: false,
        });
    }

    let orgs = source.list_organizations().await?;
    tracing::info!("User belongs to {} organizations", orgs.len());

    for org in orgs {
        if policy.is_skipped(&org.login) {
            tracing::info!("Skipping organization {} per filter config", org.login);
            continue;
        }

        let repos = match source.list_organization_repositories(&org.login).await {
            Ok(repos) => repos,
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => {
                tracing::warn!("Could not fetch repositories for {}: {}", org.login, e);
                continue;
            }
        };

        for repo in repos {
            if !policy.includes_repo(&org.login, &repo.name) {
                continue;
            }
            units.push(ScopeUnit {
                owner: org.login.clone(),
                repo: repo.name,
                is_private: repo.private,
                narrow_to_user: true,
            });
        }
    }

    Ok(units)
}

/// Whether the analyzed user is author, assignee, or requested reviewer.
pub fn involves_user(pr: &PullRequest, user: &str) -> bool {
    pr.user.login.eq_ignore_ascii_case(user)
        || pr
            .assignees
            .iter()
            .any(|a| a.login.eq_ignore_ascii_case(user))
        || pr
            .requested_reviewers
            .iter()
            .any(|a| a.login.eq_ignore_ascii_case(user))
}
