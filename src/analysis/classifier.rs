use crate::error::Result;
use crate::github::RepositorySource;
use crate::models::{Assistance, Classification, PullRequest};

/// Login of the Copilot coding agent. Author, requested-reviewer, and
/// assignee checks require this exact login.
const AGENT_LOGIN: &str = "Copilot";

/// Free-text markers of Copilot involvement, matched case-insensitively
/// against titles, bodies, and commit messages.
const COPILOT_KEYWORDS: &[&str] = &[
    "copilot",
    "co-pilot",
    "github copilot",
    "ai-assisted",
    "ai assisted",
];

const DEPENDABOT_LOGINS: &[&str] = &["dependabot", "dependabot[bot]"];

const DEPENDABOT_TITLE_PATTERNS: &[&str] = &[
    "bump ",
    "update ",
    "build(deps)",
    "build(deps-dev)",
    "dependabot",
    "dependency update",
];

/// The signal sources consulted for assistance classification, cheapest
/// first. `ReviewAuthors` and `CommitMessages` suspend on an API fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Signal {
    AuthorLogin,
    RequestedReviewers,
    ReviewAuthors,
    Assignees,
    TitleAndBody,
    CommitMessages,
}

/// Priority-ordered rule list: the first matching signal decides the
/// category and evaluation stops. Identity signals outrank keyword
/// heuristics because exact login matches cannot false-positive on prose
/// that merely discusses Copilot.
const RULES: &[(Signal, Assistance)] = &[
    (Signal::AuthorLogin, Assistance::Agent),
    (Signal::RequestedReviewers, Assistance::Review),
    (Signal::ReviewAuthors, Assistance::Review),
    (Signal::Assignees, Assistance::Agent),
    (Signal::TitleAndBody, Assistance::Agent),
    (Signal::CommitMessages, Assistance::Agent),
];

/// Classifies both facets of a pull request. The facets are independent:
/// a dependency-bot PR still runs through the assistance rules.
pub async fn classify<S: RepositorySource>(pr: &PullRequest, source: &S) -> Result<Classification> {
    Ok(Classification {
        assistance: classify_assistance(pr, source).await?,
        dependabot: classify_dependency_origin(pr),
    })
}

/// Walks the rule list in order and returns the category of the first
/// matching signal. Review and commit fetch failures degrade to "no
/// evidence at this step" and evaluation continues; only fatal errors
/// (auth) propagate.
pub async fn classify_assistance<S: RepositorySource>(
    pr: &PullRequest,
    source: &S,
) -> Result<Assistance> {
    for (signal, category) in RULES {
        let matched = match signal {
            Signal::AuthorLogin => pr.user.login == AGENT_LOGIN,
            Signal::RequestedReviewers => pr
                .requested_reviewers
                .iter()
                .any(|a| a.login == AGENT_LOGIN),
            Signal::ReviewAuthors => fetch_reviews(pr, source)
                .await?
                .iter()
                .filter_map(|r| r.user.as_ref())
                .any(|u| is_copilot_reviewer(&u.login)),
            Signal::Assignees => pr.assignees.iter().any(|a| a.login == AGENT_LOGIN),
            Signal::TitleAndBody => {
                mentions_copilot(&pr.title)
                    || pr.body.as_deref().map(mentions_copilot).unwrap_or(false)
            }
            Signal::CommitMessages => fetch_commits(pr, source)
                .await?
                .iter()
                .any(|c| commit_mentions_copilot(&c.commit.message)),
        };

        if matched {
            return Ok(*category);
        }
    }

    Ok(Assistance::None)
}

/// Pure over already-fetched fields; no network I/O. Generic title words
/// like "update " must be corroborated by a dependabot marker so a human
/// PR titled "Update README" does not count.
pub fn classify_dependency_origin(pr: &PullRequest) -> bool {
    let author = pr.user.login.to_lowercase();
    if DEPENDABOT_LOGINS.contains(&author.as_str()) {
        return true;
    }

    let title = pr.title.to_lowercase();
    let has_pattern = DEPENDABOT_TITLE_PATTERNS.iter().any(|p| title.contains(p));

    has_pattern
        && (DEPENDABOT_LOGINS.contains(&author.as_str()) || title.contains("dependabot"))
}

/// Exact agent login, or any login carrying both "copilot" and "review".
/// The substring form tolerates bot naming variants like
/// `copilot-pull-request-reviewer[bot]` without an allowlist, at the cost
/// of occasionally matching third-party bots.
fn is_copilot_reviewer(login: &str) -> bool {
    if login == AGENT_LOGIN {
        return true;
    }
    let lower = login.to_lowercase();
    lower.contains("copilot") && lower.contains("review")
}

fn mentions_copilot(text: &str) -> bool {
    let lower = text.to_lowercase();
    COPILOT_KEYWORDS.iter().any(|k| lower.contains(k))
}

fn commit_mentions_copilot(message: &str) -> bool {
    let lower = message.to_lowercase();
    COPILOT_KEYWORDS.iter().any(|k| lower.contains(k))
        || (lower.contains("co-authored-by:") && lower.contains("copilot"))
}

async fn fetch_reviews<S: RepositorySource>(
    pr: &PullRequest,
    source: &S,
) -> Result<Vec<crate::models::Review>> {
    match source
        .list_reviews(&pr.repository_owner, &pr.repository_name, pr.number)
        .await
    {
        Ok(reviews) => Ok(reviews),
        Err(e) if e.is_fatal() => Err(e),
        Err(e) => {
            tracing::warn!("Could not fetch reviews for PR #{}: {}", pr.number, e);
            Ok(Vec::new())
        }
    }
}

async fn fetch_commits<S: RepositorySource>(
    pr: &PullRequest,
    source: &S,
) -> Result<Vec<crate::models::PrCommit>> {
    match source
        .list_commits(&pr.repository_owner, &pr.repository_name, pr.number)
        .await
    {
        Ok(commits) => Ok(commits),
        Err(e) if e.is_fatal() => Err(e),
        Err(e) => {
            tracing::warn!("Could not fetch commits for PR #{}: {}", pr.number, e);
            Ok(Vec::new())
        }
    }
}
