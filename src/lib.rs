pub mod analysis;
pub mod config;
pub mod error;
pub mod github;
pub mod models;
pub mod report;

#[cfg(test)]
pub mod testing;

pub use analysis::AnalysisPipeline;
pub use config::{Config, OrgPolicy};
pub use error::{Error, Result};
pub use github::{GitHubClient, RepositorySource};
