pub mod pull_request;
pub mod report;

pub use pull_request::*;
pub use report::*;
