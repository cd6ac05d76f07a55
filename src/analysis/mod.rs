pub mod aggregator;
pub mod classifier;
pub mod pipeline;
pub mod scope;

pub use aggregator::WeeklyAggregator;
pub use pipeline::AnalysisPipeline;
