pub mod csv;
pub mod markdown;

use chrono::Utc;

use crate::error::{Error, Result};
use crate::models::AnalysisResult;

/// Writes the analysis to a timestamped file in the requested format and
/// returns the filename.
pub fn save_results(result: &AnalysisResult, format: &str) -> Result<String> {
    let timestamp = Utc::now().format("%Y%m%d_%H%M%S");

    let (filename, contents) = match format.to_lowercase().as_str() {
        "json" => (
            format!("pr_analysis_{}.json", timestamp),
            serde_json::to_string_pretty(result)?,
        ),
        "csv" => (
            format!("pr_analysis_{}.csv", timestamp),
            csv::render_csv(result),
        ),
        other => {
            return Err(Error::Config(format!(
                "unsupported output format: {}",
                other
            )))
        }
    };

    std::fs::write(&filename, contents)?;
    Ok(filename)
}
