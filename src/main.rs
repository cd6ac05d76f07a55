use clap::Parser;
use tracing_subscriber::EnvFilter;

use pr_insights::models::AnalysisResult;
use pr_insights::report::markdown::{render_summary, sorted_week_keys};
use pr_insights::{AnalysisPipeline, Config, GitHubClient, OrgPolicy};

#[derive(Parser, Debug)]
#[command(name = "pr-insights")]
#[command(version = "0.1.0")]
#[command(about = "Analyze GitHub pull requests for Copilot usage and dependency-bot activity")]
struct Args {
    /// GitHub user to analyze (defaults to GITHUB_REPOSITORY_OWNER)
    #[arg(short = 'u', long)]
    owner: Option<String>,

    /// Restrict the scan to a single repository
    #[arg(short, long)]
    repo: Option<String>,

    /// Output format (json, csv)
    #[arg(short, long)]
    format: Option<String>,

    /// Organization skip/include list file
    #[arg(long)]
    org_filter: Option<String>,

    /// Markdown summary destination (defaults to GITHUB_STEP_SUMMARY)
    #[arg(long)]
    summary: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("pr_insights=info".parse()?)
                .add_directive("reqwest=warn".parse()?),
        )
        .init();

    dotenvy::dotenv().ok();

    let args = Args::parse();
    let config = Config::from_env()?;

    let owner = args
        .owner
        .clone()
        .or_else(|| (!config.owner.is_empty()).then(|| config.owner.clone()))
        .ok_or_else(|| anyhow::anyhow!("no owner given; pass --owner or set GITHUB_REPOSITORY_OWNER"))?;
    let repo = args.repo.clone().or_else(|| config.repo.clone());
    let format = args
        .format
        .clone()
        .unwrap_or_else(|| config.output_format.clone());

    let policy = match args.org_filter.as_ref().or(config.org_filter_file.as_ref()) {
        Some(path) => OrgPolicy::load(path)?,
        None => OrgPolicy::default(),
    };

    let github = GitHubClient::new(&config.github_token)?;
    let pipeline = AnalysisPipeline::new(github, policy, config.automated_context);

    match &repo {
        Some(r) => tracing::info!("Analyzing repository: {}/{}", owner, r),
        None => tracing::info!("Analyzing all repositories for user: {}", owner),
    }

    let result = pipeline.run(&owner, repo.as_deref()).await?;

    let filename = pr_insights::report::save_results(&result, &format)?;
    tracing::info!("Analysis complete! Results saved to: {}", filename);

    write_markdown_summary(&result, args.summary.as_deref())?;
    print_summary(&result);

    Ok(())
}

fn write_markdown_summary(result: &AnalysisResult, summary_path: Option<&str>) -> anyhow::Result<()> {
    let destination = summary_path
        .map(|p| p.to_string())
        .or_else(|| std::env::var("GITHUB_STEP_SUMMARY").ok());

    let Some(path) = destination else {
        return Ok(());
    };

    use std::io::Write;
    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)?;
    writeln!(file, "{}", render_summary(result))?;
    tracing::info!("Markdown summary written to: {}", path);
    Ok(())
}

fn print_summary(result: &AnalysisResult) {
    println!("\n=== SUMMARY ===");
    println!("Total PRs analyzed: {}", result.total_prs);
    println!("Copilot-assisted PRs: {}", result.total_copilot_prs);
    println!("Dependency-bot PRs: {}", result.total_dependabot_prs);
    if result.total_prs > 0 {
        let overall = 100.0 * result.total_copilot_prs as f64 / result.total_prs as f64;
        println!("Overall Copilot percentage: {:.2}%", overall);
    }

    println!("\n=== WEEKLY BREAKDOWN ===");
    for key in sorted_week_keys(&result.weekly_analysis) {
        let week = &result.weekly_analysis[key];
        println!(
            "{}: {} PRs, {} Copilot-assisted ({}%), {} dependency-bot ({}%)",
            key,
            week.total_prs,
            week.copilot_assisted_prs,
            week.copilot_percentage,
            week.dependabot_prs,
            week.dependabot_percentage,
        );
    }
}
