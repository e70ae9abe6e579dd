use clap::Parser;
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use veriscope::{AnalysisConfig, AnalysisReport, AnalysisRequest, Pipeline};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Video files to analyze
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Emit each report as JSON instead of text
    #[arg(long)]
    json: bool,

    /// Path to an analysis config file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => AnalysisConfig::load(path)?,
        None => AnalysisConfig::default(),
    };
    let pipeline = Pipeline::new(config);

    let mut failures = 0usize;
    for file in &args.files {
        let request = AnalysisRequest::new(file);

        // Each file gets its own engine instance; analyses never share one.
        let result = pipeline
            .analyze(&request, |event| {
                info!("[{:>3}%] {}", event.percent, event.message);
            })
            .await;

        match result {
            Ok(report) => {
                if args.json {
                    println!(
                        "{}",
                        serde_json::to_string_pretty(&serde_json::json!({
                            "file": request.file_name,
                            "analyzed_at": chrono::Utc::now().to_rfc3339(),
                            "report": report,
                        }))?
                    );
                } else {
                    print_report(&request.file_name, &report);
                }
            }
            Err(e) => {
                error!("{}: {}", request.file_name, e);
                failures += 1;
            }
        }
    }

    if failures > 0 {
        anyhow::bail!("{failures} file(s) could not be analyzed");
    }
    Ok(())
}

fn print_report(file_name: &str, report: &AnalysisReport) {
    println!("────────────────────────────────────────────────────────");
    println!(
        "Report for {} ({})",
        file_name,
        chrono::Local::now().format("%Y-%m-%d %H:%M")
    );
    println!("Authenticity score: {}/100", report.score);
    println!("{}", report.summary);
    if !report.issues.is_empty() {
        println!();
        println!("Issues:");
        for issue in &report.issues {
            println!(
                "  [{:<6}] {:<18} {}",
                issue.severity, issue.timestamp, issue.description
            );
        }
    }
    println!("────────────────────────────────────────────────────────");
}
