use anyhow::Result;
use clap::Parser;
use paperdigest::pipeline::PipelineService;
use paperdigest::{config, logging, sink};

#[derive(Parser)]
#[command(
    name = "digest-run",
    about = "Summarize the most recent catalog papers into the digest file"
)]
struct Cli {
    /// Number of recent papers to request from the catalog.
    #[arg(long, default_value_t = 5)]
    count: usize,
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    config::init_config();
    logging::init_tracing();

    let service = PipelineService::new();
    let outcome = service.run_digest(cli.count).await?;

    if outcome.records.is_empty() {
        println!("No results.");
    } else {
        for record in &outcome.records {
            println!("Title: {}", record.title);
            println!("Category: {}", record.category);
            println!("Summary: {}", record.summary);
            println!("{}", sink::SEPARATOR);
            println!();
        }
    }
    println!(
        "Digest complete: {} recorded, {} skipped (of {} fetched).",
        outcome.records.len(),
        outcome.skipped,
        outcome.fetched
    );
    Ok(())
}
