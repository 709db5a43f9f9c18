use std::sync::Arc;

use audioforge::cli::Cli;
use audioforge::job::JobConfig;
use audioforge::pipeline::{ProgressTracker, Scheduler};
use audioforge::plan::PlanBuilder;
use audioforge::{config, scan, Error};

use clap::Parser;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Respect RUST_LOG if set, otherwise pick defaults from the verbose flag.
    // Non-verbose runs stay quiet so the progress indicator owns stdout.
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "audioforge=debug".to_string()
        } else {
            "audioforge=warn".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .init();

    if let Err(err) = run(cli).await {
        eprintln!("{err}");
        std::process::exit(err.exit_code());
    }
}

async fn run(cli: Cli) -> audioforge::Result<()> {
    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(config::default_config_path);

    let job = JobConfig::from_cli(cli)?;
    let registry = config::ToolRegistry::load(&config_path)?;

    // Checked once, before any scheduling: without an encoder for the
    // destination format the whole run is pointless.
    if !registry.has(&job.dest_format) {
        return Err(Error::NoEncoder {
            format: job.dest_format.clone(),
        });
    }

    // Per-job scratch directory for intermediates; removed on drop.
    let scratch = tempfile::tempdir()?;
    let builder = PlanBuilder::new(&registry, &job, scratch.path().to_path_buf())?;
    let list = scan::collect_tasks(&builder, &job);

    if job.verbose {
        println!("{job}\n");
        println!("list has {} tasks:", list.len());
        for task in &list {
            println!("{task}\n");
        }
    }

    if list.is_empty() {
        println!("Nothing to convert.");
        return Ok(());
    }

    let tracker = Arc::new(ProgressTracker::new(list.len(), job.workers, job.verbose));

    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("interrupt received, stopping");
                cancel.cancel();
            }
        });
    }

    let scheduler = Scheduler::new(job.workers, cancel);
    let summary = scheduler.run(list, tracker).await;

    if !job.verbose {
        println!();
    }
    summary.report();

    Ok(())
}
