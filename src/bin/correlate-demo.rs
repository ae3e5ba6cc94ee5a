//! Correlate demo
//!
//! Runs a batch of concurrent correlated jobs and logs what each of them sees
//! as its ambient correlation id. Options come from the command line, with
//! `CORRELATE_*` variables (optionally from a `.env` file) as the baseline.

use anyhow::Context;
use clap::Parser;
use correlate::{
    CorrelateOptions, CorrelationManager, ErrorDisposition, ExceptionContext, ambient, spans,
    tracing_setup,
};
use std::time::Duration;
use tracing::{Instrument, info, warn};

#[derive(Parser)]
#[command(name = "correlate-demo")]
#[command(about = "Run concurrent jobs under correlation scopes", long_about = None)]
#[command(version)]
struct Cli {
    /// Number of concurrent jobs
    #[arg(short, long, default_value_t = 4)]
    jobs: usize,

    /// Correlation id for the first job (others get generated ids)
    #[arg(short, long)]
    correlation_id: Option<String>,

    /// Make every job fail after its work is done
    #[arg(long)]
    fail: bool,

    /// Treat injected failures as handled
    #[arg(long)]
    handle: bool,

    /// Disable the logging scope
    #[arg(long)]
    no_logging: bool,

    /// Disable the activity span
    #[arg(long)]
    no_tracing: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    tracing_setup::init_tracing();

    let cli = Cli::parse();
    let mut options = CorrelateOptions::from_env().context("Invalid CORRELATE_* settings")?;
    if cli.no_logging {
        options = options.with_logging(false);
    }
    if cli.no_tracing {
        options = options.with_tracing(false);
    }

    let manager = CorrelationManager::new(options);
    info!(jobs = cli.jobs, ?options, "Starting correlated jobs");

    let mut handles = Vec::with_capacity(cli.jobs);
    for job in 0..cli.jobs {
        let manager = manager.clone();
        let correlation_id = if job == 0 {
            cli.correlation_id.clone()
        } else {
            None
        };
        let (fail, handle) = (cli.fail, cli.handle);

        handles.push(tokio::spawn(async move {
            manager
                .correlate_with(
                    correlation_id.as_deref(),
                    || run_job(job, fail),
                    |exception: &ExceptionContext<'_, anyhow::Error>| {
                        warn!(
                            job,
                            error = %exception.error(),
                            "Job failed inside its correlation scope"
                        );
                        Ok(ErrorDisposition::from(handle))
                    },
                )
                .await
        }));
    }

    for handle in handles {
        match handle.await.context("Job task panicked")? {
            Ok(()) => {}
            Err(e) => warn!(error = %e, "Job finished with an error"),
        }
    }

    info!("All jobs finished");
    Ok(())
}

async fn run_job(job: usize, fail: bool) -> anyhow::Result<()> {
    let span = spans::operation("demo_job");
    async move {
        for step in 0..3u64 {
            tokio::time::sleep(Duration::from_millis(5 * (job as u64 + step))).await;
            info!(
                job,
                step,
                ambient_id = ambient::current_correlation_id()
                    .map(|id| id.into_string())
                    .unwrap_or_else(|| "none".to_string()),
                "Job step"
            );
        }

        if fail {
            anyhow::bail!("job {} failed on purpose", job);
        }
        Ok(())
    }
    .instrument(span)
    .await
}
