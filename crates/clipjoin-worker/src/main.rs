//! Clip job worker binary.
//!
//! Reads one job document (stdin by default), trims and fades every clip,
//! concatenates them and marks the job done.

use clap::Parser;
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use clipjoin_models::{FadePolicy, Job};
use clipjoin_worker::{JobProcessor, WorkerConfig, WorkerResult};

#[derive(Parser, Debug)]
#[command(name = "clipjoin-worker", version, about = "Trim, fade and concatenate video clips")]
struct Cli {
    /// Directory clip names are resolved against (overrides CLIPJOIN_SOURCE_ROOT)
    #[arg(long, value_name = "DIR")]
    source_root: Option<PathBuf>,

    /// Directory the job output directory is created in (overrides CLIPJOIN_OUTPUT_ROOT)
    #[arg(long, value_name = "DIR")]
    output_root: Option<PathBuf>,

    /// Read the job document from a file instead of stdin
    #[arg(short, long, value_name = "FILE")]
    input: Option<PathBuf>,

    /// passthrough, clamp or reject (overrides CLIPJOIN_FADE_POLICY)
    #[arg(long, value_name = "POLICY")]
    fade_policy: Option<FadePolicy>,

    /// Print the JSON schema of the job document and exit
    #[arg(long)]
    print_schema: bool,
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();

    if cli.print_schema {
        match serde_json::to_string_pretty(&Job::json_schema()) {
            Ok(schema) => println!("{}", schema),
            Err(e) => {
                error!("Failed to render schema: {}", e);
                std::process::exit(1);
            }
        }
        return;
    }

    if let Err(e) = run(cli).await {
        error!("clipjoin-worker failed: {}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> WorkerResult<()> {
    let mut config = WorkerConfig::from_env()?;
    if let Some(source_root) = cli.source_root {
        config = config.with_source_root(source_root);
    }
    if let Some(output_root) = cli.output_root {
        config = config.with_output_root(output_root);
    }
    if let Some(fade_policy) = cli.fade_policy {
        config = config.with_fade_policy(fade_policy);
    }
    info!("Worker config: {:?}", config);

    let job = read_job(cli.input).await?;
    let output = JobProcessor::from_config(config).process(job).await?;

    info!(
        "Result written to {} ({} clips)",
        output.result.display(),
        output.intermediates.len()
    );
    Ok(())
}

async fn read_job(input: Option<PathBuf>) -> WorkerResult<Job> {
    match input {
        Some(path) => Ok(Job::from_slice(&tokio::fs::read(&path).await?)?),
        None => {
            let job = tokio::task::spawn_blocking(|| Job::from_reader(std::io::stdin().lock()))
                .await
                .map_err(std::io::Error::other)??;
            Ok(job)
        }
    }
}

/// Colored output for dev, JSON when `LOG_FORMAT=json`.
fn init_tracing() {
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("clipjoin=info"));

    // Logs go to stderr so stdout stays free for --print-schema
    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_ansi(true)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false),
            )
            .with(env_filter)
            .init();
    }
}
