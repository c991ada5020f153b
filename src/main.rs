use anyhow::Context;
use clap::Parser;
use propsim_api::{ErrorResponse, Handler};
use propsim_core::config::{DEFAULT_LIMIT, DEFAULT_MAX_BATCH_SIZE, DEFAULT_NEIGHBORS_PER_ITEM};
use propsim_core::{Error, RecommenderConfig};
use propsim_schema::FeatureSchema;
use serde::Serialize;
use std::process::ExitCode;
use std::time::Instant;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Recommend real-estate listings by feature similarity
#[derive(Parser, Debug)]
#[command(name = "propsim")]
#[command(about = "Recommend real-estate listings by feature similarity", long_about = None)]
struct Args {
    /// JSON request object, e.g. '{"mode": "test"}'
    input: Option<String>,

    /// Property batches longer than this are truncated
    #[arg(long, default_value_t = DEFAULT_MAX_BATCH_SIZE)]
    max_batch_size: usize,

    /// Similar properties gathered per history item
    #[arg(long, default_value_t = DEFAULT_NEIGHBORS_PER_ITEM)]
    neighbors_per_item: usize,

    /// Result count when the request has no limit
    #[arg(long, default_value_t = DEFAULT_LIMIT)]
    default_limit: usize,

    /// Scale encoded columns by the feature weight table
    #[arg(long)]
    apply_weights: bool,

    /// Log level (logs go to stderr; RUST_LOG overrides)
    #[arg(long, default_value = "warn")]
    log_level: String,
}

impl Args {
    fn config(&self) -> RecommenderConfig {
        RecommenderConfig {
            max_batch_size: self.max_batch_size,
            neighbors_per_item: self.neighbors_per_item,
            default_limit: self.default_limit,
            apply_weights: self.apply_weights,
        }
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    if let Err(err) = init_tracing(&args.log_level) {
        eprintln!("failed to initialize logging: {err:#}");
    }

    let Some(input) = args.input.as_deref() else {
        emit(&ErrorResponse::new(Error::MissingInput.to_string()));
        return ExitCode::FAILURE;
    };

    match run(&args, input) {
        Ok(output) => {
            println!("{}", output);
            ExitCode::SUCCESS
        }
        Err(err) => {
            emit(&ErrorResponse::new(err.to_string()).with_traceback(format!("{err:?}")));
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args, input: &str) -> anyhow::Result<String> {
    let start = Instant::now();
    let handler =
        Handler::new(args.config(), FeatureSchema::default()).context("invalid configuration")?;

    let response = handler.handle_str(input)?;
    let output = serde_json::to_string(&response)?;

    info!(
        elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
        "request complete"
    );
    Ok(output)
}

fn init_tracing(log_level: &str) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .context("invalid log level")?;

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

fn emit<T: Serialize>(payload: &T) {
    match serde_json::to_string(payload) {
        Ok(json) => println!("{}", json),
        Err(err) => println!("{{\"error\": \"failed to serialize output: {}\"}}", err),
    }
}
