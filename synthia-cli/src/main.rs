//! Synthia CLI - one-shot completion requests and JSONL progress monitoring.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;
use synthia::{Client, Completion, Monitor, RequestConfig};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Synthia CLI - completion requests and generation progress monitoring
#[derive(Parser, Debug)]
#[command(name = "synthia")]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Send a single completion request and print the response
    Ask {
        /// Question to send
        #[arg(default_value = "Hello!")]
        query: String,

        /// Endpoint base URL
        #[arg(
            long,
            env = "OPENAI_BASE_URL",
            default_value = "http://127.0.0.1:8030/v1"
        )]
        base_url: String,

        /// Model identifier
        #[arg(short, long, default_value = "Tesslate/Synthia-S1-27b")]
        model: String,
    },
    /// Watch a JSONL output file and redraw a progress table
    Monitor {
        /// File to watch
        #[arg(short, long, default_value = "output/aime24_bz64.jsonl")]
        file: PathBuf,

        /// Seconds between polls
        #[arg(short, long, default_value_t = 5)]
        interval: u64,

        /// Expected number of records; progress becomes a percentage
        /// instead of a delta (a full AIME24 run produces 1920)
        #[arg(short, long)]
        total: Option<u64>,
    },
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("synthia=debug,synthia_cli=debug")
    } else {
        EnvFilter::new("synthia=warn,synthia_cli=info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    match args.command {
        Command::Ask {
            query,
            base_url,
            model,
        } => {
            let client = Client::builder()
                .config(RequestConfig::from_env())
                .base_url(base_url)
                .build()?;

            match client.completion_model(model).request(query).await? {
                Completion::Text(text) => println!("Response: {text}"),
                Completion::Truncated { end_reason } => {
                    println!("Generation truncated: {end_reason}");
                }
            }
        }
        Command::Monitor {
            file,
            interval,
            total,
        } => {
            let mut monitor = Monitor::new(file, Duration::from_secs(interval));
            if let Some(total) = total {
                monitor = monitor.with_expected_total(total);
            }
            monitor.run().await;
        }
    }

    Ok(())
}
