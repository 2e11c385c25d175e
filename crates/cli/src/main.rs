//! `clipgen` -- generate and extend short video clips.
//!
//! Prints exactly one JSON document to stdout per invocation and exits
//! non-zero on failure. Logs go to stderr.
//!
//! # Environment variables
//!
//! | Variable               | Required | Default                | Description                      |
//! |------------------------|----------|------------------------|----------------------------------|
//! | `GOOGLE_API_KEY`       | remote   | --                     | Key for generate/extend/status/cancel |
//! | `CLIPGEN_API_BASE_URL` | no       | Gemini v1beta endpoint | Override the service base URL    |
//! | `CLIPGEN_PRESETS_PATH` | no       | bundled catalog        | Preset catalog JSON file         |
//! | `RUST_LOG`             | no       | `clipgen=info`         | Log filter                       |

use std::process::ExitCode;

use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use clipgen_cli::cli::{parse_failure, Cli};
use clipgen_cli::commands;
use clipgen_cli::config::AppConfig;
use clipgen_cli::render;

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "clipgen=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            return match parse_failure(&e) {
                Some(output) => {
                    println!("{}", render(&output));
                    ExitCode::FAILURE
                }
                None => {
                    let _ = e.print();
                    ExitCode::SUCCESS
                }
            };
        }
    };

    let config = AppConfig::from_env();

    // Ctrl-C stops local tracking only; the remote job keeps running.
    let cancel = CancellationToken::new();
    tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("Interrupt received, abandoning wait");
                cancel.cancel();
            }
        }
    });

    let output = commands::run(cli.command, &config, cancel).await;
    println!("{}", render(&output));

    if output.is_failure() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
