//! # Vitrine
//!
//! Command-line entry point. See the library docs for the commands.

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use vitrine_cli::CliArgs;

/// Initialize structured tracing with optional JSON format.
///
/// Set `RUST_LOG` to control log levels (default: warn,vitrine=info).
/// Set `RUST_LOG_FORMAT=json` for JSON output.
/// Logs go to stderr so command output on stdout stays machine-readable.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(
            "warn,vitrine_cli=info,vitrine_core=info,vitrine_renderer=info,vitrine_sync=info",
        )
    });

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_file(false)
        .with_line_number(false);

    if std::env::var("RUST_LOG_FORMAT").as_deref() == Ok("json") {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer.json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let args = CliArgs::parse();
    tracing::debug!(command = ?args.command, "Starting vitrine");

    let mut stdout = std::io::stdout();
    vitrine_cli::run(args, &mut stdout).await
}
