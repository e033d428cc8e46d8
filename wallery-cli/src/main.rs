//! Entry point for the command-line interface.
#![forbid(unsafe_code)]
#![expect(
    clippy::print_stderr,
    reason = "the binary reports fatal errors on stderr before exiting"
)]

use tracing_subscriber::EnvFilter;

fn main() {
    init_logging();
    if let Err(err) = wallery_cli::run() {
        eprintln!("wallery: {err}");
        std::process::exit(1);
    }
}

/// Route `log` records to stderr, filtered by `RUST_LOG` (default `warn`).
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    if let Err(err) = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
    {
        eprintln!("wallery: logging disabled: {err}");
    }
}
