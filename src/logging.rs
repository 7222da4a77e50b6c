use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize tracing subscriber for the CLI.
/// Uses RUST_LOG env var for filtering (defaults to warn so spinners stay readable).
/// Output goes to stderr; stdout carries command results only.
pub fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    if json {
        tracing_subscriber::registry()
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .with(filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(fmt::layer().with_ansi(true).with_writer(std::io::stderr))
            .with(filter)
            .init();
    }
}
