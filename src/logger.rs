use tracing_subscriber::{EnvFilter, fmt};

/// Initialise diagnostic logging.
///
/// Controlled through `RUST_LOG`, default level: warn. Diagnostics go to
/// stderr so they never interleave with the suite output on stdout.
///
/// Examples:
/// - RUST_LOG=debug stagehand run
/// - RUST_LOG=stagehand::runner=trace stagehand run
pub fn init_logger() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();

    tracing::debug!("Logger initialized");
}
