use tracing_subscriber::EnvFilter;

/// `RUST_LOG` takes precedence; otherwise `info`, or `debug` with `--verbose`.
/// Logs go to stderr so stdout only carries results.
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
