use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "SYSREPORT_LOG";

/// Diagnostic logging goes to stderr only; stdout carries the summary and
/// the report echo.
pub fn init(verbose: bool) {
    let default = if verbose { "sysreport=debug" } else { "warn" };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
