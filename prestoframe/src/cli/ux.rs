use prestoframe::PrestoframeError;


/// Maximum log level for the given `-v` count and `--quiet` flag.
pub fn log_level(verbose: u8, quiet: bool) -> tracing::Level {
    if quiet {
        tracing::Level::ERROR
    } else { match verbose {
        0 => tracing::Level::INFO,
        1 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    }}
}

/// Install the global subscriber. Logs go to stderr; stdout carries only the result.
pub fn setup_logging(verbose: u8, quiet: bool) -> Result<(), PrestoframeError> {
    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .with_max_level(log_level(verbose, quiet))
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    Ok(())
}
