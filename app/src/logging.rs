use tracing_subscriber::EnvFilter;

/// Install the stderr subscriber. `RUST_LOG` applies unless `verbose` forces
/// debug output; the fallback level is `warn` so stdout views stay clean.
/// ANSI styling follows the installed theme.
pub fn init(verbose: bool, ansi: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    // A subscriber may already be installed (tests, embedding); keep it.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_ansi(ansi)
        .try_init();
}
