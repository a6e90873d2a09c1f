// Tracing setup for the binary. Output goes to stderr so stdout carries
// only the upload report.

use tracing_subscriber::EnvFilter;

/// Install the global subscriber. `RUST_LOG` wins over the verbose flag.
/// Calling this twice is harmless; the second call is ignored.
pub fn init(verbose: bool) {
    let default = if verbose { "warn,ilab_attach=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
