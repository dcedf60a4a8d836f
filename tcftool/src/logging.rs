//! Sets up logging for the tool using `tracing_subscriber`.
//!
//! Events go to stderr so they never mix with decoded output.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Installs the global subscriber.
///
/// `RUST_LOG` takes precedence. Otherwise only warnings are shown, or debug events of
/// the decoder when `verbose` is set.
pub fn setup_logging(verbose: bool) {
    let dirs = match verbose {
        true => "warn,iab_tcf=debug,tcftool=debug",
        false => "warn",
    };

    let main_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .without_time();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(dirs)))
        .with(main_layer)
        .init()
}
