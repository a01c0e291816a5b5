//! Console diagnostics for the CLI and the Python module.

use tracing::{Level, Subscriber, metadata::LevelFilter};
use tracing_subscriber::{fmt, fmt::MakeWriter, prelude::*, util::SubscriberInitExt};

/// Builds the subscriber both entry points use: bare messages at INFO and
/// above, written to `make_writer`.
pub fn subscriber<W>(make_writer: W) -> impl Subscriber + Send + Sync + 'static
where
    W: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    let fmt = fmt::layer()
        .without_time()
        .with_file(false)
        .with_line_number(false)
        .with_writer(make_writer);
    let filter_layer = LevelFilter::from_level(Level::INFO);
    tracing_subscriber::registry().with(fmt).with(filter_layer)
}

/// Installs [`subscriber`] on stderr as the global default.
///
/// Returns false when a global subscriber was already set, for instance
/// when the Python module is imported a second time.
pub fn init() -> bool {
    subscriber(std::io::stderr).try_init().is_ok()
}

/// Loads `.env` from the current directory or one of its ancestors, then
/// installs the console subscriber. Variables already set are not
/// overridden.
pub fn bootstrap() {
    dotenvy::dotenv().ok();
    init();
}
