use tracing::{debug, level_filters::LevelFilter};
use tracing_subscriber::{EnvFilter, fmt::format::Format};

/// Installs the global subscriber. Logs go to stderr so stdout stays free for
/// the JSON summary; `RUST_LOG` directives are honoured on top of `log_level`.
pub fn setup_logger(log_level: LevelFilter) {
    let filter = EnvFilter::from_default_env().add_directive(log_level.into());

    let format = Format::default().with_level(true).with_target(false);

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .event_format(format)
        .finish();

    if tracing::subscriber::set_global_default(subscriber).is_err() {
        debug!("Logger has already been set up, continuing...");
    }
}
