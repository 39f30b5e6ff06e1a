use once_cell::sync::OnceCell;

// re-export for convenience
pub use slog::{Logger, debug, error, info, trace, warn};
use slog::{Discard, Drain, Level, o};

use crate::configuration::LoggingConfig;

static ROOT_LOGGER: OnceCell<Logger> = OnceCell::new();

/// Install the process root logger. Only the first call has an effect, later
/// calls return the logger that is already installed.
pub fn initialize_logger(conf: LoggingConfig) -> &'static Logger {
    ROOT_LOGGER.get_or_init(|| {
        let decorator = slog_term::TermDecorator::new().stderr().build();
        let drain = slog_term::FullFormat::new(decorator).build();
        let filter_level = if conf.debug_logging {
            Level::Trace
        } else if conf.quiet {
            Level::Error
        } else {
            Level::Warning
        };
        let drain = drain.filter_level(filter_level).fuse();

        let drain = slog_async::Async::new(drain).build().fuse();

        Logger::root(drain, o!())
    })
}

/// The installed root logger. If [initialize_logger] was never called this
/// installs a logger which discards everything.
pub fn root() -> &'static Logger {
    ROOT_LOGGER.get_or_init(|| Logger::root(Discard, o!()))
}

pub fn new_sublogger<S: Into<String>>(source: S) -> Logger {
    root().new(o!("source" => source.into()))
}

#[cfg(test)]
mod tests {
    use super::{initialize_logger, root};
    use crate::configuration::RuntimeConfig;

    #[test]
    fn root_logger_is_installed_once() {
        let config = RuntimeConfig::builder().debug_logging(true).build();
        let first = initialize_logger(config.get_logging_config());
        let again = initialize_logger(Default::default());
        assert!(std::ptr::eq(first, again));
        assert!(std::ptr::eq(first, root()));
    }
}
