use bon::Builder;

/// The fixpoint round bound used when none is configured.
pub const DEFAULT_MAX_ROUNDS: usize = 256;

/// Configuration struct containing options affecting simulation decisions.
// this can be a copy type because it's just a bunch of scalars
#[derive(Debug, Clone, Copy, Builder)]
pub struct RuntimeConfig {
    /// Upper bound on fixpoint rounds for a single circuit update. A circuit
    /// always gets at least one more round than it has internal systems, so
    /// this only limits circuits which contain feedback.
    #[builder(default = DEFAULT_MAX_ROUNDS)]
    pub max_rounds: usize,
    /// enables debug logging
    #[builder(default)]
    pub debug_logging: bool,
    /// suppresses warnings
    #[builder(default)]
    pub quiet: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl RuntimeConfig {
    pub fn get_logging_config(&self) -> LoggingConfig {
        LoggingConfig {
            quiet: self.quiet,
            debug_logging: self.debug_logging,
        }
    }

    /// The round bound for a circuit holding `internal_systems` systems.
    pub(crate) fn round_limit(&self, internal_systems: usize) -> usize {
        self.max_rounds.max(internal_systems + 1)
    }
}

/// Configuration struct describing what settings a logger should be created
/// with.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingConfig {
    /// Whether or not to silence non-error messages. Will be overridden by
    /// `debug_logging` if set to true.
    pub quiet: bool,
    /// Whether or not to enable debug logging. If set to true, will override
    /// `quiet`.
    pub debug_logging: bool,
}

#[cfg(test)]
mod tests {
    use super::{DEFAULT_MAX_ROUNDS, RuntimeConfig};

    #[test]
    fn builder_fills_defaults() {
        let config = RuntimeConfig::builder().quiet(true).build();
        assert_eq!(config.max_rounds, DEFAULT_MAX_ROUNDS);
        assert!(config.quiet);
        assert!(!config.debug_logging);
    }

    #[test]
    fn round_limit_never_starves_acyclic_circuits() {
        let config = RuntimeConfig::builder().max_rounds(4).build();
        assert_eq!(config.round_limit(2), 4);
        assert_eq!(config.round_limit(10), 11);
    }
}
