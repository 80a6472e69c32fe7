//! Structured logging layer using the tracing crate.
//!
//! Logs go to stderr so that task output on stdout stays machine-readable.

use crate::telemetry::config::{LogFormat, LogLevel, LoggingConfig};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

/// Builder for constructing a logging layer.
pub struct LoggingBuilder {
    config: LoggingConfig,
}

impl LoggingBuilder {
    /// Create a new logging builder with default configuration.
    pub fn new() -> Self {
        Self {
            config: LoggingConfig::default(),
        }
    }

    /// Create a builder from an existing configuration.
    pub fn from_config(config: LoggingConfig) -> Self {
        Self { config }
    }

    /// Set the log level.
    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.config.level = level;
        self
    }

    /// Set the log format.
    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.config.format = format;
        self
    }

    /// Set ANSI colors.
    pub fn with_ansi(mut self, enabled: bool) -> Self {
        self.config.ansi_colors = enabled;
        self
    }

    /// Set filter directive.
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.config.filter = Some(filter.into());
        self
    }

    pub fn config(&self) -> &LoggingConfig {
        &self.config
    }

    /// Build and initialize the logging layer (global subscriber).
    pub fn init(self) -> crate::error::Result<()> {
        let layer = self.build_layer();

        tracing_subscriber::registry()
            .with(layer)
            .try_init()
            .map_err(|e| crate::error::Error::Config(e.to_string()))
    }

    /// Build a filtered formatting layer.
    pub fn build_layer(self) -> Box<dyn Layer<Registry> + Send + Sync + 'static> {
        let env_filter = self.build_filter();
        let config = self.config;

        match config.format {
            LogFormat::Pretty => tracing_subscriber::fmt::layer()
                .pretty()
                .with_writer(std::io::stderr)
                .with_ansi(config.ansi_colors)
                .with_target(config.with_target)
                .with_file(config.with_file)
                .with_line_number(config.with_file)
                .with_filter(env_filter)
                .boxed(),
            LogFormat::Compact => tracing_subscriber::fmt::layer()
                .compact()
                .with_writer(std::io::stderr)
                .with_ansi(config.ansi_colors)
                .with_target(config.with_target)
                .with_file(config.with_file)
                .with_line_number(config.with_file)
                .with_filter(env_filter)
                .boxed(),
            LogFormat::Json => tracing_subscriber::fmt::layer()
                .json()
                .with_writer(std::io::stderr)
                .with_target(config.with_target)
                .with_file(config.with_file)
                .with_line_number(config.with_file)
                .with_filter(env_filter)
                .boxed(),
            LogFormat::Full => tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(config.ansi_colors)
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .with_thread_ids(true)
                .with_filter(env_filter)
                .boxed(),
        }
    }

    /// `RUST_LOG` wins over the configured filter, which wins over the level.
    fn build_filter(&self) -> EnvFilter {
        let default_filter = self.config.level.as_directive();

        if let Some(ref filter) = self.config.filter {
            EnvFilter::try_from_default_env()
                .or_else(|_| EnvFilter::try_new(filter))
                .unwrap_or_else(|_| EnvFilter::new(default_filter))
        } else {
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter))
        }
    }
}

impl Default for LoggingBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Initialize logging from a configuration, raised by CLI verbosity.
///
/// With no `-v` flags the configured level applies; each flag raises it.
pub fn init_from_verbosity(verbosity: u8, base: &LoggingConfig) -> crate::error::Result<()> {
    let mut config = base.clone();
    if verbosity > 0 {
        config.level = config.level.min(LogLevel::from_verbosity(verbosity));
    }
    if verbosity >= 2 {
        config.with_target = true;
    }
    if verbosity >= 3 {
        config.with_file = true;
        if config.format != LogFormat::Json {
            config.format = LogFormat::Full;
        }
    }

    LoggingBuilder::from_config(config).init()
}
