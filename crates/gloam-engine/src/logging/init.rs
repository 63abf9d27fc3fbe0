use std::sync::Once;

/// Logger configuration.
///
/// `env_filter` follows the `env_logger` filter syntax (e.g. "info", "warn",
/// "gloam_engine=debug,wgpu=warn").
///
/// `min_level` applies when neither `env_filter` nor `RUST_LOG` is set.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub env_filter: Option<String>,
    pub min_level: log::LevelFilter,
    pub write_style: env_logger::WriteStyle,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            env_filter: None,
            min_level: log::LevelFilter::Info,
            write_style: env_logger::WriteStyle::Auto,
        }
    }
}

impl LoggingConfig {
    /// Parses a level name ("trace" ... "error", "off"); unknown names keep `Info`.
    pub fn with_level_name(mut self, name: &str) -> Self {
        match name.trim().parse::<log::LevelFilter>() {
            Ok(level) => self.min_level = level,
            Err(_) => eprintln!("unknown log level '{name}', using info"),
        }
        self
    }
}

static INIT: Once = Once::new();

/// Initializes the global logger once.
///
/// This function is idempotent; subsequent calls are ignored.
/// Intended usage is early in `main`.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let mut builder = env_logger::Builder::new();

        if let Some(filter) = config.env_filter {
            builder.parse_filters(&filter);
        } else if let Ok(filter) = std::env::var("RUST_LOG") {
            builder.parse_filters(&filter);
        } else {
            builder.filter_level(config.min_level);
            // wgpu is chatty at info.
            builder.filter_module("wgpu_core", log::LevelFilter::Warn);
            builder.filter_module("wgpu_hal", log::LevelFilter::Warn);
        }

        builder.write_style(config.write_style);
        builder.init();

        log::debug!("logging initialized");
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_names_parse() {
        let config = LoggingConfig::default().with_level_name("Debug");
        assert_eq!(config.min_level, log::LevelFilter::Debug);

        let config = LoggingConfig::default().with_level_name("loud");
        assert_eq!(config.min_level, log::LevelFilter::Info);
    }
}
