//! Declarative logger configuration
//!
//! A [`LoggingConfig`] describes a registry's default formatter and the
//! settings of individual loggers. It is usually loaded from JSON:
//!
//! ```json
//! {
//!   "formatter": { "record_format": "%t [%L] %N%m" },
//!   "root": { "level": "warning", "stream": "stderr" },
//!   "loggers": {
//!     "app": { "level": "info", "file": "/var/log/app.log" },
//!     "app.db": { "level": "debug", "propagate": false, "stream": "stdout" }
//!   }
//! }
//! ```
//!
//! Loggers only exist while a handle is held, so applying a configuration
//! returns the handles it configured.

use super::{
    error::{LoggerError, Result},
    formatter::{FormatSpec, Formatter},
    log_level::{LogLevel, StreamTarget},
    logger::Logger,
    registry::{Limits, Registry, RegistryBuilder},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Settings for one logger; absent fields are left unchanged
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggerConfig {
    pub level: Option<LogLevel>,
    pub stream: Option<StreamTarget>,
    /// Log file path; an empty path closes the file
    pub file: Option<PathBuf>,
    pub propagate: Option<bool>,
    /// A formatter private to this logger
    pub formatter: Option<FormatSpec>,
}

/// Configuration of a whole registry
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// Used only when building a new registry from this configuration
    pub limits: Option<Limits>,
    /// Installed as the registry default before any logger is configured
    pub formatter: Option<FormatSpec>,
    pub self_logging: Option<bool>,
    pub root: LoggerConfig,
    /// Keyed by dotted logger name
    pub loggers: BTreeMap<String, LoggerConfig>,
}

impl LoggingConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            LoggerError::io_operation("reading logging config", path.display().to_string(), e)
        })?;
        Self::from_json_str(&contents)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Registry builder carrying this configuration's limits, formatter and
    /// self-logging flag
    pub fn registry_builder(&self) -> RegistryBuilder {
        let mut builder = Registry::builder();
        if let Some(limits) = self.limits {
            builder = builder.limits(limits);
        }
        if let Some(spec) = &self.formatter {
            builder = builder.default_formatter(Formatter::from_spec(spec.clone()));
        }
        if let Some(enabled) = self.self_logging {
            builder = builder.self_logging(enabled);
        }
        builder
    }

    fn validate(&self) -> Result<()> {
        let specs = self
            .formatter
            .iter()
            .chain(self.root.formatter.iter())
            .chain(self.loggers.values().filter_map(|l| l.formatter.as_ref()));
        for spec in specs {
            if spec.max_record_length == 0 {
                return Err(LoggerError::config(
                    "formatter",
                    "max_record_length must be greater than zero",
                ));
            }
        }
        if self.loggers.contains_key("") {
            return Err(LoggerError::config(
                "loggers",
                "the root logger is configured under \"root\", not an empty name",
            ));
        }
        if self.limits.is_some_and(|l| l.max_message_length == 0) {
            return Err(LoggerError::config(
                "limits",
                "max_message_length must be greater than zero",
            ));
        }
        Ok(())
    }
}

impl LoggerConfig {
    fn apply_to(&self, logger: &Logger) -> Result<()> {
        if let Some(level) = self.level {
            logger.set_level(level);
        }
        if let Some(propagate) = self.propagate {
            logger.set_propagation(propagate);
        }
        if let Some(spec) = &self.formatter {
            logger.set_formatter(Formatter::from_spec(spec.clone()));
        }
        if let Some(stream) = self.stream {
            logger.set_stream(stream);
        }
        if let Some(file) = &self.file {
            logger.set_logfile(file)?;
        }
        Ok(())
    }
}

/// Handles to the loggers a configuration touched
#[derive(Debug)]
pub struct ConfiguredLoggers {
    root: Logger,
    loggers: BTreeMap<String, Logger>,
}

impl ConfiguredLoggers {
    pub fn root(&self) -> &Logger {
        &self.root
    }

    pub fn get(&self, name: &str) -> Option<&Logger> {
        if name.is_empty() {
            return Some(&self.root);
        }
        self.loggers.get(name)
    }

    /// Number of configured non-root loggers
    pub fn len(&self) -> usize {
        self.loggers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.loggers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Logger)> {
        self.loggers.iter().map(|(name, logger)| (name.as_str(), logger))
    }
}

impl Registry {
    /// Build a new registry from `config` and apply it
    pub fn from_config(config: &LoggingConfig) -> Result<(Registry, ConfiguredLoggers)> {
        config.validate()?;
        let registry = config.registry_builder().build();
        let loggers = registry.apply_config(config)?;
        Ok((registry, loggers))
    }

    /// Apply `config` to this registry.
    ///
    /// Loggers are configured root first, then by name, so ancestors are set
    /// before their descendants. The first invalid name or unopenable file
    /// aborts the remaining steps. Limits are ignored here; they only apply
    /// to [`Registry::from_config`].
    pub fn apply_config(&self, config: &LoggingConfig) -> Result<ConfiguredLoggers> {
        config.validate()?;
        if let Some(enabled) = config.self_logging {
            self.set_self_logging(enabled);
        }
        if let Some(spec) = &config.formatter {
            self.set_default_formatter(Formatter::from_spec(spec.clone()));
        }

        let root = self.resolve_root();
        config.root.apply_to(&root)?;

        let mut loggers = BTreeMap::new();
        for (name, logger_config) in &config.loggers {
            let logger = self.try_resolve(name)?;
            logger_config.apply_to(&logger)?;
            loggers.insert(name.clone(), logger);
        }

        Ok(ConfiguredLoggers { root, loggers })
    }
}
