//! `gravel.toml` configuration and the process-wide `tracing` bootstrap.

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Once};

use gravel_syntax::{ParseOptions, DEFAULT_PREDICTION_WINDOW};
use parking_lot::Mutex;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing_subscriber::fmt::writer::{BoxMakeWriter, MakeWriterExt};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::prelude::*;

mod schema;

pub use schema::json_schema;

/// Environment variable naming an explicit config file.
pub const GRAVEL_CONFIG_ENV_VAR: &str = "GRAVEL_CONFIG";

/// File names searched, in order, by [`discover_config_path`].
pub const CONFIG_FILE_NAMES: [&str; 2] = ["gravel.toml", ".gravel.toml"];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
#[schemars(deny_unknown_fields)]
pub struct GravelConfig {
    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub parser: ParserConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
#[schemars(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Logging level for all gravel crates: a simple level or `EnvFilter`
    /// directives.
    #[serde(default = "LoggingConfig::default_level")]
    pub level: String,

    /// Emit logs in JSON format.
    #[serde(default)]
    pub json: bool,

    /// Write logs to stderr.
    #[serde(default = "LoggingConfig::default_stderr")]
    pub stderr: bool,

    /// Append logs to the given file path.
    ///
    /// If the file cannot be opened, file logging is disabled while stderr
    /// logging stays active.
    #[serde(default)]
    #[schemars(with = "Option<String>")]
    pub file: Option<PathBuf>,
}

impl LoggingConfig {
    fn default_level() -> String {
        "info".to_owned()
    }

    fn default_stderr() -> bool {
        true
    }

    pub(crate) fn normalize_level_directives(input: &str) -> String {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Self::default_level();
        }

        match trimmed.to_ascii_lowercase().as_str() {
            "trace" => "trace".to_owned(),
            "debug" => "debug".to_owned(),
            "info" => "info".to_owned(),
            "warn" | "warning" => "warn".to_owned(),
            "error" => "error".to_owned(),
            _ => trimmed.to_owned(),
        }
    }

    fn config_env_filter(&self) -> tracing_subscriber::EnvFilter {
        let directives = Self::normalize_level_directives(&self.level);
        tracing_subscriber::EnvFilter::try_new(directives).unwrap_or_else(|_| {
            tracing_subscriber::EnvFilter::default()
                .add_directive(tracing_subscriber::filter::LevelFilter::INFO.into())
        })
    }

    /// The effective filter: the configured level, with `RUST_LOG`
    /// directives merged in when set.
    pub fn env_filter(&self) -> tracing_subscriber::EnvFilter {
        let env_directives = std::env::var("RUST_LOG")
            .ok()
            .map(|value| value.trim().to_owned())
            .filter(|value| !value.is_empty());

        let config_directives = Self::normalize_level_directives(&self.level);

        match env_directives {
            Some(env_directives) => {
                let combined = format!("{config_directives},{env_directives}");
                tracing_subscriber::EnvFilter::try_new(combined)
                    .or_else(|_| tracing_subscriber::EnvFilter::try_new(env_directives))
                    .unwrap_or_else(|_| self.config_env_filter())
            }
            None => self.config_env_filter(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Self::default_level(),
            json: false,
            stderr: Self::default_stderr(),
            file: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
#[schemars(deny_unknown_fields)]
pub struct ParserConfig {
    /// Tokens a cached prediction may span.
    #[serde(default = "ParserConfig::default_prediction_window")]
    #[schemars(range(min = 1))]
    pub prediction_window: usize,

    /// Run the fast cached pass before the exhaustive one.
    #[serde(default = "ParserConfig::default_sll_first")]
    pub sll_first: bool,
}

impl ParserConfig {
    fn default_prediction_window() -> usize {
        DEFAULT_PREDICTION_WINDOW
    }

    fn default_sll_first() -> bool {
        true
    }

    /// Parser options for these settings. A zero window is treated as one.
    pub fn parse_options(&self) -> ParseOptions {
        ParseOptions {
            prediction_window: self.prediction_window.max(1),
            sll_first: self.sll_first,
        }
    }
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            prediction_window: Self::default_prediction_window(),
            sll_first: Self::default_sll_first(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse toml config: {0}")]
    Toml(String),
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        let message = err.message().trim_end().to_owned();
        match err.span() {
            Some(span) => ConfigError::Toml(format!("{message} at bytes {}..{}", span.start, span.end)),
            None => ConfigError::Toml(message),
        }
    }
}

impl GravelConfig {
    pub fn load_from_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config = Self::load_from_str(&text)?;
        tracing::debug!(target: "gravel.config", path = %path.display(), "loaded config");
        Ok(config)
    }
}

/// Locate the config for `dir`: `$GRAVEL_CONFIG` when set (relative paths
/// resolve against `dir`), else the first of [`CONFIG_FILE_NAMES`] present in
/// `dir`.
pub fn discover_config_path(dir: &Path) -> Option<PathBuf> {
    if let Some(value) = std::env::var_os(GRAVEL_CONFIG_ENV_VAR).filter(|value| !value.is_empty()) {
        let path = PathBuf::from(value);
        return Some(if path.is_absolute() { path } else { dir.join(path) });
    }

    CONFIG_FILE_NAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|candidate| candidate.is_file())
}

/// Load the config discovered for `dir`, or the defaults when there is none.
pub fn load_for_dir(dir: &Path) -> Result<(GravelConfig, Option<PathBuf>), ConfigError> {
    let Some(path) = discover_config_path(dir) else {
        return Ok((GravelConfig::default(), None));
    };
    let config = GravelConfig::load_from_path(&path)?;
    Ok((config, Some(path)))
}

struct FileMakeWriter {
    file: Arc<Mutex<std::fs::File>>,
}

impl<'a> MakeWriter<'a> for FileMakeWriter {
    type Writer = FileWriter<'a>;

    fn make_writer(&'a self) -> Self::Writer {
        FileWriter {
            guard: self.file.lock(),
        }
    }
}

struct FileWriter<'a> {
    guard: parking_lot::MutexGuard<'a, std::fs::File>,
}

impl Write for FileWriter<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.guard.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.guard.flush()
    }
}

static TRACING_INIT: Once = Once::new();

/// Installs the global `tracing` subscriber.
///
/// Safe to call multiple times; only the first call installs a subscriber.
pub fn init_tracing(config: &LoggingConfig) {
    TRACING_INIT.call_once(|| {
        let filter = config.env_filter();

        let file = config
            .file
            .as_ref()
            .and_then(|path| {
                std::fs::OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(path)
                    .ok()
            })
            .map(|file| Arc::new(Mutex::new(file)));
        let file_open_failed = config.file.is_some() && file.is_none();

        let make_writer = match (config.stderr, file) {
            (true, Some(file)) => BoxMakeWriter::new(io::stderr.and(FileMakeWriter { file })),
            (false, Some(file)) => BoxMakeWriter::new(FileMakeWriter { file }),
            (true, None) => BoxMakeWriter::new(io::stderr),
            (false, None) => BoxMakeWriter::new(io::sink),
        };

        let layer: Box<dyn tracing_subscriber::Layer<_> + Send + Sync> = if config.json {
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(make_writer)
                .with_ansi(false)
                .boxed()
        } else {
            tracing_subscriber::fmt::layer()
                .with_writer(make_writer)
                .with_ansi(false)
                .boxed()
        };

        let installed = tracing_subscriber::registry()
            .with(filter)
            .with(layer)
            .try_init()
            .is_ok();

        if installed && file_open_failed {
            if let Some(path) = &config.file {
                tracing::warn!(
                    target: "gravel.config",
                    path = %path.display(),
                    "failed to open log file; file logging disabled"
                );
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_synonyms_normalize() {
        assert_eq!(LoggingConfig::normalize_level_directives(" WARNING "), "warn");
        assert_eq!(LoggingConfig::normalize_level_directives(""), "info");
        assert_eq!(
            LoggingConfig::normalize_level_directives("gravel.ast=trace"),
            "gravel.ast=trace"
        );
    }

    #[test]
    fn zero_window_is_clamped() {
        let parser = ParserConfig {
            prediction_window: 0,
            sll_first: false,
        };
        let options = parser.parse_options();
        assert_eq!(options.prediction_window, 1);
        assert!(!options.sll_first);
    }
}
