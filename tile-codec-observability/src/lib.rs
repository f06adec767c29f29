#![doc = include_str!("../README.md")]

use std::collections::HashMap;
use std::fs::File;
use std::io::Read as _;
use std::path::{Path, PathBuf};

use tracing::Level;
use tracing_subscriber::EnvFilter;

#[derive(thiserror::Error, Debug)]
pub enum ObservabilityError {
    #[error("The global logger has already been set: {0}")]
    LoggerAlreadySet(#[from] log::SetLoggerError),

    #[error("The global tracing subscriber has already been set: {0}")]
    SubscriberAlreadySet(#[from] tracing::subscriber::SetGlobalDefaultError),
}

#[derive(Default)]
pub struct Observability {
    filter: EnvFilter,
    log_format: LogFormatOptions,
}

impl Observability {
    /// Transform [`log`](https://docs.rs/log) records into [`tracing`](https://docs.rs/tracing) [`Event`](tracing::Event)s.
    ///
    /// Fails if the global `log`-logger has already been set.
    pub fn with_initialised_log_tracing(self) -> Result<Self, ObservabilityError> {
        let mut builder = tracing_log::LogTracer::builder()
            .with_interest_cache(tracing_log::InterestCacheConfig::default());
        if let Some(max_level) = self.max_log_level() {
            builder = builder.with_max_level(max_level);
        }
        builder.init()?;
        Ok(self)
    }

    fn max_log_level(&self) -> Option<log::LevelFilter> {
        let level = self.filter.max_level_hint()?.into_level();
        Some(match level {
            None => log::LevelFilter::Off,
            Some(Level::ERROR) => log::LevelFilter::Error,
            Some(Level::WARN) => log::LevelFilter::Warn,
            Some(Level::INFO) => log::LevelFilter::Info,
            Some(Level::DEBUG) => log::LevelFilter::Debug,
            Some(Level::TRACE) => log::LevelFilter::Trace,
        })
    }

    /// Set the global subscriber for the application.
    ///
    /// Fails if a global subscriber has already been set.
    pub fn set_global_subscriber(self) -> Result<(), ObservabilityError> {
        use tracing::subscriber::set_global_default;
        use tracing_subscriber::fmt::Layer;
        use tracing_subscriber::prelude::*;

        // logs go to stderr, stdout carries the converted tiles
        let layer = Layer::default().with_writer(std::io::stderr);
        let registry = tracing_subscriber::registry().with(self.filter);
        match self.log_format {
            LogFormatOptions::Full => set_global_default(registry.with(layer)),
            LogFormatOptions::Compact => set_global_default(registry.with(layer.compact())),
            LogFormatOptions::Pretty => set_global_default(registry.with(layer.pretty())),
            LogFormatOptions::Json => set_global_default(registry.with(layer.json())),
        }?;
        Ok(())
    }
}

impl From<(EnvFilter, LogFormatOptions)> for Observability {
    fn from((filter, log_format): (EnvFilter, LogFormatOptions)) -> Self {
        Self { filter, log_format }
    }
}

#[derive(PartialEq, Eq, Clone, Copy, Default, Debug, clap::ValueEnum)]
pub enum LogFormatOptions {
    /// Emit human-readable, single-line logs.
    /// See [here for a sample](https://docs.rs/tracing-subscriber/latest/tracing_subscriber/fmt/format/struct.Full.html#example-output)
    Full,
    /// A variant of the full-format, optimized for short line lengths.
    /// See [here for a sample](https://docs.rs/tracing-subscriber/latest/tracing_subscriber/fmt/format/struct.Compact.html#example-output)
    #[default]
    Compact,
    /// Excessively pretty, multi-line logs for local development/debugging, prioritizing readability over compact storage.
    /// See [here for a sample](https://docs.rs/tracing-subscriber/latest/tracing_subscriber/fmt/format/struct.Pretty.html#example-output)
    #[value(alias = "verbose")]
    Pretty,
    /// Output newline-delimited (structured) JSON logs, ***not*** optimized for human readability.
    /// See [here for a sample](https://docs.rs/tracing-subscriber/latest/tracing_subscriber/fmt/format/struct.Json.html#example-output)
    #[value(alias = "jsonl")]
    Json,
}

impl LogFormatOptions {
    fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "full" => Some(Self::Full),
            "pretty" | "verbose" => Some(Self::Pretty),
            "json" | "jsonl" => Some(Self::Json),
            "compact" => Some(Self::Compact),
            _ => None,
        }
    }
}

/// Log format lookup, the first source that yields a valid format wins.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct LogFormat(Option<LogFormatOptions>);

impl LogFormat {
    /// Search for the log format as an argument in the CLI
    ///
    /// Due to [`clap`] having a help function, it is not possible to use it.
    #[must_use]
    pub fn from_argument(argument: &str) -> Self {
        let args = std::env::args().collect::<Vec<String>>();
        Self(None).or_in_args(argument, &args)
    }

    fn or_in_args(mut self, argument: &str, args: &[String]) -> Self {
        if self.0.is_none()
            && let Some(v) = get_next_after_argument(argument, args)
        {
            self.0 = parse_or_warn(&v, &format!("cli argument {argument} {v}"));
        }
        self
    }

    /// Search for the log format at a key in the YAML config file following `argument` in the CLI
    #[must_use]
    pub fn or_in_config_file(self, argument: &str, key: &str) -> Self {
        let args = std::env::args().collect::<Vec<String>>();
        self.or_in_config_file_of(argument, key, &args)
    }

    fn or_in_config_file_of(mut self, argument: &str, key: &str, args: &[String]) -> Self {
        if self.0.is_none()
            && let Some(path) = get_next_after_argument(argument, args)
        {
            let path = PathBuf::from(path);
            if let Some(v) = read_path_in_file(&path, key) {
                self.0 = parse_or_warn(&v, &format!("option {key}: {v} inside {}", path.display()));
            }
        }
        self
    }

    /// Get the log format from an environment variable
    #[must_use]
    pub fn or_env_var(mut self, key: &str) -> Self {
        if self.0.is_none()
            && let Ok(v) = std::env::var(key)
        {
            self.0 = parse_or_warn(&v, &format!("environment variable {key}={v}"));
        }
        self
    }

    /// Sets a default
    #[must_use]
    pub fn or_default(self, default_format: LogFormatOptions) -> LogFormatOptions {
        self.0.unwrap_or(default_format)
    }
}

/// The subscriber does not exist yet, so there is no logger to report this to.
fn parse_or_warn(value: &str, source: &str) -> Option<LogFormatOptions> {
    let format = LogFormatOptions::parse(value);
    if format.is_none() {
        eprintln!(
            "Ignoring specified {source} as it is not a valid log format. Can be one of full, compact, pretty, json"
        );
    }
    format
}

/// Allows configuring log directives
///
/// See [here](https://docs.rs/tracing-subscriber/latest/tracing_subscriber/filter/struct.EnvFilter.html#example-syntax) for more information.
#[derive(Clone, PartialEq, Debug)]
pub struct LogLevel(Option<String>);

impl LogLevel {
    /// Search for the log level as an argument in the CLI
    ///
    /// Due to [`clap`] having a help function, it is not possible to use it.
    #[must_use]
    pub fn from_argument(argument: &str) -> Self {
        let args = std::env::args().collect::<Vec<String>>();
        Self(get_next_after_argument(argument, &args))
    }

    /// Search for the log level at a key in the YAML config file following `argument` in the CLI
    ///
    /// A missing or unreadable file is ignored.
    #[must_use]
    pub fn or_in_config_file(self, argument: &str, key: &str) -> Self {
        let args = std::env::args().collect::<Vec<String>>();
        self.or_in_config_file_of(argument, key, &args)
    }

    fn or_in_config_file_of(mut self, argument: &str, key: &str, args: &[String]) -> Self {
        if self.0.is_none()
            && let Some(path) = get_next_after_argument(argument, args)
        {
            self.0 = read_path_in_file(Path::new(&path), key);
        }
        self
    }

    /// Get log directives from an environment variable
    #[must_use]
    pub fn or_env_var(mut self, key: &str) -> Self {
        if self.0.is_none() {
            self.0 = std::env::var(key).ok();
        }
        self
    }

    /// Parse a [`EnvFilter`] from the directives found so far, ignoring any that are invalid.
    #[must_use]
    pub fn lossy_parse_to_filter_with_default(self, default_directives: &str) -> EnvFilter {
        let directives = self.0.unwrap_or_else(|| default_directives.to_string());
        EnvFilter::builder().parse_lossy(directives)
    }
}

/// Search for the argument following a certain argument in the cli
///
/// Both `--flag value` and `--flag=value` are recognised.
#[must_use]
fn get_next_after_argument(argument: &str, args: &[String]) -> Option<String> {
    let mut args = args.iter();
    let _ = args.next(); // first argument is binary
    while let Some(arg) = args.next() {
        if arg == argument {
            return args.next().cloned();
        }
        if let Some(value) = arg
            .strip_prefix(argument)
            .and_then(|rest| rest.strip_prefix('='))
        {
            return Some(value.to_string());
        }
    }
    None
}

/// Reads a string key from a yaml file at a path
///
/// All errors are ignored and return [`None`]
#[must_use]
fn read_path_in_file(path: &Path, key: &str) -> Option<String> {
    let mut config_file = Vec::new();
    let _ = File::open(path).ok()?.read_to_end(&mut config_file).ok()?;
    let map: HashMap<String, serde_yaml::Value> = serde_yaml::from_slice(&config_file).ok()?;
    map.get(key)?.as_str().map(str::to_string)
}
