//! Structured logging configuration.

use std::path::PathBuf;

use tracing_subscriber::EnvFilter;

/// Default filter when `RUST_LOG` is unset.
const DEFAULT_FILTER: &str = "multigit=warn";

/// Filter used with `--verbose` when `RUST_LOG` is unset.
const VERBOSE_FILTER: &str = "multigit=debug";

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Single-line human readable output.
    #[default]
    Compact,
    /// Multi-line human readable output.
    Pretty,
    /// Newline-delimited JSON.
    Json,
}

impl LogFormat {
    /// Parses a format name; unknown names fall back to compact.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "json" => Self::Json,
            "pretty" => Self::Pretty,
            _ => Self::Compact,
        }
    }
}

/// Logging configuration.
#[derive(Debug)]
pub struct LoggingConfig {
    /// Output format.
    pub format: LogFormat,
    /// Filter directives.
    pub filter: String,
    /// Optional file to append logs to instead of stderr.
    pub file: Option<PathBuf>,
}

impl LoggingConfig {
    /// Builds the configuration from the process environment.
    #[must_use]
    pub fn from_env(verbose: bool) -> Self {
        Self::from_lookup(verbose, |key| std::env::var(key).ok())
    }

    /// Builds the configuration using `lookup` to read variables.
    ///
    /// | Variable | Effect |
    /// |----------|--------|
    /// | `RUST_LOG` | Filter directives, overriding `verbose` |
    /// | `MULTIGIT_LOG_FORMAT` | `json`, `pretty` or compact (default) |
    /// | `MULTIGIT_LOG_FILE` | Append to this file instead of stderr |
    pub fn from_lookup<F>(verbose: bool, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let value = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let filter = value("RUST_LOG").unwrap_or_else(|| {
            if verbose {
                VERBOSE_FILTER.to_string()
            } else {
                DEFAULT_FILTER.to_string()
            }
        });

        Self {
            format: value("MULTIGIT_LOG_FORMAT").map_or_else(LogFormat::default, |f| LogFormat::parse(&f)),
            filter,
            file: value("MULTIGIT_LOG_FILE").map(PathBuf::from),
        }
    }

    /// Builds the [`EnvFilter`], falling back to the default directives when
    /// the configured ones do not parse.
    #[must_use]
    pub fn env_filter(&self) -> EnvFilter {
        EnvFilter::try_new(&self.filter).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
    }
}
