use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Severity of a message.
///
/// `Trace` sits between `Debug` and `Info`: structured records are emitted at
/// this level, so a logger at `Info` keeps them off the console while sinks
/// at `Trace` still receive them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    /// Diagnostics.
    Debug,
    /// Structured records and detailed progress.
    Trace,
    /// Application level messages.
    Info,
    /// Something unexpected happened.
    Warning,
    /// An operation failed.
    Error,
}

impl Level {
    /// First letter of the level name, as shown in log lines.
    pub fn letter(&self) -> char {
        match self {
            Level::Debug => 'D',
            Level::Trace => 'T',
            Level::Info => 'I',
            Level::Warning => 'W',
            Level::Error => 'E',
        }
    }

    /// The corresponding level of the `log` facade.
    ///
    /// `log` ranks its `Trace` as the most verbose level, so `Debug` maps to
    /// `log::Level::Trace` and `Trace` to `log::Level::Debug`. Filters such as
    /// `RUST_LOG=debug` then keep the order of this enum.
    pub fn to_log_level(&self) -> log::Level {
        match self {
            Level::Debug => log::Level::Trace,
            Level::Trace => log::Level::Debug,
            Level::Info => log::Level::Info,
            Level::Warning => log::Level::Warn,
            Level::Error => log::Level::Error,
        }
    }

    /// Inverse of [`Level::to_log_level`].
    pub fn from_log_level(level: log::Level) -> Self {
        match level {
            log::Level::Trace => Level::Debug,
            log::Level::Debug => Level::Trace,
            log::Level::Info => Level::Info,
            log::Level::Warn => Level::Warning,
            log::Level::Error => Level::Error,
        }
    }

    /// The `log` filter letting through messages at or above this level.
    pub fn to_level_filter(&self) -> log::LevelFilter {
        self.to_log_level().to_level_filter()
    }
}

impl Default for Level {
    fn default() -> Self {
        Level::Info
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Level::Debug => "DEBUG",
            Level::Trace => "TRACE",
            Level::Info => "INFO",
            Level::Warning => "WARNING",
            Level::Error => "ERROR",
        };
        f.write_str(s)
    }
}

impl FromStr for Level {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "debug" => Ok(Level::Debug),
            "trace" => Ok(Level::Trace),
            "info" => Ok(Level::Info),
            "warning" | "warn" => Ok(Level::Warning),
            "error" => Ok(Level::Error),
            _ => Err(anyhow::anyhow!("Unknown level: {}", s)),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_order() {
        assert!(Level::Debug < Level::Trace);
        assert!(Level::Trace < Level::Info);
        assert!(Level::Warning < Level::Error);
        assert_eq!("WARN".parse::<Level>().unwrap(), Level::Warning);
        assert!("verbose".parse::<Level>().is_err());
    }

    #[test]
    fn test_log_levels_keep_order() {
        let levels = [
            Level::Debug,
            Level::Trace,
            Level::Info,
            Level::Warning,
            Level::Error,
        ];
        for pair in levels.windows(2) {
            // `log` ranks more verbose levels higher
            assert!(pair[0].to_log_level() > pair[1].to_log_level());
        }
        for level in levels {
            assert_eq!(Level::from_log_level(level.to_log_level()), level);
        }

        let filter = Level::Trace.to_level_filter();
        assert!(Level::Trace.to_log_level() <= filter);
        assert!(Level::Info.to_log_level() <= filter);
        assert!(Level::Debug.to_log_level() > filter);
    }
}
