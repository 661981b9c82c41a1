//! Console backend of the `log` facade.
//!
//! Messages below [`Level::Warning`] go to stdout, the others to stderr.
use chrono::{DateTime, Duration, Local};
use env_logger::{fmt::Formatter, Builder, Env, Logger, Target};
use log::{Log, Metadata, Record, SetLoggerError};
use rlog_core::{Level, LoggerConfig};
use std::io::{self, Write};

/// Lets through messages strictly below a level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaxLevelFilter {
    level: Level,
}

impl MaxLevelFilter {
    /// Lets through messages below `level`.
    pub fn new(level: Level) -> Self {
        Self { level }
    }

    /// Returns `true` if a message at `level` passes.
    pub fn admits(&self, level: Level) -> bool {
        level < self.level
    }
}

/// Renders the time elapsed since start as `HH:MM:SS`, hours growing past 24.
pub(crate) fn relative_time(elapsed: Duration) -> String {
    let secs = elapsed.num_seconds();
    format!("{:02}:{:02}:{:02}", secs / 3600, secs / 60 % 60, secs % 60)
}

fn line_format(
    start: DateTime<Local>,
    relative: bool,
) -> impl Fn(&mut Formatter, &Record) -> io::Result<()> + Sync + Send + 'static {
    move |buf, record| {
        let time = if relative {
            relative_time(Local::now() - start)
        } else {
            Local::now().format("%H:%M:%S").to_string()
        };
        let letter = Level::from_log_level(record.level()).letter();
        writeln!(buf, "{} [{}] {}: {}", time, letter, record.target(), record.args())
    }
}

/// Two `env_logger` loggers, split on [`Level::Warning`].
pub(crate) struct Console {
    stdout: Logger,
    stderr: Logger,
    stdout_filter: MaxLevelFilter,
}

impl Console {
    /// Lines look like `14:03:27 [I] dqn: message`. `RUST_LOG` overrides the
    /// configured level.
    pub(crate) fn new(config: &LoggerConfig) -> Self {
        let start = Local::now();
        let filter = config.level.to_level_filter().to_string();
        let build = |target: Target| {
            let mut builder = Builder::from_env(Env::default().default_filter_or(filter.clone()));
            builder
                .target(target)
                .format(line_format(start, config.relative_time));
            builder.build()
        };

        Self {
            stdout: build(Target::Stdout),
            stderr: build(Target::Stderr),
            stdout_filter: MaxLevelFilter::new(Level::Warning),
        }
    }

    /// Installs the console as the backend of the `log` facade.
    pub(crate) fn install(self) -> Result<(), SetLoggerError> {
        let max_level = self.stdout.filter().max(self.stderr.filter());
        log::set_boxed_logger(Box::new(self))?;
        log::set_max_level(max_level);
        Ok(())
    }

    fn is_stdout(&self, level: log::Level) -> bool {
        self.stdout_filter.admits(Level::from_log_level(level))
    }

    fn logger(&self, level: log::Level) -> &Logger {
        if self.is_stdout(level) {
            &self.stdout
        } else {
            &self.stderr
        }
    }
}

impl Log for Console {
    fn enabled(&self, metadata: &Metadata) -> bool {
        self.logger(metadata.level()).enabled(metadata)
    }

    fn log(&self, record: &Record) {
        self.logger(record.level()).log(record)
    }

    fn flush(&self) {
        self.stdout.flush();
        self.stderr.flush();
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_filter_below_level() {
        assert!(MaxLevelFilter::new(Level::Warning).admits(Level::Info));
    }

    #[test]
    fn test_filter_at_level() {
        assert!(!MaxLevelFilter::new(Level::Warning).admits(Level::Warning));
    }

    #[test]
    fn test_filter_above_level() {
        assert!(!MaxLevelFilter::new(Level::Warning).admits(Level::Error));
    }

    #[test]
    fn test_filter_with_debug_level() {
        assert!(!MaxLevelFilter::new(Level::Debug).admits(Level::Debug));
    }

    #[test]
    fn test_filter_with_info_level() {
        assert!(MaxLevelFilter::new(Level::Info).admits(Level::Debug));
    }

    #[test]
    fn test_filter_with_trace_level() {
        assert!(MaxLevelFilter::new(Level::Info).admits(Level::Trace));
    }

    #[test]
    fn test_streams() {
        let console = Console::new(&LoggerConfig::new("dqn").level(Level::Debug));
        for level in [Level::Debug, Level::Trace, Level::Info] {
            assert!(console.is_stdout(level.to_log_level()));
        }
        for level in [Level::Warning, Level::Error] {
            assert!(!console.is_stdout(level.to_log_level()));
        }
    }

    #[test]
    fn test_relative_time() {
        let cases = [
            (90_000, "00:01:30"),
            (0, "00:00:00"),
            (86_400_000, "24:00:00"),
            (93_600_000, "26:00:00"),
            (180_000_000, "50:00:00"),
            (366_000, "00:06:06"),
            (1_500, "00:00:01"),
            (3_600_000_000, "1000:00:00"),
            (3_661_000, "01:01:01"),
        ];
        for (ms, expected) in cases {
            assert_eq!(relative_time(Duration::milliseconds(ms)), expected);
        }
    }
}
