//! Experiment logging with windowed metric summaries.
//!
//! This crate bundles [`rlog_core`] with the Tensorboard sink and sets up the
//! console backend of the `log` facade.
//!
//! ```no_run
//! use rlog::{
//!     metric::{MetricConfig, MetricKind},
//!     record::Record,
//!     LoggerConfig,
//! };
//!
//! # fn main() -> anyhow::Result<()> {
//! let config = LoggerConfig::new("dqn")
//!     .path("./results/dqn")
//!     .tensorboard(true)
//!     .metrics(vec![
//!         MetricConfig::new(MetricKind::Sum, "ep_cnt").inputs(["done"]).resettable(false),
//!         MetricConfig::new(MetricKind::Average, "R/ep").inputs(["reward", "done"]),
//!     ]);
//! let mut rlog = rlog::init(&config)?;
//!
//! for step in 1..=1000 {
//!     rlog.put(&Record::empty().with("reward", 1.0).with("done", step % 100 == 0))?;
//!     if step % 250 == 0 {
//!         rlog.trace_and_log(step, true)?;
//!     }
//! }
//! # Ok(())
//! # }
//! ```
mod console;
use anyhow::Result;
use console::Console;
pub use console::MaxLevelFilter;

pub use rlog_core::{
    accumulator, error, expr, format, logger, metric, record, Accumulator, Level, LoggerConfig,
    RLogger, RlogError, SharedLogger, Summary,
};
pub use rlog_tensorboard::TensorboardRecorder;

/// Sets up the console backend and constructs the logger described by `config`.
///
/// Console lines look like `14:03:27 [I] dqn: message`, or `00:05:12 [I] dqn:
/// message` with `relative_time`. Messages below [`Level::Warning`] go to
/// stdout, the others to stderr. `RUST_LOG` overrides the configured level,
/// with `debug` and `trace` naming [`Level::Trace`] and [`Level::Debug`]
/// respectively, see [`Level::to_log_level`]. If a backend is already
/// installed it is kept.
///
/// With a `path`, the sinks of [`RLogger::from_config`] are added, and a
/// [`TensorboardRecorder`] writing into the same directory if `tensorboard`
/// is set.
pub fn init(config: &LoggerConfig) -> Result<RLogger> {
    if Console::new(config).install().is_err() {
        log::debug!("Console backend is already initialized");
    }

    let mut logger = RLogger::from_config(config)?;
    if config.tensorboard {
        match &config.path {
            Some(path) => logger.add_recorder(Box::new(TensorboardRecorder::new(path))),
            None => log::warn!("Tensorboard requires a log directory, {} has none", config.name),
        }
    }
    Ok(logger)
}
