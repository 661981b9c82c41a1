//! A named logger combining text messages, metric aggregation and sinks.
mod config;
mod level;

use crate::{
    accumulator::{Accumulator, Summary},
    error::RlogError,
    format::SummaryFormatter,
    metric::{Arg, Metric, MetricConfig},
    record::{BlobRecorder, Record, Recorder, TextFileRecorder},
};
use anyhow::Result;
pub use config::LoggerConfig;
pub use level::Level;
use std::sync::{Arc, Mutex};

/// A logger shared between threads.
///
/// The mutex covers the whole logger, so that tracing, summarizing and
/// resetting never interleave.
pub type SharedLogger = Arc<Mutex<RLogger>>;

/// A named logger.
///
/// Text messages go to the `log` facade, with the logger name as target, and
/// to every [`Recorder`] admitting their level. Structured records go to the
/// recorders only.
///
/// Metrics are optional: the [`Accumulator`] is created by the first call to
/// [`RLogger::add_metrics`], and the aggregation methods fail with
/// [`RlogError::NoMetricsError`] before that.
///
/// ```rust
/// use rlog_core::{
///     metric::{Average, MetricSpec, Sum},
///     record::{BufferedRecorder, Record},
///     RLogger,
/// };
///
/// # fn main() -> anyhow::Result<()> {
/// let recorder = BufferedRecorder::new();
/// let mut rlog = RLogger::new("dqn").with_recorder(recorder.clone());
/// rlog.add_metric(Sum::new(MetricSpec::new("ep_cnt").resettable(false).inputs(["done"]))?);
/// rlog.add_metric(Average::new(MetricSpec::new("R/ep").inputs(["reward", "done"]))?);
///
/// for step in 1..=100 {
///     rlog.put(&Record::empty().with("reward", 1.0).with("done", step % 10 == 0))?;
///     if step % 50 == 0 {
///         rlog.trace_and_log(step, true)?;
///     }
/// }
/// assert_eq!(recorder.records().len(), 2);
/// # Ok(())
/// # }
/// ```
pub struct RLogger {
    name: String,
    level: Level,
    accumulator: Option<Accumulator>,
    recorders: Vec<Box<dyn Recorder>>,
    formatter: SummaryFormatter,
}

impl RLogger {
    /// Constructs a logger at [`Level::Info`] without recorders and metrics.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            level: Level::Info,
            accumulator: None,
            recorders: vec![],
            formatter: SummaryFormatter::new(),
        }
    }

    /// Constructs a logger from its configuration.
    ///
    /// With a `path`, the directory is created and a [`TextFileRecorder`] is
    /// added, plus a [`BlobRecorder`] if `blob` is set. The Tensorboard sink
    /// and the console backend are set up by the `rlog` crate.
    pub fn from_config(config: &LoggerConfig) -> Result<Self> {
        let mut logger = Self::new(config.name.clone()).with_level(config.level);

        if let Some(path) = &config.path {
            std::fs::create_dir_all(path)?;
            logger.add_recorder(Box::new(TextFileRecorder::new(path, config.level)?));
            if config.blob {
                logger.add_recorder(Box::new(BlobRecorder::new(path)));
            }
        }

        if !config.metrics.is_empty() {
            logger.add_metrics(MetricConfig::build_all(&config.metrics)?);
        }

        Ok(logger)
    }

    /// Sets the minimum level of text messages.
    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Adds a recorder.
    pub fn with_recorder(mut self, recorder: impl Recorder + 'static) -> Self {
        self.recorders.push(Box::new(recorder));
        self
    }

    /// Adds a recorder.
    pub fn add_recorder(&mut self, recorder: Box<dyn Recorder>) {
        self.recorders.push(recorder);
    }

    /// Sets the formatter of [`RLogger::trace_and_log`].
    pub fn set_formatter(&mut self, formatter: SummaryFormatter) {
        self.formatter = formatter;
    }

    /// Name of the logger.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Minimum level of text messages.
    pub fn level(&self) -> Level {
        self.level
    }

    /// A logger named `<name>.<suffix>` with the same level, without recorders
    /// and metrics.
    pub fn child(&self, suffix: &str) -> Self {
        Self::new(format!("{}.{}", self.name, suffix)).with_level(self.level)
    }

    /// Wraps the logger for use from several threads.
    pub fn into_shared(self) -> SharedLogger {
        Arc::new(Mutex::new(self))
    }

    /// Logs a text message.
    pub fn log(&mut self, level: Level, message: impl AsRef<str>) -> Result<()> {
        if level < self.level {
            return Ok(());
        }
        let message = message.as_ref();
        log::log!(target: self.name.as_str(), level.to_log_level(), "{}", message);

        for recorder in self.recorders.iter_mut() {
            if level >= recorder.min_level() {
                recorder.write_text(&self.name, level, message)?;
            }
        }
        Ok(())
    }

    /// Logs a message at [`Level::Debug`].
    pub fn debug(&mut self, message: impl AsRef<str>) -> Result<()> {
        self.log(Level::Debug, message)
    }

    /// Logs a message at [`Level::Trace`].
    pub fn trace(&mut self, message: impl AsRef<str>) -> Result<()> {
        self.log(Level::Trace, message)
    }

    /// Logs a message at [`Level::Info`].
    pub fn info(&mut self, message: impl AsRef<str>) -> Result<()> {
        self.log(Level::Info, message)
    }

    /// Logs a message at [`Level::Warning`].
    pub fn warning(&mut self, message: impl AsRef<str>) -> Result<()> {
        self.log(Level::Warning, message)
    }

    /// Logs a message at [`Level::Error`].
    pub fn error(&mut self, message: impl AsRef<str>) -> Result<()> {
        self.log(Level::Error, message)
    }

    /// Hands a structured record to the recorders admitting [`Level::Trace`].
    ///
    /// Step-keyed recorders require the record to carry a `step`.
    pub fn trace_record(&mut self, record: &Record) -> Result<()> {
        if Level::Trace >= self.level {
            log::log!(target: self.name.as_str(), Level::Trace.to_log_level(), "{:?}", record);
        }
        for recorder in self.recorders.iter_mut() {
            if Level::Trace >= recorder.min_level() {
                recorder.write(&self.name, record)?;
            }
        }
        Ok(())
    }

    /// Adds metrics. The first call creates the accumulator.
    pub fn add_metrics(&mut self, metrics: impl IntoIterator<Item = Box<dyn Metric>>) {
        match self.accumulator.as_mut() {
            Some(acc) => acc.add_metrics(metrics),
            None => self.accumulator = Some(Accumulator::with_metrics(metrics)),
        }
    }

    /// Adds a single metric.
    pub fn add_metric(&mut self, metric: impl Metric + 'static) {
        self.add_metrics([Box::new(metric) as Box<dyn Metric>]);
    }

    /// The accumulator, if metrics were added.
    pub fn accumulator(&self) -> Option<&Accumulator> {
        self.accumulator.as_ref()
    }

    fn accumulator_mut(&mut self) -> Result<&mut Accumulator, RlogError> {
        let name = &self.name;
        self.accumulator
            .as_mut()
            .ok_or_else(|| RlogError::NoMetricsError(name.clone()))
    }

    /// Dispatches an event to the metrics, see [`Accumulator::trace`].
    pub fn put(&mut self, event: &Record) -> Result<(), RlogError> {
        self.accumulator_mut()?.trace(event)
    }

    /// Accumulates into a metric directly, see [`Accumulator::accumulate`].
    pub fn accumulate(&mut self, name: &str, args: &[Arg]) -> Result<(), RlogError> {
        self.accumulator_mut()?.accumulate(name, args)
    }

    /// Summarizes the metrics, see [`Accumulator::summarize`].
    pub fn summarize(&mut self) -> Result<Summary, RlogError> {
        Ok(self.accumulator_mut()?.summarize())
    }

    /// Resets the metrics.
    pub fn reset(&mut self) -> Result<(), RlogError> {
        self.accumulator_mut()?.reset();
        Ok(())
    }

    /// Summarizes the metrics, logs the summary as a line at [`Level::Info`],
    /// hands it with `step` to the recorders and optionally resets the
    /// metrics.
    pub fn trace_and_log(&mut self, step: i64, with_reset: bool) -> Result<Summary> {
        let summary = self.summarize()?;
        let line = self.formatter.format(step, &summary);
        self.info(line)?;
        self.trace_record(&summary.to_record(step))?;
        if with_reset {
            self.reset()?;
        }
        Ok(summary)
    }

    /// Flushes every recorder.
    pub fn flush(&mut self) -> Result<()> {
        for recorder in self.recorders.iter_mut() {
            recorder.flush()?;
        }
        Ok(())
    }
}

impl Drop for RLogger {
    fn drop(&mut self) {
        if let Err(e) = self.flush() {
            log::warn!("Failed to flush recorders of {}: {}", self.name, e);
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        metric::{Ema, MetricKind, MetricSpec, Sum, ValueCapture, ValueKind},
        record::{BufferedRecorder, RecordValue, STEP_KEY},
    };
    use tempdir::TempDir;
    use test_log::test;

    fn logger() -> (RLogger, BufferedRecorder) {
        let recorder = BufferedRecorder::new();
        let logger = RLogger::new("test")
            .with_level(Level::Trace)
            .with_recorder(recorder.clone());
        (logger, recorder)
    }

    #[test]
    fn test_levels() -> Result<()> {
        let recorder = BufferedRecorder::new();
        let mut logger = RLogger::new("test").with_recorder(recorder.clone());

        logger.debug("debug")?;
        logger.trace("trace")?;
        logger.info("info")?;
        logger.warning("warning")?;
        logger.error("error")?;

        let levels: Vec<_> = recorder.texts().iter().map(|t| t.level).collect();
        assert_eq!(levels, vec![Level::Info, Level::Warning, Level::Error]);
        assert!(recorder.texts().iter().all(|t| t.logger == "test"));
        Ok(())
    }

    #[test]
    fn test_trace_record() -> Result<()> {
        let (mut logger, recorder) = logger();
        logger.trace_record(&Record::empty().with("step", 1).with("aux_loss", 7.23))?;

        let records = recorder.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].0, "test");
        assert_eq!(records[0].1.get_scalar("aux_loss")?, 7.23);
        Ok(())
    }

    #[test]
    fn test_no_metrics() {
        let (mut logger, _) = logger();
        let err = RlogError::NoMetricsError("test".to_string());
        assert_eq!(logger.put(&Record::from_scalar("reward", 1.0)), Err(err.clone()));
        assert_eq!(logger.summarize(), Err(err.clone()));
        assert_eq!(logger.reset(), Err(err.clone()));
        assert!(logger.trace_and_log(1, true).is_err());
        assert!(err.to_string().contains("add_metrics"));
    }

    #[test]
    fn test_trace_and_log() -> Result<()> {
        let (mut logger, recorder) = logger();
        logger.add_metric(Sum::new(MetricSpec::new("ep_cnt").resettable(false).inputs(["done"]))?);
        logger.add_metric(ValueCapture::new(
            MetricSpec::new("sample")
                .inputs(["sample"])
                .value_kind(ValueKind::Histogram),
        )?);
        logger.add_metric(Ema::new(MetricSpec::new("ewm R/ep").inputs(["reward", "done"]), 0.5)?);

        for (r, done) in [(10.0, true), (0.0, false)] {
            logger.put(&Record::empty().with("reward", r).with("done", done).with("sample", r))?;
        }
        let summary = logger.trace_and_log(10, true)?;
        assert_eq!(summary.get_scalar("ewm R/ep"), Some(10.0));
        assert_eq!(summary.get_scalar("ep_cnt"), Some(1.0));

        logger.put(&Record::empty().with("reward", 20.0).with("done", true).with("sample", 1.0))?;
        let summary = logger.trace_and_log(20, false)?;
        assert_eq!(summary.get_scalar("ewm R/ep"), Some(15.0));
        assert_eq!(summary.get("sample"), Some(&RecordValue::Array1(vec![1.0])));

        let texts = recorder.texts();
        assert_eq!(texts.len(), 2);
        assert_eq!(
            texts[0].message,
            "[000010]   ep_cnt=1.00, ewm R/ep=10.00"
        );

        let records = recorder.records();
        assert_eq!(records.len(), 2);
        let (_, last) = &records[1];
        assert_eq!(last.get_scalar(STEP_KEY)?, 20.0);
        assert_eq!(last.value_kind_of("sample"), ValueKind::Histogram);

        // not reset the second time
        assert!(logger.summarize()?.get("sample").is_some());
        Ok(())
    }

    #[test]
    fn test_from_config() -> Result<()> {
        let dir = TempDir::new("rlogger")?;
        let config = LoggerConfig::new("dqn.agent")
            .path(dir.path().join("run"))
            .metrics(vec![
                MetricConfig::new(MetricKind::Sum, "ep_cnt").inputs(["done"])
            ]);
        let mut logger = RLogger::from_config(&config)?;
        logger.info("hello")?;
        logger.put(&Record::empty().with("done", true))?;
        logger.trace_and_log(1, true)?;
        logger.flush()?;

        let text = std::fs::read_to_string(dir.path().join("run").join("log.log"))?;
        assert!(text.contains("[I] dqn.agent: hello"));
        assert!(text.contains("[000001]   ep_cnt=1.00"));

        let blob = BlobRecorder::load(dir.path().join("run").join("dqn_agent.bin"))?;
        assert_eq!(blob.series["ep_cnt"][0].step, 1);
        assert_eq!(blob.text.len(), 2);
        Ok(())
    }

    #[test]
    fn test_child() {
        let (logger, _) = logger();
        let child = logger.child("agent");
        assert_eq!(child.name(), "test.agent");
        assert_eq!(child.level(), Level::Trace);
        assert!(child.accumulator().is_none());
    }

    #[test]
    fn test_shared() -> Result<()> {
        let (mut logger, recorder) = logger();
        logger.add_metric(Sum::new(MetricSpec::new("frames").inputs(["frame_no"]))?);
        let shared = logger.into_shared();

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let shared = shared.clone();
                std::thread::spawn(move || {
                    for _ in 0..100 {
                        let mut logger = shared.lock().unwrap();
                        logger.put(&Record::empty().with("frame_no", 1)).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let summary = shared.lock().unwrap().trace_and_log(400, true)?;
        assert_eq!(summary.get_scalar("frames"), Some(400.0));
        assert_eq!(recorder.records().len(), 1);
        Ok(())
    }
}
