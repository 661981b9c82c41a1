//! Routing of events to metrics and windowed summaries.
use crate::{
    error::RlogError,
    expr::Expr,
    metric::{Arg, Metric, ValueKind},
    record::{Record, RecordValue, STEP_KEY, VALUE_KINDS_KEY},
};
use std::{collections::BTreeMap, collections::HashMap, fmt};
use xxhash_rust::xxh3::Xxh3Builder;

#[cfg_attr(doc, aquamarine::aquamarine)]
/// Owns a named set of [`Metric`]s and dispatches events to them.
///
/// ```mermaid
/// graph LR
///     E[Event] -->|trace| A[Accumulator]
///     A -->|resolve inputs| M1[Metric]
///     A -->|resolve inputs| M2[Metric]
///     M1 -->|summarize| S[Summary]
///     M2 -->|summarize| S
///     S --> R[Recorders]
/// ```
///
/// Metrics are kept in registration order. Adding a metric whose name is
/// already registered replaces the previous one in place: the last
/// registration wins and no error is raised.
///
/// ```rust
/// use rlog_core::{
///     accumulator::Accumulator,
///     metric::{Average, MetricSpec, Sum},
///     record::Record,
/// };
///
/// let mut acc = Accumulator::new();
/// acc.add(Sum::new(MetricSpec::new("ep_cnt").resettable(false).inputs(["done"]))?);
/// acc.add(Average::new(MetricSpec::new("R/ep").inputs(["reward", "done"]))?);
///
/// acc.trace(&Record::empty().with("reward", 2.0).with("done", false))?;
/// acc.trace(&Record::empty().with("reward", 4.0).with("done", true))?;
///
/// let summary = acc.summarize();
/// assert_eq!(summary.get_scalar("ep_cnt"), Some(1.0));
/// assert_eq!(summary.get_scalar("R/ep"), Some(6.0));
/// # Ok::<(), rlog_core::error::RlogError>(())
/// ```
#[derive(Default)]
pub struct Accumulator {
    metrics: Vec<Box<dyn Metric>>,
    index: HashMap<String, usize, Xxh3Builder>,
}

impl Accumulator {
    /// Constructs an empty accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Constructs an accumulator holding the given metrics.
    pub fn with_metrics(metrics: impl IntoIterator<Item = Box<dyn Metric>>) -> Self {
        let mut acc = Self::new();
        acc.add_metrics(metrics);
        acc
    }

    /// Adds metrics, replacing registered metrics of the same name.
    pub fn add_metrics(&mut self, metrics: impl IntoIterator<Item = Box<dyn Metric>>) {
        for metric in metrics {
            match self.index.get(metric.name()) {
                Some(&ix) => {
                    log::debug!("Replace metric '{}'", metric.name());
                    self.metrics[ix] = metric;
                }
                None => {
                    self.index.insert(metric.name().to_string(), self.metrics.len());
                    self.metrics.push(metric);
                }
            }
        }
    }

    /// Adds a single metric.
    pub fn add(&mut self, metric: impl Metric + 'static) {
        self.add_metrics([Box::new(metric) as Box<dyn Metric>]);
    }

    /// Returns the metric registered under `name`.
    pub fn get(&self, name: &str) -> Option<&dyn Metric> {
        self.index.get(name).map(|&ix| self.metrics[ix].as_ref())
    }

    /// Names of the registered metrics, in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.metrics.iter().map(|m| m.name())
    }

    /// Number of registered metrics.
    pub fn len(&self) -> usize {
        self.metrics.len()
    }

    /// Returns `true` if no metric is registered.
    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }

    /// Dispatches an event to the metrics interested in it.
    ///
    /// A metric is triggered, at most once, if any field read by its declared
    /// inputs is present in the event. All triggered metrics are resolved
    /// before any of them accumulates, so an error leaves every metric as it
    /// was.
    ///
    /// # Errors
    ///
    /// * [`RlogError::MissingFieldError`] if a triggered metric reads a field
    ///   that is absent from the event.
    /// * [`RlogError::RecordValueTypeError`] if a read field is not numeric.
    pub fn trace(&mut self, event: &Record) -> Result<(), RlogError> {
        let mut resolved = vec![];

        for (ix, metric) in self.metrics.iter().enumerate() {
            let inputs = metric.declared_inputs();
            let triggered = inputs
                .iter()
                .filter_map(Expr::field)
                .any(|field| event.contains_key(field));
            if !triggered {
                continue;
            }

            let args = inputs
                .iter()
                .map(|expr| expr.resolve(event))
                .collect::<Result<Vec<_>, _>>()?;
            metric.arity().check(metric.name(), args.len())?;
            resolved.push((ix, args));
        }

        for (ix, args) in resolved {
            self.metrics[ix].accumulate(&args)?;
        }
        Ok(())
    }

    /// Accumulates positional arguments into the named metric, bypassing
    /// expression resolution.
    ///
    /// # Errors
    ///
    /// [`RlogError::UnknownMetricError`] if `name` is not registered.
    pub fn accumulate(&mut self, name: &str, args: &[Arg]) -> Result<(), RlogError> {
        let ix = self.position(name)?;
        self.metrics[ix].accumulate(args)
    }

    /// Accumulates explicit updates into several metrics.
    ///
    /// Names and argument counts are checked before any metric is updated.
    pub fn accumulate_many<S: AsRef<str>>(
        &mut self,
        updates: &[(S, Vec<Arg>)],
    ) -> Result<(), RlogError> {
        let mut targets = Vec::with_capacity(updates.len());
        for (name, args) in updates {
            let ix = self.position(name.as_ref())?;
            let metric = &self.metrics[ix];
            metric.arity().check(metric.name(), args.len())?;
            targets.push(ix);
        }

        for (ix, (_, args)) in targets.into_iter().zip(updates) {
            self.metrics[ix].accumulate(args)?;
        }
        Ok(())
    }

    /// Values of the metrics updated since their last reset, and the value
    /// kind of every registered metric.
    ///
    /// Reading values may mutate metrics, see [`Ema`](crate::metric::Ema).
    pub fn summarize(&mut self) -> Summary {
        let mut values = vec![];
        let mut value_kinds = BTreeMap::new();

        for metric in self.metrics.iter_mut() {
            value_kinds.insert(metric.name().to_string(), metric.value_kind());
            if metric.updated() {
                if let Some(value) = metric.value().into_record_value() {
                    values.push((metric.name().to_string(), value));
                }
            }
        }

        Summary {
            values,
            value_kinds,
        }
    }

    /// Resets every metric. Non-resettable metrics keep their state.
    pub fn reset(&mut self) {
        for metric in self.metrics.iter_mut() {
            metric.reset();
        }
    }

    fn position(&self, name: &str) -> Result<usize, RlogError> {
        self.index
            .get(name)
            .copied()
            .ok_or_else(|| RlogError::UnknownMetricError(name.to_string()))
    }
}

impl fmt::Debug for Accumulator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Accumulator")
            .field("metrics", &self.metrics)
            .finish()
    }
}

/// Values of the updated metrics, in registration order, together with the
/// value kind of every registered metric.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Summary {
    values: Vec<(String, RecordValue)>,
    value_kinds: BTreeMap<String, ValueKind>,
}

impl Summary {
    /// Value of the named metric, if it was updated.
    pub fn get(&self, name: &str) -> Option<&RecordValue> {
        self.values.iter().find(|(k, _)| k == name).map(|(_, v)| v)
    }

    /// Scalar value of the named metric, if it was updated.
    pub fn get_scalar(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(RecordValue::as_scalar)
    }

    /// Iterates the values in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &RecordValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Value kind of every registered metric.
    pub fn value_kinds(&self) -> &BTreeMap<String, ValueKind> {
        &self.value_kinds
    }

    /// Number of values.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if no metric was updated.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Converts the summary into a record for sinks, adding [`STEP_KEY`] and
    /// the value kinds under [`VALUE_KINDS_KEY`].
    pub fn to_record(&self, step: i64) -> Record {
        let mut record: Record = self.values.iter().cloned().collect();
        record.insert(STEP_KEY, RecordValue::Scalar(step as f64));
        record.insert(
            VALUE_KINDS_KEY,
            RecordValue::ValueKinds(self.value_kinds.clone()),
        );
        record
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::metric::{Average, Ema, Fps, Max, MetricSpec, Sum, ValueCapture};

    fn accumulator() -> Accumulator {
        let mut acc = Accumulator::new();
        acc.add(Sum::new(MetricSpec::new("ep_cnt").resettable(false).inputs(["done"])).unwrap());
        acc.add(Average::new(MetricSpec::new("R/ep").inputs(["reward", "done"])).unwrap());
        acc.add(Average::new(MetricSpec::new("R/step").inputs(["reward", "1"])).unwrap());
        acc.add(Average::new(MetricSpec::new("clip R/ep").inputs(["clip(reward)", "done"])).unwrap());
        acc.add(Fps::new(MetricSpec::new("train_fps").inputs(["frame_no"])).unwrap());
        acc
    }

    #[test]
    fn test_trace_routes_by_field() {
        let mut acc = accumulator();
        acc.trace(&Record::empty().with("reward", 1.0).with("done", true))
            .unwrap();

        assert!(acc.get("ep_cnt").unwrap().updated());
        assert!(acc.get("R/ep").unwrap().updated());
        assert!(acc.get("clip R/ep").unwrap().updated());
        assert!(!acc.get("train_fps").unwrap().updated());

        let summary = acc.summarize();
        assert_eq!(summary.len(), 4);
        assert_eq!(summary.get("train_fps"), None);
        assert_eq!(summary.value_kinds().len(), 5);
        assert_eq!(
            summary.value_kinds().get("train_fps"),
            Some(&ValueKind::Scalar)
        );
    }

    #[test]
    fn test_training_loop() {
        let mut acc = accumulator();
        let rewards = [0.5, -3.0, 2.0, 4.0, -0.25, 1.0];
        let dones = [false, false, true, false, false, true];
        for (r, d) in rewards.iter().zip(dones.iter()) {
            let event = Record::empty()
                .with("reward", *r)
                .with("done", *d)
                .with("frame_no", 1);
            acc.trace(&event).unwrap();
        }

        let total: f64 = rewards.iter().sum();
        let clipped: f64 = rewards.iter().map(|r| r.clamp(-1.0, 1.0)).sum();
        let summary = acc.summarize();
        assert_eq!(summary.get_scalar("ep_cnt"), Some(2.0));
        assert_eq!(summary.get_scalar("R/ep"), Some(total / 2.0));
        assert_eq!(summary.get_scalar("R/step"), Some(total / 6.0));
        assert_eq!(summary.get_scalar("clip R/ep"), Some(clipped / 2.0));
        assert!(summary.get_scalar("train_fps").unwrap() > 0.0);

        acc.reset();
        let summary = acc.summarize();
        let names: Vec<_> = summary.iter().map(|(k, _)| k).collect();
        assert_eq!(names, vec!["ep_cnt"]);
        assert_eq!(summary.get_scalar("ep_cnt"), Some(2.0));
    }

    #[test]
    fn test_missing_field_is_all_or_nothing() {
        let mut acc = accumulator();
        // `done` triggers R/ep, which also reads the absent `reward`
        let err = acc.trace(&Record::empty().with("done", true)).unwrap_err();
        assert_eq!(err, RlogError::MissingFieldError("reward".to_string()));
        assert!(acc.names().all(|name| !acc.get(name).unwrap().updated()));
        assert!(acc.summarize().is_empty());
    }

    #[test]
    fn test_non_numeric_field() {
        let mut acc = accumulator();
        let event = Record::empty().with("reward", "high").with("done", true);
        assert!(matches!(
            acc.trace(&event),
            Err(RlogError::RecordValueTypeError(_))
        ));
        assert!(acc.summarize().is_empty());
    }

    #[test]
    fn test_metric_without_inputs_is_explicit_only() {
        let mut acc = Accumulator::new();
        acc.add(Max::new(MetricSpec::new("max_q")).unwrap());
        acc.trace(&Record::empty().with("max_q", 3.0)).unwrap();
        assert!(acc.summarize().is_empty());

        acc.accumulate("max_q", &[3.0.into()]).unwrap();
        assert_eq!(acc.summarize().get_scalar("max_q"), Some(3.0));
    }

    #[test]
    fn test_accumulate() {
        let mut acc = accumulator();
        acc.accumulate("R/ep", &[10.0.into(), 2.0.into()]).unwrap();
        acc.accumulate_many(&[
            ("R/ep", vec![6.0.into(), 2.0.into()]),
            ("ep_cnt", vec![1.0.into()]),
        ])
        .unwrap();
        let summary = acc.summarize();
        assert_eq!(summary.get_scalar("R/ep"), Some(4.0));
        assert_eq!(summary.get_scalar("ep_cnt"), Some(1.0));

        assert_eq!(
            acc.accumulate("loss", &[1.0.into()]),
            Err(RlogError::UnknownMetricError("loss".to_string()))
        );
        assert_eq!(
            acc.accumulate_many(&[("ep_cnt", vec![1.0.into()]), ("loss", vec![1.0.into()])]),
            Err(RlogError::UnknownMetricError("loss".to_string()))
        );
        assert_eq!(acc.summarize().get_scalar("ep_cnt"), Some(1.0));
    }

    #[test]
    fn test_last_registration_wins() {
        let mut acc = accumulator();
        acc.accumulate("R/ep", &[1.0.into()]).unwrap();
        acc.add(Max::new(MetricSpec::new("R/ep").inputs(["reward"])).unwrap());

        assert_eq!(acc.len(), 5);
        assert_eq!(acc.names().nth(1), Some("R/ep"));
        assert!(!acc.get("R/ep").unwrap().updated());

        acc.trace(&Record::empty().with("reward", 7.0).with("done", false))
            .unwrap();
        assert_eq!(acc.summarize().get_scalar("R/ep"), Some(7.0));
    }

    #[test]
    fn test_field_named_like_a_number() {
        let mut acc = Accumulator::new();
        acc.add(Sum::new(MetricSpec::new("infs").inputs(["inf"])).unwrap());
        acc.trace(&Record::empty().with("inf", 3.0)).unwrap();
        assert!(acc.get("infs").unwrap().updated());
        assert_eq!(acc.summarize().get_scalar("infs"), Some(3.0));
    }

    #[test]
    fn test_empty_value_is_omitted() {
        let mut acc = Accumulator::new();
        acc.add(Ema::new(MetricSpec::new("ewm R/ep").inputs(["reward", "done"]), 0.5).unwrap());
        acc.trace(&Record::empty().with("reward", 1.0).with("done", true))
            .unwrap();
        // the pending window is dropped before the first read
        acc.reset();

        assert!(acc.get("ewm R/ep").unwrap().updated());
        let summary = acc.summarize();
        assert!(summary.is_empty());
        assert_eq!(
            summary.value_kinds().get("ewm R/ep"),
            Some(&ValueKind::Scalar)
        );
    }

    #[test]
    fn test_summary_record() {
        let mut acc = Accumulator::new();
        acc.add(
            ValueCapture::new(
                MetricSpec::new("gaussians")
                    .inputs(["sample"])
                    .value_kind(ValueKind::Histogram),
            )
            .unwrap(),
        );
        acc.add(Ema::new(MetricSpec::new("ewm R/ep").inputs(["reward"]), 0.5).unwrap());
        acc.trace(&Record::empty().with("sample", 0.5)).unwrap();

        let record = acc.summarize().to_record(100);
        assert_eq!(record.step().unwrap(), 100);
        assert_eq!(record.get_array1("gaussians").unwrap(), vec![0.5]);
        assert!(record.get("ewm R/ep").is_none());
        assert_eq!(record.value_kind_of("gaussians"), ValueKind::Histogram);
        assert_eq!(record.value_kinds().unwrap().len(), 2);
    }
}
