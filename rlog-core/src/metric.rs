//! Named stateful aggregators.
//!
//! Every aggregator implements [`Metric`]. Variants do not share mutable state:
//! each owns an immutable [`Descriptor`] compiled from a [`MetricSpec`] and
//! exactly the numeric state it needs.
//!
//! ```rust
//! use rlog_core::metric::{Arg, Average, Metric, MetricSpec, MetricValue};
//!
//! let mut metric = Average::new(MetricSpec::new("R/ep").inputs(["reward", "done"]))?;
//! metric.accumulate(&[Arg::Scalar(10.0), Arg::Scalar(2.0)])?;
//! metric.accumulate(&[Arg::Scalar(6.0), Arg::Scalar(2.0)])?;
//! assert_eq!(metric.value(), MetricValue::Scalar(4.0));
//! # Ok::<(), rlog_core::error::RlogError>(())
//! ```
mod average;
mod config;
mod ema;
mod episodic;
mod fps;
mod max;
mod sum;
mod value;

use crate::{error::RlogError, expr::Expr, record::RecordValue};
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

pub use average::Average;
pub use config::{MetricConfig, MetricKind};
pub use ema::Ema;
pub use episodic::Episodic;
pub use fps::Fps;
pub use max::Max;
pub use sum::Sum;
pub use value::ValueCapture;

/// How sinks should render the value of a metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    /// A single number per step.
    #[default]
    Scalar,

    /// A distribution of values per step.
    Histogram,
}

/// A resolved argument of [`Metric::accumulate`].
#[derive(Debug, Clone, PartialEq)]
pub enum Arg {
    /// A single value.
    Scalar(f64),

    /// A batch of values, accumulated element-wise.
    Batch(Vec<f64>),
}

impl Arg {
    /// Converts a record value. Flags become `0` or `1`.
    ///
    /// `field` names the value in the error message.
    pub fn from_record_value(field: &str, value: &RecordValue) -> Result<Self, RlogError> {
        match value {
            RecordValue::Array1(vs) => Ok(Arg::Batch(vs.clone())),
            v => v.as_scalar().map(Arg::Scalar).ok_or_else(|| {
                RlogError::RecordValueTypeError(format!(
                    "field '{}' holds {}, expected a number",
                    field,
                    v.type_name()
                ))
            }),
        }
    }

    /// The values of the argument as a slice.
    pub fn as_slice(&self) -> &[f64] {
        match self {
            Arg::Scalar(v) => std::slice::from_ref(v),
            Arg::Batch(vs) => vs.as_slice(),
        }
    }

    /// Sum of the values.
    pub fn sum(&self) -> f64 {
        self.as_slice().iter().sum()
    }

    /// Applies `f` to every value.
    pub fn map(self, f: impl Fn(f64) -> f64) -> Self {
        match self {
            Arg::Scalar(v) => Arg::Scalar(f(v)),
            Arg::Batch(vs) => Arg::Batch(vs.into_iter().map(f).collect()),
        }
    }
}

impl From<f64> for Arg {
    fn from(v: f64) -> Self {
        Arg::Scalar(v)
    }
}

impl From<i32> for Arg {
    fn from(v: i32) -> Self {
        Arg::Scalar(v as f64)
    }
}

impl From<bool> for Arg {
    fn from(v: bool) -> Self {
        Arg::Scalar(if v { 1.0 } else { 0.0 })
    }
}

impl From<Vec<f64>> for Arg {
    fn from(vs: Vec<f64>) -> Self {
        Arg::Batch(vs)
    }
}

/// The current value of a metric.
#[derive(Debug, Clone, PartialEq)]
pub enum MetricValue {
    /// A single number.
    Scalar(f64),

    /// Every captured value, in order.
    Values(Vec<f64>),

    /// No value yet.
    Empty,
}

impl MetricValue {
    /// Returns the number if the value is a scalar.
    pub fn as_scalar(&self) -> Option<f64> {
        match self {
            MetricValue::Scalar(v) => Some(*v),
            _ => None,
        }
    }

    /// Converts the value for inclusion in a [`Record`](crate::record::Record).
    pub fn into_record_value(self) -> Option<RecordValue> {
        match self {
            MetricValue::Scalar(v) => Some(RecordValue::Scalar(v)),
            MetricValue::Values(vs) => Some(RecordValue::Array1(vs)),
            MetricValue::Empty => None,
        }
    }
}

/// Number of positional arguments a metric accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Arity {
    /// Minimum number of arguments.
    pub min: usize,

    /// Maximum number of arguments, `None` when extras are ignored.
    pub max: Option<usize>,
}

impl Arity {
    /// Exactly `n` arguments.
    pub const fn exactly(n: usize) -> Self {
        Self { min: n, max: Some(n) }
    }

    /// Between `min` and `max` arguments.
    pub const fn between(min: usize, max: usize) -> Self {
        Self {
            min,
            max: Some(max),
        }
    }

    /// At least `min` arguments.
    pub const fn at_least(min: usize) -> Self {
        Self { min, max: None }
    }

    /// Returns `true` if `n` arguments are accepted.
    pub fn contains(&self, n: usize) -> bool {
        n >= self.min && self.max.map_or(true, |max| n <= max)
    }

    pub(crate) fn check(&self, metric: &str, n: usize) -> Result<(), RlogError> {
        if self.contains(n) {
            Ok(())
        } else {
            Err(RlogError::InvalidConfigurationError(format!(
                "metric '{}' accepts {} arguments, got {}",
                metric, self, n
            )))
        }
    }
}

impl std::fmt::Display for Arity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.max {
            Some(max) if max == self.min => write!(f, "{}", max),
            Some(max) => write!(f, "{}..={}", self.min, max),
            None => write!(f, "{} or more", self.min),
        }
    }
}

/// Static configuration shared by all metric variants.
///
/// ```rust
/// use rlog_core::metric::{MetricSpec, Sum};
///
/// let ep_cnt = Sum::new(MetricSpec::new("ep_cnt").resettable(false).inputs(["done"]))?;
/// # Ok::<(), rlog_core::error::RlogError>(())
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct MetricSpec {
    name: String,
    resettable: bool,
    emphasize: bool,
    inputs: Vec<String>,
    value_kind: ValueKind,
}

impl MetricSpec {
    /// A resettable scalar metric named `name` without declared inputs.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            resettable: true,
            emphasize: false,
            inputs: vec![],
            value_kind: ValueKind::Scalar,
        }
    }

    /// Sets whether [`Metric::reset`] clears the state.
    pub fn resettable(mut self, v: bool) -> Self {
        self.resettable = v;
        self
    }

    /// Sets the display hint.
    pub fn emphasize(mut self, v: bool) -> Self {
        self.emphasize = v;
        self
    }

    /// Sets the expressions extracted from each event, in argument order.
    pub fn inputs<I, S>(mut self, inputs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.inputs = inputs.into_iter().map(|s| s.as_ref().to_string()).collect();
        self
    }

    /// Sets the value kind reported to sinks.
    pub fn value_kind(mut self, v: ValueKind) -> Self {
        self.value_kind = v;
        self
    }

    /// Parses the inputs and checks them against the arity of the variant.
    pub(crate) fn compile(self, arity: Arity) -> Result<Descriptor, RlogError> {
        let inputs = self
            .inputs
            .iter()
            .map(|s| Expr::parse(s))
            .collect::<Result<Vec<_>, _>>()?;
        if !inputs.is_empty() {
            arity.check(&self.name, inputs.len())?;
        }
        Ok(Descriptor {
            name: self.name,
            resettable: self.resettable,
            emphasize: self.emphasize,
            inputs,
            value_kind: self.value_kind,
        })
    }
}

/// The compiled, immutable part of a metric.
#[derive(Debug, Clone, PartialEq)]
pub struct Descriptor {
    /// Name, unique within an accumulator.
    pub name: String,

    /// Whether [`Metric::reset`] clears the state.
    pub resettable: bool,

    /// Display hint, passed through unchanged.
    pub emphasize: bool,

    /// Parsed input expressions.
    pub inputs: Vec<Expr>,

    /// Value kind reported to sinks.
    pub value_kind: ValueKind,
}

/// A named stateful aggregator.
pub trait Metric: Debug + Send {
    /// The compiled configuration of the metric.
    fn descriptor(&self) -> &Descriptor;

    /// Number of arguments [`Metric::accumulate`] accepts.
    fn arity(&self) -> Arity;

    /// `true` iff the metric accumulated since its last reset.
    fn updated(&self) -> bool;

    /// Updates the state with positional arguments.
    ///
    /// # Errors
    ///
    /// Returns [`RlogError::InvalidConfigurationError`] if the number of
    /// arguments is outside [`Metric::arity`]. The state is untouched then.
    fn accumulate(&mut self, args: &[Arg]) -> Result<(), RlogError>;

    /// The current value.
    ///
    /// Reading is free of side effects for every variant except [`Ema`].
    fn value(&mut self) -> MetricValue;

    /// Clears the transient state if the metric is resettable.
    fn reset(&mut self);

    /// Name of the metric.
    fn name(&self) -> &str {
        &self.descriptor().name
    }

    /// Whether [`Metric::reset`] clears the state.
    fn resettable(&self) -> bool {
        self.descriptor().resettable
    }

    /// Display hint.
    fn emphasize(&self) -> bool {
        self.descriptor().emphasize
    }

    /// Expressions resolved against each event.
    fn declared_inputs(&self) -> &[Expr] {
        &self.descriptor().inputs
    }

    /// Value kind reported to sinks.
    fn value_kind(&self) -> ValueKind {
        self.descriptor().value_kind
    }
}
