//! Base implementation of records.
//!
//! A [`Record`] is the flat, named bag of values passed around the library:
//! events handed to the accumulator, summaries handed to sinks, and free-form
//! structured traces are all records.
use crate::{error::RlogError, metric::ValueKind};
use chrono::prelude::{DateTime, Local};
use std::collections::{hash_map::Iter, BTreeMap, HashMap};

/// Key conventionally holding the caller-supplied step counter.
pub const STEP_KEY: &str = "step";

/// Reserved key carrying the value kind of every registered metric.
pub const VALUE_KINDS_KEY: &str = "extra.tb_types";

/// Represents possible types of values that can be stored in a [`Record`].
///
/// # Variants
///
/// * `Scalar(f64)` - A single numeric value
/// * `Bool(bool)` - A flag, numerically `0` or `1`
/// * `DateTime(DateTime<Local>)` - A timestamp with local timezone
/// * `Array1(Vec<f64>)` - An ordered batch of numeric values
/// * `String(String)` - A text value
/// * `ValueKinds(..)` - The per-metric value kind side channel of a summary
#[derive(Debug, Clone, PartialEq)]
pub enum RecordValue {
    /// A single numeric value, e.g. a reward or a loss.
    Scalar(f64),

    /// A flag such as `done`. Treated as `0` or `1` by numeric consumers.
    Bool(bool),

    /// A timestamp with local timezone, useful for logging events.
    DateTime(DateTime<Local>),

    /// An ordered batch of values, accumulated element-wise.
    Array1(Vec<f64>),

    /// A text value.
    String(String),

    /// Metric name to [`ValueKind`], stored under [`VALUE_KINDS_KEY`].
    ValueKinds(BTreeMap<String, ValueKind>),
}

impl RecordValue {
    /// Returns the numeric value of a scalar or a flag.
    pub fn as_scalar(&self) -> Option<f64> {
        match self {
            RecordValue::Scalar(v) => Some(*v),
            RecordValue::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            _ => None,
        }
    }

    /// Name of the variant, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            RecordValue::Scalar(_) => "Scalar",
            RecordValue::Bool(_) => "Bool",
            RecordValue::DateTime(_) => "DateTime",
            RecordValue::Array1(_) => "Array1",
            RecordValue::String(_) => "String",
            RecordValue::ValueKinds(_) => "ValueKinds",
        }
    }
}

impl From<f64> for RecordValue {
    fn from(v: f64) -> Self {
        RecordValue::Scalar(v)
    }
}

impl From<f32> for RecordValue {
    fn from(v: f32) -> Self {
        RecordValue::Scalar(v as f64)
    }
}

impl From<i32> for RecordValue {
    fn from(v: i32) -> Self {
        RecordValue::Scalar(v as f64)
    }
}

impl From<i64> for RecordValue {
    fn from(v: i64) -> Self {
        RecordValue::Scalar(v as f64)
    }
}

impl From<usize> for RecordValue {
    fn from(v: usize) -> Self {
        RecordValue::Scalar(v as f64)
    }
}

impl From<bool> for RecordValue {
    fn from(v: bool) -> Self {
        RecordValue::Bool(v)
    }
}

impl From<DateTime<Local>> for RecordValue {
    fn from(v: DateTime<Local>) -> Self {
        RecordValue::DateTime(v)
    }
}

impl From<Vec<f64>> for RecordValue {
    fn from(v: Vec<f64>) -> Self {
        RecordValue::Array1(v)
    }
}

impl From<&str> for RecordValue {
    fn from(v: &str) -> Self {
        RecordValue::String(v.to_string())
    }
}

impl From<String> for RecordValue {
    fn from(v: String) -> Self {
        RecordValue::String(v)
    }
}

/// A container for storing key-value pairs of various data types.
///
/// # Examples
///
/// ```rust
/// use rlog_core::record::{Record, RecordValue};
///
/// let event = Record::empty()
///     .with("reward", 1.0)
///     .with("done", true)
///     .with("frame_no", 1);
///
/// assert_eq!(event.get_scalar("done").unwrap(), 1.0);
/// assert_eq!(event.get("frame_no"), Some(&RecordValue::Scalar(1.0)));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record(HashMap<String, RecordValue>);

impl Record {
    /// Creates an empty record.
    pub fn empty() -> Self {
        Self(HashMap::new())
    }

    /// Creates a record containing a single scalar value.
    pub fn from_scalar(name: impl Into<String>, value: f64) -> Self {
        Self(HashMap::from([(name.into(), RecordValue::Scalar(value))]))
    }

    /// Inserts a key-value pair and returns the record, for building events inline.
    pub fn with(mut self, k: impl Into<String>, v: impl Into<RecordValue>) -> Self {
        self.0.insert(k.into(), v.into());
        self
    }

    /// Inserts a key-value pair into the record.
    pub fn insert(&mut self, k: impl Into<String>, v: RecordValue) {
        self.0.insert(k.into(), v);
    }

    /// Returns an iterator over the key-value pairs in the record.
    pub fn iter(&self) -> Iter<'_, String, RecordValue> {
        self.0.iter()
    }

    /// Gets a reference to the value associated with the given key.
    pub fn get(&self, k: &str) -> Option<&RecordValue> {
        self.0.get(k)
    }

    /// Returns `true` if the record holds the key.
    pub fn contains_key(&self, k: &str) -> bool {
        self.0.contains_key(k)
    }

    /// Gets a scalar value from the record. Flags are returned as `0` or `1`.
    ///
    /// # Errors
    ///
    /// Returns an error if the key does not exist or the value is not numeric.
    pub fn get_scalar(&self, k: &str) -> Result<f64, RlogError> {
        match self.0.get(k) {
            Some(v) => v
                .as_scalar()
                .ok_or_else(|| RlogError::RecordValueTypeError("Scalar".to_string())),
            None => Err(RlogError::RecordKeyError(k.to_string())),
        }
    }

    /// Gets a batch of values from the record.
    ///
    /// # Errors
    ///
    /// Returns an error if the key does not exist or the value is not an `Array1`.
    pub fn get_array1(&self, k: &str) -> Result<Vec<f64>, RlogError> {
        match self.0.get(k) {
            Some(RecordValue::Array1(v)) => Ok(v.clone()),
            Some(_) => Err(RlogError::RecordValueTypeError("Array1".to_string())),
            None => Err(RlogError::RecordKeyError(k.to_string())),
        }
    }

    /// Returns the value kinds stored under [`VALUE_KINDS_KEY`], if any.
    pub fn value_kinds(&self) -> Option<&BTreeMap<String, ValueKind>> {
        match self.0.get(VALUE_KINDS_KEY) {
            Some(RecordValue::ValueKinds(kinds)) => Some(kinds),
            _ => None,
        }
    }

    /// Returns the kind of the given key, defaulting to [`ValueKind::Scalar`].
    pub fn value_kind_of(&self, k: &str) -> ValueKind {
        self.value_kinds()
            .and_then(|kinds| kinds.get(k).copied())
            .unwrap_or_default()
    }

    /// Returns the step counter as an integer.
    ///
    /// # Errors
    ///
    /// Returns an error if the record has no numeric [`STEP_KEY`].
    pub fn step(&self) -> Result<i64, RlogError> {
        Ok(self.get_scalar(STEP_KEY)? as i64)
    }

    /// Returns the number of entries in the record.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Checks if the record is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, RecordValue)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, RecordValue)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_scalar_accessors() {
        let record = Record::empty()
            .with("reward", -1.5)
            .with("done", true)
            .with("tag", "pong");

        assert_eq!(record.get_scalar("reward").unwrap(), -1.5);
        assert_eq!(record.get_scalar("done").unwrap(), 1.0);
        assert_eq!(
            record.get_scalar("tag"),
            Err(RlogError::RecordValueTypeError("Scalar".to_string()))
        );
        assert_eq!(
            record.get_scalar("missing"),
            Err(RlogError::RecordKeyError("missing".to_string()))
        );
    }

    #[test]
    fn test_step() {
        let record = Record::from_scalar("loss", 0.5).with("step", 12);
        assert_eq!(record.len(), 2);
        assert_eq!(record.step().unwrap(), 12);

        let record = Record::empty().with("step", "twelve").with("time", Local::now());
        assert_eq!(
            record.step(),
            Err(RlogError::RecordValueTypeError("Scalar".to_string()))
        );
        assert_eq!(record.get("time").unwrap().type_name(), "DateTime");
        assert_eq!(record.get("time").unwrap().as_scalar(), None);
    }

    #[test]
    fn test_value_kind_defaults_to_scalar() {
        let mut kinds = BTreeMap::new();
        kinds.insert("samples".to_string(), ValueKind::Histogram);
        let record = Record::empty().with("step", 3);
        assert_eq!(record.value_kind_of("samples"), ValueKind::Scalar);

        let mut record = record;
        record.insert(VALUE_KINDS_KEY, RecordValue::ValueKinds(kinds));
        assert_eq!(record.value_kind_of("samples"), ValueKind::Histogram);
        assert_eq!(record.value_kind_of("reward"), ValueKind::Scalar);
    }
}
