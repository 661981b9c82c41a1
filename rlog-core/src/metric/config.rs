//! Serializable declaration of metrics.
use super::{
    Average, Ema, Episodic, Fps, Max, Metric, MetricSpec, Sum, ValueCapture, ValueKind,
};
use crate::error::RlogError;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Metric variants available from configuration files.
#[derive(Debug, Deserialize, Serialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    /// [`Sum`]
    Sum,
    /// [`Average`]
    Average,
    /// [`Ema`]
    Ema,
    /// [`Max`]
    Max,
    /// [`ValueCapture`]
    Value,
    /// [`Fps`]
    Fps,
    /// [`Episodic`]
    Episodic,
}

fn default_true() -> bool {
    true
}

/// Declaration of a metric, e.g. in YAML:
///
/// ```yaml
/// - kind: average
///   name: clip R/ep
///   inputs: ["clip(reward)", "done"]
/// - kind: ema
///   name: ewm R/ep
///   inputs: [reward, done]
///   beta: 0.6
/// ```
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct MetricConfig {
    /// Variant of the metric.
    pub kind: MetricKind,

    /// Name of the metric.
    pub name: String,

    /// Expressions extracted from each event.
    #[serde(default)]
    pub inputs: Vec<String>,

    /// Whether reset clears the state. Ignored by [`Ema`].
    #[serde(default = "default_true")]
    pub resettable: bool,

    /// Display hint.
    #[serde(default)]
    pub emphasize: bool,

    /// Value kind reported to sinks.
    #[serde(default)]
    pub value_kind: ValueKind,

    /// Smoothing factor, required by [`Ema`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub beta: Option<f64>,
}

impl MetricConfig {
    /// Declares a metric of the given kind with default attributes.
    pub fn new(kind: MetricKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            inputs: vec![],
            resettable: true,
            emphasize: false,
            value_kind: ValueKind::Scalar,
            beta: None,
        }
    }

    /// Sets the input expressions.
    pub fn inputs<I, S>(mut self, inputs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.inputs = inputs.into_iter().map(|s| s.as_ref().to_string()).collect();
        self
    }

    /// Sets whether reset clears the state.
    pub fn resettable(mut self, v: bool) -> Self {
        self.resettable = v;
        self
    }

    /// Sets the display hint.
    pub fn emphasize(mut self, v: bool) -> Self {
        self.emphasize = v;
        self
    }

    /// Sets the smoothing factor.
    pub fn beta(mut self, v: f64) -> Self {
        self.beta = Some(v);
        self
    }

    /// Sets the value kind.
    pub fn value_kind(mut self, v: ValueKind) -> Self {
        self.value_kind = v;
        self
    }

    /// Builds the metric.
    pub fn build(&self) -> Result<Box<dyn Metric>, RlogError> {
        let spec = MetricSpec::new(self.name.clone())
            .resettable(self.resettable)
            .emphasize(self.emphasize)
            .inputs(&self.inputs)
            .value_kind(self.value_kind);

        Ok(match self.kind {
            MetricKind::Sum => Box::new(Sum::new(spec)?),
            MetricKind::Average => Box::new(Average::new(spec)?),
            MetricKind::Ema => {
                let beta = self.beta.ok_or_else(|| {
                    RlogError::InvalidConfigurationError(format!(
                        "metric '{}' of kind ema requires beta",
                        self.name
                    ))
                })?;
                Box::new(Ema::new(spec, beta)?)
            }
            MetricKind::Max => Box::new(Max::new(spec)?),
            MetricKind::Value => Box::new(ValueCapture::new(spec)?),
            MetricKind::Fps => Box::new(Fps::new(spec)?),
            MetricKind::Episodic => Box::new(Episodic::new(spec)?),
        })
    }

    /// Builds every metric of a list.
    pub fn build_all(configs: &[MetricConfig]) -> Result<Vec<Box<dyn Metric>>, RlogError> {
        configs.iter().map(MetricConfig::build).collect()
    }

    /// Loads a list of metric declarations from a YAML file.
    pub fn load_all(path: impl AsRef<Path>) -> Result<Vec<Self>> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let configs = serde_yaml::from_reader(rdr)?;
        Ok(configs)
    }

    /// Saves a list of metric declarations as YAML.
    pub fn save_all(configs: &[Self], path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(configs)?.as_bytes())?;
        Ok(())
    }
}
