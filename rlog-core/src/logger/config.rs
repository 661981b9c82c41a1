//! Configuration of [`RLogger`](super::RLogger).
use super::Level;
use crate::metric::MetricConfig;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::{Path, PathBuf},
};

fn default_true() -> bool {
    true
}

/// Configuration of [`RLogger`](super::RLogger).
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct LoggerConfig {
    /// Name of the logger, also the name of its blob file.
    pub name: String,

    /// Directory of the log artifacts. Without it only the console is used.
    #[serde(default)]
    pub path: Option<PathBuf>,

    /// Minimum level of text messages.
    #[serde(default)]
    pub level: Level,

    /// Keep a serialized blob of traced records under `path`.
    #[serde(default = "default_true")]
    pub blob: bool,

    /// Write Tensorboard event files under `path`.
    #[serde(default)]
    pub tensorboard: bool,

    /// Show the time elapsed since initialization instead of the wall clock.
    #[serde(default)]
    pub relative_time: bool,

    /// Metrics registered at initialization.
    #[serde(default)]
    pub metrics: Vec<MetricConfig>,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            name: "rlog".to_string(),
            path: None,
            level: Level::Info,
            blob: true,
            tensorboard: false,
            relative_time: false,
            metrics: vec![],
        }
    }
}

impl LoggerConfig {
    /// Configuration of a console-only logger named `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Sets the directory of the log artifacts.
    pub fn path(mut self, v: impl AsRef<Path>) -> Self {
        self.path = Some(v.as_ref().to_path_buf());
        self
    }

    /// Sets the minimum level of text messages.
    pub fn level(mut self, v: Level) -> Self {
        self.level = v;
        self
    }

    /// Sets whether a blob of traced records is kept.
    pub fn blob(mut self, v: bool) -> Self {
        self.blob = v;
        self
    }

    /// Sets whether Tensorboard event files are written.
    pub fn tensorboard(mut self, v: bool) -> Self {
        self.tensorboard = v;
        self
    }

    /// Sets whether the console shows relative time.
    pub fn relative_time(mut self, v: bool) -> Self {
        self.relative_time = v;
        self
    }

    /// Sets the metrics registered at initialization.
    pub fn metrics(mut self, v: Vec<MetricConfig>) -> Self {
        self.metrics = v;
        self
    }

    /// Constructs [`LoggerConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`LoggerConfig`].
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}
