use super::{Record, RecordValue, Recorder, STEP_KEY};
use crate::logger::Level;
use anyhow::{Context, Result};
use chrono::Local;
use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeMap,
    fs::File,
    io::{BufReader, BufWriter},
    path::{Path, PathBuf},
};

/// One numeric value of a series in a [`Blob`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BlobEntry {
    /// Step the value belongs to.
    pub step: i64,

    /// The value.
    pub value: f64,

    /// Milliseconds since the Unix epoch at which the value was written.
    pub time: i64,
}

/// Everything a logger wrote to a [`BlobRecorder`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Blob {
    /// Text messages, in order.
    pub text: Vec<String>,

    /// Numeric series keyed by record key.
    pub series: BTreeMap<String, Vec<BlobEntry>>,
}

impl Blob {
    fn push(&mut self, key: &str, entries: impl IntoIterator<Item = BlobEntry>) {
        self.series
            .entry(key.to_string())
            .or_default()
            .extend(entries);
    }
}

/// Keeps one serialized [`Blob`] per logger name in a directory.
///
/// The blob of a logger is loaded, updated and rewritten on every write, so
/// the file is complete whenever the program stops.
///
/// Scalars and flags of a structured record are appended to the series of
/// their key at the record's step. A batch of `n` values is unrolled over the
/// `n` steps ending at the record's step: values `[a, b, c]` at step `100`
/// land on steps `98`, `99` and `100`, so the last value shares the step of
/// the scalars of the same record. Strings and timestamps are skipped.
pub struct BlobRecorder {
    dir: PathBuf,
}

impl BlobRecorder {
    /// Constructs a recorder writing into `dir`.
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    /// Path of the blob of the given logger, e.g. `dqn_agent.bin` for `dqn.agent`.
    pub fn path_for(&self, logger: &str) -> PathBuf {
        self.dir.join(format!("{}.bin", logger.replace('.', "_")))
    }

    /// Reads a blob file.
    pub fn load(path: impl AsRef<Path>) -> Result<Blob> {
        let path = path.as_ref();
        let file = File::open(path).with_context(|| format!("Failed to open {:?}", path))?;
        let blob = bincode::deserialize_from(BufReader::new(file))?;
        Ok(blob)
    }

    fn load_or_default(&self, logger: &str) -> Result<Blob> {
        let path = self.path_for(logger);
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Blob::default())
        }
    }

    fn save(&self, logger: &str, blob: &Blob) -> Result<()> {
        let path = self.path_for(logger);
        let file = File::create(&path).with_context(|| format!("Failed to create {:?}", path))?;
        bincode::serialize_into(BufWriter::new(file), blob)?;
        Ok(())
    }
}

impl Recorder for BlobRecorder {
    fn write(&mut self, logger: &str, record: &Record) -> Result<()> {
        let step = record
            .step()
            .context("BlobRecorder expects a record with a `step` field")?;
        let time = Local::now().timestamp_millis();
        let mut blob = self.load_or_default(logger)?;

        for (k, v) in record.iter() {
            if k == STEP_KEY {
                continue;
            }
            match v {
                RecordValue::Array1(vs) => {
                    let start = step - vs.len() as i64;
                    blob.push(
                        k,
                        vs.iter().enumerate().map(|(i, &value)| BlobEntry {
                            step: start + i as i64 + 1,
                            value,
                            time,
                        }),
                    );
                }
                RecordValue::Scalar(_) | RecordValue::Bool(_) => {
                    if let Some(value) = v.as_scalar() {
                        blob.push(k, [BlobEntry { step, value, time }]);
                    }
                }
                _ => log::trace!("BlobRecorder skips {} of type {}", k, v.type_name()),
            }
        }

        self.save(logger, &blob)
    }

    fn write_text(&mut self, logger: &str, _level: Level, message: &str) -> Result<()> {
        let mut blob = self.load_or_default(logger)?;
        blob.text.push(message.to_string());
        self.save(logger, &blob)
    }
}
