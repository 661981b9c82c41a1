//! Tensorboard sink for rlog summaries.
use anyhow::{Context, Result};
use rlog_core::{
    metric::ValueKind,
    record::{Record, RecordValue, Recorder, STEP_KEY, VALUE_KINDS_KEY},
};
use std::path::Path;
use tensorboard_rs::summary_writer::SummaryWriter;

const NUM_BUCKETS: usize = 30;

/// Write records to TFRecord.
///
/// Values are tagged `<logger>/<key>`, with the dots of hierarchical logger
/// names turned into slashes so that Tensorboard groups them.
///
/// Events are written by a background thread of the underlying writer.
/// [`Recorder::flush`] only signals that thread; the file is complete once
/// the recorder is dropped.
pub struct TensorboardRecorder {
    writer: SummaryWriter,
}

impl TensorboardRecorder {
    /// Construct a [`TensorboardRecorder`].
    ///
    /// TFRecord will be stored in `logdir`.
    pub fn new<P: AsRef<Path>>(logdir: P) -> Self {
        Self {
            writer: SummaryWriter::new(logdir),
        }
    }

    fn add_histogram(&mut self, tag: &str, values: &[f64], step: usize) {
        let hist = Histogram::new(values);
        self.writer.add_histogram_raw(
            tag,
            hist.min,
            hist.max,
            values.len() as f64,
            hist.sum,
            hist.sum_squares,
            &hist.bucket_limits,
            &hist.bucket_counts,
            step,
        );
    }
}

impl Recorder for TensorboardRecorder {
    /// Write a given [`Record`] into a TFRecord.
    ///
    /// Scalars and flags are written as scalars. Value lists are written as
    /// histograms if the record declares them so, and unrolled over the steps
    /// ending at the record's step otherwise: `n` values at step `s` land on
    /// steps `s - n + 1 ..= s`, as in [`BlobRecorder`](rlog_core::record::BlobRecorder).
    /// Other variants are ignored.
    fn write(&mut self, logger: &str, record: &Record) -> Result<()> {
        let step = record
            .step()
            .context("TensorboardRecorder expects a record with a `step` field")?;
        let prefix = logger.replace('.', "/");

        for (k, v) in record.iter() {
            if k == STEP_KEY || k == VALUE_KINDS_KEY {
                continue;
            }
            let tag = format!("{}/{}", prefix, k);
            match v {
                RecordValue::Scalar(_) | RecordValue::Bool(_) => {
                    if let Some(x) = v.as_scalar() {
                        self.writer.add_scalar(&tag, x as f32, step.max(0) as usize);
                    }
                }
                RecordValue::Array1(vs) if vs.is_empty() => {}
                RecordValue::Array1(vs) => match record.value_kind_of(k) {
                    ValueKind::Histogram => self.add_histogram(&tag, vs, step.max(0) as usize),
                    ValueKind::Scalar => {
                        let start = step - vs.len() as i64;
                        for (i, x) in vs.iter().enumerate() {
                            let s = (start + i as i64 + 1).max(0) as usize;
                            self.writer.add_scalar(&tag, *x as f32, s);
                        }
                    }
                },
                _ => log::trace!("TensorboardRecorder skips {} of type {}", k, v.type_name()),
            }
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.writer.flush();
        Ok(())
    }
}

/// Summary statistics and equal-width buckets of a list of values.
#[derive(Debug, PartialEq)]
struct Histogram {
    min: f64,
    max: f64,
    sum: f64,
    sum_squares: f64,
    bucket_limits: Vec<f64>,
    bucket_counts: Vec<f64>,
}

impl Histogram {
    fn new(values: &[f64]) -> Self {
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let sum = values.iter().sum();
        let sum_squares = values.iter().map(|x| x * x).sum();

        // a single bucket when every value is the same
        let n = if max > min { NUM_BUCKETS } else { 1 };
        let width = (max - min) / n as f64;
        let bucket_limits: Vec<f64> = (1..=n)
            .map(|i| if i == n { max } else { min + width * i as f64 })
            .collect();
        let mut bucket_counts = vec![0.0; n];
        for x in values {
            let ix = if width > 0.0 {
                (((x - min) / width) as usize).min(n - 1)
            } else {
                0
            };
            bucket_counts[ix] += 1.0;
        }

        Self {
            min,
            max,
            sum,
            sum_squares,
            bucket_limits,
            bucket_counts,
        }
    }
}
