//! Records and the sinks receiving them.
//!
//! A [`Record`] is a flat map from names to [`RecordValue`]s. Events traced
//! into an [`Accumulator`](crate::Accumulator), the summaries it produces and
//! free-form structured traces are all records.
//!
//! ```rust
//! use rlog_core::record::{Record, RecordValue};
//!
//! // following values are obtained with some process in reality
//! let step = 1;
//! let reward = -1.0;
//!
//! let mut record = Record::empty();
//! record.insert("step", RecordValue::Scalar(step as f64));
//! record.insert("reward", RecordValue::Scalar(reward));
//! record.insert("q_values", RecordValue::Array1(vec![0.1, 0.7, 0.2]));
//! ```
//!
//! Records handed to [`Recorder`]s carry the caller supplied step under
//! [`STEP_KEY`]. Summaries also carry the value kind of every metric under
//! [`VALUE_KINDS_KEY`], so that sinks can render captured values as
//! distributions.
//!
//! # Recorders
//!
//! * [`NullRecorder`] - Discards everything
//! * [`BufferedRecorder`] - Keeps records and messages in memory
//! * [`TextFileRecorder`] - Appends formatted messages to `log.log`
//! * [`BlobRecorder`] - Keeps a serialized blob per logger name
mod base;
mod blob_recorder;
mod buffered_recorder;
mod null_recorder;
mod recorder;
mod text_recorder;

pub use base::{Record, RecordValue, STEP_KEY, VALUE_KINDS_KEY};
pub use blob_recorder::{Blob, BlobEntry, BlobRecorder};
pub use buffered_recorder::{BufferedRecorder, TextEntry};
pub use null_recorder::NullRecorder;
pub use recorder::Recorder;
pub use text_recorder::TextFileRecorder;
