#![warn(missing_docs)]
//! Metric accumulation and dispatch for experiment logging.
//!
//! Training loops put flat key/value events into an [`RLogger`]. The logger
//! routes each event to the metrics reading its fields, and periodically
//! summarizes them into one line of text and one structured record handed to
//! the registered [`Recorder`](record::Recorder)s.
pub mod accumulator;
pub mod error;
pub mod expr;
pub mod format;
pub mod logger;
pub mod metric;
pub mod record;

pub use accumulator::{Accumulator, Summary};
pub use error::RlogError;
pub use logger::{Level, LoggerConfig, RLogger, SharedLogger};
