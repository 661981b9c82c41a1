//! One-line rendering of summaries.
use crate::{accumulator::Summary, record::RecordValue};

/// Renders a [`Summary`] as `[000100]   R/ep=1.50, ep_cnt=3.00`.
///
/// Only scalar values are shown. Captured value lists are left to sinks
/// that can render distributions.
#[derive(Debug, Clone)]
pub struct SummaryFormatter {
    precision: usize,
}

impl Default for SummaryFormatter {
    fn default() -> Self {
        Self { precision: 2 }
    }
}

impl SummaryFormatter {
    /// Constructs a formatter with two decimals.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the number of decimals.
    pub fn precision(mut self, v: usize) -> Self {
        self.precision = v;
        self
    }

    /// Formats the summary of the given step.
    pub fn format(&self, step: i64, summary: &Summary) -> String {
        let fields = summary
            .iter()
            .filter_map(|(k, v)| match v {
                RecordValue::Scalar(v) => Some(format!("{}={:.*}", k, self.precision, v)),
                _ => None,
            })
            .collect::<Vec<_>>();
        format!("[{:06}]   {}", step, fields.join(", "))
    }
}
