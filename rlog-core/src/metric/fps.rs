use super::{Arg, Arity, Descriptor, Metric, MetricSpec, MetricValue};
use crate::error::RlogError;
use std::time::Instant;

const ARITY: Arity = Arity::at_least(1);

/// Accumulated frames divided by the wall-clock time since the last reset.
///
/// Reading the value right after a reset divides by a near-zero duration;
/// it is up to the caller not to do so.
#[derive(Debug)]
pub struct Fps {
    descriptor: Descriptor,
    total: f64,
    start: Instant,
    updated: bool,
}

impl Fps {
    /// Constructs the metric. The clock starts now.
    pub fn new(spec: MetricSpec) -> Result<Self, RlogError> {
        Ok(Self {
            descriptor: spec.compile(ARITY)?,
            total: 0.0,
            start: Instant::now(),
            updated: false,
        })
    }
}

impl Metric for Fps {
    fn descriptor(&self) -> &Descriptor {
        &self.descriptor
    }

    fn arity(&self) -> Arity {
        ARITY
    }

    fn updated(&self) -> bool {
        self.updated
    }

    /// Adds the first argument to the frame count. Extra arguments are ignored.
    fn accumulate(&mut self, args: &[Arg]) -> Result<(), RlogError> {
        ARITY.check(self.name(), args.len())?;
        self.total += args[0].sum();
        self.updated = true;
        Ok(())
    }

    fn value(&mut self) -> MetricValue {
        MetricValue::Scalar(self.total / self.start.elapsed().as_secs_f64())
    }

    fn reset(&mut self) {
        if self.descriptor.resettable {
            self.total = 0.0;
            self.start = Instant::now();
            self.updated = false;
        }
    }
}
