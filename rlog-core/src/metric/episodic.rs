use super::{Arg, Arity, Descriptor, Metric, MetricSpec, MetricValue};
use crate::error::RlogError;

const ARITY: Arity = Arity::between(1, 2);

/// Average of per-episode totals.
///
/// `accumulate(v, n)` with `n == 0` adds `v` to the running episode. With
/// `n > 0` the episode, including `v`, is closed and counted `n` times. Rewards
/// of an episode still running at reset time are dropped.
#[derive(Debug)]
pub struct Episodic {
    descriptor: Descriptor,
    total: f64,
    count: f64,
    partial: f64,
    updated: bool,
}

impl Episodic {
    /// Constructs the metric.
    pub fn new(spec: MetricSpec) -> Result<Self, RlogError> {
        Ok(Self {
            descriptor: spec.compile(ARITY)?,
            total: 0.0,
            count: 0.0,
            partial: 0.0,
            updated: false,
        })
    }
}

impl Metric for Episodic {
    fn descriptor(&self) -> &Descriptor {
        &self.descriptor
    }

    fn arity(&self) -> Arity {
        ARITY
    }

    fn updated(&self) -> bool {
        self.updated
    }

    fn accumulate(&mut self, args: &[Arg]) -> Result<(), RlogError> {
        ARITY.check(self.name(), args.len())?;
        let v = args[0].sum();
        let n = args.get(1).map_or(1.0, Arg::sum);
        if n == 0.0 {
            self.partial += v;
        } else {
            self.total += self.partial + v;
            self.count += n;
            self.partial = 0.0;
        }
        self.updated = true;
        Ok(())
    }

    fn value(&mut self) -> MetricValue {
        if self.count == 0.0 {
            MetricValue::Scalar(0.0)
        } else {
            MetricValue::Scalar(self.total / self.count)
        }
    }

    fn reset(&mut self) {
        if self.descriptor.resettable {
            self.total = 0.0;
            self.count = 0.0;
            self.partial = 0.0;
            self.updated = false;
        }
    }
}
