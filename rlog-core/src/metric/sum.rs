use super::{Arg, Arity, Descriptor, Metric, MetricSpec, MetricValue};
use crate::error::RlogError;

const ARITY: Arity = Arity::exactly(1);

/// Running total of the accumulated values.
#[derive(Debug)]
pub struct Sum {
    descriptor: Descriptor,
    total: f64,
    updated: bool,
}

impl Sum {
    /// Constructs the metric.
    pub fn new(spec: MetricSpec) -> Result<Self, RlogError> {
        Ok(Self {
            descriptor: spec.compile(ARITY)?,
            total: 0.0,
            updated: false,
        })
    }
}

impl Metric for Sum {
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
        self.total += args[0].sum();
        self.updated = true;
        Ok(())
    }

    fn value(&mut self) -> MetricValue {
        MetricValue::Scalar(self.total)
    }

    fn reset(&mut self) {
        if self.descriptor.resettable {
            self.total = 0.0;
            self.updated = false;
        }
    }
}
