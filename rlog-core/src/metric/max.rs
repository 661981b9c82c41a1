use super::{Arg, Arity, Descriptor, Metric, MetricSpec, MetricValue};
use crate::error::RlogError;

const ARITY: Arity = Arity::exactly(1);

/// Running maximum, `-inf` before the first accumulation.
#[derive(Debug)]
pub struct Max {
    descriptor: Descriptor,
    max: f64,
    updated: bool,
}

impl Max {
    /// Constructs the metric.
    pub fn new(spec: MetricSpec) -> Result<Self, RlogError> {
        Ok(Self {
            descriptor: spec.compile(ARITY)?,
            max: f64::NEG_INFINITY,
            updated: false,
        })
    }
}

impl Metric for Max {
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
        self.max = args[0].as_slice().iter().fold(self.max, |m, v| m.max(*v));
        self.updated = true;
        Ok(())
    }

    fn value(&mut self) -> MetricValue {
        MetricValue::Scalar(self.max)
    }

    fn reset(&mut self) {
        if self.descriptor.resettable {
            self.max = f64::NEG_INFINITY;
            self.updated = false;
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_max() {
        let mut m = Max::new(MetricSpec::new("max_q")).unwrap();
        assert_eq!(m.value(), MetricValue::Scalar(f64::NEG_INFINITY));

        m.accumulate(&[2.0.into()]).unwrap();
        m.accumulate(&[(-5.0).into()]).unwrap();
        m.accumulate(&[9.0.into()]).unwrap();
        assert_eq!(m.value(), MetricValue::Scalar(9.0));

        m.accumulate(&[vec![-1.0, 11.0, 3.0].into()]).unwrap();
        assert_eq!(m.value(), MetricValue::Scalar(11.0));

        m.reset();
        m.reset();
        assert_eq!(m.value(), MetricValue::Scalar(f64::NEG_INFINITY));
        assert!(!m.updated());
    }
}
