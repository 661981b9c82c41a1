use super::{Arg, Arity, Descriptor, Metric, MetricSpec, MetricValue};
use crate::error::RlogError;

const ARITY: Arity = Arity::between(1, 2);

/// Ratio of the accumulated values to the accumulated counts.
///
/// `accumulate(v, n)` adds `v` to the total and `n` to the count, `n`
/// defaulting to `1`. Declaring `["reward", "done"]` as inputs yields the mean
/// reward per episode, `["reward", "1"]` the mean reward per step.
#[derive(Debug)]
pub struct Average {
    descriptor: Descriptor,
    total: f64,
    count: f64,
    updated: bool,
}

impl Average {
    /// Constructs the metric.
    pub fn new(spec: MetricSpec) -> Result<Self, RlogError> {
        Ok(Self {
            descriptor: spec.compile(ARITY)?,
            total: 0.0,
            count: 0.0,
            updated: false,
        })
    }

    /// The average, `0` while the count is zero.
    pub(crate) fn mean(&self) -> f64 {
        if self.count == 0.0 {
            0.0
        } else {
            self.total / self.count
        }
    }
}

impl Metric for Average {
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
        self.count += args.get(1).map_or(1.0, Arg::sum);
        self.updated = true;
        Ok(())
    }

    fn value(&mut self) -> MetricValue {
        MetricValue::Scalar(self.mean())
    }

    fn reset(&mut self) {
        if self.descriptor.resettable {
            self.total = 0.0;
            self.count = 0.0;
            self.updated = false;
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_average() {
        let mut m = Average::new(MetricSpec::new("R/ep")).unwrap();
        m.accumulate(&[10.0.into(), 2.0.into()]).unwrap();
        m.accumulate(&[6.0.into(), 2.0.into()]).unwrap();
        assert_eq!(m.value(), MetricValue::Scalar(4.0));
    }

    #[test]
    fn test_zero_count() {
        let mut m = Average::new(MetricSpec::new("R/ep")).unwrap();
        assert_eq!(m.value(), MetricValue::Scalar(0.0));

        // rewards of an unfinished episode
        m.accumulate(&[5.0.into(), false.into()]).unwrap();
        assert_eq!(m.value(), MetricValue::Scalar(0.0));
        m.accumulate(&[1.0.into(), true.into()]).unwrap();
        assert_eq!(m.value(), MetricValue::Scalar(6.0));

        m.reset();
        m.reset();
        assert_eq!(m.value(), MetricValue::Scalar(0.0));
        assert!(!m.updated());
    }

    #[test]
    fn test_default_count_and_batch() {
        let mut m = Average::new(MetricSpec::new("loss")).unwrap();
        m.accumulate(&[3.0.into()]).unwrap();
        m.accumulate(&[vec![1.0, 2.0].into(), vec![1.0, 1.0].into()]).unwrap();
        assert_eq!(m.value(), MetricValue::Scalar(2.0));
    }
}
