use super::{Arg, Arity, Descriptor, Metric, MetricSpec, MetricValue};
use crate::error::RlogError;

const ARITY: Arity = Arity::exactly(1);

/// Captures every raw value since the last reset.
///
/// Consumers summarize the values downstream, typically as a histogram when
/// the metric is declared with [`ValueKind::Histogram`](super::ValueKind::Histogram).
#[derive(Debug)]
pub struct ValueCapture {
    descriptor: Descriptor,
    values: Vec<f64>,
    updated: bool,
}

impl ValueCapture {
    /// Constructs the metric.
    pub fn new(spec: MetricSpec) -> Result<Self, RlogError> {
        Ok(Self {
            descriptor: spec.compile(ARITY)?,
            values: vec![],
            updated: false,
        })
    }
}

impl Metric for ValueCapture {
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
        self.values.extend_from_slice(args[0].as_slice());
        self.updated = true;
        Ok(())
    }

    fn value(&mut self) -> MetricValue {
        MetricValue::Values(self.values.clone())
    }

    fn reset(&mut self) {
        if self.descriptor.resettable {
            self.values.clear();
            self.updated = false;
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::metric::ValueKind;

    #[test]
    fn test_capture() {
        let spec = MetricSpec::new("gaussians").value_kind(ValueKind::Histogram);
        let mut m = ValueCapture::new(spec).unwrap();
        assert_eq!(m.value(), MetricValue::Values(vec![]));
        assert_eq!(m.value_kind(), ValueKind::Histogram);

        m.accumulate(&[0.5.into()]).unwrap();
        m.accumulate(&[vec![0.1, -0.2].into()]).unwrap();
        assert_eq!(m.value(), MetricValue::Values(vec![0.5, 0.1, -0.2]));

        m.reset();
        m.reset();
        assert_eq!(m.value(), MetricValue::Values(vec![]));
        assert!(!m.updated());
    }
}
