use super::{Arg, Arity, Average, Descriptor, Metric, MetricSpec, MetricValue};
use crate::error::RlogError;

const ARITY: Arity = Arity::between(1, 2);

/// Exponentially weighted moving average of windowed [`Average`]s.
///
/// Accumulation goes to an inner [`Average`]. Reading the value closes the
/// current window: if the inner average was updated since its last reset, its
/// value is blended into the moving average and the inner average is reset.
///
/// Reading therefore mutates the metric. Two reads without an accumulation in
/// between return the same value, but a read between two accumulations splits
/// them into separate windows.
///
/// The metric itself is never resettable; [`Metric::reset`] only drops the
/// pending window of the inner average.
#[derive(Debug)]
pub struct Ema {
    descriptor: Descriptor,
    beta: f64,
    avg: Average,
    ema: Option<f64>,
    updated: bool,
}

impl Ema {
    /// Constructs the metric with smoothing factor `beta`.
    ///
    /// # Errors
    ///
    /// [`RlogError::InvalidConfigurationError`] if `beta` is not in `(0, 1)`.
    pub fn new(spec: MetricSpec, beta: f64) -> Result<Self, RlogError> {
        if !(beta > 0.0 && beta < 1.0) {
            return Err(RlogError::InvalidConfigurationError(format!(
                "smoothing factor of an exponential moving average must be in (0, 1), got {}",
                beta
            )));
        }
        let descriptor = spec.resettable(false).compile(ARITY)?;
        let avg = Average::new(MetricSpec::new(descriptor.name.clone()))?;

        Ok(Self {
            descriptor,
            beta,
            avg,
            ema: None,
            updated: false,
        })
    }

    /// The smoothing factor.
    pub fn beta(&self) -> f64 {
        self.beta
    }
}

impl Metric for Ema {
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
        self.avg.accumulate(args)?;
        self.updated = true;
        Ok(())
    }

    fn value(&mut self) -> MetricValue {
        if self.avg.updated() {
            let avg = self.avg.mean();
            self.avg.reset();
            self.ema = Some(match self.ema {
                None => avg,
                Some(ema) => self.beta * ema + (1.0 - self.beta) * avg,
            });
        }
        self.ema.map_or(MetricValue::Empty, MetricValue::Scalar)
    }

    fn reset(&mut self) {
        self.avg.reset();
    }
}
