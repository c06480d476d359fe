//! Position-dependent selection weights for slide generators.

use std::sync::Arc;

/// Relative likelihood of a slide generator at a deck position.
pub trait WeightFunction: Send + Sync {
    /// Weight at 0-based `position`. Never negative.
    fn weight(&self, position: usize) -> f64;
}

/// Shared weight function.
pub type BoxedWeight = Arc<dyn WeightFunction>;

impl<F> WeightFunction for F
where
    F: Fn(usize) -> f64 + Send + Sync,
{
    fn weight(&self, position: usize) -> f64 {
        self(position)
    }
}

/// The same weight everywhere.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConstantWeight {
    value: f64,
}

impl ConstantWeight {
    pub fn new(value: f64) -> Self {
        Self {
            value: value.max(0.0),
        }
    }
}

impl WeightFunction for ConstantWeight {
    fn weight(&self, _position: usize) -> f64 {
        self.value
    }
}

/// A weight that peaks at chosen positions and drops to a baseline elsewhere.
///
/// At distance `d` from the nearest peak position the weight is
/// `max(baseline, peak * falloff^d)`. With the default falloff of `0` the
/// weight is `peak` on a peak position and `baseline` everywhere else.
#[derive(Debug, Clone, PartialEq)]
pub struct PeakedWeight {
    centers: Vec<usize>,
    peak: f64,
    baseline: f64,
    falloff: f64,
}

impl PeakedWeight {
    /// Peak at each of `centers`.
    pub fn new(centers: impl Into<Vec<usize>>, peak: f64, baseline: f64) -> Self {
        let baseline = baseline.max(0.0);
        Self {
            centers: centers.into(),
            peak: peak.max(baseline),
            baseline,
            falloff: 0.0,
        }
    }

    /// Let the weight decay geometrically by `falloff` per position away
    /// from a peak instead of dropping straight to the baseline.
    pub fn with_falloff(mut self, falloff: f64) -> Self {
        self.falloff = falloff.clamp(0.0, 1.0);
        self
    }

    fn distance_to_nearest(&self, position: usize) -> Option<usize> {
        self.centers.iter().map(|&c| c.abs_diff(position)).min()
    }
}

impl WeightFunction for PeakedWeight {
    fn weight(&self, position: usize) -> f64 {
        let Some(distance) = self.distance_to_nearest(position) else {
            return self.baseline;
        };
        let decayed = match distance {
            0 => self.peak,
            d => self.peak * self.falloff.powi(d.min(i32::MAX as usize) as i32),
        };
        decayed.max(self.baseline)
    }
}

/// Constant weight `value`, shared.
pub fn constant(value: f64) -> BoxedWeight {
    Arc::new(ConstantWeight::new(value))
}

/// Peak `peak` at `centers`, `baseline` elsewhere, shared.
pub fn peaked(centers: &[usize], peak: f64, baseline: f64) -> BoxedWeight {
    Arc::new(PeakedWeight::new(centers.to_vec(), peak, baseline))
}
