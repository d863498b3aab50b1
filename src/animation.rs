//! Time-varying material parameters.

use glam::Vec2;

/// Scroll rate of both cloud layers, in UV units per second on each axis.
pub const CLOUD_SCROLL_RATE: f32 = 0.008;

/// Texture offsets of the two sky cloud layers.
///
/// Both layers drift at the same rate from different starting offsets, so they
/// never line up.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CloudLayers {
    pub first: Vec2,
    pub second: Vec2,
}

impl Default for CloudLayers {
    fn default() -> Self {
        Self {
            first: Vec2::new(0.001, 0.005),
            second: Vec2::new(-0.01, 0.001),
        }
    }
}

impl CloudLayers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Offsets grow without bound; the sampler repeats.
    pub fn advance(&mut self, dt: f32) {
        let step = Vec2::splat(dt * CLOUD_SCROLL_RATE);
        self.first += step;
        self.second += step;
    }
}

/// A triangle wave between 0 and 1 driving the post-effect strength.
///
/// The direction flips after the tick that reaches or crosses a bound, so the
/// value can overshoot by up to one tick. Consumers clamp.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EffectOscillator {
    percent: f32,
    rising: bool,
}

impl Default for EffectOscillator {
    fn default() -> Self {
        Self {
            percent: 0.0,
            rising: true,
        }
    }
}

impl EffectOscillator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn percent(&self) -> f32 {
        self.percent
    }

    pub fn is_rising(&self) -> bool {
        self.rising
    }

    pub fn advance(&mut self, dt: f32) {
        self.percent += if self.rising { dt } else { -dt };
        if self.percent >= 1.0 {
            self.rising = false;
        } else if self.percent <= 0.0 {
            self.rising = true;
        }
    }
}
