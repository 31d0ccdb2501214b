// Copyright @yucwang 2026

use crate::core::computation_node::ComputationNode;
use crate::core::interaction::{DirectionSample, SurfaceInteraction};
use crate::math::constants::{Float, Vector2f};
use crate::math::spectrum::Spectrum;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmitterFlag(u8);

impl EmitterFlag {
    pub const NONE: Self = Self(0);
    pub const SURFACE: Self = Self(1 << 0);
    pub const INFINITE: Self = Self(1 << 1);
    pub const DELTA_POSITION: Self = Self(1 << 2);
    pub const DELTA_DIRECTION: Self = Self(1 << 3);
    pub const DELTA: Self = Self(Self::DELTA_POSITION.0 | Self::DELTA_DIRECTION.0);

    pub fn contains(self, other: Self) -> bool {
        (self.0 & other.0) != 0
    }
}

impl std::ops::BitOr for EmitterFlag {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        Self(self.0 | rhs.0)
    }
}

impl std::ops::BitOrAssign for EmitterFlag {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

pub trait Emitter<S: Spectrum>: ComputationNode + Send + Sync {
    fn flags(&self) -> EmitterFlag;

    fn is_environment(&self) -> bool {
        self.flags().contains(EmitterFlag::INFINITE)
    }

    /// Radiance leaving the emitter toward the ray that produced `si`.
    /// For an invalid `si` this is the environment lookup along the ray.
    fn eval(&self, si: &SurfaceInteraction<S>) -> S;

    /// Samples a direction from `reference` toward the emitter. The returned
    /// value is the incident radiance divided by the solid-angle pdf, without
    /// any visibility test.
    fn sample_direction(&self, reference: &SurfaceInteraction<S>,
                               u: &Vector2f) -> (DirectionSample, S);

    /// Solid-angle density that `sample_direction` would produce `ds`.
    fn pdf_direction(&self, reference: &SurfaceInteraction<S>,
                            ds: &DirectionSample) -> Float;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delta_flags() {
        let point = EmitterFlag::DELTA_POSITION;
        assert!(point.contains(EmitterFlag::DELTA));
        assert!(!EmitterFlag::SURFACE.contains(EmitterFlag::DELTA));
        let mut flags = EmitterFlag::NONE;
        flags |= EmitterFlag::INFINITE;
        assert!(flags.contains(EmitterFlag::INFINITE));
        assert_eq!(EmitterFlag::SURFACE | EmitterFlag::NONE, EmitterFlag::SURFACE);
    }
}
