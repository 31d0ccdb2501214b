// Copyright @yucwang 2023

use crate::core::computation_node::ComputationNode;
use crate::core::interaction::SurfaceInteraction;
use crate::math::constants::{ Float, Vector2f, Vector3f };
use crate::math::spectrum::Spectrum;

/// Lobe classification of a BSDF or of one sampled event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BSDFFlags(u16);

impl BSDFFlags {
    pub const EMPTY: Self = Self(0);
    /// Index-matched passthrough: the ray continues unchanged.
    pub const NULL: Self = Self(1 << 0);
    pub const DIFFUSE_REFLECTION: Self = Self(1 << 1);
    pub const DIFFUSE_TRANSMISSION: Self = Self(1 << 2);
    pub const GLOSSY_REFLECTION: Self = Self(1 << 3);
    pub const GLOSSY_TRANSMISSION: Self = Self(1 << 4);
    pub const DELTA_REFLECTION: Self = Self(1 << 5);
    pub const DELTA_TRANSMISSION: Self = Self(1 << 6);

    pub const DIFFUSE: Self = Self(Self::DIFFUSE_REFLECTION.0 | Self::DIFFUSE_TRANSMISSION.0);
    pub const GLOSSY: Self = Self(Self::GLOSSY_REFLECTION.0 | Self::GLOSSY_TRANSMISSION.0);
    pub const SMOOTH: Self = Self(Self::DIFFUSE.0 | Self::GLOSSY.0);
    pub const DELTA: Self = Self(Self::NULL.0 | Self::DELTA_REFLECTION.0 | Self::DELTA_TRANSMISSION.0);

    /// True when any bit of `other` is set.
    pub fn contains(self, other: Self) -> bool {
        (self.0 & other.0) != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Lobes of `self` that are not in `other`.
    pub fn without(self, other: Self) -> Self {
        Self(self.0 & !other.0)
    }
}

impl std::ops::BitOr for BSDFFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        Self(self.0 | rhs.0)
    }
}

impl std::ops::BitOrAssign for BSDFFlags {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

// Definitions of types used in BSDF sampling and eval
// processes
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BSDFSampleRecord {
    /// Sampled outgoing direction, local frame.
    pub wo: Vector3f,
    pub pdf: Float,
    /// Relative index of refraction along the sampled direction.
    pub eta: Float,
    pub sampled_type: BSDFFlags,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BSDFEvalResult<S: Spectrum> {
    /// BSDF value times the cosine foreshortening.
    pub value: S,
    pub pdf: Float,
}

impl Default for BSDFSampleRecord {
    fn default() -> Self {
        Self {
            wo: Vector3f::zeros(),
            pdf: 0.0,
            eta: 1.0,
            sampled_type: BSDFFlags::EMPTY,
        }
    }
}

impl BSDFSampleRecord {
    pub fn new(wo: Vector3f, pdf: Float, eta: Float, sampled_type: BSDFFlags) -> Self {
        Self { wo, pdf, eta, sampled_type }
    }
}

impl<S: Spectrum> Default for BSDFEvalResult<S> {
    fn default() -> Self {
        Self {
            value: S::zero(),
            pdf: 0.0,
        }
    }
}

pub trait BSDF<S: Spectrum>: ComputationNode + Send + Sync {
    fn flags(&self) -> BSDFFlags;

    /// Draws an outgoing direction for `si.wi()`. The returned weight is
    /// `f * cos / pdf`, or `value / pdf` for delta lobes.
    fn sample(&self, si: &SurfaceInteraction<S>,
                     u1: Float,
                     u2: &Vector2f) -> (BSDFSampleRecord, S);

    /// Value (cosine included) and sampling density for the local
    /// direction `wo`. Delta lobes evaluate to zero.
    fn eval_pdf(&self, si: &SurfaceInteraction<S>, wo: &Vector3f) -> BSDFEvalResult<S>;

    fn eval(&self, si: &SurfaceInteraction<S>, wo: &Vector3f) -> S {
        self.eval_pdf(si, wo).value
    }

    fn pdf(&self, si: &SurfaceInteraction<S>, wo: &Vector3f) -> Float {
        self.eval_pdf(si, wo).pdf
    }
}
