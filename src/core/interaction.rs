// Copyright @yucwang 2023

use crate::core::bsdf::BSDF;
use crate::core::emitter::Emitter;
use crate::core::scene::Scene;
use crate::math::constants::{ Float, Vector2f, Vector3f };
use crate::math::frame::Frame;
use crate::math::ray::Ray3f;
use crate::math::spectrum::Spectrum;

use std::fmt;
use std::sync::Arc;

/// Raw hit reported by a shape, before the scene attaches materials.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShapeIntersection {
    pub t: Float,
    pub p: Vector3f,
    pub n: Vector3f,
    pub uv: Vector2f,
}

/// Point sampled on a surface; `pdf` is with respect to area.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionSample {
    pub p: Vector3f,
    pub n: Vector3f,
    pub uv: Vector2f,
    pub pdf: Float,
}

#[derive(Clone)]
pub struct SurfaceInteraction<S: Spectrum> {
    t: Float,
    p: Vector3f,
    n: Vector3f,
    uv: Vector2f,
    sh_frame: Frame,
    wi: Vector3f,
    bsdf: Option<Arc<dyn BSDF<S>>>,
    emitter: Option<Arc<dyn Emitter<S>>>,
}

impl<S: Spectrum> fmt::Debug for SurfaceInteraction<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SurfaceInteraction")
            .field("t", &self.t)
            .field("p", &self.p)
            .field("n", &self.n)
            .field("wi", &self.wi)
            .field("has_bsdf", &self.bsdf.is_some())
            .field("has_emitter", &self.emitter.is_some())
            .finish()
    }
}

impl<S: Spectrum> SurfaceInteraction<S> {
    /// Record for a ray that left the scene. The incident direction is kept
    /// in world space (identity frame) so environment emitters can look it up.
    pub fn invalid(ray: &Ray3f) -> Self {
        Self {
            t: Float::INFINITY,
            p: ray.origin(),
            n: Vector3f::zeros(),
            uv: Vector2f::zeros(),
            sh_frame: Frame::default(),
            wi: -ray.dir(),
            bsdf: None,
            emitter: None,
        }
    }

    pub fn from_hit(hit: &ShapeIntersection,
                    ray: &Ray3f,
                    bsdf: Option<Arc<dyn BSDF<S>>>,
                    emitter: Option<Arc<dyn Emitter<S>>>) -> Self {
        let sh_frame = Frame::from_normal(&hit.n);
        let wi = sh_frame.to_local(&(-ray.dir()));
        Self { t: hit.t, p: hit.p, n: hit.n, uv: hit.uv, sh_frame, wi, bsdf, emitter }
    }

    pub fn is_valid(&self) -> bool {
        self.t.is_finite()
    }

    pub fn t(&self) -> Float {
        self.t
    }

    pub fn p(&self) -> Vector3f {
        self.p
    }

    pub fn n(&self) -> Vector3f {
        self.n
    }

    pub fn uv(&self) -> Vector2f {
        self.uv
    }

    /// Incident direction in the local shading frame, pointing back along the ray.
    pub fn wi(&self) -> Vector3f {
        self.wi
    }

    pub fn bsdf(&self) -> Option<&Arc<dyn BSDF<S>>> {
        self.bsdf.as_ref()
    }

    pub fn attached_emitter(&self) -> Option<&Arc<dyn Emitter<S>>> {
        self.emitter.as_ref()
    }

    /// Emitter seen by this interaction: the surface's own emitter for hits,
    /// the scene's environment for misses.
    pub fn emitter(&self, scene: &Scene<S>) -> Option<Arc<dyn Emitter<S>>> {
        if self.is_valid() {
            self.emitter.clone()
        } else {
            scene.environment().cloned()
        }
    }

    pub fn to_local(&self, v: &Vector3f) -> Vector3f {
        self.sh_frame.to_local(v)
    }

    pub fn to_world(&self, v: &Vector3f) -> Vector3f {
        self.sh_frame.to_world(v)
    }

    pub fn spawn_ray(&self, d: &Vector3f) -> Ray3f {
        Ray3f::spawn(&self.p, &self.n, d)
    }

    pub fn spawn_ray_to(&self, target: &Vector3f) -> Ray3f {
        Ray3f::spawn_to(&self.p, &self.n, target)
    }
}

/// Direction toward an emitter, as seen from a reference point.
/// `pdf` is with respect to solid angle at the reference point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionSample {
    pub p: Vector3f,
    pub n: Vector3f,
    pub d: Vector3f,
    pub dist: Float,
    pub pdf: Float,
    pub delta: bool,
}

impl Default for DirectionSample {
    fn default() -> Self {
        Self {
            p: Vector3f::zeros(),
            n: Vector3f::zeros(),
            d: Vector3f::zeros(),
            dist: 0.0,
            pdf: 0.0,
            delta: false,
        }
    }
}

impl DirectionSample {
    /// Geometry of reaching `si` from `reference` along an already traced ray.
    /// Used to ask emitter sampling how likely it would have been to pick it.
    pub fn from_hit<S: Spectrum>(si: &SurfaceInteraction<S>,
                                 reference: &SurfaceInteraction<S>) -> Self {
        if si.is_valid() {
            let mut d = si.p() - reference.p();
            let dist = d.norm();
            if dist > 0.0 {
                d /= dist;
            }
            Self { p: si.p(), n: si.n(), d, dist, pdf: 0.0, delta: false }
        } else {
            let d = -si.to_world(&si.wi());
            Self { p: reference.p() + d, n: -d, d, dist: Float::INFINITY, pdf: 0.0, delta: false }
        }
    }
}
