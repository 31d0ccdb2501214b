// Copyright @yucwang 2026

use crate::core::batch::Mask;
use crate::core::bsdf::BSDF;
use crate::core::emitter::Emitter;
use crate::core::interaction::{DirectionSample, ShapeIntersection, SurfaceInteraction};
use crate::core::sensor::Sensor;
use crate::core::shape::Shape;
use crate::math::constants::{ Float, ONE_MINUS_EPSILON, Vector2f };
use crate::math::ray::Ray3f;
use crate::math::spectrum::Spectrum;
use std::sync::Arc;

pub struct SceneObject<S: Spectrum> {
    pub shape: Arc<dyn Shape>,
    pub bsdf: Arc<dyn BSDF<S>>,
    pub emitter: Option<Arc<dyn Emitter<S>>>,
    pub name: Option<String>,
}

impl<S: Spectrum> SceneObject<S> {
    pub fn new(shape: Arc<dyn Shape>, bsdf: Arc<dyn BSDF<S>>) -> Self {
        Self { shape, bsdf, emitter: None, name: None }
    }

    pub fn with_emitter(mut self, emitter: Arc<dyn Emitter<S>>) -> Self {
        self.emitter = Some(emitter);
        self
    }

    pub fn with_name(mut self, name: String) -> Self {
        self.name = Some(name);
        self
    }
}

pub struct Scene<S: Spectrum> {
    objects: Vec<SceneObject<S>>,
    emitters: Vec<Arc<dyn Emitter<S>>>,
    environment: Option<Arc<dyn Emitter<S>>>,
    sensors: Vec<Box<dyn Sensor>>,
}

impl<S: Spectrum> Default for Scene<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Spectrum> Scene<S> {
    pub fn new() -> Self {
        Self {
            objects: Vec::new(),
            emitters: Vec::new(),
            environment: None,
            sensors: Vec::new(),
        }
    }

    pub fn add_object(&mut self, object: SceneObject<S>) {
        if let Some(emitter) = &object.emitter {
            self.emitters.push(emitter.clone());
        }
        self.objects.push(object);
    }

    /// Registers a free-standing emitter. An infinite emitter also becomes
    /// the environment seen by escaping rays; the last one added wins.
    pub fn add_emitter(&mut self, emitter: Arc<dyn Emitter<S>>) {
        if emitter.is_environment() {
            self.environment = Some(emitter.clone());
        }
        self.emitters.push(emitter);
    }

    pub fn add_sensor(&mut self, sensor: Box<dyn Sensor>) {
        self.sensors.push(sensor);
    }

    pub fn emitters(&self) -> &Vec<Arc<dyn Emitter<S>>> {
        &self.emitters
    }

    pub fn environment(&self) -> Option<&Arc<dyn Emitter<S>>> {
        self.environment.as_ref()
    }

    pub fn sensors(&self) -> &Vec<Box<dyn Sensor>> {
        &self.sensors
    }

    pub fn camera(&self, camera_id: usize) -> Option<&dyn Sensor> {
        self.sensors.get(camera_id).map(|s| s.as_ref())
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Closest hit along `ray`. Misses come back as an invalid interaction.
    pub fn ray_intersect(&self, ray: &Ray3f) -> SurfaceInteraction<S> {
        let mut segment = *ray;
        let mut closest: Option<(usize, ShapeIntersection)> = None;
        for (idx, object) in self.objects.iter().enumerate() {
            if let Some(hit) = object.shape.ray_intersection(&segment) {
                if segment.update(hit.t) {
                    closest = Some((idx, hit));
                }
            }
        }

        match closest {
            Some((idx, hit)) => {
                let object = &self.objects[idx];
                SurfaceInteraction::from_hit(&hit, ray, Some(object.bsdf.clone()), object.emitter.clone())
            }
            None => SurfaceInteraction::invalid(ray),
        }
    }

    /// Any-hit occlusion query.
    pub fn ray_test(&self, ray: &Ray3f) -> bool {
        self.objects.iter().any(|object| object.shape.ray_intersection_t(ray))
    }

    pub fn ray_intersect_wavefront(&self, rays: &[Ray3f], active: &Mask) -> Vec<SurfaceInteraction<S>> {
        rays.iter()
            .zip(active.iter())
            .map(|(ray, a)| if a { self.ray_intersect(ray) } else { SurfaceInteraction::invalid(ray) })
            .collect()
    }

    /// Picks one emitter uniformly (reusing `u.x`) and samples a direction
    /// toward it. The pdf includes the selection probability and the value
    /// is zeroed when `test_visibility` finds the connection blocked.
    pub fn sample_emitter_direction(&self,
                                    reference: &SurfaceInteraction<S>,
                                    u: &Vector2f,
                                    test_visibility: bool) -> (DirectionSample, S) {
        if self.emitters.is_empty() {
            return (DirectionSample::default(), S::zero());
        }

        let count = self.emitters.len();
        let scaled = u.x * count as Float;
        let index = (scaled as usize).min(count - 1);
        let u_reused = Vector2f::new((scaled - index as Float).min(ONE_MINUS_EPSILON), u.y);

        let (mut ds, mut value) = self.emitters[index].sample_direction(reference, &u_reused);
        if ds.pdf <= 0.0 {
            return (ds, S::zero());
        }
        ds.pdf /= count as Float;
        value = value * count as Float;

        if test_visibility && !value.is_black() {
            let shadow_ray = if ds.dist.is_finite() {
                reference.spawn_ray_to(&ds.p)
            } else {
                reference.spawn_ray(&ds.d)
            };
            if self.ray_test(&shadow_ray) {
                value = S::zero();
            }
        }
        (ds, value)
    }

    /// Density with which `sample_emitter_direction` generates `ds` on `emitter`.
    pub fn pdf_emitter_direction(&self,
                                 reference: &SurfaceInteraction<S>,
                                 ds: &DirectionSample,
                                 emitter: &dyn Emitter<S>) -> Float {
        if self.emitters.is_empty() {
            return 0.0;
        }
        emitter.pdf_direction(reference, ds) / self.emitters.len() as Float
    }
}
