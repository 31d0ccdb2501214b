// Copyright @yucwang 2026

use crate::core::batch::Mask;
use crate::core::bsdf::BSDFFlags;
use crate::core::computation_node::{generate_node_id, ComputationNode};
use crate::core::integrator::{IntegratorOutput, SamplingIntegrator};
use crate::core::interaction::{DirectionSample, SurfaceInteraction};
use crate::core::properties::{ConfigError, Properties};
use crate::core::sampler::Sampler;
use crate::core::scene::Scene;
use crate::integrators::mis::mis_weight;
use crate::integrators::path_state::PathBatch;
use crate::integrators::roulette::{RouletteOutcome, RussianRoulette};
use crate::math::ray::Ray3f;
use crate::math::spectrum::Spectrum;

/// Name of the auxiliary channel holding the last valid hit distance.
pub const DEPTH_AOV: &str = "depth.Y";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathIntegratorConfig {
    /// Longest path, counted in intersected segments.
    pub max_depth: u32,
    /// Depth from which Russian roulette may terminate paths.
    pub rr_depth: u32,
    /// Drop paths that never scatter off a non-null surface.
    pub hide_emitters: bool,
}

impl Default for PathIntegratorConfig {
    fn default() -> Self {
        Self { max_depth: 5, rr_depth: 5, hide_emitters: false }
    }
}

impl PathIntegratorConfig {
    pub fn from_properties(props: &Properties) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let config = Self {
            max_depth: depth_property(props, "max_depth", defaults.max_depth)?,
            rr_depth: depth_property(props, "rr_depth", defaults.rr_depth)?,
            hide_emitters: props.bool_or("hide_emitters", defaults.hide_emitters)?,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rr_depth > self.max_depth {
            return Err(ConfigError::InvalidValue {
                name: "rr_depth".to_string(),
                reason: format!("rr_depth ({}) must not exceed max_depth ({})", self.rr_depth, self.max_depth),
            });
        }
        Ok(())
    }
}

fn depth_property(props: &Properties, name: &str, default: u32) -> Result<u32, ConfigError> {
    let value = props.integer_or(name, default as i64)?;
    if value < 0 {
        return Err(ConfigError::InvalidValue {
            name: name.to_string(),
            reason: format!("must be non-negative, got {}", value),
        });
    }
    if value > u32::MAX as i64 {
        return Err(ConfigError::InvalidValue {
            name: name.to_string(),
            reason: format!("{} is out of range", value),
        });
    }
    Ok(value as u32)
}

/// Validity of a path before its first bounce: counted only when emitters
/// are visible and an environment exists to be seen.
pub fn initial_valid_ray(hide_emitters: bool, has_environment: bool) -> bool {
    (!hide_emitters) && has_environment
}

/// Unidirectional path tracer with next event estimation. Emitter samples
/// and BSDF samples are combined with the power heuristic.
pub struct PathIntegrator {
    id: String,
    config: PathIntegratorConfig,
}

impl PathIntegrator {
    pub fn new(config: PathIntegratorConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { id: generate_node_id("PathIntegrator"), config })
    }

    pub fn from_properties(props: &Properties) -> Result<Self, ConfigError> {
        let mut integrator = Self::new(PathIntegratorConfig::from_properties(props)?)?;
        if let Some(id) = props.id() {
            integrator.id = id.to_string();
        }
        Ok(integrator)
    }

    pub fn config(&self) -> &PathIntegratorConfig {
        &self.config
    }

    /// Runs the wavefront to completion and returns the final path state.
    pub fn trace<S: Spectrum>(&self,
                              scene: &Scene<S>,
                              sampler: &mut dyn Sampler,
                              rays: &[Ray3f],
                              active: &Mask) -> PathBatch<S> {
        let valid_ray = initial_valid_ray(self.config.hide_emitters, scene.environment().is_some());
        let mut batch = PathBatch::new(rays, active, valid_ray);
        let roulette = RussianRoulette::new(self.config.rr_depth);

        let mut iteration = 0;
        while iteration < self.config.max_depth && batch.active.any() {
            log::debug!("path iteration {}: {} of {} lanes active",
                        iteration, batch.active.count(), batch.len());

            let si = scene.ray_intersect_wavefront(&batch.rays, &batch.active);
            self.accumulate_emitter_hits(scene, &si, &mut batch);

            let eligible = self.eligible_lanes(&si, &batch);
            self.sample_emitters(scene, sampler, &si, &eligible, &mut batch);
            let sampled = self.sample_bsdfs(sampler, &si, &eligible, &mut batch);
            self.update_validity(&si, &sampled, &mut batch);
            advance_depth(&si, &mut batch);
            batch.active = self.russian_roulette(sampler, &roulette, &eligible, &mut batch);

            iteration += 1;
        }
        batch
    }

    // Emitters reached by the previous BSDF sample. Camera rays have no
    // sampling history (delta, pdf 1) and see area emitters at full weight,
    // but a camera ray that escapes collects nothing. With hidden emitters a
    // lane only collects emission once it has scattered off a visible surface.
    fn accumulate_emitter_hits<S: Spectrum>(&self,
                                            scene: &Scene<S>,
                                            si: &[SurfaceInteraction<S>],
                                            batch: &mut PathBatch<S>) {
        for i in 0..batch.len() {
            let first_segment = batch.prev_si[i].is_none();
            if !batch.active[i] || (first_segment && !si[i].is_valid()) {
                continue;
            }
            if self.config.hide_emitters && !batch.valid_ray[i] {
                continue;
            }
            let emitter = match si[i].emitter(scene) {
                Some(emitter) => emitter,
                None => continue,
            };

            let weight = match (&batch.prev_si[i], batch.prev_bsdf_delta[i]) {
                (Some(prev), false) => {
                    let ds = DirectionSample::from_hit(&si[i], prev);
                    let emitter_pdf = scene.pdf_emitter_direction(prev, &ds, emitter.as_ref());
                    mis_weight(batch.prev_bsdf_pdf[i], emitter_pdf)
                }
                _ => 1.0,
            };

            let emitted = emitter.eval(&si[i]).finite_or_zero();
            batch.radiance[i] += (batch.throughput[i] * emitted * weight).finite_or_zero();
        }
    }

    fn eligible_lanes<S: Spectrum>(&self, si: &[SurfaceInteraction<S>], batch: &PathBatch<S>) -> Mask {
        let hit = Mask::from_fn(batch.len(), |i| si[i].is_valid());
        let below_max = Mask::from_fn(batch.len(), |i| {
            batch.depth[i].saturating_add(1) < self.config.max_depth
        });
        &(&batch.active & &hit) & &below_max
    }

    // Next event estimation, only on surfaces with a non-delta lobe.
    fn sample_emitters<S: Spectrum>(&self,
                                    scene: &Scene<S>,
                                    sampler: &mut dyn Sampler,
                                    si: &[SurfaceInteraction<S>],
                                    eligible: &Mask,
                                    batch: &mut PathBatch<S>) {
        let smooth = eligible & &Mask::from_fn(batch.len(), |i| {
            si[i].bsdf().map_or(false, |bsdf| bsdf.flags().contains(BSDFFlags::SMOOTH))
        });
        if smooth.none() {
            return;
        }

        let u = sampler.next_2d(&smooth);
        for i in 0..batch.len() {
            if !smooth[i] {
                continue;
            }
            let bsdf = match si[i].bsdf() {
                Some(bsdf) => bsdf,
                None => continue,
            };

            let (ds, emitter_value) = scene.sample_emitter_direction(&si[i], &u[i], true);
            if ds.pdf <= 0.0 || emitter_value.is_black() {
                continue;
            }

            let wo = si[i].to_local(&ds.d);
            let eval = bsdf.eval_pdf(&si[i], &wo);
            let weight = if ds.delta { 1.0 } else { mis_weight(ds.pdf, eval.pdf) };
            let contribution = batch.throughput[i] * eval.value * emitter_value * weight;
            batch.radiance[i] += contribution.finite_or_zero();
        }
    }

    // Returns the lobe type sampled on each eligible lane.
    fn sample_bsdfs<S: Spectrum>(&self,
                                 sampler: &mut dyn Sampler,
                                 si: &[SurfaceInteraction<S>],
                                 eligible: &Mask,
                                 batch: &mut PathBatch<S>) -> Vec<Option<BSDFFlags>> {
        let u1 = sampler.next_1d(eligible);
        let u2 = sampler.next_2d(eligible);
        let mut sampled = vec![None; batch.len()];
        for i in 0..batch.len() {
            if !eligible[i] {
                continue;
            }
            let bsdf = match si[i].bsdf() {
                Some(bsdf) => bsdf,
                None => continue,
            };

            let (bs, weight) = bsdf.sample(&si[i], u1[i], &u2[i]);
            let weight = if bs.pdf > 0.0 { weight.finite_or_zero() } else { S::zero() };

            batch.rays[i] = si[i].spawn_ray(&si[i].to_world(&bs.wo));
            batch.throughput[i] = batch.throughput[i] * weight;
            batch.eta[i] *= bs.eta;
            batch.prev_si[i] = Some(si[i].clone());
            batch.prev_bsdf_pdf[i] = bs.pdf;
            batch.prev_bsdf_delta[i] = bs.sampled_type.contains(BSDFFlags::DELTA);
            sampled[i] = Some(bs.sampled_type);
        }
        sampled
    }

    // A path becomes valid at any active hit on a surface that scatters
    // (non-null), whether or not it continues. Lanes that sampled a lobe use
    // the sampled type, the rest the surface's lobes. With hidden emitters an
    // emitting surface reached before any scattering does not count.
    fn update_validity<S: Spectrum>(&self,
                                    si: &[SurfaceInteraction<S>],
                                    sampled: &[Option<BSDFFlags>],
                                    batch: &mut PathBatch<S>) {
        for i in 0..batch.len() {
            if !batch.active[i] || !si[i].is_valid() || batch.valid_ray[i] {
                continue;
            }
            if self.config.hide_emitters && si[i].attached_emitter().is_some() {
                continue;
            }
            let scatters = match sampled[i] {
                Some(lobe) => !lobe.contains(BSDFFlags::NULL),
                None => si[i].bsdf()
                    .map_or(false, |bsdf| !bsdf.flags().without(BSDFFlags::NULL).is_empty()),
            };
            if scatters {
                batch.valid_ray.set(i, true);
            }
        }
    }

    // Returns the mask of lanes that keep tracing.
    fn russian_roulette<S: Spectrum>(&self,
                                     sampler: &mut dyn Sampler,
                                     roulette: &RussianRoulette,
                                     eligible: &Mask,
                                     batch: &mut PathBatch<S>) -> Mask {
        let rr_lanes = eligible & &Mask::from_fn(batch.len(), |i| roulette.applies(batch.depth[i]));
        let u = sampler.next_1d(&rr_lanes);

        let mut next_active = Mask::new(batch.len(), false);
        for i in 0..batch.len() {
            if !eligible[i] {
                continue;
            }
            let throughput_max = batch.throughput[i].max_channel();
            if !(throughput_max > 0.0) {
                continue;
            }
            if rr_lanes[i] {
                let q = RussianRoulette::survival_probability(throughput_max, batch.eta[i]);
                match RussianRoulette::decide(q, u[i]) {
                    RouletteOutcome::Continue { compensation } => {
                        batch.throughput[i] = batch.throughput[i] * compensation;
                    }
                    RouletteOutcome::Terminate => continue,
                }
            }
            next_active.set(i, true);
        }
        next_active
    }
}

// Depth counts intersected segments; misses do not add to it.
fn advance_depth<S: Spectrum>(si: &[SurfaceInteraction<S>], batch: &mut PathBatch<S>) {
    for i in 0..batch.len() {
        if batch.active[i] && si[i].is_valid() {
            batch.depth[i] += 1;
            batch.last_t[i] = si[i].t();
        }
    }
}

impl ComputationNode for PathIntegrator {
    fn id(&self) -> &str {
        &self.id
    }

    fn to_string(&self) -> String {
        format!("PathIntegrator[id={}, max_depth={}, rr_depth={}, hide_emitters={}]",
                self.id, self.config.max_depth, self.config.rr_depth, self.config.hide_emitters)
    }
}

impl<S: Spectrum> SamplingIntegrator<S> for PathIntegrator {
    fn sample(&self,
              scene: &Scene<S>,
              sampler: &mut dyn Sampler,
              rays: &[Ray3f],
              active: &Mask) -> IntegratorOutput<S> {
        self.trace(scene, sampler, rays, active).into_output(self.config.hide_emitters)
    }

    fn aov_names(&self) -> Vec<String> {
        vec![DEPTH_AOV.to_string()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::bsdf::BSDF;
    use crate::core::emitter::Emitter;
    use crate::core::properties::PropertyValue;
    use crate::core::rng::LcgRng;
    use crate::core::scene::SceneObject;
    use crate::core::shape::Shape;
    use crate::emitters::area::AreaEmitter;
    use crate::emitters::constant::ConstantEmitter;
    use crate::materials::lambertian_diffuse::LambertianDiffuseBSDF;
    use crate::materials::null::NullBSDF;
    use crate::math::constants::{Float, Vector2f, Vector3f};
    use crate::math::spectrum::RGBSpectrum;
    use crate::math::transform::Transform;
    use crate::math::warp::sample_uniform_sphere;
    use crate::samplers::independent::IndependentSampler;
    use crate::shapes::rectangle::Rectangle;
    use crate::shapes::sphere::Sphere;
    use std::sync::Arc;

    fn assert_close(a: Float, b: Float, tol: Float) {
        assert!((a - b).abs() < tol, "expected {} ~ {} (tol {})", a, b, tol);
    }

    fn integrator(max_depth: u32, rr_depth: u32, hide_emitters: bool) -> PathIntegrator {
        PathIntegrator::new(PathIntegratorConfig { max_depth, rr_depth, hide_emitters })
            .expect("valid integrator config")
    }

    fn run<S: Spectrum>(integrator: &PathIntegrator, scene: &Scene<S>, rays: &[Ray3f], seed: u64) -> IntegratorOutput<S> {
        let mut sampler = IndependentSampler::new(1, seed);
        sampler.seed(0, rays.len());
        SamplingIntegrator::<S>::sample(integrator, scene, &mut sampler, rays, &Mask::new(rays.len(), true))
    }

    fn forward_ray() -> Ray3f {
        Ray3f::new(Vector3f::zeros(), Vector3f::new(0.0, 0.0, 1.0), None, None)
    }

    fn emissive_sphere_scene(bsdf: Arc<dyn BSDF<Float>>) -> Scene<Float> {
        let shape: Arc<dyn Shape> = Arc::new(Sphere::new(Vector3f::new(0.0, 0.0, 5.0), 1.0));
        let emitter: Arc<dyn Emitter<Float>> = Arc::new(AreaEmitter::new(shape.clone(), 2.0));
        let mut scene = Scene::new();
        scene.add_object(SceneObject::new(shape, bsdf).with_emitter(emitter));
        scene
    }

    fn black() -> Arc<dyn BSDF<Float>> {
        Arc::new(LambertianDiffuseBSDF::new(0.0))
    }

    #[test]
    fn test_default_config() {
        let config = PathIntegratorConfig::default();
        assert_eq!(config.max_depth, 5);
        assert_eq!(config.rr_depth, 5);
        assert!(!config.hide_emitters);

        let from_empty = PathIntegratorConfig::from_properties(&Properties::new("path"));
        assert_eq!(from_empty, Ok(config));
    }

    #[test]
    fn test_config_from_properties() {
        let mut props = Properties::new("path");
        props.set_id(Some("main".to_string()));
        props.set("max_depth", PropertyValue::Integer(8));
        props.set("rr_depth", PropertyValue::Integer(3));
        props.set("hide_emitters", PropertyValue::Boolean(true));

        let integrator = PathIntegrator::from_properties(&props).expect("valid properties");
        assert_eq!(*integrator.config(), PathIntegratorConfig { max_depth: 8, rr_depth: 3, hide_emitters: true });
        assert_eq!(integrator.id(), "main");
        assert_eq!(SamplingIntegrator::<Float>::aov_names(&integrator), vec!["depth.Y".to_string()]);
    }

    #[test]
    fn test_invalid_configs_fail_fast() {
        let mut props = Properties::new("path");
        props.set("max_depth", PropertyValue::Integer(-1));
        match PathIntegratorConfig::from_properties(&props) {
            Err(ConfigError::InvalidValue { name, .. }) => assert_eq!(name, "max_depth"),
            other => panic!("unexpected {:?}", other),
        }

        let mut props = Properties::new("path");
        props.set("max_depth", PropertyValue::Integer(2));
        props.set("rr_depth", PropertyValue::Integer(4));
        match PathIntegratorConfig::from_properties(&props) {
            Err(ConfigError::InvalidValue { name, .. }) => assert_eq!(name, "rr_depth"),
            other => panic!("unexpected {:?}", other),
        }

        let mut props = Properties::new("path");
        props.set("hide_emitters", PropertyValue::Integer(1));
        assert!(matches!(PathIntegratorConfig::from_properties(&props),
                         Err(ConfigError::TypeMismatch { .. })));

        assert!(PathIntegrator::new(PathIntegratorConfig { max_depth: 1, rr_depth: 2, hide_emitters: false }).is_err());
    }

    #[test]
    fn test_initial_valid_ray_truth_table() {
        assert!(initial_valid_ray(false, true));
        assert!(!initial_valid_ray(false, false));
        assert!(!initial_valid_ray(true, true));
        assert!(!initial_valid_ray(true, false));
    }

    #[test]
    fn test_emissive_sphere_seen_directly() {
        let scene = emissive_sphere_scene(black());
        let output = run(&integrator(2, 2, false), &scene, &[forward_ray()], 1);
        assert_close(output.radiance[0], 2.0, 1e-5);
        assert!(output.valid[0]);
        assert_close(output.aovs[0][0], 4.0, 1e-4);
    }

    #[test]
    fn test_hidden_emitter_without_scattering() {
        let scene = emissive_sphere_scene(black());
        let output = run(&integrator(1, 1, true), &scene, &[forward_ray()], 1);
        assert_eq!(output.radiance[0], 0.0);
        assert!(!output.valid[0]);
    }

    #[test]
    fn test_hidden_emitter_with_room_to_scatter() {
        // The camera ray is eligible to scatter off the emitter's own surface,
        // which must not reveal the emission it saw directly.
        let scene = emissive_sphere_scene(black());
        for &(max_depth, rr_depth) in &[(2u32, 2u32), (5, 5), (5, 1)] {
            let mut sampler = seeded(1, 1);
            let batch = integrator(max_depth, rr_depth, true)
                .trace(&scene, &mut sampler, &[forward_ray()], &Mask::new(1, true));
            assert_eq!(batch.radiance[0], 0.0);
            assert!(!batch.valid_ray[0]);

            let output = run(&integrator(max_depth, rr_depth, true), &scene, &[forward_ray()], 1);
            assert_eq!(output.radiance[0], 0.0);
            assert!(!output.valid[0]);
            assert_close(output.aovs[0][0], 4.0, 1e-4);
        }
    }

    #[test]
    fn test_emitter_seen_on_last_bounce() {
        let scene = emissive_sphere_scene(black());
        assert!(scene.environment().is_none());
        let output = run(&integrator(1, 1, false), &scene, &[forward_ray()], 1);
        assert_close(output.radiance[0], 2.0, 1e-5);
        assert!(output.valid[0]);
        assert_close(output.aovs[0][0], 4.0, 1e-4);
    }

    #[test]
    fn test_hiding_emitters_keeps_indirect_light() {
        // The floor is not emissive, so every path is validated at its first
        // hit and hiding emitters changes nothing.
        let scene = panel_scene();
        let camera_ray = Ray3f::new(Vector3f::new(0.0, -3.0, 0.5), Vector3f::new(0.0, 3.0, -0.5), None, None);
        let rays = vec![camera_ray; 256];
        let shown = run(&integrator(3, 3, false), &scene, &rays, 23);
        let hidden = run(&integrator(3, 3, true), &scene, &rays, 23);
        assert!(hidden.valid.all());
        assert_eq!(shown.radiance, hidden.radiance);
        assert!(hidden.radiance.iter().any(|l| *l > 0.0));
    }

    #[test]
    fn test_null_interfaces_do_not_validate_paths() {
        let scene = emissive_sphere_scene(Arc::new(NullBSDF::new(None)));
        let batch = integrator(3, 3, true).trace(&scene, &mut seeded(1, 1), &[forward_ray()], &Mask::new(1, true));
        assert_eq!(batch.depth[0], 2);
        assert!(!batch.valid_ray[0]);
        let output = batch.into_output(true);
        assert_eq!(output.radiance[0], 0.0);
        assert!(!output.valid[0]);
    }

    fn seeded(seed: u64, width: usize) -> IndependentSampler {
        let mut sampler = IndependentSampler::new(1, seed);
        sampler.seed(0, width);
        sampler
    }

    #[test]
    fn test_escaping_camera_rays() {
        let empty: Scene<Float> = Scene::new();
        let output = run(&integrator(5, 5, false), &empty, &[forward_ray()], 3);
        assert_eq!(output.radiance[0], 0.0);
        assert!(!output.valid[0]);
        assert_eq!(output.aovs[0][0], 0.0);

        let mut lit: Scene<Float> = Scene::new();
        lit.add_emitter(Arc::new(ConstantEmitter::new(1.0)));
        let output = run(&integrator(5, 5, false), &lit, &[forward_ray()], 3);
        assert_eq!(output.radiance[0], 0.0);
        assert!(output.valid[0]);

        let output = run(&integrator(5, 5, true), &lit, &[forward_ray()], 3);
        assert_eq!(output.radiance[0], 0.0);
        assert!(!output.valid[0]);
    }

    #[test]
    fn test_zero_max_depth_does_nothing() {
        let scene = emissive_sphere_scene(black());
        let output = run(&integrator(0, 0, false), &scene, &[forward_ray()], 1);
        assert_eq!(output.radiance[0], 0.0);
        assert!(!output.valid[0]);
    }

    #[test]
    fn test_masked_lanes_are_left_alone() {
        let scene = emissive_sphere_scene(black());
        let rays = [forward_ray(), forward_ray()];
        let mut sampler = seeded(5, 2);
        let batch = integrator(2, 2, false).trace(&scene, &mut sampler, &rays, &Mask::from_vec(vec![true, false]));
        assert_close(batch.radiance[0], 2.0, 1e-5);
        assert_eq!(batch.radiance[1], 0.0);
        assert_eq!(batch.depth[1], 0);
        assert_eq!(batch.throughput[1], 1.0);
        assert_eq!(batch.rays[1], rays[1]);
        assert!(!batch.valid_ray[1]);
    }

    fn furnace_scene() -> Scene<RGBSpectrum> {
        let mut scene = Scene::new();
        let walls: Arc<dyn Shape> = Arc::new(Sphere::new(Vector3f::zeros(), 10.0));
        let tint = RGBSpectrum::new(0.9, 0.5, 0.7);
        scene.add_object(SceneObject::new(walls, Arc::new(LambertianDiffuseBSDF::new(tint))));

        let bulb: Arc<dyn Shape> = Arc::new(Sphere::new(Vector3f::new(0.0, 0.0, 5.0), 1.0));
        let emitter: Arc<dyn Emitter<RGBSpectrum>> = Arc::new(AreaEmitter::new(bulb.clone(), RGBSpectrum::new(4.0, 4.0, 4.0)));
        scene.add_object(SceneObject::new(bulb, Arc::new(LambertianDiffuseBSDF::new(RGBSpectrum::new(0.5, 0.5, 0.5))))
                         .with_emitter(emitter));
        scene
    }

    fn scattered_rays(count: usize, seed: u64) -> Vec<Ray3f> {
        let mut rng = LcgRng::with_stream(seed, 0);
        (0..count)
            .map(|_| {
                let d = sample_uniform_sphere(&Vector2f::new(rng.next_f32(), rng.next_f32()));
                Ray3f::new(Vector3f::new(0.0, 0.0, -2.0), d, None, None)
            })
            .collect()
    }

    #[test]
    fn test_depth_and_throughput_bounds() {
        let scene = furnace_scene();
        let rays = scattered_rays(512, 17);
        for &(max_depth, rr_depth) in &[(1u32, 1u32), (2, 2), (4, 2), (8, 1)] {
            let mut sampler = seeded(max_depth as u64, rays.len());
            let batch = integrator(max_depth, rr_depth, false)
                .trace(&scene, &mut sampler, &rays, &Mask::new(rays.len(), true));
            for i in 0..batch.len() {
                assert!(batch.depth[i] <= max_depth, "depth {} > {}", batch.depth[i], max_depth);
                assert!(batch.throughput[i].min_channel() >= 0.0);
                assert!(batch.radiance[i].all_finite());
                assert!(batch.radiance[i].min_channel() >= 0.0);
                assert!(batch.eta[i] > 0.0);
            }
            assert!(batch.active.none());
        }
    }

    // Diffuse floor (albedo 0.5) under a unit constant sky. Reflected
    // radiance is 0.5; everything past the first bounce escapes.
    fn sky_scene() -> Scene<Float> {
        let mut scene = Scene::new();
        let floor: Arc<dyn Shape> = Arc::new(Rectangle::new(Transform::scale(&Vector3f::new(1000.0, 1000.0, 1.0))));
        scene.add_object(SceneObject::new(floor, Arc::new(LambertianDiffuseBSDF::new(0.5))));
        scene.add_emitter(Arc::new(ConstantEmitter::new(1.0)));
        scene
    }

    #[test]
    fn test_roulette_keeps_the_estimate_unbiased() {
        const EXPECTED: f64 = 0.5;
        const SAMPLES: usize = 16384;

        let scene = sky_scene();
        let camera_ray = Ray3f::new(Vector3f::new(0.0, -3.0, 0.5), Vector3f::new(0.0, 3.0, -0.5), None, None);
        let rays = vec![camera_ray; SAMPLES];

        // rr_depth == max_depth: roulette never applies.
        let plain = run(&integrator(3, 3, false), &scene, &rays, 29);
        // Roulette after the first bounce, survival probability 0.5.
        let mut sampler = seeded(29, SAMPLES);
        let batch = integrator(3, 1, false).trace(&scene, &mut sampler, &rays, &Mask::new(SAMPLES, true));
        // Terminated lanes keep the albedo 0.5, survivors are compensated to 1.
        let survived = batch.throughput.iter().filter(|t| (**t - 1.0).abs() < 1e-4).count();
        let killed = batch.throughput.iter().filter(|t| (**t - 0.5).abs() < 1e-4).count();
        let rouletted = batch.into_output(false);

        let (plain_mean, _) = mean_and_variance(&plain.radiance);
        let (rr_mean, _) = mean_and_variance(&rouletted.radiance);
        assert!((plain_mean - EXPECTED).abs() < 0.01, "plain mean {}", plain_mean);
        assert!((rr_mean - EXPECTED).abs() < 0.015, "roulette mean {}", rr_mean);

        assert!(survived + killed > SAMPLES - 16, "{} survived, {} killed", survived, killed);
        assert!(killed > SAMPLES / 3 && killed < 2 * SAMPLES / 3, "killed {}", killed);
    }

    // Diffuse floor (albedo 0.5) lit by a 2x2 unit-radiance panel one unit
    // above it. Outgoing radiance at the origin is 0.2771.
    fn panel_scene() -> Scene<Float> {
        let mut scene = Scene::new();
        let floor: Arc<dyn Shape> = Arc::new(Rectangle::new(Transform::scale(&Vector3f::new(10.0, 10.0, 1.0))));
        scene.add_object(SceneObject::new(floor, Arc::new(LambertianDiffuseBSDF::new(0.5))));

        let panel: Arc<dyn Shape> = Arc::new(Rectangle::new(
            Transform::translate(&Vector3f::new(0.0, 0.0, 1.0)) * Transform::scale(&Vector3f::new(1.0, -1.0, 1.0))));
        let emitter: Arc<dyn Emitter<Float>> = Arc::new(AreaEmitter::new(panel.clone(), 1.0));
        scene.add_object(SceneObject::new(panel, black()).with_emitter(emitter));
        scene
    }

    fn mean_and_variance(values: &[Float]) -> (f64, f64) {
        let n = values.len() as f64;
        let mean = values.iter().map(|v| *v as f64).sum::<f64>() / n;
        let var = values.iter().map(|v| (*v as f64 - mean).powi(2)).sum::<f64>() / (n - 1.0);
        (mean, var)
    }

    #[test]
    fn test_mis_converges_with_lower_variance() {
        const EXPECTED: f64 = 0.2771;
        const SAMPLES: usize = 16384;

        let scene = panel_scene();
        let camera_ray = Ray3f::new(Vector3f::new(0.0, -3.0, 0.5), Vector3f::new(0.0, 3.0, -0.5), None, None);
        let si = scene.ray_intersect(&camera_ray);
        assert!(si.is_valid());
        let bsdf = si.bsdf().expect("floor carries a bsdf").clone();

        let mut rng = LcgRng::with_stream(7, 1);
        let light_only: Vec<Float> = (0..SAMPLES)
            .map(|_| {
                let u = Vector2f::new(rng.next_f32(), rng.next_f32());
                let (ds, value) = scene.sample_emitter_direction(&si, &u, true);
                if ds.pdf > 0.0 { bsdf.eval(&si, &si.to_local(&ds.d)) * value } else { 0.0 }
            })
            .collect();

        let bsdf_only: Vec<Float> = (0..SAMPLES)
            .map(|_| {
                let u1 = rng.next_f32();
                let u2 = Vector2f::new(rng.next_f32(), rng.next_f32());
                let (bs, weight) = bsdf.sample(&si, u1, &u2);
                let hit = scene.ray_intersect(&si.spawn_ray(&si.to_world(&bs.wo)));
                let emitted = hit.emitter(&scene).map_or(0.0, |e| e.eval(&hit));
                weight * emitted
            })
            .collect();

        let rays = vec![camera_ray; SAMPLES];
        let output = run(&integrator(2, 2, false), &scene, &rays, 11);
        assert!(output.valid.all());

        let (light_mean, light_var) = mean_and_variance(&light_only);
        let (bsdf_mean, bsdf_var) = mean_and_variance(&bsdf_only);
        let (mis_mean, mis_var) = mean_and_variance(&output.radiance);

        assert!((light_mean - EXPECTED).abs() < 0.01, "light sampling mean {}", light_mean);
        assert!((bsdf_mean - EXPECTED).abs() < 0.01, "bsdf sampling mean {}", bsdf_mean);
        assert!((mis_mean - EXPECTED).abs() < 0.01, "mis mean {}", mis_mean);
        assert!(mis_var < light_var, "mis variance {} vs light {}", mis_var, light_var);
        assert!(mis_var < bsdf_var, "mis variance {} vs bsdf {}", mis_var, bsdf_var);
    }
}
