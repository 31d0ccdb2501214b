// Copyright @yucwang 2021

pub mod batch;
pub mod bsdf;
pub mod computation_node;
pub mod emitter;
pub mod film;
pub mod integrator;
pub mod interaction;
pub mod properties;
pub mod rng;
pub mod sampler;
pub mod scene;
pub mod scene_loader;
pub mod sensor;
pub mod shape;
