// Copyright @yucwang 2021

use crate::core::film::Film;
use crate::core::sampler::Sampler;
use crate::core::scene::Scene;
use crate::math::spectrum::Spectrum;

use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum RenderError {
    MissingSensor(usize),
    EmptyFilm { width: usize, height: usize },
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::MissingSensor(id) => write!(f, "scene has no sensor with index {}", id),
            RenderError::EmptyFilm { width, height } => write!(f, "sensor film is empty ({}x{})", width, height),
        }
    }
}

impl std::error::Error for RenderError {}

pub trait Renderer<S: Spectrum> {
    /// `sampler` is a prototype; workers fork their own copies from it.
    fn render(&self, scene: &Scene<S>, sampler: &dyn Sampler) -> Result<Film, RenderError>;
}
