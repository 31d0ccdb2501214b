// Copyright @yucwang 2026

use crate::math::constants::Vector2f;
use crate::math::ray::Ray3f;

pub trait Sensor: Send + Sync {
    /// `u` is the film position in `[0, 1]^2`, origin at the top left.
    fn sample_ray(&self, u: &Vector2f) -> Ray3f;
    fn resolution(&self) -> (usize, usize);
    fn describe(&self) -> String {
        String::from("Sensor")
    }
}
