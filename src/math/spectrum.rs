// Copyright 2020 @TwoCookingMice

use super::constants::{Float, Vector3f};

use std::fmt::Debug;
use std::ops;

/// Radiometric quantity carried along a path.
///
/// The integrator only relies on component-wise arithmetic, the maximum
/// channel (for Russian roulette) and finiteness checks, so any bundle of
/// wavelengths can be plugged in. `RGBSpectrum` is what the renderer uses;
/// `Float` doubles as a monochrome spectrum.
pub trait Spectrum:
    Copy
    + Debug
    + Default
    + PartialEq
    + Send
    + Sync
    + 'static
    + ops::Add<Output = Self>
    + ops::AddAssign
    + ops::Mul<Output = Self>
    + ops::MulAssign
    + ops::Mul<Float, Output = Self>
    + ops::Div<Float, Output = Self>
{
    fn splat(value: Float) -> Self;

    fn zero() -> Self {
        Self::splat(0.0)
    }

    fn max_channel(&self) -> Float;

    fn min_channel(&self) -> Float;

    fn all_finite(&self) -> bool;

    /// Component-wise reciprocal. Zero channels stay zero.
    fn rcp(&self) -> Self;

    /// Linear RGB triple written to the film.
    fn to_rgb(&self) -> [Float; 3];

    fn is_black(&self) -> bool {
        self.max_channel() == 0.0 && self.min_channel() == 0.0
    }

    fn fma(a: Self, b: Self, c: Self) -> Self {
        a * b + c
    }

    fn finite_or_zero(self) -> Self {
        if self.all_finite() {
            self
        } else {
            Self::zero()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RGBSpectrum {
    rgb: Vector3f
}

impl Default for RGBSpectrum {
    fn default() -> Self {
        Self { rgb: Vector3f::new(0.0f32, 0.0f32, 0.0f32) }
    }
}

impl RGBSpectrum {
    pub fn new(r: Float, g: Float, b: Float) -> Self {
        Self { rgb: Vector3f::new(r, g, b) }
    }

    pub fn from_vector(rgb: Vector3f) -> Self {
        Self { rgb }
    }
}

impl ops::Index<usize> for RGBSpectrum {
    type Output = Float;

    fn index(&self, index: usize) -> &Float {
        &self.rgb[index]
    }
}

impl ops::Add for RGBSpectrum {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self { rgb: self.rgb + rhs.rgb }
    }
}

impl ops::AddAssign for RGBSpectrum {
    fn add_assign(&mut self, rhs: Self) {
        self.rgb += rhs.rgb;
    }
}

impl ops::Mul for RGBSpectrum {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        Self { rgb: self.rgb.component_mul(&rhs.rgb) }
    }
}

impl ops::MulAssign for RGBSpectrum {
    fn mul_assign(&mut self, rhs: Self) {
        self.rgb.component_mul_assign(&rhs.rgb);
    }
}

impl ops::Mul<Float> for RGBSpectrum {
    type Output = Self;

    fn mul(self, rhs: Float) -> Self {
        Self { rgb: self.rgb * rhs }
    }
}

impl ops::Div<Float> for RGBSpectrum {
    type Output = Self;

    fn div(self, rhs: Float) -> Self {
        Self { rgb: self.rgb / rhs }
    }
}

impl Spectrum for RGBSpectrum {
    fn splat(value: Float) -> Self {
        Self::new(value, value, value)
    }

    fn max_channel(&self) -> Float {
        self.rgb.x.max(self.rgb.y).max(self.rgb.z)
    }

    fn min_channel(&self) -> Float {
        self.rgb.x.min(self.rgb.y).min(self.rgb.z)
    }

    fn all_finite(&self) -> bool {
        self.rgb.iter().all(|c| c.is_finite())
    }

    fn rcp(&self) -> Self {
        Self { rgb: self.rgb.map(|c| if c != 0.0 { 1.0 / c } else { 0.0 }) }
    }

    fn to_rgb(&self) -> [Float; 3] {
        [self.rgb.x, self.rgb.y, self.rgb.z]
    }
}

impl Spectrum for Float {
    fn splat(value: Float) -> Self {
        value
    }

    fn max_channel(&self) -> Float {
        *self
    }

    fn min_channel(&self) -> Float {
        *self
    }

    fn all_finite(&self) -> bool {
        Float::is_finite(*self)
    }

    fn rcp(&self) -> Self {
        if *self != 0.0 { 1.0 / *self } else { 0.0 }
    }

    fn to_rgb(&self) -> [Float; 3] {
        [*self; 3]
    }
}
