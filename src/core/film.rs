// Copyright @yucwang 2026

use crate::math::bitmap::Bitmap;
use crate::math::constants::Float;

/// Accumulation buffer for one sensor. Channels are `R, G, B, A` followed
/// by the integrator's AOVs; every sample carries unit weight.
#[derive(Debug, Clone)]
pub struct Film {
    width: usize,
    height: usize,
    channel_names: Vec<String>,
    values: Bitmap,
    weights: Vec<Float>,
}

impl Film {
    pub fn new(width: usize, height: usize, aov_names: &[String]) -> Self {
        let mut channel_names: Vec<String> = ["R", "G", "B", "A"].iter().map(|c| c.to_string()).collect();
        channel_names.extend(aov_names.iter().cloned());
        let values = Bitmap::new(width, height, channel_names.len());
        Self { width, height, channel_names, values, weights: vec![0.0; width * height] }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn channel_names(&self) -> &[String] {
        &self.channel_names
    }

    pub fn channel_count(&self) -> usize {
        self.channel_names.len()
    }

    /// Adds one sample. `values` holds one entry per channel; missing
    /// trailing channels count as zero.
    pub fn put(&mut self, x: usize, y: usize, values: &[Float]) {
        let pixel = &mut self.values[(x, y)];
        for (slot, v) in pixel.iter_mut().zip(values.iter()) {
            *slot += *v;
        }
        self.weights[x + self.width * y] += 1.0;
    }

    /// Accumulates a block-local film whose top left corner sits at `(x0, y0)`.
    pub fn put_block(&mut self, x0: usize, y0: usize, block: &Film) {
        for y in 0..block.height {
            for x in 0..block.width {
                let (tx, ty) = (x0 + x, y0 + y);
                if tx >= self.width || ty >= self.height {
                    continue;
                }
                let source = &block.values[(x, y)];
                let target = &mut self.values[(tx, ty)];
                for (t, s) in target.iter_mut().zip(source.iter()) {
                    *t += *s;
                }
                self.weights[tx + self.width * ty] += block.weights[x + block.width * y];
            }
        }
    }

    /// Weight-normalized image. Pixels that never received a sample stay zero.
    pub fn develop(&self) -> Bitmap {
        let mut image = Bitmap::new(self.width, self.height, self.channel_count());
        for y in 0..self.height {
            for x in 0..self.width {
                let w = self.weights[x + self.width * y];
                if w <= 0.0 {
                    continue;
                }
                let inv_w = 1.0 / w;
                let source = &self.values[(x, y)];
                let target = &mut image[(x, y)];
                for (t, s) in target.iter_mut().zip(source.iter()) {
                    *t = *s * inv_w;
                }
            }
        }
        image
    }
}
