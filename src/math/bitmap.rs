// Copyright 2020 @TwoCookingMice

use super::constants::Float;

use std::ops;
use std::vec::Vec;

/// Interleaved multi-channel float image, row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct Bitmap {
    data: Vec<Float>,
    height: usize,
    width: usize,
    channels: usize
}

impl ops::Index<(usize, usize)> for Bitmap {
    type Output = [Float];

    fn index(&self, index: (usize, usize)) -> &[Float] {
        let start = self.offset(index);
        &self.data[start..start + self.channels]
    }
}

impl ops::IndexMut<(usize, usize)> for Bitmap {
    fn index_mut(&mut self, index: (usize, usize)) -> &mut [Float] {
        let start = self.offset(index);
        &mut self.data[start..start + self.channels]
    }
}

impl Bitmap {
    pub fn new(width: usize, height: usize, channels: usize) -> Self {
        Self { data: vec![0.0; width * height * channels],
               width: width,
               height: height,
               channels: channels }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Copy one channel out as a contiguous plane.
    pub fn channel(&self, channel: usize) -> Vec<Float> {
        self.data.iter()
            .skip(channel)
            .step_by(self.channels.max(1))
            .copied()
            .collect()
    }

    fn offset(&self, index: (usize, usize)) -> usize {
        assert!(index.0 < self.width && index.1 < self.height,
                "pixel ({}, {}) out of bounds for {}x{}", index.0, index.1, self.width, self.height);
        (index.0 + self.width * index.1) * self.channels
    }
}

/* Test for Bitmap */
