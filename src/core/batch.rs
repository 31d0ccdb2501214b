// Copyright @yucwang 2026

//! Lane masks for wavefront execution.
//!
//! Each integrator step runs over the whole wavefront and writes only the
//! lanes enabled in its mask; masked-off lanes keep their old values.

use std::ops;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Mask {
    lanes: Vec<bool>,
}

impl Mask {
    pub fn new(width: usize, value: bool) -> Self {
        Self { lanes: vec![value; width] }
    }

    pub fn from_vec(lanes: Vec<bool>) -> Self {
        Self { lanes }
    }

    pub fn from_fn<F: FnMut(usize) -> bool>(width: usize, f: F) -> Self {
        Self { lanes: (0..width).map(f).collect() }
    }

    pub fn len(&self) -> usize {
        self.lanes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lanes.is_empty()
    }

    pub fn any(&self) -> bool {
        self.lanes.iter().any(|&l| l)
    }

    pub fn all(&self) -> bool {
        self.lanes.iter().all(|&l| l)
    }

    pub fn none(&self) -> bool {
        !self.any()
    }

    pub fn count(&self) -> usize {
        self.lanes.iter().filter(|&&l| l).count()
    }

    pub fn iter(&self) -> impl Iterator<Item = bool> + '_ {
        self.lanes.iter().copied()
    }

    pub fn set(&mut self, lane: usize, value: bool) {
        self.lanes[lane] = value;
    }
}

impl ops::Index<usize> for Mask {
    type Output = bool;

    fn index(&self, lane: usize) -> &bool {
        &self.lanes[lane]
    }
}

impl<'a> ops::BitAnd<&'a Mask> for &'a Mask {
    type Output = Mask;

    fn bitand(self, rhs: &'a Mask) -> Mask {
        debug_assert_eq!(self.len(), rhs.len());
        Mask::from_fn(self.len(), |i| self.lanes[i] && rhs.lanes[i])
    }
}

impl<'a> ops::BitOr<&'a Mask> for &'a Mask {
    type Output = Mask;

    fn bitor(self, rhs: &'a Mask) -> Mask {
        debug_assert_eq!(self.len(), rhs.len());
        Mask::from_fn(self.len(), |i| self.lanes[i] || rhs.lanes[i])
    }
}

impl<'a> ops::Not for &'a Mask {
    type Output = Mask;

    fn not(self) -> Mask {
        Mask::from_fn(self.len(), |i| !self.lanes[i])
    }
}

/// `mask ? new : old`.
#[inline]
pub fn select<T>(mask: bool, new: T, old: T) -> T {
    if mask { new } else { old }
}
