/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 * All rights reserved.
 *
 * This source code is licensed under the BSD-style license found in the
 * LICENSE file in the root directory of this source tree.
 */

use std::fmt;

use itertools::izip;
use serde::Deserialize;
use serde::Serialize;

/// The type of error for region construction.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum RegionError {
    #[error("invalid dims: origin has {origin}, extents has {extents}")]
    InvalidDims { origin: usize, extents: usize },
}

/// An axis-aligned box of coordinates in an n-dimensional index space.
///
/// A region is described by an origin and per-dimension extents, and
/// denotes the coordinates `origin[d] .. origin[d] + extents[d]` along
/// each dimension. Regions are how a host scheduler hands a worker a
/// disjoint portion of an output array to produce: any partition of
/// the full index space into regions can be executed in any order, or
/// concurrently, without coordination.
///
/// ```
/// use ndshift::Region;
///
/// let r = Region::full(vec![2, 2]);
/// let coords: Vec<_> = r.iter().collect();
/// assert_eq!(
///     coords,
///     vec![vec![0, 0], vec![0, 1], vec![1, 0], vec![1, 1]]
/// );
/// ```
#[derive(Serialize, Deserialize, Clone, Eq, PartialEq, Hash, Debug)]
pub struct Region {
    origin: Vec<usize>,
    extents: Vec<usize>,
}

impl Region {
    /// Create a new region with the provided origin and extents. The
    /// two must have the same number of dimensions.
    pub fn new(origin: Vec<usize>, extents: Vec<usize>) -> Result<Self, RegionError> {
        if origin.len() != extents.len() {
            return Err(RegionError::InvalidDims {
                origin: origin.len(),
                extents: extents.len(),
            });
        }
        Ok(Self { origin, extents })
    }

    /// The region covering the whole of an index space with the given
    /// extents, anchored at the zero coordinate.
    pub fn full(extents: impl Into<Vec<usize>>) -> Self {
        let extents = extents.into();
        Self {
            origin: vec![0; extents.len()],
            extents,
        }
    }

    /// The number of dimensions of this region.
    pub fn num_dim(&self) -> usize {
        self.extents.len()
    }

    /// The lowest coordinate contained in the region.
    pub fn origin(&self) -> &[usize] {
        &self.origin
    }

    /// The size of the region along each dimension.
    pub fn extents(&self) -> &[usize] {
        &self.extents
    }

    /// The number of coordinates contained in the region.
    pub fn len(&self) -> usize {
        self.extents.iter().product()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether every coordinate of this region lies within an index
    /// space of the given extents.
    pub fn fits_within(&self, extents: &[usize]) -> bool {
        self.extents.len() == extents.len()
            && izip!(&self.origin, &self.extents, extents).all(|(o, n, bound)| o + n <= *bound)
    }

    /// Iterator over the region's coordinates, in row-major order
    /// (last dimension varies fastest).
    pub fn iter(&self) -> RegionIterator {
        RegionIterator {
            origin: self.origin.clone(),
            extents: self.extents.clone(),
            index: 0,
        }
    }

    /// Partition this region into at most `pieces` disjoint regions
    /// along the outermost dimension. The pieces jointly cover the
    /// region exactly; fewer than `pieces` are produced when the
    /// outermost extent is shorter.
    ///
    /// Splitting along the outermost dimension keeps each piece
    /// contiguous in the row-major storage of any array the region is
    /// embedded in.
    pub fn split(&self, pieces: usize) -> Vec<Region> {
        if self.extents.is_empty() || self.extents[0] <= 1 || pieces <= 1 {
            return vec![self.clone()];
        }
        let axis = self.extents[0];
        let step = axis.div_ceil(pieces.min(axis));
        let mut parts = Vec::with_capacity(axis.div_ceil(step));
        let mut begin = 0;
        while begin < axis {
            let mut origin = self.origin.clone();
            origin[0] += begin;
            let mut extents = self.extents.clone();
            extents[0] = step.min(axis - begin);
            begin += extents[0];
            parts.push(Region { origin, extents });
        }
        parts
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for dim in 0..self.extents.len() {
            write!(
                f,
                "{}..{}",
                self.origin[dim],
                self.origin[dim] + self.extents[dim]
            )?;
            if dim < self.extents.len() - 1 {
                write!(f, ",")?;
            }
        }
        write!(f, "}}")
    }
}

impl IntoIterator for &Region {
    type Item = Vec<usize>;
    type IntoIter = RegionIterator;
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterates over all coordinates of a [`Region`] in row-major order.
pub struct RegionIterator {
    origin: Vec<usize>,
    extents: Vec<usize>,
    index: usize,
}

impl Iterator for RegionIterator {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.index >= self.extents.iter().product::<usize>() {
            return None;
        }

        let mut result = self.origin.clone();
        let mut rest = self.index;
        for (i, dim) in self.extents.iter().enumerate().rev() {
            result[i] += rest % dim;
            rest /= dim;
        }
        self.index += 1;
        Some(result)
    }
}
