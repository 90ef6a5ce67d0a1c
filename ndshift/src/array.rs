/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 * All rights reserved.
 *
 * This source code is licensed under the BSD-style license found in the
 * LICENSE file in the root directory of this source tree.
 */

use serde::Deserialize;
use serde::Serialize;

use crate::Region;

/// The type of error for array construction and element access.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ArrayError {
    #[error("extents {extents:?} describe {expected} elements, storage holds {got}")]
    ExtentsDataMismatch {
        extents: Vec<usize>,
        expected: usize,
        got: usize,
    },

    #[error("invalid dims: expected {expected}, got {got}")]
    InvalidDims { expected: usize, got: usize },

    #[error("index {index:?} out of bounds for extents {extents:?}")]
    IndexOutOfBounds {
        index: Vec<usize>,
        extents: Vec<usize>,
    },

    #[error("offset {offset} out of range {total}")]
    OffsetOutOfRange { offset: usize, total: usize },
}

/// A dense n-dimensional array in row-major order.
///
/// `Array` owns its sample storage and pairs it with per-dimension
/// extents. Elements are addressed either by a full coordinate vector
/// or by their flat storage offset; the two are related by
/// ```text
/// offset = ∑ index[d] × strides[d]
/// ```
/// with standard row-major strides (last dimension varies fastest).
///
/// An empty extent list denotes a rank-0 array holding exactly one
/// element. Extents of size 0 are representable (the array is then
/// empty), but are rejected by the shift operations, which have no
/// defined index space for them.
#[derive(Serialize, Deserialize, Clone, PartialEq, Debug)]
pub struct Array<T> {
    extents: Vec<usize>,
    strides: Vec<usize>,
    data: Vec<T>,
}

impl<T> Array<T> {
    /// Create a new array over the provided storage. The storage length
    /// must equal the product of the extents.
    pub fn new(extents: Vec<usize>, data: Vec<T>) -> Result<Self, ArrayError> {
        let expected: usize = extents.iter().product();
        if data.len() != expected {
            return Err(ArrayError::ExtentsDataMismatch {
                extents,
                expected,
                got: data.len(),
            });
        }
        let strides = row_major_strides(&extents);
        Ok(Self {
            extents,
            strides,
            data,
        })
    }

    /// Create an array of the given extents with every element set to
    /// `elem`.
    pub fn from_elem(extents: Vec<usize>, elem: T) -> Self
    where
        T: Clone,
    {
        let len = extents.iter().product();
        let strides = row_major_strides(&extents);
        Self {
            extents,
            strides,
            data: vec![elem; len],
        }
    }

    /// Create an array of the given extents by evaluating `f` at every
    /// coordinate, in row-major order.
    pub fn from_fn<F>(extents: Vec<usize>, mut f: F) -> Self
    where
        F: FnMut(&[usize]) -> T,
    {
        let len = extents.iter().product();
        let mut data = Vec::with_capacity(len);
        for index in Region::full(extents.clone()).iter() {
            data.push(f(&index));
        }
        let strides = row_major_strides(&extents);
        Self {
            extents,
            strides,
            data,
        }
    }

    /// The number of dimensions of this array.
    pub fn num_dim(&self) -> usize {
        self.extents.len()
    }

    /// The size of each dimension.
    pub fn extents(&self) -> &[usize] {
        &self.extents
    }

    /// The row-major strides of the storage.
    pub fn strides(&self) -> &[usize] {
        &self.strides
    }

    /// The total number of elements.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// The flat storage offset of the provided coordinates.
    pub fn offset_of(&self, index: &[usize]) -> Result<usize, ArrayError> {
        if index.len() != self.extents.len() {
            return Err(ArrayError::InvalidDims {
                expected: self.extents.len(),
                got: index.len(),
            });
        }
        if index.iter().zip(&self.extents).any(|(i, n)| i >= n) {
            return Err(ArrayError::IndexOutOfBounds {
                index: index.to_vec(),
                extents: self.extents.clone(),
            });
        }
        Ok(index
            .iter()
            .zip(&self.strides)
            .map(|(pos, stride)| pos * stride)
            .sum())
    }

    /// The coordinates of the provided flat storage offset.
    pub fn coordinates(&self, offset: usize) -> Result<Vec<usize>, ArrayError> {
        if offset >= self.data.len() {
            return Err(ArrayError::OffsetOutOfRange {
                offset,
                total: self.data.len(),
            });
        }
        let mut result = vec![0; self.extents.len()];
        let mut rest = offset;
        for (i, dim) in self.extents.iter().enumerate().rev() {
            result[i] = rest % dim;
            rest /= dim;
        }
        Ok(result)
    }

    /// The element at the provided coordinates.
    pub fn get(&self, index: &[usize]) -> Result<&T, ArrayError> {
        let offset = self.offset_of(index)?;
        Ok(&self.data[offset])
    }

    /// Mutable access to the element at the provided coordinates.
    pub fn get_mut(&mut self, index: &[usize]) -> Result<&mut T, ArrayError> {
        let offset = self.offset_of(index)?;
        Ok(&mut self.data[offset])
    }

    /// The flat storage, in row-major order.
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// Deconstruct the array into its extents and storage.
    pub fn into_inner(self) -> (Vec<usize>, Vec<T>) {
        (self.extents, self.data)
    }
}

fn row_major_strides(extents: &[usize]) -> Vec<usize> {
    let mut strides = vec![1; extents.len()];
    for i in (0..extents.len().saturating_sub(1)).rev() {
        strides[i] = strides[i + 1] * extents[i + 1];
    }
    strides
}
