/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 * All rights reserved.
 *
 * This source code is licensed under the BSD-style license found in the
 * LICENSE file in the root directory of this source tree.
 */

use itertools::izip;
use rayon::iter::IndexedParallelIterator;
use rayon::iter::ParallelIterator;
use rayon::slice::ParallelSliceMut;
use serde::Deserialize;
use serde::Serialize;

use crate::Array;
use crate::Region;

/// The type of error for shift execution.
///
/// Every condition is a caller/precondition error, reported before any
/// element of the output is written. The shift itself has no failure
/// modes once its preconditions hold.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ShiftError {
    #[error("shape mismatch: input {input:?}, output {output:?}")]
    ShapeMismatch {
        input: Vec<usize>,
        output: Vec<usize>,
    },

    #[error("region {region} out of bounds for extents {extents:?}")]
    RegionOutOfBounds {
        region: Region,
        extents: Vec<usize>,
    },

    #[error("empty extent in dimension {dim}")]
    EmptyExtent { dim: usize },
}

/// Relocates the zero-frequency component of a spectrum between the
/// corner and the geometric center of an n-dimensional array.
///
/// A discrete Fourier transform leaves the zero-frequency component at
/// index 0 of every dimension. The forward shift moves it to the
/// center; the inverse shift moves it back. Along a dimension of
/// extent `n`, the forward shift relocates the element at index `i` to
/// `(i + n / 2) % n` and the inverse to `(i + n.div_ceil(2)) % n`.
/// When every extent is even the two displacements coincide and the
/// forward shift is its own inverse; when any extent is odd they
/// differ, and restoring the original layout requires running one
/// forward and one inverse pass.
///
/// The engine never interprets element values; it only relocates them.
///
/// ```
/// use ndshift::Array;
/// use ndshift::FftShift;
///
/// let spectrum = Array::new(vec![4, 4], (0..16).collect()).unwrap();
/// let centered = FftShift::new().run(&spectrum).unwrap();
/// // The zero-frequency component moves from [0, 0] to [2, 2].
/// assert_eq!(centered.get(&[2, 2]).unwrap(), spectrum.get(&[0, 0]).unwrap());
/// ```
#[derive(Serialize, Deserialize, Clone, Copy, Default, Eq, PartialEq, Hash, Debug)]
pub struct FftShift {
    inverse: bool,
}

impl FftShift {
    /// A forward shift.
    pub fn new() -> Self {
        Self::default()
    }

    /// A shift with the given direction.
    pub fn with_inverse(inverse: bool) -> Self {
        Self { inverse }
    }

    /// Whether this engine performs the inverse shift.
    pub fn inverse(&self) -> bool {
        self.inverse
    }

    /// Set the direction. Has no effect on an application already in
    /// progress, only on subsequent ones.
    pub fn set_inverse(&mut self, inverse: bool) {
        self.inverse = inverse;
    }

    /// The per-dimension displacement applied by this engine to an
    /// array of the given extents.
    pub fn offsets(&self, extents: &[usize]) -> Vec<usize> {
        extents
            .iter()
            .map(|&n| shift_offset(n, self.inverse))
            .collect()
    }

    /// Fill the whole of `output` with the shifted contents of
    /// `input`. The two arrays must be distinct buffers of identical
    /// extents; fails fast with no partial writes otherwise.
    pub fn apply<T: Clone>(&self, input: &Array<T>, output: &mut Array<T>) -> Result<(), ShiftError> {
        let region = Region::full(input.extents());
        self.apply_region(input, output, &region)
    }

    /// Fill `region` of `output` with the shifted contents of `input`,
    /// leaving the rest of `output` untouched.
    ///
    /// Any single output coordinate may read from anywhere in the
    /// input, so the whole input must be materialized even when only a
    /// sub-range of the output is produced. Disjoint regions have no
    /// data dependency on one another and may be filled in any order,
    /// or concurrently from separate workers.
    pub fn apply_region<T: Clone>(
        &self,
        input: &Array<T>,
        output: &mut Array<T>,
        region: &Region,
    ) -> Result<(), ShiftError> {
        check_extents(input, output)?;
        if !region.fits_within(output.extents()) {
            return Err(ShiftError::RegionOutOfBounds {
                region: region.clone(),
                extents: output.extents().to_vec(),
            });
        }

        let extents = input.extents().to_vec();
        let strides = input.strides().to_vec();
        let offsets = self.offsets(&extents);
        tracing::debug!(
            extents = ?extents,
            inverse = self.inverse,
            region = %region,
            "applying spectral shift"
        );

        for index in region.iter() {
            let src = source_offset(&index, &extents, &offsets, &strides);
            let dst: usize = index.iter().zip(&strides).map(|(i, s)| i * s).sum();
            output.as_mut_slice()[dst] = input.as_slice()[src].clone();
        }
        Ok(())
    }

    /// Fill the whole of `output` from `input` using a parallel
    /// worker per outermost-axis span of the output.
    ///
    /// Each worker owns a disjoint, contiguous span of the output
    /// storage and reads the shared input without synchronization, so
    /// no locking is involved. The result is identical to
    /// [`FftShift::apply`].
    pub fn par_apply<T>(&self, input: &Array<T>, output: &mut Array<T>) -> Result<(), ShiftError>
    where
        T: Clone + Send + Sync,
    {
        check_extents(input, output)?;

        let extents = input.extents().to_vec();
        if extents.is_empty() {
            output.as_mut_slice()[0] = input.as_slice()[0].clone();
            return Ok(());
        }

        let strides = input.strides().to_vec();
        let offsets = self.offsets(&extents);
        let plane: usize = extents[1..].iter().product();
        tracing::debug!(
            extents = ?extents,
            inverse = self.inverse,
            workers = extents[0],
            "applying spectral shift in parallel"
        );

        output
            .as_mut_slice()
            .par_chunks_mut(plane)
            .enumerate()
            .for_each(|(outer, chunk)| {
                let mut origin = vec![0; extents.len()];
                origin[0] = outer;
                let mut sizes = extents.clone();
                sizes[0] = 1;
                let span = Region::new(origin, sizes).expect("span region is valid");
                // Row-major iteration over a single outermost-axis
                // span enumerates exactly the chunk's storage order.
                for (at, index) in span.iter().enumerate() {
                    let src = source_offset(&index, &extents, &offsets, &strides);
                    chunk[at] = input.as_slice()[src].clone();
                }
            });
        Ok(())
    }

    /// Shift `input` into a freshly allocated array of the same
    /// extents.
    pub fn run<T: Clone>(&self, input: &Array<T>) -> Result<Array<T>, ShiftError> {
        let mut output = input.clone();
        self.apply(input, &mut output)?;
        Ok(output)
    }
}

/// Shift the zero-frequency component of `input` to the geometric
/// center of the array.
pub fn fftshift<T: Clone>(input: &Array<T>) -> Result<Array<T>, ShiftError> {
    FftShift::new().run(input)
}

/// Undo [`fftshift`], returning the zero-frequency component to index
/// 0 of every dimension. Identical to [`fftshift`] when every extent
/// is even; distinct whenever any extent is odd.
pub fn ifftshift<T: Clone>(input: &Array<T>) -> Result<Array<T>, ShiftError> {
    FftShift::with_inverse(true).run(input)
}

/// The displacement applied along one dimension of the given extent:
/// `extent / 2` for the forward shift, `extent.div_ceil(2)` for the
/// inverse. The two coincide for even extents, and an extent of 1 is
/// never displaced.
pub fn shift_offset(extent: usize, inverse: bool) -> usize {
    if extent <= 1 {
        return 0;
    }
    if inverse {
        extent.div_ceil(2)
    } else {
        extent / 2
    }
}

/// Map an output coordinate to the input coordinate it draws its
/// sample from, for the given extents and per-dimension displacements.
///
/// The displacement moves content forward: the element at input index
/// `i` appears at output index `(i + offsets[d]) % extents[d]` along
/// each dimension, so the output coordinate reads from the complement.
/// Dimensions are fully independent, and for fixed extents and
/// displacements the mapping is a bijection on the index space.
pub fn map_index(index: &[usize], extents: &[usize], offsets: &[usize]) -> Vec<usize> {
    izip!(index, extents, offsets)
        .map(|(i, n, o)| (i + n - o % n) % n)
        .collect()
}

/// `map_index`, fused with the row-major stride computation to produce
/// a flat storage offset.
fn source_offset(index: &[usize], extents: &[usize], offsets: &[usize], strides: &[usize]) -> usize {
    izip!(index, extents, offsets, strides)
        .map(|(i, n, o, s)| ((i + n - o % n) % n) * s)
        .sum()
}

fn check_extents<T>(input: &Array<T>, output: &Array<T>) -> Result<(), ShiftError> {
    if input.extents() != output.extents() {
        return Err(ShiftError::ShapeMismatch {
            input: input.extents().to_vec(),
            output: output.extents().to_vec(),
        });
    }
    if let Some(dim) = input.extents().iter().position(|&n| n == 0) {
        return Err(ShiftError::EmptyExtent { dim });
    }
    Ok(())
}
