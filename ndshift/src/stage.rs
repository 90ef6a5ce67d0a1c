/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 * All rights reserved.
 *
 * This source code is licensed under the BSD-style license found in the
 * LICENSE file in the root directory of this source tree.
 */

//! The contract between a transform stage and its host pipeline.
//!
//! A host pipeline allocates the output array, decides how the output
//! index space is partitioned across workers, and materializes input
//! data. A [`Stage`] declares its input requirements to the host and
//! fills the output regions it is handed. The declarations are plain
//! methods rather than inherited hook overrides, so a scheduler can
//! interrogate a stage before running it.

use crate::Array;
use crate::FftShift;
use crate::Region;
use crate::ShiftError;

/// A pipeline stage that fills regions of a pre-allocated output
/// array from a materialized input array of the same extents.
pub trait Stage<T> {
    /// Whether the whole input must be materialized before any part
    /// of the output can be produced. Schedulers use this to order
    /// upstream work; a stage returning `true` cannot be streamed.
    fn requires_full_input(&self) -> bool;

    /// The input region that must be available before `output_region`
    /// can be produced.
    fn requested_input(&self, output_region: &Region, input_extents: &[usize]) -> Region;

    /// Fill `output_region` of `output` from `input`. Disjoint
    /// regions carry no data dependency on one another and may be
    /// executed in any order or in parallel.
    fn apply_region(
        &self,
        input: &Array<T>,
        output: &mut Array<T>,
        output_region: &Region,
    ) -> Result<(), ShiftError>;
}

impl<T: Clone> Stage<T> for FftShift {
    fn requires_full_input(&self) -> bool {
        true
    }

    /// Any output coordinate may read from anywhere in the input, so
    /// the requested input region is the full extent regardless of
    /// which output sub-range is being produced.
    fn requested_input(&self, _output_region: &Region, input_extents: &[usize]) -> Region {
        Region::full(input_extents)
    }

    fn apply_region(
        &self,
        input: &Array<T>,
        output: &mut Array<T>,
        output_region: &Region,
    ) -> Result<(), ShiftError> {
        FftShift::apply_region(self, input, output, output_region)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fftshift;

    #[test]
    fn test_shift_requests_the_full_input() {
        let stage = FftShift::new();
        assert!(Stage::<f64>::requires_full_input(&stage));

        let small = Region::new(vec![3, 0], vec![1, 4]).unwrap();
        let requested = Stage::<f64>::requested_input(&stage, &small, &[4, 4]);
        assert_eq!(requested, Region::full(vec![4, 4]));
    }

    #[test]
    fn test_region_at_a_time_execution_covers_the_output() {
        let input = Array::new(vec![4, 6], (0..24).collect::<Vec<i64>>()).unwrap();
        let mut output = Array::from_elem(vec![4, 6], -1i64);

        let stage: &dyn Stage<i64> = &FftShift::new();
        for region in Region::full(vec![4, 6]).split(3) {
            stage.apply_region(&input, &mut output, &region).unwrap();
        }

        assert_eq!(output, fftshift(&input).unwrap());
    }
}
