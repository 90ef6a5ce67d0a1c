/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 * All rights reserved.
 *
 * This source code is licensed under the BSD-style license found in the
 * LICENSE file in the root directory of this source tree.
 */

//! Zero-frequency recentering for n-dimensional spectra.
//!
//! A discrete Fourier transform places the zero-frequency component at
//! index 0 of every dimension, which makes spectra awkward to inspect
//! and to filter. [`FftShift`] relocates that component to the
//! geometric center of the array (the classical "fftshift") and back
//! again, for arbitrary rank, arbitrary even or odd extents, and
//! arbitrary element type. See [`FftShift`] for the even/odd direction
//! subtlety that makes the inverse a distinct operation.
//!
//! The crate also provides the machinery the shift runs on: [`Array`],
//! a dense row-major n-dimensional container; [`Region`], an
//! axis-aligned box of output coordinates used to hand disjoint
//! portions of the work to concurrent workers; and [`Stage`], the
//! contract through which a host pipeline drives the engine.

mod array;
pub use array::Array;
pub use array::ArrayError;

mod region;
pub use region::Region;
pub use region::RegionError;
pub use region::RegionIterator;

mod shift;
pub use shift::FftShift;
pub use shift::ShiftError;
pub use shift::fftshift;
pub use shift::ifftshift;
pub use shift::map_index;
pub use shift::shift_offset;

/// The contract between a transform stage and its host pipeline.
pub mod stage;
pub use stage::Stage;
