/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 * All rights reserved.
 *
 * This source code is licensed under the BSD-style license found in the
 * LICENSE file in the root directory of this source tree.
 */

use std::collections::HashSet;

use ndshift::Array;
use ndshift::FftShift;
use ndshift::Region;
use ndshift::Stage;
use ndshift::fftshift;
use ndshift::ifftshift;
use ndshift::map_index;
use proptest::prelude::*;

/// Generates arbitrary extents with up to `max_dims` dimensions, each
/// of size 1 to `max_len` inclusive.
fn gen_extents(max_dims: usize, max_len: usize) -> impl Strategy<Value = Vec<usize>> {
    prop::collection::vec(1..=max_len, 1..=max_dims)
}

/// Generates extents that are all even.
fn gen_even_extents(max_dims: usize, max_half: usize) -> impl Strategy<Value = Vec<usize>> {
    prop::collection::vec((1..=max_half).prop_map(|n| 2 * n), 1..=max_dims)
}

/// Generates extents whose outermost dimension is odd and at least 3.
fn gen_odd_extents(max_dims: usize, max_len: usize) -> impl Strategy<Value = Vec<usize>> {
    gen_extents(max_dims, max_len).prop_map(|mut extents| {
        extents[0] = (extents[0] | 1).max(3);
        extents
    })
}

/// A test array whose elements are all distinct, so that any
/// misplacement of a single sample is observable.
fn distinct(extents: &[usize]) -> Array<u32> {
    let len = extents.iter().product::<usize>() as u32;
    Array::new(extents.to_vec(), (1..=len).collect()).unwrap()
}

proptest! {
    #[test]
    fn forward_is_self_inverse_on_even_extents(extents in gen_even_extents(4, 3)) {
        let original = distinct(&extents);
        let twice = fftshift(&fftshift(&original).unwrap()).unwrap();
        prop_assert_eq!(twice, original);
    }

    #[test]
    fn inverse_undoes_forward(extents in gen_extents(4, 7)) {
        let original = distinct(&extents);
        let there_and_back = ifftshift(&fftshift(&original).unwrap()).unwrap();
        prop_assert_eq!(&there_and_back, &original);
        let back_and_there = fftshift(&ifftshift(&original).unwrap()).unwrap();
        prop_assert_eq!(&back_and_there, &original);
    }

    #[test]
    fn forward_twice_scrambles_odd_extents(extents in gen_odd_extents(4, 7)) {
        let original = distinct(&extents);
        let twice = fftshift(&fftshift(&original).unwrap()).unwrap();
        prop_assert_ne!(twice, original);
    }

    #[test]
    fn index_mapping_is_a_bijection(
        extents in gen_extents(4, 6),
        inverse in any::<bool>(),
    ) {
        let offsets = FftShift::with_inverse(inverse).offsets(&extents);
        let mut sources = HashSet::new();
        for index in Region::full(extents.clone()).iter() {
            let source = map_index(&index, &extents, &offsets);
            for (s, n) in source.iter().zip(&extents) {
                prop_assert!(s < n);
            }
            prop_assert!(sources.insert(source), "two outputs read the same input");
        }
        prop_assert_eq!(sources.len(), extents.iter().product::<usize>());
    }

    #[test]
    fn disjoint_regions_compose_to_the_whole(
        extents in gen_extents(4, 6),
        pieces in 1usize..5,
        refine in 1usize..3,
        inverse in any::<bool>(),
    ) {
        let engine = FftShift::with_inverse(inverse);
        let input = distinct(&extents);
        let expected = engine.run(&input).unwrap();

        let mut partition: Vec<Region> = Region::full(extents.clone())
            .split(pieces)
            .into_iter()
            .flat_map(|region| region.split(refine))
            .collect();
        // Region order must not matter.
        partition.reverse();

        let mut output = Array::from_elem(extents.clone(), 0u32);
        for region in &partition {
            engine.apply_region(&input, &mut output, region).unwrap();
        }
        prop_assert_eq!(output, expected);
    }

    #[test]
    fn parallel_execution_matches_serial(
        extents in gen_extents(4, 6),
        inverse in any::<bool>(),
    ) {
        let engine = FftShift::with_inverse(inverse);
        let input = distinct(&extents);
        let mut serial = Array::from_elem(extents.clone(), 0u32);
        let mut parallel = Array::from_elem(extents.clone(), 0u32);
        engine.apply(&input, &mut serial).unwrap();
        engine.par_apply(&input, &mut parallel).unwrap();
        prop_assert_eq!(serial, parallel);
    }
}

#[test]
fn staged_execution_matches_the_one_shot_path() -> anyhow::Result<()> {
    let input = distinct(&[6, 5]);
    let stage = FftShift::with_inverse(true);

    anyhow::ensure!(Stage::<u32>::requires_full_input(&stage));
    let narrow = Region::new(vec![0, 0], vec![1, 5])?;
    let requested = Stage::<u32>::requested_input(&stage, &narrow, input.extents());
    anyhow::ensure!(
        requested == Region::full(vec![6, 5]),
        "stage must request the whole input"
    );

    let mut output = Array::from_elem(vec![6, 5], 0u32);
    for region in Region::full(vec![6, 5]).split(4) {
        Stage::apply_region(&stage, &input, &mut output, &region)?;
    }
    anyhow::ensure!(output == ifftshift(&input)?);
    Ok(())
}
