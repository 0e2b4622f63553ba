// Copyright 2025 Google LLC
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Random generation of the benchmark's input vectors.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha12Rng;

/// Returns a vector of `len` integers, each drawn independently and uniformly
/// from `0..=len`.
///
/// The generator is seeded with a constant per call, so a given `(len, seed)`
/// pair always produces the same vector. Reproducible inputs keep benchmark
/// runs comparable.
///
/// # Panics
///
/// Panics if `len` doesn't fit in an [`i32`].
pub fn random_vector(len: usize, seed: u64) -> Vec<i32> {
    let max = i32::try_from(len).unwrap_or_else(|_| {
        panic!(
            "cannot generate a vector of {len} elements: only lengths up to {} are supported",
            i32::MAX
        )
    });
    let mut rng = ChaCha12Rng::seed_from_u64(seed);
    (0..len).map(|_| rng.random_range(0..=max)).collect()
}
