// Copyright 2025 Google LLC
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The fixed benchmark matrix and its console report.

use crate::add::{add_serial, CpuPinningPolicy, ParallelAdd};
use crate::input::random_vector;
use crate::macros::log_debug;
use std::io::Write;
use std::num::NonZeroUsize;
use std::thread;
use std::time::Duration;

/// Input sizes of the benchmark matrix, one column per size.
pub const SIZES: [usize; 4] = [1_000, 10_000, 100_000, 1_000_000];

/// Worker-thread counts of the benchmark matrix, one row per count.
pub const THREAD_COUNTS: [usize; 6] = [1, 2, 4, 8, 16, 32];

/// Seed of the first generated vector; each subsequent vector derives its own
/// seed from this one, so the whole matrix is reproducible across runs.
const BASE_SEED: u64 = 42;

/// Runs the whole benchmark matrix, writing the timing table to the given
/// output.
///
/// One vector pair is generated per input size and reused across all
/// thread-count rows, so rows differ only in parallelism. Each cell is the
/// elapsed time of a single sample, formatted with 7 decimal places in
/// seconds.
pub fn run_benchmarks(out: &mut impl Write) -> std::io::Result<()> {
    match thread::available_parallelism() {
        Ok(n) => writeln!(out, "available hardware threads: {n}")?,
        Err(_) => writeln!(out, "available hardware threads: unknown")?,
    }
    writeln!(out)?;

    write!(out, "\t")?;
    for size in SIZES {
        write!(out, "{size}\t")?;
    }
    writeln!(out)?;

    let inputs = SIZES
        .iter()
        .enumerate()
        .map(|(i, &size)| {
            let seed = BASE_SEED + 2 * i as u64;
            (random_vector(size, seed), random_vector(size, seed + 1))
        })
        .collect::<Vec<_>>();
    log_debug!("[main thread] Generated {} input vector pairs", inputs.len());

    for num_threads in THREAD_COUNTS {
        if num_threads == 1 {
            write!(out, "1 thread\t")?;
        } else {
            write!(out, "{num_threads} threads\t")?;
        }
        for (left, right) in &inputs {
            let elapsed = time_add(num_threads, left, right);
            write!(out, "{:.7}s\t", elapsed.as_secs_f64())?;
        }
        writeln!(out)?;
    }
    Ok(())
}

/// Times one cell of the matrix: a single thread runs the serial loop, more
/// threads run the parallel version. The result vector is discarded, only the
/// timing is kept.
fn time_add(num_threads: usize, left: &[i32], right: &[i32]) -> Duration {
    if num_threads == 1 {
        let (_result, elapsed) = add_serial(left, right);
        elapsed
    } else {
        let workers = ParallelAdd {
            num_threads: NonZeroUsize::try_from(num_threads).unwrap(),
            cpu_pinning: CpuPinningPolicy::IfSupported,
        };
        let (_result, elapsed) = workers.run(left, right);
        elapsed
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_report_shape() {
        let mut out = Vec::new();
        run_benchmarks(&mut out).unwrap();
        let report = String::from_utf8(out).unwrap();
        let lines = report.lines().collect::<Vec<_>>();

        assert_eq!(lines.len(), 3 + THREAD_COUNTS.len());
        assert!(lines[0].starts_with("available hardware threads:"));
        assert_eq!(lines[1], "");
        for size in SIZES {
            assert!(lines[2].contains(&size.to_string()));
        }

        for (line, num_threads) in lines[3..].iter().zip(THREAD_COUNTS) {
            let mut cells = line.split('\t');
            let label = cells.next().unwrap();
            assert!(label.starts_with(&num_threads.to_string()));
            assert!(label.ends_with(if num_threads == 1 { "thread" } else { "threads" }));

            let durations = cells.filter(|cell| !cell.is_empty()).collect::<Vec<_>>();
            assert_eq!(durations.len(), SIZES.len());
            for cell in durations {
                // "0.0001234s": 7 decimal places, seconds suffix.
                let seconds = cell.strip_suffix('s').unwrap();
                assert_eq!(seconds.len() - seconds.find('.').unwrap() - 1, 7);
                let seconds = seconds.parse::<f64>().unwrap();
                assert!(seconds >= 0.0);
                assert!(seconds.is_finite());
            }
        }
    }
}
