// Copyright 2025 Google LLC
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Timed element-wise addition of two integer slices.

use crate::macros::{log_debug, log_warn};
use crate::partition::Partition;
// Platforms that support `libc::sched_setaffinity()`.
#[cfg(all(
    not(miri),
    any(
        target_os = "android",
        target_os = "dragonfly",
        target_os = "freebsd",
        target_os = "linux"
    )
))]
use nix::{
    sched::{sched_setaffinity, CpuSet},
    unistd::Pid,
};
use std::num::NonZeroUsize;
use std::time::{Duration, Instant};

/// Policy to pin worker threads to CPUs.
#[derive(Clone, Copy, Debug)]
pub enum CpuPinningPolicy {
    /// Don't pin worker threads to CPUs.
    No,
    /// Pin each worker thread to a CPU, if CPU pinning is supported and
    /// implemented on this platform.
    IfSupported,
    /// Pin each worker thread to a CPU. If CPU pinning isn't supported on this
    /// platform (or not implemented), the parallel addition will panic.
    Always,
}

/// An element-wise addition of two integer slices, split across a fixed team
/// of worker threads.
///
/// A fresh team is spawned for every call to [`run()`](Self::run) and joined
/// before it returns: no thread pool, no reuse, no threads outliving a call.
pub struct ParallelAdd {
    /// Number of worker threads to spawn.
    pub num_threads: NonZeroUsize,
    /// Policy to pin worker threads to CPUs.
    pub cpu_pinning: CpuPinningPolicy,
}

impl ParallelAdd {
    /// Adds the two slices element-wise, returning the result together with
    /// the elapsed wall-clock time, measured from the first thread spawn to
    /// the join of the last worker.
    ///
    /// The output is pre-allocated before the clock starts and split into one
    /// fixed contiguous chunk per worker, so each worker writes to its own
    /// disjoint sub-slice and no synchronization happens between workers. The
    /// last chunk absorbs the remainder when the length isn't a multiple of
    /// the thread count.
    ///
    /// ```
    /// # use std::num::NonZeroUsize;
    /// # use vecadd::{CpuPinningPolicy, ParallelAdd};
    /// let workers = ParallelAdd {
    ///     num_threads: NonZeroUsize::try_from(4).unwrap(),
    ///     cpu_pinning: CpuPinningPolicy::No,
    /// };
    /// let (result, elapsed) = workers.run(&[1, 2, 3, 4], &[10, 20, 30, 40]);
    /// assert_eq!(result, vec![11, 22, 33, 44]);
    /// assert!(elapsed.as_secs_f64().is_finite());
    /// ```
    ///
    /// # Panics
    ///
    /// Panics if the slices have different lengths, or if a worker thread
    /// panics.
    pub fn run(&self, left: &[i32], right: &[i32]) -> (Vec<i32>, Duration) {
        assert_eq!(
            left.len(),
            right.len(),
            "cannot add vectors of different lengths"
        );
        let mut output = vec![0; left.len()];
        let partition = Partition::new(left.len(), self.num_threads);
        let cpu_pinning = self.cpu_pinning;

        let start = Instant::now();
        std::thread::scope(|scope| {
            let mut rest = output.as_mut_slice();
            for (id, range) in partition.chunks().enumerate() {
                let (chunk, tail) = std::mem::take(&mut rest).split_at_mut(range.len());
                rest = tail;
                let left = &left[range.clone()];
                let right = &right[range];
                scope.spawn(move || {
                    pin_current_thread(id, cpu_pinning);
                    left.iter()
                        .zip(right)
                        .zip(chunk.iter_mut())
                        .for_each(|((&a, &b), out)| *out = a + b);
                });
            }
            log_debug!("[main thread] Spawned {} worker threads", self.num_threads);
        });
        let elapsed = start.elapsed();
        log_debug!("[main thread] Joined all worker threads after {elapsed:?}");

        (output, elapsed)
    }
}

/// Adds the two slices element-wise on the calling thread, returning the
/// result together with the elapsed wall-clock time of the addition loop. The
/// output allocation isn't measured.
///
/// # Panics
///
/// Panics if the slices have different lengths.
pub fn add_serial(left: &[i32], right: &[i32]) -> (Vec<i32>, Duration) {
    assert_eq!(
        left.len(),
        right.len(),
        "cannot add vectors of different lengths"
    );
    let mut output = vec![0; left.len()];

    let start = Instant::now();
    left.iter()
        .zip(right)
        .zip(output.iter_mut())
        .for_each(|((&a, &b), out)| *out = a + b);
    let elapsed = start.elapsed();

    (output, elapsed)
}

/// Pins the current thread to the CPU with the given index, according to the
/// given policy.
#[cfg(all(
    not(miri),
    any(
        target_os = "android",
        target_os = "dragonfly",
        target_os = "freebsd",
        target_os = "linux"
    )
))]
fn pin_current_thread(id: usize, cpu_pinning: CpuPinningPolicy) {
    if matches!(cpu_pinning, CpuPinningPolicy::No) {
        return;
    }
    let mut cpu_set = CpuSet::new();
    let result = cpu_set
        .set(id)
        .and_then(|()| sched_setaffinity(Pid::from_raw(0), &cpu_set));
    match result {
        Ok(()) => log_debug!("Pinned worker #{id} to CPU #{id}"),
        Err(e) => match cpu_pinning {
            CpuPinningPolicy::Always => panic!("failed to pin worker #{id} to CPU #{id}: {e}"),
            _ => log_warn!("Failed to set CPU affinity for worker #{id}: {e}"),
        },
    }
}

/// Pins the current thread to the CPU with the given index, according to the
/// given policy.
#[cfg(any(
    miri,
    not(any(
        target_os = "android",
        target_os = "dragonfly",
        target_os = "freebsd",
        target_os = "linux"
    ))
))]
fn pin_current_thread(_id: usize, cpu_pinning: CpuPinningPolicy) {
    match cpu_pinning {
        CpuPinningPolicy::No => (),
        CpuPinningPolicy::IfSupported => {
            log_warn!("Pinning threads to CPUs is not implemented on this platform.");
        }
        CpuPinningPolicy::Always => {
            panic!("Pinning threads to CPUs is not implemented on this platform.");
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_serial_known_values() {
        let (result, _) = add_serial(&[1, 2, 3, 4], &[10, 20, 30, 40]);
        assert_eq!(result, vec![11, 22, 33, 44]);
    }

    #[test]
    fn test_serial_empty_input() {
        let (result, _) = add_serial(&[], &[]);
        assert!(result.is_empty());
    }

    #[test]
    fn test_elapsed_is_finite() {
        let left = vec![1; 1000];
        let right = vec![2; 1000];

        let (_, elapsed) = add_serial(&left, &right);
        assert!(elapsed.as_secs_f64() >= 0.0);
        assert!(elapsed.as_secs_f64().is_finite());

        let workers = ParallelAdd {
            num_threads: NonZeroUsize::try_from(4).unwrap(),
            cpu_pinning: CpuPinningPolicy::No,
        };
        let (_, elapsed) = workers.run(&left, &right);
        assert!(elapsed.as_secs_f64() >= 0.0);
        assert!(elapsed.as_secs_f64().is_finite());
    }

    #[test]
    #[should_panic(expected = "cannot add vectors of different lengths")]
    fn test_serial_mismatched_lengths() {
        add_serial(&[1, 2, 3], &[1, 2, 3, 4]);
    }

    #[test]
    #[should_panic(expected = "cannot add vectors of different lengths")]
    fn test_parallel_mismatched_lengths() {
        let workers = ParallelAdd {
            num_threads: NonZeroUsize::try_from(2).unwrap(),
            cpu_pinning: CpuPinningPolicy::No,
        };
        workers.run(&[1, 2, 3], &[1, 2, 3, 4]);
    }

    #[test]
    fn test_parallel_single_thread() {
        let workers = ParallelAdd {
            num_threads: NonZeroUsize::try_from(1).unwrap(),
            cpu_pinning: CpuPinningPolicy::No,
        };
        let (result, _) = workers.run(&[5, 6], &[7, 8]);
        assert_eq!(result, vec![12, 14]);
    }
}
