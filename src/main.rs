// Copyright 2025 Google LLC
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Runs the fixed benchmark matrix and prints the timing table to stdout.

use std::io;

fn main() -> io::Result<()> {
    #[cfg(feature = "log")]
    env_logger::init();

    let stdout = io::stdout();
    let mut out = stdout.lock();
    vecadd::run_benchmarks(&mut out)
}
