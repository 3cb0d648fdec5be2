//! # ticbench
//!
//! Robust tic/toc micro-benchmarking for inline blocks of code.
//!
//! Unlike string-based `timeit`-style tools, ticbench times existing code
//! exactly as written: indent the block into a closure, optionally mark the
//! measured sub-region with the yielded [`Timer`], and the engine handles
//! iteration counts and robust statistics. Measurement noise from OS jitter
//! and allocator pauses is suppressed by best-of-N chunk-min reduction, and
//! an installed [`Collector`] can be suspended for the whole run.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ticbench::{Bencher, BencherConfig};
//!
//! let mut bench = Bencher::with_config(BencherConfig::new().num(100)).unwrap();
//!
//! bench.reset("parse").run(|timer| {
//!     // Setup (not timed)
//!     let input = build_input();
//!
//!     // Measure exactly the region of interest
//!     timer.measure(|| {
//!         parse(&input);
//!     });
//! });
//!
//! println!("best = {:?}, mean = {:?}", bench.min().unwrap(), bench.mean().unwrap());
//!
//! fn build_input() -> String { "1,2,3".repeat(1000) }
//! fn parse(_: &str) {}
//! ```
//!
//! Leaving the `num` configuration unset selects adaptive mode: the engine
//! doubles its batch size until at least
//! [`min_duration`](BencherConfig::min_duration) of measured time has
//! accumulated.
//!
//! Comparing variants reuses one engine so the label history accumulates:
//!
//! ```rust,no_run
//! use ticbench::Bencher;
//!
//! let mut bench = Bencher::new();
//! bench.reset("vec").call(|| { std::hint::black_box(vec![0u8; 1024]); });
//! bench.reset("boxed").call(|| { std::hint::black_box(Box::new([0u8; 1024])); });
//!
//! let rankings = bench.rankings();
//! let agreement = bench.consistency().unwrap();
//! # let _ = (rankings, agreement);
//! ```

mod bencher;
mod collector;
mod config;
mod error;
mod stats;
mod timer;

pub mod relative;

pub use bencher::Bencher;
pub use collector::{Collector, CollectorPause};
pub use config::{BencherConfig, TimeUnit};
pub use error::BenchError;
pub use stats::{Measures, Rankings, Stat};
pub use timer::{TimedScope, Timer};

use std::sync::{Mutex, OnceLock};

/// The process-wide default engine, for terse interactive use.
///
/// Configured like an interactive session: adaptive mode with `bestof = 5`
/// and `verbose = 2`. This is one shared engine behind a [`Mutex`]: runs
/// from different call sites accumulate into the same label history, and the
/// lock is held for the duration of a measurement loop. Construct your own
/// [`Bencher`] whenever isolation matters.
pub fn default_bencher() -> &'static Mutex<Bencher> {
    static DEFAULT: OnceLock<Mutex<Bencher>> = OnceLock::new();
    DEFAULT.get_or_init(|| {
        let config = BencherConfig::new().bestof(5).verbose(2);
        // Statically valid configuration.
        Mutex::new(Bencher::with_config(config).expect("default config is valid"))
    })
}
