//! Configuration for the benchmark engine.

use crate::error::BenchError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Display unit hint, consumed only by the reporting layer.
///
/// The engine itself always works in [`Duration`]s and fractional seconds;
/// this hint lets a reporter skip its unit auto-selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeUnit {
    S,
    Ms,
    Us,
    Ns,
}

/// Configuration for a [`Bencher`](crate::Bencher).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BencherConfig {
    /// Fixed number of iterations. `None` selects adaptive mode, which keeps
    /// iterating until [`min_duration`](Self::min_duration) of measured time
    /// has accumulated.
    pub num: Option<usize>,
    /// Label for the first run. Can be changed per run via
    /// [`reset`](crate::Bencher::reset).
    pub label: Option<String>,
    /// Best-of group size: consecutive raw measurements are collapsed into
    /// one robust sample by taking their minimum. Trades effective sample
    /// count for robustness to scheduling noise.
    pub bestof: usize,
    /// Display unit hint for the reporting layer. `None` lets the reporter
    /// choose.
    pub unit: Option<TimeUnit>,
    /// Verbosity level for the reporting layer. The engine emits nothing
    /// itself.
    pub verbose: u8,
    /// Suspend the installed [`Collector`](crate::Collector) for the whole
    /// measurement loop.
    pub isolate_collector: bool,
    /// Wall-clock floor for adaptive mode.
    #[serde(with = "duration_secs")]
    pub min_duration: Duration,
}

impl Default for BencherConfig {
    fn default() -> Self {
        Self {
            num: None,
            label: None,
            bestof: 3,
            unit: None,
            verbose: 0,
            isolate_collector: true,
            min_duration: Duration::from_millis(200),
        }
    }
}

impl BencherConfig {
    /// Create a config with default settings: adaptive mode, best of 3,
    /// collector isolation on, 200 ms adaptive floor.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse config from environment variables.
    ///
    /// Supported variables:
    /// - `TICBENCH_NUM`: fixed iteration count (unset = adaptive)
    /// - `TICBENCH_BESTOF`: best-of group size (default: 3)
    /// - `TICBENCH_VERBOSE`: verbosity level (default: 0)
    /// - `TICBENCH_MIN_DURATION_MS`: adaptive floor in milliseconds
    /// - `TICBENCH_ISOLATE_GC`: collector isolation (default: true)
    pub fn from_env() -> Self {
        let mut cfg = Self::default();

        if let Ok(v) = std::env::var("TICBENCH_NUM") {
            if let Ok(n) = v.parse() {
                cfg.num = Some(n);
            }
        }
        if let Ok(v) = std::env::var("TICBENCH_BESTOF") {
            if let Ok(n) = v.parse() {
                cfg.bestof = n;
            }
        }
        if let Ok(v) = std::env::var("TICBENCH_VERBOSE") {
            if let Ok(n) = v.parse() {
                cfg.verbose = n;
            }
        }
        if let Ok(v) = std::env::var("TICBENCH_MIN_DURATION_MS") {
            if let Ok(ms) = v.parse::<u64>() {
                cfg.min_duration = Duration::from_millis(ms);
            }
        }
        if let Ok(v) = std::env::var("TICBENCH_ISOLATE_GC") {
            cfg.isolate_collector = v != "0" && !v.eq_ignore_ascii_case("false");
        }

        cfg
    }

    /// Set a fixed iteration count.
    pub fn num(mut self, n: usize) -> Self {
        self.num = Some(n);
        self
    }

    /// Select adaptive mode (the default).
    pub fn adaptive(mut self) -> Self {
        self.num = None;
        self
    }

    /// Set the initial label.
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Set the best-of group size.
    pub fn bestof(mut self, n: usize) -> Self {
        self.bestof = n;
        self
    }

    /// Set the display unit hint.
    pub fn unit(mut self, unit: TimeUnit) -> Self {
        self.unit = Some(unit);
        self
    }

    /// Set the verbosity level.
    pub fn verbose(mut self, level: u8) -> Self {
        self.verbose = level;
        self
    }

    /// Enable or disable collector isolation.
    pub fn isolate_collector(mut self, isolate: bool) -> Self {
        self.isolate_collector = isolate;
        self
    }

    /// Set the adaptive-mode wall-clock floor.
    pub fn min_duration(mut self, d: Duration) -> Self {
        self.min_duration = d;
        self
    }

    /// Reject configurations the engine cannot run with.
    pub(crate) fn validate(&self) -> Result<(), BenchError> {
        if self.bestof < 1 {
            return Err(BenchError::InvalidBestof(self.bestof));
        }
        if let Some(0) = self.num {
            return Err(BenchError::InvalidIterations(0));
        }
        Ok(())
    }
}

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        d.as_secs_f64().serialize(s)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(d)?;
        Duration::try_from_secs_f64(secs).map_err(serde::de::Error::custom)
    }
}
