//! The benchmark engine: iteration control and measurement collection.

use crate::collector::{Collector, CollectorPause};
use crate::config::BencherConfig;
use crate::error::BenchError;
use crate::stats::{self, Measures, Rankings};
use crate::timer::Timer;
use std::convert::Infallible;
use std::ops::ControlFlow;
use std::sync::Arc;
use std::time::Duration;

/// Multiline alternative to string-based `timeit`-style tools.
///
/// The engine drives repeated invocation of a timed block, decides how many
/// iterations are enough, collects raw per-iteration durations, and derives
/// robust statistics from them. The block is ordinary code in a closure, not
/// a string: per-iteration setup stays outside the measured region by timing
/// only a sub-scope with the yielded [`Timer`].
///
/// # Example
///
/// ```rust
/// use ticbench::{Bencher, BencherConfig};
///
/// let mut bench = Bencher::with_config(BencherConfig::new().num(10)).unwrap();
/// bench.reset("sum").run(|timer| {
///     let data: Vec<u64> = (0..1000).collect(); // Setup (not timed)
///     timer.measure(|| {
///         std::hint::black_box(data.iter().sum::<u64>()); // Timed
///     });
/// });
/// assert!(bench.min().unwrap() > std::time::Duration::ZERO);
/// ```
///
/// If the closure never uses the yielded timer, the engine's own bracketing
/// of the whole closure is kept instead, so a measurement is never silently
/// lost:
///
/// ```rust
/// use ticbench::Bencher;
///
/// let mut bench = Bencher::new();
/// bench.reset("concise").run(|_timer| {
///     std::hint::black_box((0..1000).sum::<u64>());
/// });
/// assert!(!bench.raw_times().is_empty());
/// ```
pub struct Bencher {
    config: BencherConfig,
    label: Option<String>,
    raw_times: Vec<Duration>,
    total_time: Duration,
    measures: Measures,
    collector: Option<Arc<dyn Collector>>,
    // Foreground timer is handed to the caller's closure; the background
    // timer brackets the whole closure as the implicit-mode fallback.
    fg_timer: Timer,
    bg_timer: Timer,
}

impl Bencher {
    /// Create an engine with the default adaptive configuration.
    pub fn new() -> Self {
        // Defaults are statically valid, so this cannot fail.
        Self::from_parts(BencherConfig::default())
    }

    /// Create an engine with an explicit configuration.
    ///
    /// Fails with [`BenchError::InvalidBestof`] or
    /// [`BenchError::InvalidIterations`] for configurations the engine
    /// cannot run with.
    pub fn with_config(config: BencherConfig) -> Result<Self, BenchError> {
        config.validate()?;
        Ok(Self::from_parts(config))
    }

    fn from_parts(config: BencherConfig) -> Self {
        let label = config.label.clone();
        Self {
            config,
            label,
            raw_times: Vec::new(),
            total_time: Duration::ZERO,
            measures: Measures::new(),
            collector: None,
            fg_timer: Timer::new(),
            bg_timer: Timer::new(),
        }
    }

    /// Install a [`Collector`] to suspend while measuring.
    ///
    /// Without one, collector isolation is a no-op regardless of
    /// [`isolate_collector`](BencherConfig::isolate_collector).
    pub fn with_collector(mut self, collector: Arc<dyn Collector>) -> Self {
        self.collector = Some(collector);
        self
    }

    /// The engine configuration.
    pub fn config(&self) -> &BencherConfig {
        &self.config
    }

    /// The active run label, if any.
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Clear the current run and switch to a new label, keeping the
    /// cross-label measurement history.
    ///
    /// Returns `&mut Self` for chaining:
    /// `bench.reset("a").call(|| work_a()); bench.reset("b").call(|| work_b());`
    pub fn reset(&mut self, label: impl Into<String>) -> &mut Self {
        self.reset_with(label, true)
    }

    /// Like [`reset`](Self::reset); `keep_history = false` also drops any
    /// measurements previously accumulated under the new label.
    pub fn reset_with(&mut self, label: impl Into<String>, keep_history: bool) -> &mut Self {
        let label = label.into();
        if !keep_history {
            for by_label in self.measures.values_mut() {
                by_label.remove(&label);
            }
        }
        self.raw_times.clear();
        self.total_time = Duration::ZERO;
        self.label = Some(label);
        self
    }

    /// Run the measurement loop.
    ///
    /// The closure runs once per iteration and receives the foreground
    /// [`Timer`]: wrap only the region to measure in
    /// [`Timer::measure`]/[`Timer::scoped`], or ignore the timer entirely to
    /// have the whole closure timed.
    pub fn run<F>(&mut self, mut f: F) -> &mut Self
    where
        F: FnMut(&mut Timer),
    {
        match self.drive::<_, Infallible>(|timer| {
            f(timer);
            Ok(ControlFlow::Continue(()))
        }) {
            Ok(()) => self,
            Err(never) => match never {},
        }
    }

    /// Run the measurement loop with a fallible body.
    ///
    /// An `Err` aborts the loop and propagates unchanged, but only after the
    /// elapsed time of the failing iteration has been recorded: a completed
    /// clock reading is never lost, and the caller's error is never masked.
    pub fn try_run<F, E>(&mut self, mut f: F) -> Result<(), E>
    where
        F: FnMut(&mut Timer) -> Result<(), E>,
    {
        self.drive(|timer| f(timer).map(|()| ControlFlow::Continue(())))
    }

    /// Run the measurement loop with caller-driven cancellation.
    ///
    /// Returning [`ControlFlow::Break`] stops after the current iteration;
    /// everything measured so far stays readable.
    pub fn run_while<F>(&mut self, mut f: F) -> &mut Self
    where
        F: FnMut(&mut Timer) -> ControlFlow<()>,
    {
        match self.drive::<_, Infallible>(|timer| Ok(f(timer))) {
            Ok(()) => self,
            Err(never) => match never {},
        }
    }

    /// Condensed form timing an entire closure per iteration.
    ///
    /// ```rust
    /// use ticbench::{Bencher, BencherConfig};
    ///
    /// let mut bench = Bencher::with_config(BencherConfig::new().num(10)).unwrap();
    /// bench.reset("shift").call(|| { std::hint::black_box(1u64 << 20); });
    /// assert!(bench.min().is_ok());
    /// ```
    pub fn call<F>(&mut self, mut f: F) -> &mut Self
    where
        F: FnMut(),
    {
        self.run(|timer| {
            timer.measure(&mut f);
        })
    }

    /// The measurement loop shared by every entry point.
    ///
    /// Fixed mode runs exactly `num` iterations. Adaptive mode runs batches
    /// that double from 1, stopping once the cumulative measured time
    /// reaches the configured floor; the sizing batches are kept as
    /// legitimate raw data, not discarded as warm-up. The collector (when
    /// installed and isolation is on) is suspended once for the whole loop
    /// and restored on every exit path by the guard's drop.
    fn drive<F, E>(&mut self, mut f: F) -> Result<(), E>
    where
        F: FnMut(&mut Timer) -> Result<ControlFlow<()>, E>,
    {
        let collector = self.collector.clone();
        let _pause = match &collector {
            Some(c) if self.config.isolate_collector => Some(CollectorPause::new(c.as_ref())),
            _ => None,
        };

        match self.config.num {
            Some(num) => {
                for _ in 0..num {
                    if self.step(&mut f)?.is_break() {
                        break;
                    }
                }
            }
            None => {
                let mut batch = 1usize;
                'grow: loop {
                    for _ in 0..batch {
                        if self.step(&mut f)?.is_break() {
                            break 'grow;
                        }
                    }
                    if self.total_time >= self.config.min_duration {
                        break;
                    }
                    batch = batch.saturating_mul(2);
                }
            }
        }

        self.record_measures();
        Ok(())
    }

    /// One measurement opportunity.
    ///
    /// The raw sample is pushed before any body error propagates, so an
    /// aborted run still leaves `raw_times` complete for the iterations that
    /// actually executed.
    fn step<F, E>(&mut self, f: &mut F) -> Result<ControlFlow<()>, E>
    where
        F: FnMut(&mut Timer) -> Result<ControlFlow<()>, E>,
    {
        self.fg_timer.clear();
        self.bg_timer.tic();
        let outcome = f(&mut self.fg_timer);
        let bg_time = self.bg_timer.toc();

        // Prefer the explicit foreground reading; a timer left running when
        // the body aborted mid-scope is stopped here so its partial time is
        // not lost. Untouched timer means implicit mode for this iteration.
        let sample = match self.fg_timer.elapsed() {
            Some(elapsed) => elapsed,
            None if self.fg_timer.is_running() => self.fg_timer.toc(),
            None => bg_time,
        };
        self.raw_times.push(sample);
        self.total_time += sample;

        outcome
    }

    /// Save the robust statistics of the current run under the active label.
    ///
    /// Unlabeled runs are not entered into the cross-label history.
    fn record_measures(&mut self) {
        let label = match (&self.label, self.raw_times.is_empty()) {
            (Some(label), false) => label.clone(),
            _ => return,
        };
        let robust = stats::chunk_mins(&self.raw_times, self.config.bestof);
        let min = robust
            .iter()
            .copied()
            .min()
            .unwrap_or(Duration::ZERO)
            .as_secs_f64();
        let mean = stats::mean_secs(&robust);
        let std = stats::sample_std_secs(&robust);

        use crate::stats::Stat;
        for (stat, value) in [
            (Stat::Min, min),
            (Stat::Mean, mean),
            (Stat::MeanMinusStd, mean - std),
            (Stat::MeanPlusStd, mean + std),
        ] {
            self.measures
                .entry(stat)
                .or_default()
                .insert(label.clone(), value);
        }
    }

    /// Raw per-iteration durations for the active label, in execution order.
    pub fn raw_times(&self) -> &[Duration] {
        &self.raw_times
    }

    /// Sum of all raw durations: the true wall-clock cost incurred,
    /// independent of best-of grouping.
    pub fn total_time(&self) -> Duration {
        self.total_time
    }

    /// Raw times reduced to robust samples by best-of grouping.
    ///
    /// See [`BencherConfig::bestof`]; with `bestof == 1` this is identical
    /// to [`raw_times`](Self::raw_times).
    pub fn robust_times(&self) -> Vec<Duration> {
        stats::chunk_mins(&self.raw_times, self.config.bestof)
    }

    /// The best time overall.
    ///
    /// Typically the statistic to trust: higher values are caused by other
    /// processes interfering with the measurement, not by variability in the
    /// code under test, so the minimum is a lower bound on true cost.
    pub fn min(&self) -> Result<Duration, BenchError> {
        self.robust_times()
            .into_iter()
            .min()
            .ok_or(BenchError::EmptyMeasurement)
    }

    /// Mean of the robust samples.
    pub fn mean(&self) -> Result<Duration, BenchError> {
        let robust = self.robust_times();
        if robust.is_empty() {
            return Err(BenchError::EmptyMeasurement);
        }
        Ok(Duration::from_secs_f64(stats::mean_secs(&robust)))
    }

    /// Sample standard deviation of the robust samples; zero when only one
    /// robust sample exists.
    pub fn std(&self) -> Result<Duration, BenchError> {
        let robust = self.robust_times();
        if robust.is_empty() {
            return Err(BenchError::EmptyMeasurement);
        }
        Ok(Duration::from_secs_f64(stats::sample_std_secs(&robust)))
    }

    /// The per-statistic, per-label history accumulated across
    /// [`reset`](Self::reset) calls. Values are fractional seconds.
    pub fn measures(&self) -> &Measures {
        &self.measures
    }

    /// Labels ordered ascending by value, per statistic kind.
    ///
    /// Only meaningful when the same engine compared multiple labels via
    /// [`reset`](Self::reset).
    pub fn rankings(&self) -> Rankings {
        stats::rank(&self.measures)
    }

    /// Rank-order agreement between the recorded statistics, in `[0, 1]`.
    ///
    /// 1.0 means every statistic agrees on which label is fastest; a lower
    /// score flags a measurement not yet trustworthy (too few iterations,
    /// high variance, or interference) that needs more iterations or a
    /// larger `bestof` before drawing conclusions.
    pub fn consistency(&self) -> Result<f64, BenchError> {
        stats::consistency(&self.rankings()).ok_or(BenchError::EmptyMeasurement)
    }
}

impl Default for Bencher {
    fn default() -> Self {
        Self::new()
    }
}
