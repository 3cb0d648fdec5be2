//! Monotonic tic/toc stopwatch.

use std::time::{Duration, Instant};

/// A restartable stopwatch with a MATLAB-style tic/toc interface.
///
/// Backed by [`Instant`], the highest-resolution monotonic clock the platform
/// provides. Never reads the wall clock, so measurements are immune to clock
/// adjustments.
///
/// # Example
///
/// ```rust
/// use ticbench::Timer;
///
/// let mut timer = Timer::new();
/// timer.tic();
/// let elapsed1 = timer.toc();
/// let elapsed2 = timer.toc();
/// assert!(elapsed2 >= elapsed1);
/// ```
#[derive(Debug, Default)]
pub struct Timer {
    start: Option<Instant>,
    elapsed: Option<Duration>,
}

impl Timer {
    /// Create a stopped timer. No instant is captured until [`tic`](Self::tic).
    pub fn new() -> Self {
        Self::default()
    }

    /// Start (or restart) the timer. Re-entry overwrites the previous start.
    ///
    /// Returns `&mut Self` so it can be chained: `Timer::new().tic()`.
    pub fn tic(&mut self) -> &mut Self {
        self.elapsed = None;
        self.start = Some(Instant::now());
        self
    }

    /// Elapsed time since the last [`tic`](Self::tic).
    ///
    /// Does not reset the start point: repeated calls before a new `tic`
    /// return monotonically increasing values. The reading is also stored so
    /// the owning engine can collect it after the timed block returns.
    ///
    /// # Panics
    ///
    /// Panics if the timer was never started. Call `tic()` first.
    pub fn toc(&mut self) -> Duration {
        let start = match self.start {
            Some(start) => start,
            None => panic!("Timer::toc() called before Timer::tic()"),
        };
        let elapsed = start.elapsed();
        self.elapsed = Some(elapsed);
        elapsed
    }

    /// The reading recorded by the most recent [`toc`](Self::toc), if any.
    ///
    /// `None` before the first `toc` and after every `tic`.
    pub fn elapsed(&self) -> Option<Duration> {
        self.elapsed
    }

    /// Whether a `tic` has happened without a subsequent `toc`.
    pub fn is_running(&self) -> bool {
        self.start.is_some() && self.elapsed.is_none()
    }

    /// Time a closure, toc-ing on every exit path.
    ///
    /// Equivalent to wrapping the closure in [`scoped`](Self::scoped): if the
    /// closure panics, the elapsed time is still recorded into the timer
    /// before the panic propagates.
    ///
    /// # Example
    ///
    /// ```rust
    /// use ticbench::Timer;
    ///
    /// let mut timer = Timer::new();
    /// let sum: u64 = timer.measure(|| (0..1000).sum());
    /// assert!(timer.elapsed().is_some());
    /// # let _ = sum;
    /// ```
    pub fn measure<F, R>(&mut self, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        let _scope = self.scoped();
        f()
    }

    /// Enter a timed scope: construction tics, drop tocs.
    ///
    /// The drop runs during unwinding too, so an abnormal exit from the
    /// scope still records its elapsed time.
    pub fn scoped(&mut self) -> TimedScope<'_> {
        self.tic();
        TimedScope { timer: self }
    }

    /// Forget any previous reading so a fresh use can be detected.
    pub(crate) fn clear(&mut self) {
        self.start = None;
        self.elapsed = None;
    }
}

/// RAII guard for a timed region. Created by [`Timer::scoped`].
///
/// Dropping the guard stops the timer and records the reading.
#[derive(Debug)]
pub struct TimedScope<'a> {
    timer: &'a mut Timer,
}

impl Drop for TimedScope<'_> {
    fn drop(&mut self) {
        self.timer.toc();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_increase_monotonically_on_repeated_toc() {
        let mut timer = Timer::new();
        timer.tic();
        let e1 = timer.toc();
        let e2 = timer.toc();
        let e3 = timer.toc();
        assert!(e1 <= e2);
        assert!(e2 <= e3);
    }

    #[test]
    fn should_have_no_reading_before_first_toc() {
        let timer = Timer::new();
        assert_eq!(timer.elapsed(), None);
        assert!(!timer.is_running());
    }

    #[test]
    fn should_record_elapsed_when_measuring_closure() {
        let mut timer = Timer::new();
        timer.measure(|| std::thread::sleep(Duration::from_millis(5)));
        assert!(timer.elapsed().unwrap() >= Duration::from_millis(5));
    }

    #[test]
    fn should_record_elapsed_when_scope_panics() {
        let mut timer = Timer::new();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            timer.measure(|| panic!("boom"));
        }));
        assert!(result.is_err());
        assert!(timer.elapsed().is_some());
    }

    #[test]
    fn should_overwrite_start_on_reentrant_tic() {
        let mut timer = Timer::new();
        timer.tic();
        std::thread::sleep(Duration::from_millis(25));
        timer.tic();
        let elapsed = timer.toc();
        assert!(elapsed < Duration::from_millis(25));
    }

    #[test]
    #[should_panic(expected = "before Timer::tic")]
    fn should_panic_when_toc_called_before_tic() {
        Timer::new().toc();
    }
}
