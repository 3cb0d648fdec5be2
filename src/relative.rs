//! Relative-change helpers for comparing measured durations.
//!
//! Consumed by report layers to phrase one labeled measurement against
//! another ("x is N% faster than y"). All inputs are raw numbers in the same
//! unit; direction conventions follow everyday usage, so "faster" means a
//! decrease in time.

/// Percent decrease from `old` to `new`.
///
/// Positive values are decreases, negative values are increases:
/// `percent_change(1.0, 5.0) == 80.0`, `percent_change(5.0, 1.0) == -400.0`.
pub fn percent_change(new: f64, old: f64) -> f64 {
    (old - new) / old * 100.0
}

/// How many percent faster `new` is than `old`, where both are durations.
///
/// Faster means time decreased, so this is the percent decrease.
pub fn percent_faster(new: f64, old: f64) -> f64 {
    percent_change(new, old)
}

/// How many percent slower `new` is than `old`, where both are durations.
pub fn percent_slower(new: f64, old: f64) -> f64 {
    -percent_change(new, old)
}

/// Ratio `new / old`: below 1.0 is an improvement, above is a regression.
pub fn ratio(new: f64, old: f64) -> f64 {
    new / old
}

/// Whether `new` regressed past `old` by more than `threshold`
/// (e.g. 0.05 for 5%).
pub fn is_regression(new: f64, old: f64, threshold: f64) -> bool {
    ratio(new, old) > 1.0 + threshold
}
