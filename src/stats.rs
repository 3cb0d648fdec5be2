//! The raw-to-robust statistics pipeline.
//!
//! Raw per-iteration durations are collapsed into robust samples by taking
//! the minimum of consecutive best-of-N groups: extra latency in a timing
//! measurement is additive noise (never negative), so the fastest time in a
//! window is the best available estimate of true cost. Summary statistics,
//! rankings, and the consistency score are all computed over those robust
//! samples.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

/// A summary statistic recorded per label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Stat {
    /// Minimum robust sample.
    #[serde(rename = "min")]
    Min,
    /// Mean of the robust samples.
    #[serde(rename = "mean")]
    Mean,
    /// Mean minus one standard deviation.
    #[serde(rename = "mean-std")]
    MeanMinusStd,
    /// Mean plus one standard deviation.
    #[serde(rename = "mean+std")]
    MeanPlusStd,
}

impl Stat {
    /// All recorded statistic kinds, in ranking order.
    pub const ALL: [Stat; 4] = [Stat::Min, Stat::Mean, Stat::MeanMinusStd, Stat::MeanPlusStd];
}

impl fmt::Display for Stat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stat::Min => "min",
            Stat::Mean => "mean",
            Stat::MeanMinusStd => "mean-std",
            Stat::MeanPlusStd => "mean+std",
        };
        f.write_str(name)
    }
}

/// Robust values per statistic kind, per label, in seconds.
pub type Measures = BTreeMap<Stat, BTreeMap<String, f64>>;

/// Labels ordered ascending by value, per statistic kind.
pub type Rankings = BTreeMap<Stat, Vec<(String, f64)>>;

/// Reduce raw times to robust samples: consecutive non-overlapping chunks of
/// `bestof`, each collapsed to its minimum, in execution order.
///
/// A final undersized chunk is kept as its own group, never dropped or
/// padded, so the result has exactly `ceil(len / bestof)` entries.
pub(crate) fn chunk_mins(times: &[Duration], bestof: usize) -> Vec<Duration> {
    debug_assert!(bestof >= 1);
    times
        .chunks(bestof)
        .map(|chunk| chunk.iter().copied().min().unwrap_or(Duration::ZERO))
        .collect()
}

/// Arithmetic mean in fractional seconds. Caller guarantees non-empty input.
pub(crate) fn mean_secs(times: &[Duration]) -> f64 {
    debug_assert!(!times.is_empty());
    times.iter().map(Duration::as_secs_f64).sum::<f64>() / times.len() as f64
}

/// Sample standard deviation in fractional seconds.
///
/// Defined as 0 for a single-element sequence.
pub(crate) fn sample_std_secs(times: &[Duration]) -> f64 {
    debug_assert!(!times.is_empty());
    if times.len() < 2 {
        return 0.0;
    }
    let mean = mean_secs(times);
    let variance = times
        .iter()
        .map(|t| {
            let diff = t.as_secs_f64() - mean;
            diff * diff
        })
        .sum::<f64>()
        / (times.len() - 1) as f64;
    variance.sqrt()
}

/// Order each statistic's labels ascending by value.
///
/// Ties keep their label-alphabetical order (stable sort over an already
/// label-sorted map), so two statistics that agree numerically always induce
/// the same label order.
pub(crate) fn rank(measures: &Measures) -> Rankings {
    measures
        .iter()
        .map(|(stat, by_label)| {
            let mut ranked: Vec<(String, f64)> =
                by_label.iter().map(|(k, v)| (k.clone(), *v)).collect();
            ranked.sort_by(|a, b| a.1.total_cmp(&b.1));
            (*stat, ranked)
        })
        .collect()
}

/// Rank-order agreement between the recorded statistics, in `[0, 1]`.
///
/// Computed as one minus the mean positional Hamming distance between the
/// label orders induced by each pair of statistics: 1.0 when every statistic
/// sorts the labels identically, lower as the orders diverge. Returns `None`
/// when no measures have been recorded.
pub(crate) fn consistency(rankings: &Rankings) -> Option<f64> {
    let orders: Vec<Vec<&str>> = rankings
        .values()
        .map(|ranked| ranked.iter().map(|(label, _)| label.as_str()).collect())
        .collect();
    let num_labels = orders.first().map(Vec::len)?;
    if num_labels == 0 {
        return None;
    }

    let mut mismatches = 0usize;
    let mut pairs = 0usize;
    for (i, a) in orders.iter().enumerate() {
        for b in orders.iter().skip(i + 1) {
            pairs += 1;
            mismatches += a.iter().zip(b.iter()).filter(|(x, y)| x != y).count();
        }
    }
    if pairs == 0 {
        // Single statistic: trivially self-consistent.
        return Some(1.0);
    }
    Some(1.0 - mismatches as f64 / (pairs * num_labels) as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secs(values: &[f64]) -> Vec<Duration> {
        values.iter().map(|v| Duration::from_secs_f64(*v)).collect()
    }

    #[test]
    fn should_take_minimum_of_each_chunk() {
        let times = secs(&[3.0, 1.0, 2.0, 5.0, 4.0, 6.0]);
        assert_eq!(chunk_mins(&times, 3), secs(&[1.0, 4.0]));
    }

    #[test]
    fn should_keep_undersized_final_chunk() {
        let times = secs(&[3.0, 1.0, 2.0, 5.0, 4.0]);
        assert_eq!(chunk_mins(&times, 3), secs(&[1.0, 4.0]));
        assert_eq!(chunk_mins(&times, 2), secs(&[1.0, 2.0, 4.0]));
    }

    #[test]
    fn should_be_identity_when_bestof_is_one() {
        let times = secs(&[3.0, 1.0, 2.0]);
        assert_eq!(chunk_mins(&times, 1), times);
    }

    #[test]
    fn should_have_ceiling_length_for_any_bestof() {
        let times = secs(&[1.0; 7]);
        for bestof in 1..=8 {
            let expected = times.len().div_ceil(bestof);
            assert_eq!(chunk_mins(&times, bestof).len(), expected);
        }
    }

    #[test]
    fn should_compute_sample_std() {
        let times = secs(&[1.0, 3.0]);
        // Sample variance of [1, 3] is 2, not 1.
        assert!((sample_std_secs(&times) - 2.0_f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn should_define_std_as_zero_for_single_sample() {
        assert_eq!(sample_std_secs(&secs(&[5.0])), 0.0);
    }

    fn measures_from(pairs: &[(Stat, &[(&str, f64)])]) -> Measures {
        pairs
            .iter()
            .map(|(stat, entries)| {
                let by_label = entries
                    .iter()
                    .map(|(label, v)| (label.to_string(), *v))
                    .collect();
                (*stat, by_label)
            })
            .collect()
    }

    #[test]
    fn should_rank_labels_ascending_by_value() {
        let measures = measures_from(&[(Stat::Min, &[("slow", 2.0), ("fast", 1.0)])]);
        let rankings = rank(&measures);
        let order: Vec<&str> = rankings[&Stat::Min]
            .iter()
            .map(|(label, _)| label.as_str())
            .collect();
        assert_eq!(order, ["fast", "slow"]);
    }

    #[test]
    fn should_score_one_when_statistics_agree() {
        let measures = measures_from(&[
            (Stat::Min, &[("a", 1.0), ("b", 2.0)]),
            (Stat::Mean, &[("a", 1.5), ("b", 2.5)]),
        ]);
        let score = consistency(&rank(&measures)).unwrap();
        assert!((score - 1.0).abs() < 1e-12);
    }

    #[test]
    fn should_score_one_when_values_tie_exactly() {
        let measures = measures_from(&[
            (Stat::Min, &[("a", 1.0), ("b", 1.0)]),
            (Stat::Mean, &[("a", 2.0), ("b", 2.0)]),
        ]);
        let score = consistency(&rank(&measures)).unwrap();
        assert!((score - 1.0).abs() < 1e-12);
    }

    #[test]
    fn should_score_zero_when_orders_fully_disagree() {
        let measures = measures_from(&[
            (Stat::Min, &[("a", 1.0), ("b", 2.0)]),
            (Stat::Mean, &[("a", 2.0), ("b", 1.0)]),
        ]);
        let score = consistency(&rank(&measures)).unwrap();
        assert!(score.abs() < 1e-12);
    }

    #[test]
    fn should_return_none_when_no_measures() {
        assert_eq!(consistency(&Rankings::new()), None);
    }

    #[test]
    fn should_serialize_stat_names_for_reporters() {
        assert_eq!(serde_json::to_string(&Stat::Min).unwrap(), "\"min\"");
        assert_eq!(
            serde_json::to_string(&Stat::MeanPlusStd).unwrap(),
            "\"mean+std\""
        );
    }
}
