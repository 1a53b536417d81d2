use super::loader::{AboveThreshold, LazyDataset};
use super::model::FilterStats;
use crate::error::{FilterError, Result};

// ---------------------------------------------------------------------------
// Quantile
// ---------------------------------------------------------------------------

/// How a percentile is read off the sorted values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantileMethod {
    /// Interpolate between the order statistics bracketing rank `p * (n - 1)`.
    Linear,
    /// Take the order statistic at the rounded rank `p * (n - 1)`.
    Nearest,
}

/// Method used by [`filter_above_percentile`].
pub const PERCENTILE_METHOD: QuantileMethod = QuantileMethod::Linear;

/// Percentile `p` of `values`. Returns `None` for an empty slice.
///
/// The slice is reordered in place (partial selection, no full sort).
/// `p` is expected within `[0, 1]`; values must not contain NaN.
pub fn quantile(values: &mut [f64], p: f64, method: QuantileMethod) -> Option<f64> {
    if values.is_empty() {
        return None;
    }

    let rank = (values.len() - 1) as f64 * p;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;

    match method {
        QuantileMethod::Nearest => {
            let idx = rank.round() as usize;
            let (_, value, _) = values.select_nth_unstable_by(idx, f64::total_cmp);
            Some(*value)
        }
        QuantileMethod::Linear => {
            let (_, lower, upper_part) = values.select_nth_unstable_by(lo, f64::total_cmp);
            let lower = *lower;
            if hi == lo {
                return Some(lower);
            }
            // everything right of `lo` is >= lower; its minimum is order statistic `hi`
            let upper = upper_part
                .iter()
                .copied()
                .min_by(f64::total_cmp)?;
            Some(lower + (rank - lo as f64) * (upper - lower))
        }
    }
}

// ---------------------------------------------------------------------------
// Filter stage
// ---------------------------------------------------------------------------

/// Narrow `dataset` to the rows whose `column` is strictly above its
/// `percentile`.
///
/// The threshold is computed over the rows `dataset` yields, in a single pass
/// that also counts them. The returned plan is `dataset` plus one predicate;
/// only its row count is evaluated here. Running this on an already filtered
/// plan stacks a second threshold on top of the first.
pub fn filter_above_percentile(
    dataset: &LazyDataset,
    column: &str,
    percentile: f64,
) -> Result<(LazyDataset, FilterStats)> {
    if !(0.0..=1.0).contains(&percentile) {
        return Err(FilterError::InvalidPercentile(percentile));
    }

    let mut scan = dataset.scan_column(column)?;
    let threshold = quantile(&mut scan.values, percentile, PERCENTILE_METHOD).ok_or_else(|| {
        FilterError::EmptyDataset {
            column: column.to_string(),
        }
    })?;
    drop(scan.values);

    let filtered = dataset.with_predicate(AboveThreshold {
        column: column.to_string(),
        threshold,
    });
    let filtered_rows = filtered.count()?;

    let stats = FilterStats {
        total_rows: scan.total_rows,
        threshold,
        filtered_rows,
    };
    log::info!(
        "'{column}' p{}: threshold {threshold:.4}, {filtered_rows} of {} rows above",
        percentile * 100.0,
        stats.total_rows
    );
    Ok((filtered, stats))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn one_to_hundred() -> Vec<f64> {
        // shuffled so selection is actually exercised
        (1..=100).map(|v| ((v * 37) % 100 + 1) as f64).collect()
    }

    #[test]
    fn linear_interpolates_between_order_statistics() {
        let mut values = one_to_hundred();
        let q = quantile(&mut values, 0.9, QuantileMethod::Linear).unwrap();
        assert!((q - 90.1).abs() < 1e-9, "got {q}");
    }

    #[test]
    fn nearest_picks_rounded_rank() {
        let mut values = one_to_hundred();
        assert_eq!(quantile(&mut values, 0.9, QuantileMethod::Nearest), Some(90.0));
    }

    #[test]
    fn methods_disagree_on_small_inputs() {
        let mut values = vec![10.0, 0.0, 30.0, 20.0];
        // rank = 3 * 0.5 = 1.5
        assert_eq!(quantile(&mut values, 0.5, QuantileMethod::Linear), Some(15.0));
        assert_eq!(quantile(&mut values, 0.5, QuantileMethod::Nearest), Some(20.0));
    }

    #[test]
    fn quantile_edges() {
        assert_eq!(quantile(&mut [], 0.9, QuantileMethod::Linear), None);
        assert_eq!(quantile(&mut [4.2], 0.9, QuantileMethod::Linear), Some(4.2));

        let mut values = vec![3.0, 1.0, 2.0];
        assert_eq!(quantile(&mut values, 0.0, QuantileMethod::Linear), Some(1.0));
        assert_eq!(quantile(&mut values, 1.0, QuantileMethod::Linear), Some(3.0));
    }

    #[test]
    fn ties_are_handled() {
        let mut values = vec![5.0, 5.0, 5.0, 1.0];
        assert_eq!(quantile(&mut values, 0.9, QuantileMethod::Linear), Some(5.0));
    }

    #[test]
    fn default_method_is_linear() {
        assert_eq!(PERCENTILE_METHOD, QuantileMethod::Linear);
    }

    #[test]
    fn rejects_out_of_range_percentiles() {
        let plan = LazyDataset::scan_file("unused.parquet");
        for p in [-0.1, 1.5, f64::NAN] {
            assert!(matches!(
                filter_above_percentile(&plan, "trip_distance", p),
                Err(FilterError::InvalidPercentile(_))
            ));
        }
    }
}
