use serde::{Deserialize, Serialize};

/// Summary of one objective's values across a population.
///
/// Non-finite values (failed assessments map to infinity) are excluded from
/// every measure, matching NaN-ignoring reductions; `failed` counts them so
/// the log still shows how many individuals blew up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitnessStats {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub median: f64,
    pub std_dev: f64,
    /// Number of non-finite values excluded from the summary.
    pub failed: usize,
}

impl FitnessStats {
    /// Computes the summary over an objective's values.
    ///
    /// Returns `None` if no finite value is present.
    #[must_use]
    pub fn new<I>(values: I) -> Option<Self>
    where
        I: IntoIterator<Item = f64>,
    {
        let mut failed = 0;
        let mut finite: Vec<f64> = values
            .into_iter()
            .filter(|v| {
                if v.is_finite() {
                    true
                } else {
                    failed += 1;
                    false
                }
            })
            .collect();
        if finite.is_empty() {
            return None;
        }
        finite.sort_by(f64::total_cmp);

        #[expect(clippy::cast_precision_loss)]
        let n = finite.len() as f64;
        let min = finite[0];
        let max = *finite.last().unwrap();
        let mean = finite.iter().sum::<f64>() / n;
        let median = finite[finite.len() / 2];
        let variance = finite.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;

        Some(Self {
            min,
            max,
            mean,
            median,
            std_dev: variance.sqrt(),
            failed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_of_known_values() {
        let stats = FitnessStats::new([5.0, 2.0, 4.0, 1.0, 3.0]).unwrap();
        assert_eq!(stats.min, 1.0);
        assert_eq!(stats.max, 5.0);
        assert_eq!(stats.mean, 3.0);
        assert_eq!(stats.median, 3.0);
        assert!((stats.std_dev - 2.0f64.sqrt()).abs() < 1e-12);
        assert_eq!(stats.failed, 0);
    }

    #[test]
    fn non_finite_values_are_counted_not_summarized() {
        let stats =
            FitnessStats::new([1.0, f64::INFINITY, 3.0, f64::NAN]).unwrap();
        assert_eq!(stats.min, 1.0);
        assert_eq!(stats.max, 3.0);
        assert_eq!(stats.mean, 2.0);
        assert_eq!(stats.failed, 2);
    }

    #[test]
    fn all_failed_yields_none() {
        assert!(FitnessStats::new([f64::INFINITY, f64::NAN]).is_none());
        assert!(FitnessStats::new([]).is_none());
    }
}
