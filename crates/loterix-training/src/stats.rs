use serde::Serialize;

/// Descriptive statistics over a generation's scores.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Statistics {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl Statistics {
    /// Computes min, max, mean, and standard deviation in two passes.
    /// Returns `None` for an empty dataset.
    #[must_use]
    pub fn compute(values: impl IntoIterator<Item = f64> + Clone) -> Option<Self> {
        let (min, max, sum, count) = values.clone().into_iter().fold(
            (f64::INFINITY, f64::NEG_INFINITY, 0.0, 0usize),
            |(min, max, sum, count), x| (f64::min(min, x), f64::max(max, x), sum + x, count + 1),
        );
        if count == 0 {
            return None;
        }
        #[expect(clippy::cast_precision_loss)]
        let mean = sum / count as f64;
        #[expect(clippy::cast_precision_loss)]
        let variance = values
            .into_iter()
            .map(|x| (x - mean).powi(2))
            .sum::<f64>()
            / count as f64;
        Some(Self {
            min,
            max,
            mean,
            std_dev: variance.sqrt(),
        })
    }
}
