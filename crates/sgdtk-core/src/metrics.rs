//! Evaluation metrics accumulated over one pass of a dataset.
//!
//! [`Metrics`] keeps running sums of the loss, the regularized cost and the
//! number of misclassified examples. Averages are read after the pass; the
//! accumulator must be cleared before it is reused for another dataset.

use serde::{Deserialize, Serialize};

/// Running loss, cost and error totals for one dataset pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    /// Sum of per-example losses.
    total_loss: f64,
    /// Sum of per-example losses plus the regularization penalty.
    total_cost: f64,
    /// Number of misclassified examples.
    errors: u64,
    /// Number of examples recorded.
    count: u64,
}

impl Metrics {
    /// Creates an empty accumulator.
    ///
    /// # Examples
    ///
    /// ```
    /// use sgdtk_core::Metrics;
    ///
    /// let mut metrics = Metrics::new();
    /// metrics.add(0.0, 0.5, false);
    /// metrics.add(2.0, 2.5, true);
    /// assert_eq!(metrics.loss(), 1.0);
    /// assert_eq!(metrics.cost(), 1.5);
    /// assert_eq!(metrics.error(), 0.5);
    /// ```
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one example.
    pub fn add(&mut self, loss: f64, cost: f64, misclassified: bool) {
        self.total_loss += loss;
        self.total_cost += cost;
        if misclassified {
            self.errors += 1;
        }
        self.count += 1;
    }

    /// Returns the number of examples recorded.
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Returns the number of misclassified examples.
    pub fn errors(&self) -> u64 {
        self.errors
    }

    /// Returns the mean loss, or 0.0 if nothing has been recorded.
    pub fn loss(&self) -> f64 {
        self.mean(self.total_loss)
    }

    /// Returns the mean regularized cost, or 0.0 if nothing has been recorded.
    pub fn cost(&self) -> f64 {
        self.mean(self.total_cost)
    }

    /// Returns the misclassification rate in `[0, 1]`.
    pub fn error(&self) -> f64 {
        self.mean(self.errors as f64)
    }

    fn mean(&self, total: f64) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            total / self.count as f64
        }
    }

    /// Resets the accumulator to its initial state.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_empty() {
        let metrics = Metrics::new();
        assert_eq!(metrics.count(), 0);
        assert_eq!(metrics.loss(), 0.0);
        assert_eq!(metrics.cost(), 0.0);
        assert_eq!(metrics.error(), 0.0);
    }

    #[test]
    fn test_metrics_add() {
        let mut metrics = Metrics::new();
        metrics.add(0.2, 0.3, false);
        metrics.add(0.4, 0.5, true);
        metrics.add(0.6, 0.7, true);
        metrics.add(0.0, 0.1, false);

        assert_eq!(metrics.count(), 4);
        assert_eq!(metrics.errors(), 2);
        assert!((metrics.loss() - 0.3).abs() < 1e-12);
        assert!((metrics.cost() - 0.4).abs() < 1e-12);
        assert!((metrics.error() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_metrics_clear() {
        let mut metrics = Metrics::new();
        metrics.add(1.0, 1.0, true);
        metrics.clear();
        assert_eq!(metrics, Metrics::default());
        assert_eq!(metrics.error(), 0.0);
    }

    #[test]
    fn test_metrics_serialization() {
        let mut metrics = Metrics::new();
        metrics.add(1.5, 2.0, true);
        let json = serde_json::to_string(&metrics).unwrap();
        let back: Metrics = serde_json::from_str(&json).unwrap();
        assert_eq!(back, metrics);
    }
}
