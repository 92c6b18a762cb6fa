//! Sparse feature vectors.
//!
//! A [`FeatureVector`] holds one example: the non-zero `(index, value)` pairs
//! of its features, kept in load order, and its label. Vectors are validated
//! once at construction and are immutable afterwards.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SgdError};

/// One sparse training or evaluation example.
///
/// Indices and values are stored as parallel arrays in the order they were
/// supplied. The vector does not know the width of the model it will be
/// scored against; that check happens in [`LinearModel::score`].
///
/// [`LinearModel::score`]: crate::model::LinearModel::score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawFeatureVector")]
pub struct FeatureVector {
    /// The target value (±1 for classification, real-valued for regression).
    label: f64,

    /// Feature indices, unique within the vector.
    indices: Vec<usize>,

    /// Feature values (same length as indices).
    values: Vec<f64>,
}

/// Unvalidated wire form; deserialization goes through [`FeatureVector::new`].
#[derive(Deserialize)]
struct RawFeatureVector {
    label: f64,
    indices: Vec<usize>,
    values: Vec<f64>,
}

impl TryFrom<RawFeatureVector> for FeatureVector {
    type Error = SgdError;

    fn try_from(raw: RawFeatureVector) -> Result<Self> {
        Self::new(raw.label, raw.indices, raw.values)
    }
}

impl FeatureVector {
    /// Creates a feature vector from parallel index and value arrays.
    ///
    /// # Errors
    ///
    /// Returns [`SgdError::InvalidFeature`] if the arrays have different
    /// lengths or an index appears more than once.
    ///
    /// # Examples
    ///
    /// ```
    /// use sgdtk_core::FeatureVector;
    ///
    /// let fv = FeatureVector::new(1.0, vec![0, 4], vec![0.5, 2.0]).unwrap();
    /// assert_eq!(fv.length(), 2);
    /// assert_eq!(fv.label(), 1.0);
    /// ```
    pub fn new(label: f64, indices: Vec<usize>, values: Vec<f64>) -> Result<Self> {
        if indices.len() != values.len() {
            return Err(SgdError::InvalidFeature {
                message: format!(
                    "{} indices but {} values",
                    indices.len(),
                    values.len()
                ),
            });
        }

        let mut seen = HashSet::with_capacity(indices.len());
        for &index in &indices {
            if !seen.insert(index) {
                return Err(SgdError::InvalidFeature {
                    message: format!("duplicate index {}", index),
                });
            }
        }

        Ok(Self {
            label,
            indices,
            values,
        })
    }

    /// Creates a feature vector from `(index, value)` pairs.
    pub fn from_pairs<I>(label: f64, pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (usize, f64)>,
    {
        let (indices, values) = pairs.into_iter().unzip();
        Self::new(label, indices, values)
    }

    /// Returns the number of non-zero entries (not the model width).
    #[inline]
    pub fn length(&self) -> usize {
        self.indices.len()
    }

    /// Returns true if the vector has no features.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Returns the target value.
    #[inline]
    pub fn label(&self) -> f64 {
        self.label
    }

    /// Returns the feature indices in load order.
    #[inline]
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    /// Returns the feature values in load order.
    #[inline]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Iterates over `(index, value)` pairs in load order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.indices.iter().copied().zip(self.values.iter().copied())
    }

    /// Returns the largest feature index, or `None` for an empty vector.
    pub fn max_index(&self) -> Option<usize> {
        self.indices.iter().copied().max()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_vector_new() {
        let fv = FeatureVector::new(-1.0, vec![3, 1, 7], vec![1.0, 2.0, 3.0]).unwrap();
        assert_eq!(fv.length(), 3);
        assert_eq!(fv.label(), -1.0);
        assert_eq!(fv.max_index(), Some(7));
        assert!(!fv.is_empty());
    }

    #[test]
    fn test_feature_vector_preserves_order() {
        let fv = FeatureVector::from_pairs(1.0, [(9, 0.1), (2, 0.2), (5, 0.3)]).unwrap();
        let pairs: Vec<_> = fv.iter().collect();
        assert_eq!(pairs, vec![(9, 0.1), (2, 0.2), (5, 0.3)]);
    }

    #[test]
    fn test_feature_vector_duplicate_index() {
        let err = FeatureVector::new(1.0, vec![2, 2], vec![1.0, 1.0])
            .expect_err("duplicate indices should be rejected");
        assert!(matches!(err, SgdError::InvalidFeature { .. }));
    }

    #[test]
    fn test_feature_vector_length_mismatch() {
        let result = FeatureVector::new(1.0, vec![0, 1], vec![1.0]);
        assert!(matches!(result, Err(SgdError::InvalidFeature { .. })));
    }

    #[test]
    fn test_feature_vector_empty() {
        let fv = FeatureVector::from_pairs(1.0, std::iter::empty()).unwrap();
        assert!(fv.is_empty());
        assert_eq!(fv.max_index(), None);
    }

    #[test]
    fn test_deserialize_validates() {
        let fv: FeatureVector =
            serde_json::from_str(r#"{"label": 1.0, "indices": [0, 4], "values": [0.5, 2.0]}"#)
                .unwrap();
        assert_eq!(fv.iter().collect::<Vec<_>>(), vec![(0, 0.5), (4, 2.0)]);

        let json = serde_json::to_string(&fv).unwrap();
        assert_eq!(serde_json::from_str::<FeatureVector>(&json).unwrap(), fv);

        let dup = r#"{"label": 1.0, "indices": [2, 2], "values": [1.0, 1.0]}"#;
        let err = serde_json::from_str::<FeatureVector>(dup).unwrap_err();
        assert!(err.to_string().contains("duplicate index 2"));

        let short = r#"{"label": 1.0, "indices": [0, 1], "values": [1.0]}"#;
        assert!(serde_json::from_str::<FeatureVector>(short).is_err());
    }
}
