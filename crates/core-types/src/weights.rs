use crate::error::CoreError;
use crate::prices::PriceMatrix;
use serde::Serialize;
use std::collections::BTreeMap;

/// Weights are expressed in percentage points and must add up to this value.
pub const WEIGHT_SUM_TARGET: f64 = 100.0;

/// Accepted deviation of the weight sum from `WEIGHT_SUM_TARGET`, inclusive.
pub const WEIGHT_SUM_TOLERANCE: f64 = 0.1;

// Absorbs representation error so that e.g. 60.0 + 39.9 still counts as 99.9.
const FLOAT_SLACK: f64 = 1e-9;

/// Portfolio allocation, asset identifier to weight in percentage points.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct WeightVector {
    weights: BTreeMap<String, f64>,
}

impl WeightVector {
    /// Validates and builds a weight vector.
    ///
    /// Every weight must be finite and non-negative and the sum must lie within
    /// `[99.9, 100.1]`.
    pub fn new<I, S>(weights: I) -> Result<Self, CoreError>
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        let mut map = BTreeMap::new();
        for (asset, weight) in weights {
            let asset = asset.into();
            if map.insert(asset.clone(), weight).is_some() {
                return Err(CoreError::DuplicateAsset(asset));
            }
        }
        let vector = Self { weights: map };
        vector.validate()?;
        Ok(vector)
    }

    /// Re-checks the weight invariants.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.weights.is_empty() {
            return Err(CoreError::InvalidWeights(
                "at least one weight is required".to_string(),
            ));
        }
        for (asset, weight) in &self.weights {
            if !weight.is_finite() {
                return Err(CoreError::InvalidWeights(format!(
                    "weight for '{asset}' is not a number"
                )));
            }
            if *weight < 0.0 {
                return Err(CoreError::InvalidWeights(format!(
                    "weight for '{asset}' is negative ({weight})"
                )));
            }
        }

        let total = self.total();
        if (total - WEIGHT_SUM_TARGET).abs() > WEIGHT_SUM_TOLERANCE + FLOAT_SLACK {
            return Err(CoreError::InvalidWeights(format!(
                "weights sum to {total}, expected {WEIGHT_SUM_TARGET} ± {WEIGHT_SUM_TOLERANCE}"
            )));
        }
        Ok(())
    }

    /// Rejects weights naming assets the price matrix does not carry.
    pub fn check_assets(&self, prices: &PriceMatrix) -> Result<(), CoreError> {
        match self
            .weights
            .keys()
            .find(|asset| prices.column(asset).is_none())
        {
            Some(asset) => Err(CoreError::UnknownAsset(asset.clone())),
            None => Ok(()),
        }
    }

    /// Weight in percentage points, zero for assets without an allocation.
    pub fn get(&self, asset: &str) -> f64 {
        self.weights.get(asset).copied().unwrap_or(0.0)
    }

    /// Weight as a fraction of one.
    pub fn fraction(&self, asset: &str) -> f64 {
        self.get(asset) / WEIGHT_SUM_TARGET
    }

    pub fn total(&self) -> f64 {
        self.weights.values().sum()
    }
}
