//! Tunables for the ordering engine.

use crate::error::{BoardError, Result};
use serde::{Deserialize, Serialize};

/// Largest integer an `f64` represents exactly (2^53)
pub(crate) const MAX_EXACT_KEY: f64 = 9_007_199_254_740_992.0;

/// Parameters for fractional position keys
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrderingConfig {
    /// Smallest gap between neighbors that still admits a new key
    pub epsilon: f64,
    /// Key given to the first item of an empty collection
    pub seed: f64,
    /// Offset used when inserting before the first or after the last item
    pub step: f64,
    /// Distance between keys after a full renumbering pass
    pub renumber_spacing: f64,
}

impl Default for OrderingConfig {
    fn default() -> Self {
        Self {
            epsilon: 1e-9,
            seed: 1.0,
            step: 1.0,
            renumber_spacing: 1000.0,
        }
    }
}

impl OrderingConfig {
    /// Parses a config from JSON, filling omitted fields with defaults
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects values that would make key generation meaningless
    pub fn validate(&self) -> Result<()> {
        let positive = |name: &str, value: f64| {
            if value.is_finite() && value > 0.0 {
                Ok(())
            } else {
                Err(BoardError::ConfigError(format!(
                    "{} must be a positive finite number, got {}",
                    name, value
                )))
            }
        };

        positive("epsilon", self.epsilon)?;
        positive("step", self.step)?;
        positive("renumber_spacing", self.renumber_spacing)?;

        if !self.seed.is_finite() {
            return Err(BoardError::ConfigError(format!(
                "seed must be finite, got {}",
                self.seed
            )));
        }
        if self.renumber_spacing <= self.epsilon {
            return Err(BoardError::ConfigError(
                "renumber_spacing must exceed epsilon".to_string(),
            ));
        }
        if self.renumber_spacing > MAX_EXACT_KEY {
            return Err(BoardError::ConfigError(
                "renumber_spacing exceeds the exact integer range of f64".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(OrderingConfig::default().validate().is_ok());
    }

    #[test]
    fn test_from_json_partial() {
        let config = OrderingConfig::from_json(r#"{"renumber_spacing": 64.0}"#).unwrap();
        assert_eq!(config.renumber_spacing, 64.0);
        assert_eq!(config.epsilon, 1e-9);
        assert_eq!(config.seed, 1.0);
    }

    #[test]
    fn test_from_json_rejects_non_positive_epsilon() {
        let err = OrderingConfig::from_json(r#"{"epsilon": 0.0}"#).unwrap_err();
        assert!(matches!(err, BoardError::ConfigError(_)));
    }

    #[test]
    fn test_spacing_must_exceed_epsilon() {
        let config = OrderingConfig {
            epsilon: 10.0,
            renumber_spacing: 5.0,
            ..OrderingConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_malformed_json() {
        let err = OrderingConfig::from_json("{not json").unwrap_err();
        assert!(matches!(err, BoardError::SerializationError(_)));
    }
}
