use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{GameError, Result};
use crate::sdf::SdfParams;

/// Tunables for a simulation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Fixed simulation rate; one tick lasts `1 / updates_per_second` seconds.
    pub updates_per_second: f64,
    /// Pixel size of one world unit, used by the rendering transform.
    pub tile_size: [u32; 2],
    pub sdf: SdfParams,
    /// Gravity handed to the rigid-body backend.
    pub gravity: [f32; 2],
    /// Solver iteration counts for the rigid-body backend step.
    pub velocity_iterations: usize,
    pub position_iterations: usize,
    /// Seed for the random source shared with capability hooks.
    pub seed: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            updates_per_second: 60.0,
            tile_size: [32, 32],
            sdf: SdfParams::default(),
            gravity: [0.0, 9.81],
            velocity_iterations: 1,
            position_iterations: 1,
            seed: 0x5eed,
        }
    }
}

impl SimulationConfig {
    /// Parses a JSON document; missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.updates_per_second.is_finite() && self.updates_per_second > 0.0) {
            return Err(GameError::InvalidConfig(format!(
                "updates_per_second must be positive, got {}",
                self.updates_per_second
            )));
        }
        if self.tile_size.contains(&0) {
            return Err(GameError::InvalidConfig("tile_size must be non-zero".into()));
        }
        if !(self.sdf.epsilon > 0.0) {
            return Err(GameError::InvalidConfig(format!(
                "sdf.epsilon must be positive, got {}",
                self.sdf.epsilon
            )));
        }
        if self.sdf.max_steps == 0 {
            return Err(GameError::InvalidConfig("sdf.max_steps must be at least 1".into()));
        }
        if self.velocity_iterations == 0 || self.position_iterations == 0 {
            return Err(GameError::InvalidConfig("solver iterations must be at least 1".into()));
        }
        Ok(())
    }

    /// Duration of one fixed tick.
    pub fn fixed_delta(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.updates_per_second)
    }

    #[must_use]
    pub fn with_updates_per_second(mut self, rate: f64) -> Self {
        self.updates_per_second = rate;
        self
    }

    #[must_use]
    pub fn with_tile_size(mut self, width: u32, height: u32) -> Self {
        self.tile_size = [width, height];
        self
    }

    #[must_use]
    pub fn with_sdf(mut self, sdf: SdfParams) -> Self {
        self.sdf = sdf;
        self
    }

    #[must_use]
    pub fn with_gravity(mut self, x: f32, y: f32) -> Self {
        self.gravity = [x, y];
        self
    }

    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = SimulationConfig::from_json_str(r#"{ "updates_per_second": 30.0, "sdf": { "max_steps": 16 } }"#)
            .unwrap();
        assert_eq!(config.updates_per_second, 30.0);
        assert_eq!(config.sdf.max_steps, 16);
        assert_eq!(config.sdf.epsilon, crate::sdf::DEFAULT_EPSILON);
        assert_eq!(config.tile_size, [32, 32]);
    }

    #[test]
    fn test_rejects_zero_rate() {
        let err = SimulationConfig::from_json_str(r#"{ "updates_per_second": 0.0 }"#).unwrap_err();
        assert!(matches!(err, GameError::InvalidConfig(_)));
    }

    #[test]
    fn test_rejects_malformed_json() {
        let err = SimulationConfig::from_json_str("{ updates_per_second: }").unwrap_err();
        assert!(matches!(err, GameError::Json(_)));
    }

    #[test]
    fn test_round_trips_through_json() {
        let config = SimulationConfig::default().with_seed(7).with_tile_size(16, 16);
        let json = config.to_json_string().unwrap();
        assert_eq!(SimulationConfig::from_json_str(&json).unwrap(), config);
    }

    #[test]
    fn test_fixed_delta_matches_rate() {
        let step = SimulationConfig::default().fixed_delta();
        assert!((step.as_secs_f64() - 1.0 / 60.0).abs() < 1e-9);
    }
}
