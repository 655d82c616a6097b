//! Engine configuration.

use tracing::debug;

use crate::{Error, Result};

/// Default frame rate of the animation clock.
pub const DEFAULT_FRAME_RATE: u32 = 60;

/// Default surface sampling resolution `(nu, nv)`.
pub const DEFAULT_RESOLUTION: (usize, usize) = (101, 101);

/// Default finite-difference offset used for normal estimation.
pub const DEFAULT_EPSILON: f32 = 1e-4;

/// Engine-wide settings.
#[derive(Clone, Debug, PartialEq)]
pub struct EngineConfig {
    /// Frames per second of the fixed-step clock
    pub frame_rate: u32,
    /// Default `(nu, nv)` sampling resolution for new surfaces
    pub resolution: (usize, usize),
    /// Default finite-difference offset for new surfaces
    pub epsilon: f32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            frame_rate: DEFAULT_FRAME_RATE,
            resolution: DEFAULT_RESOLUTION,
            epsilon: DEFAULT_EPSILON,
        }
    }
}

impl EngineConfig {
    /// Create a configuration with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the frame rate.
    pub fn with_frame_rate(mut self, frame_rate: u32) -> Self {
        self.frame_rate = frame_rate;
        self
    }

    /// Set the default sampling resolution.
    pub fn with_resolution(mut self, nu: usize, nv: usize) -> Self {
        self.resolution = (nu, nv);
        self
    }

    /// Set the default finite-difference offset.
    pub fn with_epsilon(mut self, epsilon: f32) -> Self {
        self.epsilon = epsilon;
        self
    }

    /// Load defaults, then apply overrides from the environment.
    ///
    /// Recognized variables:
    /// - `PARAMSURF_FPS`: frame rate, e.g. `30`
    /// - `PARAMSURF_RESOLUTION`: `NUxNV`, e.g. `51x51`
    /// - `PARAMSURF_EPSILON`: finite-difference offset, e.g. `1e-4`
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`EngineConfig::from_env`], reading variables through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let lookup = |key: &str| {
            let value = lookup(key);
            if let Some(raw) = &value {
                debug!("{} = {:?}", key, raw);
            }
            value
        };
        let mut config = Self::default();

        if let Some(raw) = lookup("PARAMSURF_FPS") {
            config.frame_rate = raw
                .trim()
                .parse()
                .map_err(|_| Error::Config(format!("PARAMSURF_FPS is not an integer: {raw:?}")))?;
        }

        if let Some(raw) = lookup("PARAMSURF_RESOLUTION") {
            config.resolution = parse_resolution(&raw)?;
        }

        if let Some(raw) = lookup("PARAMSURF_EPSILON") {
            config.epsilon = raw
                .trim()
                .parse()
                .map_err(|_| Error::Config(format!("PARAMSURF_EPSILON is not a number: {raw:?}")))?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Check that every setting is usable.
    pub fn validate(&self) -> Result<()> {
        if self.frame_rate == 0 {
            return Err(Error::Config("frame rate must be positive".into()));
        }
        let (nu, nv) = self.resolution;
        if nu < 2 || nv < 2 {
            return Err(Error::Config(format!(
                "resolution must be at least 2x2, got {nu}x{nv}"
            )));
        }
        if !(self.epsilon.is_finite() && self.epsilon > 0.0) {
            return Err(Error::Config(format!(
                "epsilon must be a positive finite number, got {}",
                self.epsilon
            )));
        }
        Ok(())
    }
}

fn parse_resolution(raw: &str) -> Result<(usize, usize)> {
    let bad = || Error::Config(format!("PARAMSURF_RESOLUTION must look like 101x101, got {raw:?}"));
    let (nu, nv) = raw.trim().split_once(['x', 'X']).ok_or_else(bad)?;
    let nu = nu.trim().parse().map_err(|_| bad())?;
    let nv = nv.trim().parse().map_err(|_| bad())?;
    Ok((nu, nv))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_default_is_valid() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.frame_rate, 60);
        assert_eq!(config.resolution, (101, 101));
    }

    #[test]
    fn test_builder() {
        let config = EngineConfig::new()
            .with_frame_rate(24)
            .with_resolution(11, 21)
            .with_epsilon(1e-3);
        assert_eq!(config.frame_rate, 24);
        assert_eq!(config.resolution, (11, 21));
        assert_eq!(config.epsilon, 1e-3);
    }

    #[test]
    fn test_lookup_overrides() {
        let config = EngineConfig::from_lookup(lookup_from(&[
            ("PARAMSURF_FPS", "30"),
            ("PARAMSURF_RESOLUTION", "51x41"),
            ("PARAMSURF_EPSILON", "0.001"),
        ]))
        .expect("valid overrides");

        assert_eq!(config.frame_rate, 30);
        assert_eq!(config.resolution, (51, 41));
        assert!((config.epsilon - 0.001).abs() < 1e-9);
    }

    #[test]
    fn test_lookup_rejects_garbage() {
        let err = EngineConfig::from_lookup(lookup_from(&[("PARAMSURF_RESOLUTION", "big")]));
        assert!(matches!(err, Err(Error::Config(_))));

        let err = EngineConfig::from_lookup(lookup_from(&[("PARAMSURF_FPS", "0")]));
        assert!(matches!(err, Err(Error::Config(_))));
    }

    #[test]
    fn test_validate_small_resolution() {
        let config = EngineConfig::new().with_resolution(1, 5);
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }
}
