use serde::{Deserialize, Serialize};

pub const DEFAULT_RAREST_LIMIT: usize = 50;
pub const DEFAULT_PRECISION: u32 = 3;
/// f64 carries about 15 significant decimal digits.
pub const MAX_PRECISION: u32 = 15;

/// Knobs for the statistics pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatisticsConfig {
    /// Maximum number of words returned by a statistics request.
    pub rarest_limit: usize,
    /// Decimal places kept on every returned float.
    pub precision: u32,
}

impl Default for StatisticsConfig {
    fn default() -> Self {
        Self { rarest_limit: DEFAULT_RAREST_LIMIT, precision: DEFAULT_PRECISION }
    }
}

impl StatisticsConfig {
    pub fn from_json(s: &str) -> crate::Result<Self> {
        let mut cfg: Self = serde_json::from_str(s)?;
        cfg.precision = cfg.precision.min(MAX_PRECISION);
        Ok(cfg)
    }
}

/// Round half away from zero to `places` decimals, at most [`MAX_PRECISION`].
pub fn round_to(value: f64, places: u32) -> f64 {
    if !value.is_finite() {
        return value;
    }
    let scale = 10f64.powi(places.min(MAX_PRECISION) as i32);
    (value * scale).round() / scale
}

pub fn round3(value: f64) -> f64 { round_to(value, 3) }

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounds_to_three_places() {
        assert_eq!(round3(1.6170000001), 1.617);
        assert_eq!(round3(0.6931471805599453), 0.693);
    }

    #[test]
    fn oversized_precision_is_clamped() {
        assert_eq!(round_to(0.5, 400), 0.5);
        assert_eq!(round_to(0.125, u32::MAX), 0.125);
        let cfg = StatisticsConfig::from_json(r#"{"precision": 400}"#).unwrap();
        assert_eq!(cfg.precision, MAX_PRECISION);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg = StatisticsConfig::from_json(r#"{"rarest_limit": 10}"#).unwrap();
        assert_eq!(cfg.rarest_limit, 10);
        assert_eq!(cfg.precision, DEFAULT_PRECISION);
    }
}
