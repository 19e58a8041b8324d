//! Capture pipeline configuration.
//!
//! Detection thresholds and decision timing were tuned empirically
//! against real devices. They are surfaced here so deployments can
//! override them, but the defaults are the reference behavior and
//! changing them changes capture success rates.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Face geometry thresholds and analysis cadence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionConfig {
    /// Max horizontal face-center offset, as a fraction of frame width.
    pub max_center_offset_x: f64,
    /// Max vertical face-center offset, as a fraction of frame height.
    pub max_center_offset_y: f64,
    /// Minimum face coverage (min of width/height ratios) for a selfie.
    pub min_face_coverage: f64,
    /// Maximum face coverage for a selfie.
    pub max_face_coverage: f64,
    /// Maximum head yaw magnitude in degrees.
    pub max_yaw_degrees: f64,
    /// Maximum head roll magnitude in degrees.
    pub max_roll_degrees: f64,
    /// Minimum face-to-frame ratio for the ID-card portrait test.
    pub doc_face_min_ratio: f64,
    /// Maximum face-to-frame ratio for the ID-card portrait test.
    pub doc_face_max_ratio: f64,
    /// Detector minimum face size for the front camera.
    pub front_min_face_ratio: f64,
    /// Detector minimum face size for the back camera (documents hold
    /// much smaller faces).
    pub back_min_face_ratio: f64,
    /// Minimum interval between analyses in milliseconds (~4 Hz).
    pub analysis_interval_ms: u64,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            max_center_offset_x: 0.16,
            max_center_offset_y: 0.20,
            min_face_coverage: 0.20,
            max_face_coverage: 0.65,
            max_yaw_degrees: 22.0,
            max_roll_degrees: 22.0,
            doc_face_min_ratio: 0.04,
            doc_face_max_ratio: 0.45,
            front_min_face_ratio: 0.20,
            back_min_face_ratio: 0.05,
            analysis_interval_ms: 250,
        }
    }
}

impl DetectionConfig {
    /// Validates the configuration parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let ratios = [
            self.max_center_offset_x,
            self.max_center_offset_y,
            self.min_face_coverage,
            self.max_face_coverage,
            self.doc_face_min_ratio,
            self.doc_face_max_ratio,
            self.front_min_face_ratio,
            self.back_min_face_ratio,
        ];
        if ratios.iter().any(|r| !(0.0..=1.0).contains(r)) {
            return Err(ConfigError::InvalidRatio);
        }
        if self.min_face_coverage >= self.max_face_coverage
            || self.doc_face_min_ratio >= self.doc_face_max_ratio
        {
            return Err(ConfigError::InvalidRatio);
        }
        if self.analysis_interval_ms == 0 {
            return Err(ConfigError::InvalidInterval);
        }
        Ok(())
    }
}

/// Parameters for the pixel-edge document presence heuristic.
///
/// These constants are a cheap proxy for "a textured, non-blank,
/// non-overexposed object fills the frame", not real document
/// detection. Keep the defaults unless substituting a real detector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeuristicConfig {
    /// Left edge of the sampled region, fraction of frame width.
    pub region_left: f64,
    /// Right edge of the sampled region, fraction of frame width.
    pub region_right: f64,
    /// Top edge of the sampled region, fraction of frame height.
    pub region_top: f64,
    /// Bottom edge of the sampled region, fraction of frame height.
    pub region_bottom: f64,
    /// Horizontal sample count across the region.
    pub grid_cols: u32,
    /// Vertical sample count across the region.
    pub grid_rows: u32,
    /// Summed right+down luminance delta above which a sample counts
    /// as an edge (8-bit scale).
    pub edge_threshold: u32,
    /// Mean brightness must be strictly above this.
    pub min_brightness: f64,
    /// Mean brightness must be strictly below this.
    pub max_brightness: f64,
    /// Edge samples / total samples must exceed this.
    pub min_edge_ratio: f64,
}

impl Default for HeuristicConfig {
    fn default() -> Self {
        Self {
            region_left: 0.20,
            region_right: 0.80,
            region_top: 0.24,
            region_bottom: 0.76,
            grid_cols: 30,
            grid_rows: 20,
            edge_threshold: 34,
            min_brightness: 40.0,
            max_brightness: 220.0,
            min_edge_ratio: 0.18,
        }
    }
}

impl HeuristicConfig {
    /// Validates the configuration parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..1.0).contains(&self.region_left)
            || !(0.0..=1.0).contains(&self.region_right)
            || !(0.0..1.0).contains(&self.region_top)
            || !(0.0..=1.0).contains(&self.region_bottom)
            || self.region_left >= self.region_right
            || self.region_top >= self.region_bottom
        {
            return Err(ConfigError::InvalidRegion);
        }
        if self.grid_cols == 0 || self.grid_rows == 0 {
            return Err(ConfigError::InvalidGrid);
        }
        Ok(())
    }
}

/// Streak requirements and auto-capture timing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionConfig {
    /// Consecutive positive verdicts required for a selfie.
    pub selfie_streak: u32,
    /// Consecutive positive verdicts required for document targets.
    pub document_streak: u32,
    /// Delay between streak satisfaction and the actual snapshot, in
    /// milliseconds. Gives the subject a moment of genuine stillness
    /// and suppresses double-triggering on rapid-fire analyses.
    pub auto_capture_delay_ms: u64,
}

impl Default for DecisionConfig {
    fn default() -> Self {
        Self {
            selfie_streak: 3,
            document_streak: 2,
            auto_capture_delay_ms: 750,
        }
    }
}

impl DecisionConfig {
    /// Validates the configuration parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.selfie_streak == 0 || self.document_streak == 0 {
            return Err(ConfigError::InvalidStreak);
        }
        Ok(())
    }
}

/// Configuration validation errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    #[error("ratio parameters must lie in [0, 1] with min below max")]
    InvalidRatio,
    #[error("analysis interval must be non-zero")]
    InvalidInterval,
    #[error("heuristic region must be a non-empty sub-rectangle of the frame")]
    InvalidRegion,
    #[error("heuristic grid dimensions must be non-zero")]
    InvalidGrid,
    #[error("streak requirements must be at least 1")]
    InvalidStreak,
    #[error("failed to read config file: {0}")]
    FileReadError(String),
    #[error("failed to parse config file: {0}")]
    ParseError(String),
}

/// Full configuration file format.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FileConfig {
    #[serde(default)]
    pub detection: DetectionConfig,
    #[serde(default)]
    pub heuristic: HeuristicConfig,
    #[serde(default)]
    pub decision: DecisionConfig,
}

impl FileConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::FileReadError(e.to_string()))?;
        let config: FileConfig =
            toml::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates all sections.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.detection.validate()?;
        self.heuristic.validate()?;
        self.decision.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_valid() {
        assert!(FileConfig::default().validate().is_ok());
    }

    #[test]
    fn test_inverted_coverage_invalid() {
        let mut config = DetectionConfig::default();
        config.min_face_coverage = 0.7;
        assert!(matches!(config.validate(), Err(ConfigError::InvalidRatio)));
    }

    #[test]
    fn test_zero_streak_invalid() {
        let mut config = DecisionConfig::default();
        config.selfie_streak = 0;
        assert!(matches!(config.validate(), Err(ConfigError::InvalidStreak)));
    }

    #[test]
    fn test_empty_region_invalid() {
        let mut config = HeuristicConfig::default();
        config.region_right = 0.20;
        assert!(matches!(config.validate(), Err(ConfigError::InvalidRegion)));
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let parsed: FileConfig = toml::from_str(
            r#"
            [decision]
            selfie_streak = 4
            document_streak = 2
            auto_capture_delay_ms = 500
            "#,
        )
        .unwrap();

        assert_eq!(parsed.decision.selfie_streak, 4);
        assert_eq!(parsed.detection.front_min_face_ratio, 0.20);
        assert_eq!(parsed.heuristic.edge_threshold, 34);
    }
}
