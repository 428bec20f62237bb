//! Configuration for the Draft Valuation Engine
//!
//! Every policy constant of the pipeline (replacement thresholds, fallback
//! window, calibration target, leaderboard sample floor, curve parameters)
//! lives here instead of inline at call sites.

use crate::error::{Result, ValuationError};
use crate::types::Position;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration for the valuation engine
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ValuationConfig {
    /// Replacement-level roster thresholds
    pub replacement: ReplacementThresholds,
    /// Expected-value table lookup
    pub expected: ExpectedValueConfig,
    /// Residual calibration
    pub calibration: CalibrationConfig,
    /// Leaderboards and summaries
    pub ranking: RankingConfig,
    /// Parametric decay curves
    pub curve: CurveConfig,
    /// Record store location
    pub store: StoreConfig,
    /// Logging
    pub logging: LoggingConfig,
}

/// League-wide roster-slot count per position.
///
/// The player ranked at this depth in a season marks replacement level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplacementThresholds {
    pub qb: usize,
    pub rb: usize,
    pub wr: usize,
    pub te: usize,
    pub k: usize,
    pub dst: usize,
}

impl Default for ReplacementThresholds {
    fn default() -> Self {
        Self { qb: 12, rb: 36, wr: 36, te: 12, k: 12, dst: 12 }
    }
}

impl ReplacementThresholds {
    /// Same threshold for every position
    pub fn uniform(threshold: usize) -> Self {
        Self {
            qb: threshold,
            rb: threshold,
            wr: threshold,
            te: threshold,
            k: threshold,
            dst: threshold,
        }
    }

    pub fn for_position(&self, position: Position) -> usize {
        match position {
            Position::QB => self.qb,
            Position::RB => self.rb,
            Position::WR => self.wr,
            Position::TE => self.te,
            Position::K => self.k,
            Position::DST => self.dst,
        }
    }
}

/// Expected-value table configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExpectedValueConfig {
    /// Half-width (in overall picks) of the neighbor window used when a
    /// (position, pick) cell has no observations
    pub window: u32,
    /// Replacement levels backed by fewer season samples mark their picks
    /// as low confidence
    pub min_replacement_seasons: usize,
    /// Exact cells with fewer observations mark their picks as low
    /// confidence
    pub min_cell_samples: usize,
}

impl Default for ExpectedValueConfig {
    fn default() -> Self {
        Self { window: 5, min_replacement_seasons: 1, min_cell_samples: 2 }
    }
}

/// Calibration configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibrationConfig {
    /// Mean absolute residual value after calibration
    pub target_avg_abs: f64,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self { target_avg_abs: 25.0 }
    }
}

/// Ranking configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RankingConfig {
    /// Owners with fewer picks are left off owner leaderboards
    pub min_picks: usize,
    /// Teams (one owner's roster in one season) with fewer picks are left off
    /// team leaderboards
    pub team_min_picks: usize,
    /// Limit used by callers that do not pass one
    pub default_limit: usize,
    /// Position averages are reported as `band_center + mean value`,
    /// clamped to `[band_min, band_max]`
    pub band_center: f64,
    pub band_min: f64,
    pub band_max: f64,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            min_picks: 128,
            team_min_picks: 1,
            default_limit: 10,
            band_center: 50.0,
            band_min: 0.0,
            band_max: 100.0,
        }
    }
}

/// Parametric curve configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CurveConfig {
    /// Peak of the single global curve
    pub global_base: f64,
    /// Per-pick decay of the single global curve
    pub global_decay: f64,
    /// Overall pick whose curve value is fit to the tail bucket average
    pub tail_pick: u32,
    /// Picks a bucket needs before it can mark a position's typical start
    pub typical_start_min_picks: usize,
}

impl Default for CurveConfig {
    fn default() -> Self {
        Self { global_base: 180.0, global_decay: 0.012, tail_pick: 150, typical_start_min_picks: 5 }
    }
}

/// Record store configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Directory holding the JSON record files
    pub data_dir: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self { data_dir: PathBuf::from("./data") }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Log format (json, pretty, compact)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_string(), format: "pretty".to_string() }
    }
}

impl ValuationConfig {
    /// Load configuration from a TOML file
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: ValuationConfig = toml::from_str(&content)?;
        config.validate().map_err(ValuationError::config)?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| ValuationError::config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Default configuration with environment overrides applied
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Apply `DRAFT_VALUATION_*` environment variables on top of this config
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(dir) = std::env::var("DRAFT_VALUATION_DATA_DIR") {
            self.store.data_dir = PathBuf::from(dir);
        }

        if let Ok(window) = std::env::var("DRAFT_VALUATION_WINDOW") {
            self.expected.window = window
                .parse()
                .map_err(|_| ValuationError::config(format!("invalid window: {window}")))?;
        }

        if let Ok(target) = std::env::var("DRAFT_VALUATION_TARGET_AVG_ABS") {
            self.calibration.target_avg_abs = target.parse().map_err(|_| {
                ValuationError::config(format!("invalid calibration target: {target}"))
            })?;
        }

        if let Ok(min_picks) = std::env::var("DRAFT_VALUATION_MIN_PICKS") {
            self.ranking.min_picks = min_picks
                .parse()
                .map_err(|_| ValuationError::config(format!("invalid min picks: {min_picks}")))?;
        }

        if let Ok(level) = std::env::var("DRAFT_VALUATION_LOG_LEVEL") {
            self.logging.level = level;
        }

        self.validate().map_err(ValuationError::config)
    }

    /// Validate configuration
    pub fn validate(&self) -> std::result::Result<(), String> {
        for position in Position::ALL {
            if self.replacement.for_position(position) == 0 {
                return Err(format!("replacement threshold for {position} must be greater than 0"));
            }
        }

        let target = self.calibration.target_avg_abs;
        if !target.is_finite() || target <= 0.0 {
            return Err("calibration target_avg_abs must be a positive number".to_string());
        }

        if !self.curve.global_base.is_finite() || !self.curve.global_decay.is_finite() {
            return Err("curve parameters must be finite".to_string());
        }

        if self.curve.tail_pick == 0 {
            return Err("curve tail_pick must be greater than 0".to_string());
        }

        let band = &self.ranking;
        if !(band.band_min <= band.band_center && band.band_center <= band.band_max) {
            return Err("ranking band must satisfy band_min <= band_center <= band_max".to_string());
        }

        Ok(())
    }
}
