use crate::error::{Result, VeriscopeError};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Minimum duration for frame-comparison analysis.
    pub min_duration_secs: f64,
    /// Proportional timestamps (fractions of total duration) to sample.
    pub sample_points: Vec<f64>,
    pub frame_width: u32,
    pub frame_height: u32,
    /// Per-channel delta above which two pixels count as mismatched.
    pub pixel_delta_threshold: u8,
    /// Mismatch percentage above which a pair is flagged as a possible splice.
    pub major_diff_pct: f64,
    /// Mismatch percentage above which a pair is flagged as noticeable.
    pub minor_diff_pct: f64,
    /// Noise floor for silence detection, in dB.
    pub silence_noise_db: i32,
    /// Minimum silence duration for an interval to count, in seconds.
    pub silence_min_secs: f64,
    /// More intervals than this is flagged as possible audio editing.
    pub max_silence_intervals: usize,
    pub penalties: PenaltyTable,
}

/// Flat point deductions per triggered condition.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct PenaltyTable {
    pub probe_failed: u32,
    pub duration_unresolved: u32,
    pub short_duration: u32,
    pub frame_extraction: u32,
    pub major_visual_diff: u32,
    pub minor_visual_diff: u32,
    pub excess_silence: u32,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            min_duration_secs: 3.0,
            sample_points: vec![0.1, 0.5, 0.9],
            frame_width: 640,
            frame_height: 360,
            pixel_delta_threshold: 25,
            major_diff_pct: 10.0,
            minor_diff_pct: 2.0,
            silence_noise_db: -30,
            silence_min_secs: 0.5,
            max_silence_intervals: 2,
            penalties: PenaltyTable::default(),
        }
    }
}

impl Default for PenaltyTable {
    fn default() -> Self {
        Self {
            probe_failed: 50,
            duration_unresolved: 50,
            short_duration: 10,
            frame_extraction: 20,
            major_visual_diff: 25,
            minor_visual_diff: 10,
            excess_silence: 15,
        }
    }
}

impl AnalysisConfig {
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: AnalysisConfig =
            toml::from_str(&content).map_err(|e| VeriscopeError::Config(e.to_string()))?;
        Ok(config)
    }
}
