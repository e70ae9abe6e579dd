//! Metadata probe: a pass-through decode of the whole file, run only to make
//! the engine emit its duration and stream headers.

use crate::config::AnalysisConfig;
use crate::engine::DecodeEngine;
use crate::logparse::LogState;
use crate::report::{Scorecard, Severity};
use std::path::Path;
use tracing::{info, warn};

/// What the later stages branch on.
#[derive(Debug, Clone, Copy)]
pub struct ProbeOutcome {
    pub duration_secs: f64,
    pub sample_frames: bool,
}

pub async fn run<E: DecodeEngine>(
    engine: &mut E,
    input: &Path,
    log: &mut LogState,
    card: &mut Scorecard,
    config: &AnalysisConfig,
) -> ProbeOutcome {
    let args = vec![
        "-i".to_string(),
        input.display().to_string(),
        "-f".to_string(),
        "null".to_string(),
        "-".to_string(),
    ];

    let probe_ok = match engine.run(&args).await {
        Ok(output) => {
            log.feed(&output.lines);
            output.success
        }
        Err(e) => {
            warn!("Metadata probe did not run: {}", e);
            false
        }
    };

    if !probe_ok {
        card.charge(
            config.penalties.probe_failed,
            Severity::High,
            "N/A",
            "Failed to process video metadata. The file may be corrupted.",
        );
    }

    let duration_secs = log.duration_secs();
    if duration_secs == 0.0 {
        // A failed probe already covers an unresolved duration; charging both
        // would double-penalize the same signal.
        if probe_ok {
            card.charge(
                config.penalties.duration_unresolved,
                Severity::High,
                "N/A",
                "Could not determine video duration. The file may be corrupted or have missing metadata.",
            );
        }
    } else if duration_secs < config.min_duration_secs {
        card.charge(
            config.penalties.short_duration,
            Severity::Low,
            "N/A",
            "Video is too short for a full frame-comparison analysis.",
        );
    } else {
        info!("Measured duration: {:.2}s", duration_secs);
        card.note(
            Severity::Low,
            "00:00:00",
            format!("Video duration confirmed: {:.2} seconds.", duration_secs),
        );
    }

    ProbeOutcome {
        duration_secs,
        sample_frames: duration_secs >= config.min_duration_secs,
    }
}
