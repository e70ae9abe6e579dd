//! Audio silence analysis. Best-effort: a failed silencedetect pass is
//! logged and swallowed, never penalized.

use crate::config::AnalysisConfig;
use crate::engine::DecodeEngine;
use crate::logparse::LogState;
use crate::report::{Scorecard, Severity};
use std::path::Path;
use tracing::debug;

pub async fn run<E: DecodeEngine>(
    engine: &mut E,
    input: &Path,
    log: &mut LogState,
    card: &mut Scorecard,
    config: &AnalysisConfig,
) {
    if !log.has_audio() {
        card.note(
            Severity::Low,
            "N/A",
            "No audio track detected; audio-based checks were skipped.",
        );
        return;
    }

    let filter = format!(
        "silencedetect=noise={}dB:d={}",
        config.silence_noise_db, config.silence_min_secs
    );
    let args = vec![
        "-i".to_string(),
        input.display().to_string(),
        "-af".to_string(),
        filter,
        "-f".to_string(),
        "null".to_string(),
        "-".to_string(),
    ];

    match engine.run(&args).await {
        Ok(output) => {
            log.feed(&output.lines);
            if !output.success {
                debug!("Silence detection pass failed; skipping audio heuristics");
                return;
            }
        }
        Err(e) => {
            debug!("Silence detection pass did not run: {}", e);
            return;
        }
    }

    let intervals = log.silence_intervals();
    if intervals.len() > config.max_silence_intervals {
        if let (Some(first), Some(last)) = (intervals.first(), intervals.last()) {
            card.charge(
                config.penalties.excess_silence,
                Severity::Medium,
                format!("{:.2}s - {:.2}s", first.start_secs, last.end_secs),
                format!(
                    "{} separate periods of silence detected, possible audio editing.",
                    intervals.len()
                ),
            );
        }
    }
}
