//! Frame sampling and pairwise visual difference.
//!
//! Frames are extracted at proportional timestamps, decoded to RGBA buffers,
//! and adjacent pairs are compared with a perceptual per-pixel threshold so
//! compression noise does not count as a mismatch.

use crate::config::AnalysisConfig;
use crate::engine::DecodeEngine;
use crate::logparse::LogState;
use crate::progress::ProgressTracker;
use crate::report::{Scorecard, Severity};
use image::RgbaImage;
use std::path::Path;
use tracing::{debug, warn};

/// A sampled frame, kept only for the lifetime of one analysis.
pub struct FrameSample {
    pub timestamp_secs: f64,
    pub bytes: Vec<u8>,
}

fn artifact_name(index: usize) -> String {
    format!("frame{}.jpg", index + 1)
}

/// Extract one still frame per sample point, in file order. A failed
/// extraction is penalized and leaves a hole; the loop never aborts.
pub async fn sample<E: DecodeEngine>(
    engine: &mut E,
    input: &Path,
    duration_secs: f64,
    log: &mut LogState,
    card: &mut Scorecard,
    progress: &mut ProgressTracker<'_>,
    config: &AnalysisConfig,
) -> Vec<Option<FrameSample>> {
    let timestamps: Vec<f64> = config
        .sample_points
        .iter()
        .map(|p| duration_secs * p)
        .collect();

    let mut samples = Vec::with_capacity(timestamps.len());
    for (i, ts) in timestamps.iter().enumerate() {
        // advance proportionally within the 30..75 range reserved for sampling
        let percent = 30 + (45 * i / timestamps.len().max(1)) as u8;
        progress.report(
            &format!("Extracting frame {}/{}...", i + 1, timestamps.len()),
            percent,
        );

        let name = artifact_name(i);
        let args = vec![
            "-ss".to_string(),
            format!("{:.3}", ts),
            "-i".to_string(),
            input.display().to_string(),
            "-frames:v".to_string(),
            "1".to_string(),
            "-s".to_string(),
            format!("{}x{}", config.frame_width, config.frame_height),
            "-q:v".to_string(),
            "2".to_string(),
            engine.artifact_path(&name).display().to_string(),
        ];

        let mut pass_ok = false;
        match engine.run(&args).await {
            Ok(output) => {
                log.feed(&output.lines);
                pass_ok = output.success;
            }
            Err(e) => warn!("Frame extraction pass did not run: {}", e),
        }

        let bytes = if pass_ok {
            engine.read_artifact(&name).await.ok()
        } else {
            None
        };

        match bytes {
            Some(bytes) => samples.push(Some(FrameSample {
                timestamp_secs: *ts,
                bytes,
            })),
            None => {
                card.charge(
                    config.penalties.frame_extraction,
                    Severity::High,
                    format!("{:.3}s", ts),
                    format!(
                        "Failed to extract frame {}. The video stream may be incomplete.",
                        i + 1
                    ),
                );
                samples.push(None);
            }
        }
    }

    samples
}

/// Compare each adjacent pair of successfully extracted frames. A hole in the
/// pair skips that comparison; the sampler already charged for it.
pub fn compare(samples: &[Option<FrameSample>], card: &mut Scorecard, config: &AnalysisConfig) {
    let decoded: Vec<Option<(f64, RgbaImage)>> = samples
        .iter()
        .map(|sample| {
            sample.as_ref().and_then(|frame| {
                match image::load_from_memory(&frame.bytes) {
                    Ok(img) => Some((frame.timestamp_secs, img.to_rgba8())),
                    Err(e) => {
                        warn!("Failed to decode frame at {:.3}s: {}", frame.timestamp_secs, e);
                        None
                    }
                }
            })
        })
        .collect();

    for pair in decoded.windows(2) {
        let (Some((ts_a, a)), Some((ts_b, b))) = (&pair[0], &pair[1]) else {
            continue;
        };
        if a.dimensions() != b.dimensions() {
            warn!("Frame dimensions differ, skipping comparison");
            continue;
        }

        let mismatched = mismatched_pixels(a, b, config.pixel_delta_threshold);
        let total = (a.width() as u64) * (a.height() as u64);
        let pct = mismatched as f64 / total as f64 * 100.0;
        debug!("Frame pair {:.3}s/{:.3}s mismatch: {:.2}%", ts_a, ts_b, pct);

        let span = format!("{:.3}s - {:.3}s", ts_a, ts_b);
        if pct > config.major_diff_pct {
            card.charge(
                config.penalties.major_visual_diff,
                Severity::Medium,
                span,
                format!(
                    "High visual difference ({:.2}%) between distant frames, suggesting a major scene change or potential splice.",
                    pct
                ),
            );
        } else if pct > config.minor_diff_pct {
            card.charge(
                config.penalties.minor_visual_diff,
                Severity::Low,
                span,
                format!("Noticeable visual difference ({:.2}%) between distant frames.", pct),
            );
        }
    }
}

/// Delete frame artifacts. Failures are logged and swallowed.
pub async fn cleanup<E: DecodeEngine>(engine: &mut E, count: usize) {
    for i in 0..count {
        let name = artifact_name(i);
        if let Err(e) = engine.remove_artifact(&name).await {
            warn!("Failed to delete {}: {}", name, e);
        }
    }
}

fn mismatched_pixels(a: &RgbaImage, b: &RgbaImage, threshold: u8) -> u64 {
    a.pixels()
        .zip(b.pixels())
        .filter(|(pa, pb)| {
            pa.0.iter()
                .zip(pb.0.iter())
                .take(3)
                .any(|(ca, cb)| ca.abs_diff(*cb) > threshold)
        })
        .count() as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;
    use std::io::Cursor;

    fn solid(width: u32, height: u32, px: [u8; 4]) -> RgbaImage {
        RgbaImage::from_pixel(width, height, Rgba(px))
    }

    fn png_bytes(img: &RgbaImage) -> Vec<u8> {
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, image::ImageFormat::Png).unwrap();
        buf.into_inner()
    }

    /// Black frame with the first `differing` pixels flipped to white.
    fn frame_with_diff(width: u32, height: u32, differing: u32) -> RgbaImage {
        let mut img = solid(width, height, [0, 0, 0, 255]);
        for (i, pixel) in img.pixels_mut().enumerate() {
            if (i as u32) < differing {
                *pixel = Rgba([255, 255, 255, 255]);
            }
        }
        img
    }

    fn sample_at(ts: f64, img: &RgbaImage) -> Option<FrameSample> {
        Some(FrameSample {
            timestamp_secs: ts,
            bytes: png_bytes(img),
        })
    }

    #[test]
    fn test_identical_buffers_have_zero_mismatch() {
        let a = solid(10, 10, [10, 20, 30, 255]);
        let b = solid(10, 10, [10, 20, 30, 255]);
        assert_eq!(mismatched_pixels(&a, &b, 25), 0);
    }

    #[test]
    fn test_small_deltas_below_threshold_do_not_count() {
        let a = solid(10, 10, [100, 100, 100, 255]);
        let b = solid(10, 10, [110, 95, 100, 255]);
        assert_eq!(mismatched_pixels(&a, &b, 25), 0);
        assert_eq!(mismatched_pixels(&a, &b, 5), 100);
    }

    #[test]
    fn test_identical_frames_produce_no_issue() {
        let img = solid(10, 10, [50, 50, 50, 255]);
        let samples = vec![sample_at(1.0, &img), sample_at(5.0, &img), sample_at(9.0, &img)];
        let mut card = Scorecard::new();
        compare(&samples, &mut card, &AnalysisConfig::default());
        let report = card.finish();
        assert_eq!(report.score, 100);
        assert!(report.issues.is_empty());
    }

    #[test]
    fn test_major_difference_flagged_as_medium() {
        // 15 of 100 pixels differ: above the 10% tier.
        let base = frame_with_diff(10, 10, 0);
        let changed = frame_with_diff(10, 10, 15);
        let samples = vec![sample_at(1.0, &base), sample_at(5.0, &changed)];
        let mut card = Scorecard::new();
        let config = AnalysisConfig::default();
        compare(&samples, &mut card, &config);
        let report = card.finish();
        assert_eq!(report.issues.len(), 1);
        assert_eq!(report.issues[0].severity, Severity::Medium);
        assert!(report.issues[0].description.contains("potential splice"));
        assert_eq!(report.score, 100 - config.penalties.major_visual_diff);
    }

    #[test]
    fn test_minor_difference_flagged_as_low() {
        // 5 of 100 pixels differ: inside the (2%, 10%] tier.
        let base = frame_with_diff(10, 10, 0);
        let changed = frame_with_diff(10, 10, 5);
        let samples = vec![sample_at(1.0, &base), sample_at(5.0, &changed)];
        let mut card = Scorecard::new();
        compare(&samples, &mut card, &AnalysisConfig::default());
        let report = card.finish();
        assert_eq!(report.issues.len(), 1);
        assert_eq!(report.issues[0].severity, Severity::Low);
    }

    #[test]
    fn test_one_percent_difference_is_ignored() {
        let base = frame_with_diff(10, 10, 0);
        let changed = frame_with_diff(10, 10, 1);
        let samples = vec![sample_at(1.0, &base), sample_at(5.0, &changed)];
        let mut card = Scorecard::new();
        compare(&samples, &mut card, &AnalysisConfig::default());
        assert!(card.finish().issues.is_empty());
    }

    #[test]
    fn test_missing_frame_skips_its_comparisons() {
        let img = frame_with_diff(10, 10, 50);
        let other = frame_with_diff(10, 10, 0);
        // middle frame missing: neither pair is comparable
        let samples = vec![sample_at(1.0, &img), None, sample_at(9.0, &other)];
        let mut card = Scorecard::new();
        compare(&samples, &mut card, &AnalysisConfig::default());
        assert!(card.finish().issues.is_empty());
    }
}
