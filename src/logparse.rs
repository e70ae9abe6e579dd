//! Structured parsing of the engine's diagnostic line stream.
//!
//! Each line is fed through [`parse_line`], a pure function returning at most
//! one [`LogEvent`], and events are folded into a [`LogState`] owned by the
//! pipeline invocation. Parsing never fails; lines that match no known shape
//! simply produce no event.

use serde::Serialize;

#[derive(Debug, Clone, PartialEq)]
pub enum LogEvent {
    DurationFound(f64),
    AudioStreamFound,
    SilenceStarted(f64),
    SilenceEnded { end: f64, duration: f64 },
}

/// A contiguous span of audio below the noise floor for at least the minimum
/// silence duration, as reported by the silencedetect filter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SilenceInterval {
    pub start_secs: f64,
    pub end_secs: f64,
    pub duration_secs: f64,
}

/// Parse one diagnostic line. Recognized shapes:
///
/// ```text
///   Duration: 00:01:15.50, start: 0.000000, bitrate: 1500 kb/s
///   Stream #0:1(und): Audio: aac (LC), 48000 Hz, stereo
/// [silencedetect @ 0x5600] silence_start: 1.2345
/// [silencedetect @ 0x5600] silence_end: 3.456 | silence_duration: 2.2215
/// ```
pub fn parse_line(line: &str) -> Option<LogEvent> {
    let trimmed = line.trim_start();

    if let Some(rest) = trimmed.strip_prefix("Duration: ") {
        let field = rest.split(',').next()?.trim();
        return parse_clock(field).map(LogEvent::DurationFound);
    }

    if trimmed.starts_with("Stream #") && trimmed.contains("Audio:") {
        return Some(LogEvent::AudioStreamFound);
    }

    if line.contains("silencedetect") {
        if let Some(rest) = line.split("silence_start:").nth(1) {
            let start: f64 = rest.split_whitespace().next()?.parse().ok()?;
            return Some(LogEvent::SilenceStarted(start));
        }
        if let Some(rest) = line.split("silence_end:").nth(1) {
            let end: f64 = rest.split_whitespace().next()?.parse().ok()?;
            let duration = rest
                .split("silence_duration:")
                .nth(1)
                .and_then(|d| d.split_whitespace().next())
                .and_then(|d| d.parse().ok())
                .unwrap_or(0.0);
            return Some(LogEvent::SilenceEnded { end, duration });
        }
    }

    None
}

/// Parse `HH:MM:SS.cc` to total seconds. Returns `None` for `N/A` and other
/// malformed values.
fn parse_clock(s: &str) -> Option<f64> {
    let parts: Vec<&str> = s.split(':').collect();
    if parts.len() != 3 {
        return None;
    }
    let hours: f64 = parts[0].parse().ok()?;
    let minutes: f64 = parts[1].parse().ok()?;
    let seconds: f64 = parts[2].parse().ok()?;
    Some(hours * 3600.0 + minutes * 60.0 + seconds)
}

/// Facts accumulated across every decode pass of one analysis.
#[derive(Debug, Default)]
pub struct LogState {
    duration_secs: f64,
    has_audio: bool,
    open_silence: Option<f64>,
    silences: Vec<SilenceInterval>,
}

impl LogState {
    pub fn apply(&mut self, event: LogEvent) {
        match event {
            // First occurrence wins; later passes re-print the same header.
            LogEvent::DurationFound(secs) => {
                if self.duration_secs == 0.0 {
                    self.duration_secs = secs;
                }
            }
            LogEvent::AudioStreamFound => self.has_audio = true,
            LogEvent::SilenceStarted(start) => self.open_silence = Some(start),
            LogEvent::SilenceEnded { end, duration } => {
                // An end without an open start is discarded.
                if let Some(start) = self.open_silence.take() {
                    if end >= start {
                        let duration_secs = if duration > 0.0 { duration } else { end - start };
                        self.silences.push(SilenceInterval {
                            start_secs: start,
                            end_secs: end,
                            duration_secs,
                        });
                    }
                }
            }
        }
    }

    pub fn feed<S: AsRef<str>>(&mut self, lines: &[S]) {
        for line in lines {
            if let Some(event) = parse_line(line.as_ref()) {
                self.apply(event);
            }
        }
    }

    pub fn duration_secs(&self) -> f64 {
        self.duration_secs
    }

    pub fn has_audio(&self) -> bool {
        self.has_audio
    }

    pub fn silence_intervals(&self) -> &[SilenceInterval] {
        &self.silences
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_duration_line() {
        let event = parse_line("  Duration: 00:01:15.50, start: 0.000000, bitrate: 1500 kb/s");
        assert_eq!(event, Some(LogEvent::DurationFound(75.5)));
    }

    #[test]
    fn test_duration_na_produces_no_event() {
        assert_eq!(parse_line("  Duration: N/A, start: 0.000000, bitrate: N/A"), None);
    }

    #[test]
    fn test_parse_audio_stream_line() {
        let event = parse_line("    Stream #0:1(und): Audio: aac (LC), 48000 Hz, stereo, fltp");
        assert_eq!(event, Some(LogEvent::AudioStreamFound));
    }

    #[test]
    fn test_video_stream_line_is_not_audio() {
        assert_eq!(
            parse_line("    Stream #0:0(und): Video: h264 (High), yuv420p, 1920x1080"),
            None
        );
    }

    #[test]
    fn test_parse_silence_markers() {
        assert_eq!(
            parse_line("[silencedetect @ 0x5600] silence_start: 1.2345"),
            Some(LogEvent::SilenceStarted(1.2345))
        );
        assert_eq!(
            parse_line("[silencedetect @ 0x5600] silence_end: 3.456 | silence_duration: 2.2215"),
            Some(LogEvent::SilenceEnded { end: 3.456, duration: 2.2215 })
        );
    }

    #[test]
    fn test_unrelated_lines_produce_no_events() {
        let mut state = LogState::default();
        state.feed(&[
            "ffmpeg version 6.1 Copyright (c) 2000-2023",
            "frame=  100 fps=25.0 time=00:00:04.00 speed=1.5x",
            "Output #0, null, to 'pipe:':",
        ]);
        assert_eq!(state.duration_secs(), 0.0);
        assert!(!state.has_audio());
        assert!(state.silence_intervals().is_empty());
    }

    #[test]
    fn test_first_duration_wins() {
        let mut state = LogState::default();
        state.feed(&[
            "  Duration: 00:00:10.00, start: 0.000000, bitrate: 1500 kb/s",
            "  Duration: 00:00:99.00, start: 0.000000, bitrate: 1500 kb/s",
        ]);
        assert_eq!(state.duration_secs(), 10.0);
    }

    #[test]
    fn test_silence_pairing() {
        let mut state = LogState::default();
        state.feed(&[
            "[silencedetect @ 0x1] silence_start: 1.0",
            "frame=  10 fps=25.0 time=00:00:01.00",
            "[silencedetect @ 0x1] silence_end: 2.5 | silence_duration: 1.5",
            "[silencedetect @ 0x1] silence_start: 4.0",
            "[silencedetect @ 0x1] silence_end: 5.0 | silence_duration: 1.0",
        ]);
        let intervals = state.silence_intervals();
        assert_eq!(intervals.len(), 2);
        assert_eq!(intervals[0].start_secs, 1.0);
        assert_eq!(intervals[0].end_secs, 2.5);
        assert_eq!(intervals[0].duration_secs, 1.5);
    }

    #[test]
    fn test_orphaned_silence_end_discarded() {
        let mut state = LogState::default();
        state.feed(&["[silencedetect @ 0x1] silence_end: 2.5 | silence_duration: 1.5"]);
        assert!(state.silence_intervals().is_empty());
    }

    #[test]
    fn test_silence_end_before_start_discarded() {
        let mut state = LogState::default();
        state.feed(&[
            "[silencedetect @ 0x1] silence_start: 5.0",
            "[silencedetect @ 0x1] silence_end: 2.0 | silence_duration: 0.0",
        ]);
        assert!(state.silence_intervals().is_empty());
    }
}
