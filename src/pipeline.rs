//! The analysis pipeline: engine acquisition, sequential stages, score
//! aggregation, and guaranteed engine termination on every exit path.

use crate::config::AnalysisConfig;
use crate::engine::{DecodeEngine, FfmpegEngine};
use crate::error::{Result, VeriscopeError};
use crate::logparse::LogState;
use crate::progress::{ProgressEvent, ProgressTracker};
use crate::report::{AnalysisReport, Scorecard};
use crate::{audio, frames, probe};
use std::path::PathBuf;
use tracing::{error, info};

/// One video file to analyze. Immutable for the duration of the analysis.
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    pub path: PathBuf,
    pub file_name: String,
}

impl AnalysisRequest {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self { path, file_name }
    }
}

pub struct Pipeline {
    config: AnalysisConfig,
}

impl Pipeline {
    pub fn new(config: AnalysisConfig) -> Self {
        Self { config }
    }

    /// Analyze one file with a freshly acquired engine. Engine acquisition
    /// failure is the one fatal error before any scoring begins.
    pub async fn analyze<F>(&self, request: &AnalysisRequest, progress: F) -> Result<AnalysisReport>
    where
        F: FnMut(ProgressEvent) + Send,
    {
        let engine = FfmpegEngine::acquire().await.map_err(|e| {
            error!("Engine acquisition failed: {}", e);
            VeriscopeError::AnalysisFailed
        })?;
        self.analyze_with_engine(engine, request, progress).await
    }

    /// Run the full stage sequence against a caller-supplied engine. The
    /// engine is terminated exactly once, on success and failure alike.
    pub async fn analyze_with_engine<E, F>(
        &self,
        mut engine: E,
        request: &AnalysisRequest,
        progress: F,
    ) -> Result<AnalysisReport>
    where
        E: DecodeEngine,
        F: FnMut(ProgressEvent) + Send,
    {
        let mut tracker = ProgressTracker::new(progress);
        let result = self.run_stages(&mut engine, request, &mut tracker).await;
        engine.terminate().await;

        result.map_err(|e| {
            error!("Analysis of {} failed: {}", request.file_name, e);
            VeriscopeError::AnalysisFailed
        })
    }

    async fn run_stages<E: DecodeEngine>(
        &self,
        engine: &mut E,
        request: &AnalysisRequest,
        tracker: &mut ProgressTracker<'_>,
    ) -> Result<AnalysisReport> {
        info!("Analyzing {}", request.file_name);
        tracker.report("Loading analysis engine...", 5);

        // An unreadable input is fatal, not a scoring signal.
        tracker.report("Preparing video file...", 15);
        tokio::fs::metadata(&request.path).await?;

        let mut log = LogState::default();
        let mut card = Scorecard::new();

        tracker.report("Analyzing video metadata...", 20);
        let outcome = probe::run(engine, &request.path, &mut log, &mut card, &self.config).await;

        if outcome.sample_frames {
            let samples = frames::sample(
                engine,
                &request.path,
                outcome.duration_secs,
                &mut log,
                &mut card,
                tracker,
                &self.config,
            )
            .await;

            if samples.iter().flatten().count() >= 2 {
                tracker.report("Comparing frames...", 75);
                frames::compare(&samples, &mut card, &self.config);
            }

            frames::cleanup(engine, samples.len()).await;
        }

        tracker.report("Analyzing audio track...", 85);
        audio::run(engine, &request.path, &mut log, &mut card, &self.config).await;

        tracker.report("Finalizing report...", 95);
        let report = card.finish();
        info!(
            "Analysis of {} complete: score {}, {} issue(s)",
            request.file_name,
            report.score,
            report.issues.len()
        );

        tracker.report("Analysis complete.", 100);
        Ok(report)
    }
}
