//! Media-decoding engine abstraction and the FFmpeg-backed implementation.
//!
//! Each analysis exclusively owns one engine instance; the engine supports a
//! single in-flight decode pass at a time and must be terminated exactly once
//! on every exit path.

use crate::error::{Result, VeriscopeError};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tempfile::TempDir;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tracing::{debug, warn};

/// Output of one decode pass. Diagnostic lines are captured even when the
/// pass fails, because stream metadata is reported before the engine decides
/// whether it can decode at all.
#[derive(Debug, Default)]
pub struct DecodeOutput {
    pub lines: Vec<String>,
    pub success: bool,
}

#[async_trait]
pub trait DecodeEngine: Send {
    /// Run one decode pass to completion. `Err` means the pass could not be
    /// started; a pass that ran and exited non-zero comes back with
    /// `success: false` and whatever diagnostics it produced.
    async fn run(&mut self, args: &[String]) -> Result<DecodeOutput>;

    /// Read an artifact produced by an earlier pass.
    async fn read_artifact(&mut self, name: &str) -> Result<Vec<u8>>;

    /// Remove an artifact. Callers treat failure as best-effort housekeeping.
    async fn remove_artifact(&mut self, name: &str) -> Result<()>;

    /// Absolute path the engine writes artifacts under.
    fn artifact_path(&self, name: &str) -> PathBuf;

    /// Release engine resources.
    async fn terminate(&mut self);
}

/// Production engine: one spawned `ffmpeg` process per decode pass, with a
/// private scratch directory for frame artifacts.
pub struct FfmpegEngine {
    ffmpeg_path: String,
    scratch: Option<TempDir>,
}

impl FfmpegEngine {
    /// Acquire an engine: verify ffmpeg is runnable and create the scratch
    /// directory. Failure here aborts the whole analysis.
    pub async fn acquire() -> Result<Self> {
        let ffmpeg_path = "ffmpeg".to_string();
        let status = Command::new(&ffmpeg_path)
            .arg("-version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map_err(|_| VeriscopeError::EngineUnavailable)?;
        if !status.success() {
            return Err(VeriscopeError::EngineUnavailable);
        }

        let scratch = TempDir::new()?;
        debug!("Engine acquired, scratch dir {:?}", scratch.path());
        Ok(Self {
            ffmpeg_path,
            scratch: Some(scratch),
        })
    }

    fn scratch_path(&self) -> &Path {
        // scratch is only None after terminate()
        self.scratch
            .as_ref()
            .map(|dir| dir.path())
            .unwrap_or_else(|| Path::new("."))
    }
}

#[async_trait]
impl DecodeEngine for FfmpegEngine {
    async fn run(&mut self, args: &[String]) -> Result<DecodeOutput> {
        debug!("Engine pass: ffmpeg {}", args.join(" "));

        let mut child = Command::new(&self.ffmpeg_path)
            .args(["-hide_banner", "-y"])
            .args(args)
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| VeriscopeError::Engine(format!("failed to spawn ffmpeg: {e}")))?;

        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| VeriscopeError::Engine("failed to capture engine diagnostics".into()))?;

        let mut reader = BufReader::new(stderr).lines();
        let mut lines = Vec::new();
        while let Some(line) = reader.next_line().await? {
            lines.push(line);
        }

        let status = child.wait().await?;
        Ok(DecodeOutput {
            lines,
            success: status.success(),
        })
    }

    async fn read_artifact(&mut self, name: &str) -> Result<Vec<u8>> {
        Ok(tokio::fs::read(self.artifact_path(name)).await?)
    }

    async fn remove_artifact(&mut self, name: &str) -> Result<()> {
        Ok(tokio::fs::remove_file(self.artifact_path(name)).await?)
    }

    fn artifact_path(&self, name: &str) -> PathBuf {
        self.scratch_path().join(name)
    }

    async fn terminate(&mut self) {
        if let Some(dir) = self.scratch.take() {
            if let Err(e) = dir.close() {
                warn!("Failed to clean engine scratch dir: {}", e);
            }
        }
    }
}
