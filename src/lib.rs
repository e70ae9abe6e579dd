pub mod audio;
pub mod config;
pub mod engine;
pub mod error;
pub mod frames;
pub mod logparse;
pub mod pipeline;
pub mod probe;
pub mod progress;
pub mod report;

pub use config::{AnalysisConfig, PenaltyTable};
pub use engine::{DecodeEngine, DecodeOutput, FfmpegEngine};
pub use error::{Result, VeriscopeError};
pub use logparse::{LogEvent, LogState, SilenceInterval};
pub use pipeline::{AnalysisRequest, Pipeline};
pub use progress::ProgressEvent;
pub use report::{AnalysisReport, Issue, Severity};
