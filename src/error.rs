use thiserror::Error;

#[derive(Error, Debug)]
pub enum VeriscopeError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("FFmpeg not found or not executable")]
    EngineUnavailable,

    #[error("Engine error: {0}")]
    Engine(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The one error the pipeline surfaces to callers. Internal failure
    /// detail is logged, never exposed here.
    #[error("Video analysis failed. The file might be corrupted or in an unsupported format.")]
    AnalysisFailed,
}

pub type Result<T> = std::result::Result<T, VeriscopeError>;
