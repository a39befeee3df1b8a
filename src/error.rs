use thiserror::Error;

/// Closed set of recoverable failure categories (see the error-handling taxonomy).
///
/// Every variant maps to exactly one user-facing diagnostic line; nothing here
/// is fatal to the shell except `exit` or end-of-file at the prompt.
#[derive(Debug, Error)]
pub enum ShellError {
    /// fork/pipe/open failed while building a pipeline. The pipeline is
    /// abandoned; children already forked are left to be reaped normally.
    #[error("tsh: {0}")]
    PipelineConstruction(String),

    /// The job table had no free slot for a newly built pipeline.
    #[error("tsh: too many jobs")]
    TableFull,

    /// `fg`/`bg` referenced a job id or pid that isn't a live job.
    #[error("{0}")]
    NoSuchJob(String),

    /// A redirection operator was missing its filename, or named an
    /// operator/fd combination the shell doesn't implement.
    #[error("tsh: {0}")]
    BadRedirection(String),

    /// A built-in was called with a missing or malformed argument.
    #[error("tsh: {0}")]
    BadArgument(String),
}

pub type Result<T> = std::result::Result<T, ShellError>;
