// Error kinds for the composition pipeline.
//
// Every stage returns `Result<T>` and propagates with `?`. The kinds stay
// distinct all the way to the binary so callers can tell a malformed input
// from an unusable configuration table from a failed write.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ComposeError {
    /// A stage received input that violates its precondition.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A configuration table cannot drive its stage (empty, or values out of range).
    #[error("unsupported table: {0}")]
    UnsupportedTable(String),

    /// MIDI encoding or file I/O failed.
    #[error("export failed: {0}")]
    ExportFailure(String),

    /// A configuration file could not be read or parsed.
    #[error("config error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, ComposeError>;
