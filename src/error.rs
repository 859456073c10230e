use std::path::PathBuf;
use thiserror::Error;

/// Everything that can stop a run.
/// None of them is recoverable: the driver reports the error and exits.
#[derive(Debug, Error)]
pub enum CaseError {
    #[error("could not find input file {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// A data row that does not follow the `date,state,...,cases,deaths` layout.
    /// `line` is 1-based and counts the header.
    #[error("line {line}: {reason}: {text:?}")]
    Parse {
        line: usize,
        reason: String,
        text: String,
    },

    #[error("could not draw frame: {0}")]
    Draw(String),
}

impl CaseError {
    pub fn parse(line: usize, reason: impl Into<String>, text: &str) -> CaseError {
        CaseError::Parse {
            line,
            reason: reason.into(),
            text: text.to_owned(),
        }
    }
}
