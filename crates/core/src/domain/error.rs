// Domain Error Types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("No transcript provided")]
    EmptyTranscript,

    #[error("Malformed evaluation payload: {0}")]
    MalformedEvaluation(String),
}

pub type Result<T> = std::result::Result<T, DomainError>;
