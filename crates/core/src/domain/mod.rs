pub mod error;
pub mod evaluation;

pub use error::DomainError;
pub use evaluation::{
    parse_evaluation, EvaluationResult, FillerWords, PhrasingSuggestion, TopicAdherence,
};
