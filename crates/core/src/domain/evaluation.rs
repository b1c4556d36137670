// Evaluation Domain Model

use serde::{Deserialize, Serialize};

use crate::domain::error::DomainError;

/// Structured evaluation of one speech transcript, as produced by the
/// generative provider and validated here.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationResult {
    /// Overall score out of 100.
    pub overall_score: f64,

    /// Analysis of the speaker's confidence (hesitations, strong phrasing).
    pub confidence: String,

    pub filler_words: FillerWords,

    /// Constructive feedback on grammar and syntax.
    pub grammar_feedback: String,

    /// Better ways to phrase parts of the transcript.
    pub alternative_phrasing: Vec<PhrasingSuggestion>,

    /// Topic adherence when a topic was assigned, absent otherwise.
    #[serde(default)]
    pub topic_adherence: Option<TopicAdherence>,
}

/// Filler words ("um", "uh", "like", ...) found in the transcript.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FillerWords {
    pub count: u32,
    pub words: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhrasingSuggestion {
    pub original: String,
    pub suggested: String,
}

/// Topic adherence as models actually emit it: a bare 0-10 score, or a score
/// with relevance feedback.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TopicAdherence {
    Score(f64),
    Detailed { score: f64, feedback: String },
}

impl TopicAdherence {
    pub fn score(&self) -> f64 {
        match self {
            TopicAdherence::Score(score) => *score,
            TopicAdherence::Detailed { score, .. } => *score,
        }
    }
}

/// Shape a raw provider response into a validated evaluation.
///
/// Models occasionally wrap the JSON in markdown code fences even when told
/// not to; those are stripped before parsing.
pub fn parse_evaluation(raw: &str) -> Result<EvaluationResult, DomainError> {
    let cleaned = raw.replace("```json", "").replace("```", "");
    serde_json::from_str(cleaned.trim())
        .map_err(|e| DomainError::MalformedEvaluation(e.to_string()))
}
