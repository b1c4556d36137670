pub mod evaluation_provider;

pub use evaluation_provider::{EvaluationProvider, ProviderError};
