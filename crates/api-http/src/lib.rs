//! HTTP surface for the evaluation engine
//!
//! One substantive route: `POST /evaluate`. The handler makes the admission
//! decision (reject early on a deep backlog) before anything reaches the
//! request queue, and maps application errors onto the wire contract the
//! frontend expects (`inQueue` markers, distinct configuration errors).

pub mod error;
pub mod handler;
pub mod router;
pub mod state;
pub mod types;

pub use router::build_router;
pub use state::{ApiConfig, AppState};
