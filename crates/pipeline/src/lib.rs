//! RefugeeAssist query pipeline.
//!
//! Wires retrieval, prompt composition, LLM completion, and background
//! interaction logging into a single `Assistant` entry point.

pub mod assistant;
pub mod logger;
pub mod outcome;
pub mod prompt;

pub use assistant::Assistant;
pub use logger::InteractionLogger;
pub use outcome::{fallback_response, QueryOutcome};
pub use prompt::{compose_prompt, SYSTEM_PROMPT};
