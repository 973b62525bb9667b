//! The Rescueline answering pipeline.
//!
//! One query flows: question → [`ContextAssembler`] pulls a bounded document
//! set from the store → [`compose_prompt`] builds the final prompt →
//! [`AnswerPipeline`] invokes the generator → plain-text answer (or the
//! fixed fallback) returns to the caller.
//!
//! The pipeline is stateless per call and fails open at both I/O
//! boundaries: a dead store degrades to a sentinel context, a dead
//! generator degrades to a fixed safe answer. A live emergency caller
//! always gets *some* spoken-safe response.

pub mod answer;
pub mod context;
pub mod prompt;

pub use answer::{AnswerPipeline, FALLBACK_ANSWER};
pub use context::{CONTEXT_HEADER, ContextAssembler, ContextBlock, MISSING_CONTEXT_SENTINEL};
pub use prompt::{ANSWER_INSTRUCTION, compose_prompt};
