//! # Rescueline Core
//!
//! Domain types, traits, and error definitions for the Rescueline
//! disaster-response backend. This crate has **zero framework dependencies**
//! — it defines the domain model that all other crates implement against.
//!
//! ## Design Philosophy
//!
//! The two external collaborators of the answering pipeline — the document
//! store and the generative-text service — are defined as traits here.
//! Implementations live in their respective crates. This enables:
//! - Swapping implementations via configuration
//! - Easy testing with mock/stub implementations
//! - Clean dependency graph (all crates depend inward on core)

pub mod answer;
pub mod document;
pub mod error;
pub mod generator;
pub mod report;
pub mod store;

// Re-export key types at crate root for ergonomics
pub use answer::AnswerResult;
pub use document::{StoredDocument, normalize_content};
pub use error::{Error, GeneratorError, Result, StoreError};
pub use generator::{GenerateRequest, GenerateResponse, Generator, Usage};
pub use report::{Report, ReportStatus};
pub use store::{DocumentStore, ReportStore, ReportUpsert};
