//! Reference-document domain types.
//!
//! A `StoredDocument` is a piece of reference text uploaded by operators
//! (shelter lists, water-safety notices, evacuation routes) that the
//! answering pipeline stuffs into the model context. Documents are created
//! once at ingestion, immutable thereafter, and read many times.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A reference document held by the document store.
///
/// Invariant: `content` is always non-empty plain text. Binary payloads must
/// be decoded to text before storage — the pipeline never sees non-text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredDocument {
    /// Unique ID, assigned by the store on insert when left empty
    pub id: String,

    /// The file name the document was uploaded under
    pub original_name: String,

    /// MIME type of the original upload (e.g., "text/plain")
    pub mime_type: String,

    /// Extracted plain-text content, whitespace-normalized
    pub content: String,

    /// When this document was ingested
    pub uploaded_at: DateTime<Utc>,
}

impl StoredDocument {
    /// Create a new document pending insertion. The store assigns the ID.
    pub fn new(
        original_name: impl Into<String>,
        mime_type: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            id: String::new(),
            original_name: original_name.into(),
            mime_type: mime_type.into(),
            content: content.into(),
            uploaded_at: Utc::now(),
        }
    }

    /// Create a document with an explicit ID (useful in tests and fixtures).
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Assign a fresh UUID if the ID is empty. Returns the final ID.
    pub fn ensure_id(&mut self) -> String {
        if self.id.is_empty() {
            self.id = Uuid::new_v4().to_string();
        }
        self.id.clone()
    }
}

/// Collapse runs of whitespace to single spaces and trim the ends.
///
/// Uploaded text arrives with arbitrary line breaks and padding; the store
/// only ever holds the normalized form. Returns an empty string for
/// whitespace-only input, which ingestion must reject.
pub fn normalize_content(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}
