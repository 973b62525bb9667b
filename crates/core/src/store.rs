//! Store traits — the persistence contracts the pipeline consumes.
//!
//! The answering pipeline treats storage as a simple keyed document store:
//! insert on ingestion, bounded fetch at query time. There is no relevance
//! ranking behind `fetch_documents` — it returns whatever the store holds,
//! newest first, capped at `limit`.
//!
//! Implementations: SQLite (persistent), in-memory (tests and ephemeral
//! runs).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::document::StoredDocument;
use crate::error::StoreError;
use crate::report::Report;

/// Storage for reference documents.
///
/// All methods must be safe for concurrent independent calls; document
/// writes and pipeline reads are not synchronized against each other.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// The backend name (e.g., "sqlite", "in_memory").
    fn name(&self) -> &str;

    /// Insert a document. Assigns a UUID when the ID is empty and returns
    /// the final ID. Rejects empty content with
    /// [`StoreError::InvalidDocument`].
    async fn insert(&self, doc: StoredDocument) -> std::result::Result<String, StoreError>;

    /// Fetch up to `limit` documents, most recently uploaded first.
    ///
    /// An empty store yields an empty Vec, never an error. Connectivity
    /// failures surface as [`StoreError::Unavailable`].
    async fn fetch_documents(
        &self,
        limit: usize,
    ) -> std::result::Result<Vec<StoredDocument>, StoreError>;

    /// Total number of stored documents.
    async fn count(&self) -> std::result::Result<usize, StoreError>;
}

/// Outcome of a report upsert: the stored ID and whether a new row was
/// created (vs an existing call's report being updated).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportUpsert {
    pub id: String,
    pub created: bool,
}

/// Storage for caller reports.
#[async_trait]
pub trait ReportStore: Send + Sync {
    /// Insert or update a report, keyed on `call_sid`.
    ///
    /// A second submission for the same call replaces the report's fields
    /// and refreshes its timestamp instead of creating a duplicate.
    async fn upsert_report(
        &self,
        report: Report,
    ) -> std::result::Result<ReportUpsert, StoreError>;

    /// All reports, newest first.
    async fn list_reports(&self) -> std::result::Result<Vec<Report>, StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upsert_outcome_serialization() {
        let outcome = ReportUpsert {
            id: "rep_001".into(),
            created: true,
        };
        let json = serde_json::to_string(&outcome).unwrap();
        assert!(json.contains("rep_001"));
        assert!(json.contains("true"));
    }
}
