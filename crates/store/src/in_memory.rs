//! In-memory store — useful for testing and ephemeral sessions.

use async_trait::async_trait;
use chrono::Utc;
use rescueline_core::document::StoredDocument;
use rescueline_core::error::StoreError;
use rescueline_core::report::Report;
use rescueline_core::store::{DocumentStore, ReportStore, ReportUpsert};
use std::sync::Arc;
use tokio::sync::RwLock;

/// An in-memory store that keeps documents and reports in Vecs.
/// Useful for testing and runs where persistence isn't needed.
pub struct InMemoryStore {
    documents: Arc<RwLock<Vec<StoredDocument>>>,
    reports: Arc<RwLock<Vec<Report>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            documents: Arc::new(RwLock::new(Vec::new())),
            reports: Arc::new(RwLock::new(Vec::new())),
        }
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentStore for InMemoryStore {
    fn name(&self) -> &str {
        "in_memory"
    }

    async fn insert(&self, mut doc: StoredDocument) -> Result<String, StoreError> {
        if doc.content.is_empty() {
            return Err(StoreError::InvalidDocument(
                "document content must be non-empty text".into(),
            ));
        }
        let id = doc.ensure_id();
        self.documents.write().await.push(doc);
        Ok(id)
    }

    async fn fetch_documents(&self, limit: usize) -> Result<Vec<StoredDocument>, StoreError> {
        let documents = self.documents.read().await;
        let mut results: Vec<StoredDocument> = documents.iter().cloned().collect();
        results.sort_by(|a, b| b.uploaded_at.cmp(&a.uploaded_at));
        results.truncate(limit);
        Ok(results)
    }

    async fn count(&self) -> Result<usize, StoreError> {
        Ok(self.documents.read().await.len())
    }
}

#[async_trait]
impl ReportStore for InMemoryStore {
    async fn upsert_report(&self, mut report: Report) -> Result<ReportUpsert, StoreError> {
        let mut reports = self.reports.write().await;

        if let Some(existing) = reports.iter_mut().find(|r| r.call_sid == report.call_sid) {
            existing.location = report.location;
            existing.people_count = report.people_count;
            existing.need_description = report.need_description;
            if report.caller_number.is_some() {
                existing.caller_number = report.caller_number;
            }
            existing.is_urgent_medical = existing.is_urgent_medical || report.is_urgent_medical;
            existing.timestamp = Utc::now();
            return Ok(ReportUpsert {
                id: existing.id.clone(),
                created: false,
            });
        }

        let id = report.ensure_id();
        reports.push(report);
        Ok(ReportUpsert { id, created: true })
    }

    async fn list_reports(&self) -> Result<Vec<Report>, StoreError> {
        let reports = self.reports.read().await;
        let mut results: Vec<Report> = reports.iter().cloned().collect();
        results.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(results)
    }
}
