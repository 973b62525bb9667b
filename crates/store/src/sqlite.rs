//! SQLite store backend.
//!
//! Uses a single SQLite database file with two tables:
//! - `documents` — reference documents for the answering pipeline
//! - `reports` — caller reports, unique per call_sid
//!
//! Retrieval is a plain ordered LIMIT query: there is no full-text or
//! vector index because the pipeline performs no relevance selection.

use async_trait::async_trait;
use chrono::Utc;
use rescueline_core::document::StoredDocument;
use rescueline_core::error::StoreError;
use rescueline_core::report::{Report, ReportStatus};
use rescueline_core::store::{DocumentStore, ReportStore, ReportUpsert};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{Row, SqlitePool};
use std::str::FromStr;
use tracing::{debug, info};

/// A persistent SQLite store for documents and reports.
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Create a new SQLite store from a file path.
    ///
    /// The database and all tables/indexes are created automatically.
    /// Pass `"sqlite::memory:"` for an in-process ephemeral database
    /// (useful for tests).
    pub async fn new(path: &str) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(path)
            .map_err(|e| StoreError::Unavailable(format!("Invalid SQLite path: {e}")))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .pragma("foreign_keys", "ON");

        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .connect_with(options)
            .await
            .map_err(|e| StoreError::Unavailable(format!("Failed to open SQLite: {e}")))?;

        let store = Self { pool };
        store.run_migrations().await?;
        info!("SQLite store initialized at {path}");
        Ok(store)
    }

    /// Create from an existing pool (useful for testing).
    pub async fn from_pool(pool: SqlitePool) -> Result<Self, StoreError> {
        let store = Self { pool };
        store.run_migrations().await?;
        Ok(store)
    }

    /// Run schema migrations — creates the documents and reports tables.
    async fn run_migrations(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS documents (
                id            TEXT PRIMARY KEY,
                original_name TEXT NOT NULL,
                mime_type     TEXT NOT NULL,
                content       TEXT NOT NULL,
                uploaded_at   TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::MigrationFailed(format!("documents table: {e}")))?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_documents_uploaded_at ON documents(uploaded_at DESC)",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::MigrationFailed(format!("uploaded_at index: {e}")))?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS reports (
                id                TEXT PRIMARY KEY,
                call_sid          TEXT UNIQUE NOT NULL,
                caller_number     TEXT,
                location          TEXT NOT NULL,
                people_count      INTEGER NOT NULL,
                need_description  TEXT NOT NULL,
                status            TEXT NOT NULL,
                is_urgent_medical INTEGER NOT NULL DEFAULT 0,
                timestamp         TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::MigrationFailed(format!("reports table: {e}")))?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_reports_timestamp ON reports(timestamp DESC)",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::MigrationFailed(format!("timestamp index: {e}")))?;

        debug!("SQLite migrations complete");
        Ok(())
    }

    /// Parse a `StoredDocument` from a SQLite row.
    fn row_to_document(row: &sqlx::sqlite::SqliteRow) -> Result<StoredDocument, StoreError> {
        let id: String = row
            .try_get("id")
            .map_err(|e| StoreError::QueryFailed(format!("id column: {e}")))?;
        let original_name: String = row
            .try_get("original_name")
            .map_err(|e| StoreError::QueryFailed(format!("original_name column: {e}")))?;
        let mime_type: String = row
            .try_get("mime_type")
            .map_err(|e| StoreError::QueryFailed(format!("mime_type column: {e}")))?;
        let content: String = row
            .try_get("content")
            .map_err(|e| StoreError::QueryFailed(format!("content column: {e}")))?;
        let uploaded_at_str: String = row
            .try_get("uploaded_at")
            .map_err(|e| StoreError::QueryFailed(format!("uploaded_at column: {e}")))?;

        let uploaded_at = chrono::DateTime::parse_from_rfc3339(&uploaded_at_str)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now());

        Ok(StoredDocument {
            id,
            original_name,
            mime_type,
            content,
            uploaded_at,
        })
    }

    /// Parse a `Report` from a SQLite row.
    fn row_to_report(row: &sqlx::sqlite::SqliteRow) -> Result<Report, StoreError> {
        let id: String = row
            .try_get("id")
            .map_err(|e| StoreError::QueryFailed(format!("id column: {e}")))?;
        let call_sid: String = row
            .try_get("call_sid")
            .map_err(|e| StoreError::QueryFailed(format!("call_sid column: {e}")))?;
        let caller_number: Option<String> = row
            .try_get("caller_number")
            .map_err(|e| StoreError::QueryFailed(format!("caller_number column: {e}")))?;
        let location: String = row
            .try_get("location")
            .map_err(|e| StoreError::QueryFailed(format!("location column: {e}")))?;
        let people_count: i64 = row
            .try_get("people_count")
            .map_err(|e| StoreError::QueryFailed(format!("people_count column: {e}")))?;
        let need_description: String = row
            .try_get("need_description")
            .map_err(|e| StoreError::QueryFailed(format!("need_description column: {e}")))?;
        let status_str: String = row
            .try_get("status")
            .map_err(|e| StoreError::QueryFailed(format!("status column: {e}")))?;
        let is_urgent_medical: bool = row
            .try_get("is_urgent_medical")
            .map_err(|e| StoreError::QueryFailed(format!("is_urgent_medical column: {e}")))?;
        let timestamp_str: String = row
            .try_get("timestamp")
            .map_err(|e| StoreError::QueryFailed(format!("timestamp column: {e}")))?;

        let status = match status_str.as_str() {
            "acknowledged" => ReportStatus::Acknowledged,
            "actioned" => ReportStatus::Actioned,
            _ => ReportStatus::Received,
        };

        let timestamp = chrono::DateTime::parse_from_rfc3339(&timestamp_str)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now());

        Ok(Report {
            id,
            call_sid,
            caller_number,
            location,
            people_count: people_count.max(0) as u32,
            need_description,
            status,
            is_urgent_medical,
            timestamp,
        })
    }

    fn status_to_str(status: &ReportStatus) -> &'static str {
        match status {
            ReportStatus::Received => "received",
            ReportStatus::Acknowledged => "acknowledged",
            ReportStatus::Actioned => "actioned",
        }
    }
}

#[async_trait]
impl DocumentStore for SqliteStore {
    fn name(&self) -> &str {
        "sqlite"
    }

    async fn insert(&self, mut doc: StoredDocument) -> Result<String, StoreError> {
        if doc.content.is_empty() {
            return Err(StoreError::InvalidDocument(
                "document content must be non-empty text".into(),
            ));
        }
        let id = doc.ensure_id();

        sqlx::query(
            r#"
            INSERT INTO documents (id, original_name, mime_type, content, uploaded_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&doc.id)
        .bind(&doc.original_name)
        .bind(&doc.mime_type)
        .bind(&doc.content)
        .bind(doc.uploaded_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Storage(format!("INSERT failed: {e}")))?;

        debug!("Stored document {id}");
        Ok(id)
    }

    async fn fetch_documents(&self, limit: usize) -> Result<Vec<StoredDocument>, StoreError> {
        let rows =
            sqlx::query("SELECT * FROM documents ORDER BY uploaded_at DESC, id LIMIT ?1")
                .bind(limit as i64)
                .fetch_all(&self.pool)
                .await
                .map_err(|e| StoreError::QueryFailed(format!("Document fetch: {e}")))?;

        rows.iter().map(Self::row_to_document).collect()
    }

    async fn count(&self) -> Result<usize, StoreError> {
        let row = sqlx::query("SELECT COUNT(*) as cnt FROM documents")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| StoreError::QueryFailed(format!("COUNT: {e}")))?;

        let cnt: i64 = row
            .try_get("cnt")
            .map_err(|e| StoreError::QueryFailed(format!("cnt column: {e}")))?;

        Ok(cnt as usize)
    }
}

#[async_trait]
impl ReportStore for SqliteStore {
    async fn upsert_report(&self, mut report: Report) -> Result<ReportUpsert, StoreError> {
        let existing = sqlx::query("SELECT * FROM reports WHERE call_sid = ?1")
            .bind(&report.call_sid)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StoreError::QueryFailed(format!("Report lookup: {e}")))?;

        if let Some(ref row) = existing {
            let current = Self::row_to_report(row)?;

            let caller_number = report.caller_number.or(current.caller_number);
            let is_urgent = report.is_urgent_medical || current.is_urgent_medical;

            sqlx::query(
                r#"
                UPDATE reports
                SET caller_number = ?1,
                    location = ?2,
                    people_count = ?3,
                    need_description = ?4,
                    is_urgent_medical = ?5,
                    timestamp = ?6
                WHERE call_sid = ?7
                "#,
            )
            .bind(&caller_number)
            .bind(&report.location)
            .bind(report.people_count as i64)
            .bind(&report.need_description)
            .bind(is_urgent)
            .bind(Utc::now().to_rfc3339())
            .bind(&report.call_sid)
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::Storage(format!("Report UPDATE failed: {e}")))?;

            debug!(call_sid = %report.call_sid, "Updated existing report");
            return Ok(ReportUpsert {
                id: current.id,
                created: false,
            });
        }

        let id = report.ensure_id();
        sqlx::query(
            r#"
            INSERT INTO reports
                (id, call_sid, caller_number, location, people_count,
                 need_description, status, is_urgent_medical, timestamp)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(&report.id)
        .bind(&report.call_sid)
        .bind(&report.caller_number)
        .bind(&report.location)
        .bind(report.people_count as i64)
        .bind(&report.need_description)
        .bind(Self::status_to_str(&report.status))
        .bind(report.is_urgent_medical)
        .bind(report.timestamp.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Storage(format!("Report INSERT failed: {e}")))?;

        debug!(call_sid = %report.call_sid, "Created report {id}");
        Ok(ReportUpsert { id, created: true })
    }

    async fn list_reports(&self) -> Result<Vec<Report>, StoreError> {
        let rows = sqlx::query("SELECT * FROM reports ORDER BY timestamp DESC, id")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StoreError::QueryFailed(format!("Report list: {e}")))?;

        rows.iter().map(Self::row_to_report).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    async fn test_store() -> SqliteStore {
        SqliteStore::new("sqlite::memory:").await.unwrap()
    }

    fn make_doc(name: &str, content: &str) -> StoredDocument {
        StoredDocument::new(name, "text/plain", content)
    }

    #[tokio::test]
    async fn insert_and_fetch() {
        let db = test_store().await;
        let id = db
            .insert(make_doc("water.txt", "Boil water before drinking."))
            .await
            .unwrap();
        assert!(!id.is_empty());

        let docs = db.fetch_documents(5).await.unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].content, "Boil water before drinking.");
        assert_eq!(docs[0].id, id);
    }

    #[tokio::test]
    async fn empty_content_rejected() {
        let db = test_store().await;
        let result = db.insert(make_doc("empty.txt", "")).await;
        assert!(matches!(result, Err(StoreError::InvalidDocument(_))));
    }

    #[tokio::test]
    async fn empty_store_fetches_nothing() {
        let db = test_store().await;
        let docs = db.fetch_documents(5).await.unwrap();
        assert!(docs.is_empty());
        assert_eq!(db.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn fetch_respects_limit_and_order() {
        let db = test_store().await;
        let base = Utc::now();
        for i in 0..8 {
            let mut doc = make_doc(&format!("doc{i}.txt"), &format!("content {i}"));
            doc.uploaded_at = base + Duration::seconds(i);
            db.insert(doc).await.unwrap();
        }

        let docs = db.fetch_documents(5).await.unwrap();
        assert_eq!(docs.len(), 5);
        assert_eq!(docs[0].content, "content 7");
        assert_eq!(docs[4].content, "content 3");
        assert_eq!(db.count().await.unwrap(), 8);
    }

    #[tokio::test]
    async fn report_upsert_create_then_update() {
        let db = test_store().await;

        let first = db
            .upsert_report(Report::new("CA100", "Main St bridge", 2, "trapped by water"))
            .await
            .unwrap();
        assert!(first.created);

        let second = db
            .upsert_report(
                Report::new("CA100", "Main St bridge, north side", 4, "trapped by water")
                    .with_urgent_medical(true),
            )
            .await
            .unwrap();
        assert!(!second.created);
        assert_eq!(second.id, first.id);

        let reports = db.list_reports().await.unwrap();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].people_count, 4);
        assert!(reports[0].is_urgent_medical);
        assert_eq!(reports[0].status, ReportStatus::Received);
    }

    #[tokio::test]
    async fn update_keeps_known_caller_number() {
        let db = test_store().await;
        db.upsert_report(
            Report::new("CA200", "5th Ave", 1, "medical help")
                .with_caller_number("+15550001111"),
        )
        .await
        .unwrap();
        db.upsert_report(Report::new("CA200", "5th Ave", 1, "medical help"))
            .await
            .unwrap();

        let reports = db.list_reports().await.unwrap();
        assert_eq!(reports[0].caller_number.as_deref(), Some("+15550001111"));
    }

    #[tokio::test]
    async fn reports_listed_newest_first() {
        let db = test_store().await;
        let mut first = Report::new("CA1", "north", 1, "first");
        first.timestamp = Utc::now() - Duration::seconds(60);
        db.upsert_report(first).await.unwrap();
        db.upsert_report(Report::new("CA2", "south", 1, "second"))
            .await
            .unwrap();

        let reports = db.list_reports().await.unwrap();
        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].call_sid, "CA2");
        assert_eq!(reports[1].call_sid, "CA1");
    }
}
