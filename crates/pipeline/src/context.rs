//! Context assembly — turning stored documents into one prompt-ready block.
//!
//! The assembler takes whatever the store returns, bounded, and formats it
//! with positional labels. There is no relevance selection: the bound is
//! the only control against unbounded prompt growth, and labels are
//! positions in the returned sequence, not stable document identities.

use rescueline_core::store::DocumentStore;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Fixed header every non-degraded context block begins with.
pub const CONTEXT_HEADER: &str =
    "Use the following information to answer the user's question:";

/// Sentinel block substituted when document retrieval fails.
///
/// Fail-open: the pipeline still attempts to answer from general guidance
/// rather than aborting the caller's request.
pub const MISSING_CONTEXT_SENTINEL: &str =
    "No specific context documents are available right now.";

/// Default cap on documents per context block.
pub const DEFAULT_MAX_DOCUMENTS: usize = 5;

/// An assembled context block. Ephemeral — recomputed per query, never
/// persisted.
#[derive(Debug, Clone)]
pub struct ContextBlock {
    /// The full block text handed to prompt composition
    pub text: String,
    /// How many documents made it into the block
    pub documents_used: usize,
    /// True when retrieval failed and the sentinel was substituted
    pub degraded: bool,
}

/// Assembles bounded document context for one query.
pub struct ContextAssembler {
    store: Arc<dyn DocumentStore>,
    max_documents: usize,
}

impl ContextAssembler {
    /// Create an assembler over the given store with the default bound.
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            max_documents: DEFAULT_MAX_DOCUMENTS,
        }
    }

    /// Override the document bound (must be at least 1).
    pub fn with_max_documents(mut self, max_documents: usize) -> Self {
        self.max_documents = max_documents.max(1);
        self
    }

    /// Assemble a context block for one query. Infallible: any store
    /// failure degrades to the sentinel block.
    ///
    /// `query_hint` performs no filtering today — retrieval is a blind
    /// bounded fetch. The hint is logged so a future ranked selector can
    /// slot in behind the same contract.
    pub async fn assemble(&self, query_hint: &str) -> ContextBlock {
        debug!(
            hint_len = query_hint.len(),
            bound = self.max_documents,
            "Assembling context"
        );

        match self.store.fetch_documents(self.max_documents).await {
            Ok(mut documents) => {
                // The store caps at the requested limit, but the bound is
                // the prompt-growth guard, so enforce it here too.
                documents.truncate(self.max_documents);

                let mut text = String::from(CONTEXT_HEADER);
                text.push_str("\n\n");
                for (i, doc) in documents.iter().enumerate() {
                    text.push_str(&format!("--- Document {} ---\n{}\n\n", i + 1, doc.content));
                }

                info!(
                    documents = documents.len(),
                    context_len = text.len(),
                    "Context assembled"
                );

                ContextBlock {
                    text,
                    documents_used: documents.len(),
                    degraded: false,
                }
            }
            Err(e) => {
                warn!(error = %e, "Document fetch failed; substituting sentinel context");
                ContextBlock {
                    text: MISSING_CONTEXT_SENTINEL.into(),
                    documents_used: 0,
                    degraded: true,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use rescueline_core::document::StoredDocument;
    use rescueline_core::error::StoreError;

    /// A store stub returning a fixed document list or a fixed error.
    struct FixedStore {
        documents: Vec<StoredDocument>,
        fail: bool,
    }

    impl FixedStore {
        fn with_documents(contents: &[&str]) -> Self {
            Self {
                documents: contents
                    .iter()
                    .map(|c| StoredDocument::new("doc.txt", "text/plain", *c))
                    .collect(),
                fail: false,
            }
        }

        fn unavailable() -> Self {
            Self {
                documents: vec![],
                fail: true,
            }
        }
    }

    #[async_trait]
    impl DocumentStore for FixedStore {
        fn name(&self) -> &str {
            "fixed"
        }

        async fn insert(&self, _doc: StoredDocument) -> Result<String, StoreError> {
            unimplemented!("not used by assembler tests")
        }

        async fn fetch_documents(
            &self,
            _limit: usize,
        ) -> Result<Vec<StoredDocument>, StoreError> {
            if self.fail {
                return Err(StoreError::Unavailable("connection refused".into()));
            }
            // Ignores the limit on purpose: the assembler must enforce the
            // bound itself.
            Ok(self.documents.clone())
        }

        async fn count(&self) -> Result<usize, StoreError> {
            Ok(self.documents.len())
        }
    }

    #[tokio::test]
    async fn empty_store_still_yields_header() {
        let assembler = ContextAssembler::new(Arc::new(FixedStore::with_documents(&[])));
        let block = assembler.assemble("anything").await;

        assert!(block.text.starts_with(CONTEXT_HEADER));
        assert!(!block.text.is_empty());
        assert!(!block.degraded);
        assert_eq!(block.documents_used, 0);
    }

    #[tokio::test]
    async fn documents_labeled_by_position() {
        let assembler = ContextAssembler::new(Arc::new(FixedStore::with_documents(&[
            "Boil water before drinking.",
            "Shelter at Lincoln High is open.",
        ])));
        let block = assembler.assemble("water").await;

        assert!(block.text.starts_with(CONTEXT_HEADER));
        assert!(
            block
                .text
                .contains("--- Document 1 ---\nBoil water before drinking.\n\n")
        );
        assert!(
            block
                .text
                .contains("--- Document 2 ---\nShelter at Lincoln High is open.\n\n")
        );
        assert_eq!(block.documents_used, 2);
    }

    #[tokio::test]
    async fn bound_enforced_when_store_over_returns() {
        let contents: Vec<String> = (0..8).map(|i| format!("fact number {i}")).collect();
        let refs: Vec<&str> = contents.iter().map(String::as_str).collect();
        let assembler = ContextAssembler::new(Arc::new(FixedStore::with_documents(&refs)));

        let block = assembler.assemble("facts").await;

        assert_eq!(block.documents_used, 5);
        for i in 1..=5 {
            assert!(block.text.contains(&format!("--- Document {i} ---")));
        }
        assert!(!block.text.contains("--- Document 6 ---"));
        // Order of the returned sequence is preserved
        assert!(block.text.contains("--- Document 1 ---\nfact number 0"));
        assert!(block.text.contains("--- Document 5 ---\nfact number 4"));
    }

    #[tokio::test]
    async fn store_failure_degrades_to_sentinel() {
        let assembler = ContextAssembler::new(Arc::new(FixedStore::unavailable()));
        let block = assembler.assemble("anything").await;

        assert_eq!(block.text, MISSING_CONTEXT_SENTINEL);
        assert!(block.degraded);
        assert_eq!(block.documents_used, 0);
    }
}
