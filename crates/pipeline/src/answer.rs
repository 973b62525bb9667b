//! Answer generation — the pipeline's outer surface.
//!
//! `AnswerPipeline` owns the full query flow and the fail-open policy: a
//! store failure degrades to the sentinel context (the generator is still
//! invoked), a generator failure degrades to the fixed fallback sentence.
//! `answer_query` never returns an error — the caller is a live,
//! time-sensitive voice/chat interaction and must always receive some
//! spoken-safe text.

use rescueline_core::answer::AnswerResult;
use rescueline_core::generator::{GenerateRequest, Generator};
use rescueline_core::store::DocumentStore;
use std::sync::Arc;
use tracing::{info, warn};

use crate::context::ContextAssembler;
use crate::prompt::compose_prompt;

/// Fixed answer returned when the generator fails for any reason.
pub const FALLBACK_ANSWER: &str = "I encountered an issue trying to retrieve that \
information. Please rely on official local announcements for now and stay safe.";

/// The retrieval-and-answer pipeline.
///
/// Stateless per call: every query independently re-fetches context and
/// re-invokes the model. Exactly one external call per query — no caching,
/// no retries, no backoff.
pub struct AnswerPipeline {
    assembler: ContextAssembler,
    generator: Arc<dyn Generator>,
    model: String,
    temperature: f32,
    max_output_tokens: Option<u32>,
}

impl AnswerPipeline {
    /// Create a pipeline over injected store and generator handles.
    pub fn new(
        store: Arc<dyn DocumentStore>,
        generator: Arc<dyn Generator>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            assembler: ContextAssembler::new(store),
            generator,
            model: model.into(),
            temperature: 0.4,
            max_output_tokens: None,
        }
    }

    /// Set the sampling temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Cap the generated answer length.
    pub fn with_max_output_tokens(mut self, max: u32) -> Self {
        self.max_output_tokens = Some(max);
        self
    }

    /// Override the context document bound.
    pub fn with_max_documents(mut self, max_documents: usize) -> Self {
        self.assembler = self.assembler.with_max_documents(max_documents);
        self
    }

    /// Answer one query. Never errors.
    pub async fn answer(&self, query: &str) -> AnswerResult {
        let context = self.assembler.assemble(query).await;
        if context.degraded {
            warn!("Answering with degraded context");
        }

        let prompt = compose_prompt(&context.text, query);

        let mut request =
            GenerateRequest::new(&self.model, prompt).with_temperature(self.temperature);
        if let Some(max) = self.max_output_tokens {
            request = request.with_max_output_tokens(max);
        }

        match self.generator.generate(request).await {
            Ok(response) => {
                info!(
                    model = %response.model,
                    answer_len = response.text.len(),
                    context_documents = context.documents_used,
                    "Answer generated"
                );
                AnswerResult::answered(response.text)
            }
            Err(e) => {
                warn!(error = %e, "Generation failed; returning fallback answer");
                AnswerResult::fallback(FALLBACK_ANSWER)
            }
        }
    }

    /// Answer one query as plain displayable text — the surface the request
    /// layer consumes. Never errors, never empty.
    pub async fn answer_query(&self, query: &str) -> String {
        self.answer(query).await.answer_text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::MISSING_CONTEXT_SENTINEL;
    use async_trait::async_trait;
    use rescueline_core::document::StoredDocument;
    use rescueline_core::error::{GeneratorError, StoreError};
    use rescueline_core::generator::GenerateResponse;
    use std::sync::Mutex;

    struct FixedStore {
        documents: Vec<StoredDocument>,
        fail: bool,
    }

    #[async_trait]
    impl DocumentStore for FixedStore {
        fn name(&self) -> &str {
            "fixed"
        }

        async fn insert(&self, _doc: StoredDocument) -> Result<String, StoreError> {
            unimplemented!("not used by pipeline tests")
        }

        async fn fetch_documents(
            &self,
            limit: usize,
        ) -> Result<Vec<StoredDocument>, StoreError> {
            if self.fail {
                return Err(StoreError::Unavailable("store is down".into()));
            }
            let mut docs = self.documents.clone();
            docs.truncate(limit);
            Ok(docs)
        }

        async fn count(&self) -> Result<usize, StoreError> {
            Ok(self.documents.len())
        }
    }

    /// Generator stub that records the prompt it was handed.
    struct CapturingGenerator {
        reply: String,
        fail: bool,
        last_prompt: Mutex<Option<String>>,
    }

    impl CapturingGenerator {
        fn replying(text: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: text.into(),
                fail: false,
                last_prompt: Mutex::new(None),
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                reply: String::new(),
                fail: true,
                last_prompt: Mutex::new(None),
            })
        }

        fn prompt(&self) -> Option<String> {
            self.last_prompt.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Generator for CapturingGenerator {
        fn name(&self) -> &str {
            "capturing"
        }

        async fn generate(
            &self,
            request: GenerateRequest,
        ) -> Result<GenerateResponse, GeneratorError> {
            *self.last_prompt.lock().unwrap() = Some(request.prompt.clone());
            if self.fail {
                return Err(GeneratorError::Timeout("simulated timeout".into()));
            }
            Ok(GenerateResponse {
                text: self.reply.clone(),
                model: request.model,
                usage: None,
            })
        }
    }

    fn store_with(contents: &[&str]) -> Arc<FixedStore> {
        Arc::new(FixedStore {
            documents: contents
                .iter()
                .map(|c| StoredDocument::new("doc.txt", "text/plain", *c))
                .collect(),
            fail: false,
        })
    }

    fn dead_store() -> Arc<FixedStore> {
        Arc::new(FixedStore {
            documents: vec![],
            fail: true,
        })
    }

    #[tokio::test]
    async fn answers_with_retrieved_context() {
        let generator = CapturingGenerator::replying("Yes, after boiling it.");
        let pipeline = AnswerPipeline::new(
            store_with(&["Boil water before drinking."]),
            generator.clone(),
            "mock-model",
        );

        let result = pipeline.answer("Is the water safe?").await;
        assert!(!result.is_fallback);
        assert_eq!(result.answer_text, "Yes, after boiling it.");

        let prompt = generator.prompt().unwrap();
        assert!(prompt.contains("--- Document 1 ---\nBoil water before drinking."));
        assert!(prompt.contains("\"Is the water safe?\""));
    }

    #[tokio::test]
    async fn generator_failure_yields_exact_fallback() {
        let generator = CapturingGenerator::failing();
        let pipeline = AnswerPipeline::new(
            store_with(&["Shelter is open."]),
            generator,
            "mock-model",
        );

        let result = pipeline.answer("Where can I sleep?").await;
        assert!(result.is_fallback);
        assert_eq!(result.answer_text, FALLBACK_ANSWER);
    }

    #[tokio::test]
    async fn store_failure_is_fail_open() {
        let generator = CapturingGenerator::replying("General guidance only.");
        let pipeline = AnswerPipeline::new(dead_store(), generator.clone(), "mock-model");

        let result = pipeline.answer("Is the bridge passable?").await;

        // The generator was still invoked, with the sentinel as context
        let prompt = generator.prompt().unwrap();
        assert!(prompt.starts_with(MISSING_CONTEXT_SENTINEL));
        assert!(!result.is_fallback);
        assert_eq!(result.answer_text, "General guidance only.");
    }

    #[tokio::test]
    async fn both_collaborators_down_still_answers() {
        let pipeline = AnswerPipeline::new(
            dead_store(),
            CapturingGenerator::failing(),
            "mock-model",
        );

        let answer = pipeline.answer_query("Anything?").await;
        assert!(!answer.is_empty());
        assert_eq!(answer, FALLBACK_ANSWER);
    }

    #[tokio::test]
    async fn answer_query_returns_plain_text() {
        let pipeline = AnswerPipeline::new(
            store_with(&["Route 9 is closed."]),
            CapturingGenerator::replying("Route 9 is closed; use Route 12."),
            "mock-model",
        );

        let answer = pipeline.answer_query("Which roads are closed?").await;
        assert_eq!(answer, "Route 9 is closed; use Route 12.");
    }

    #[tokio::test]
    async fn generation_request_carries_configuration() {
        let generator = CapturingGenerator::replying("ok");
        let pipeline = AnswerPipeline::new(store_with(&[]), generator.clone(), "mock-model")
            .with_temperature(0.2)
            .with_max_output_tokens(64)
            .with_max_documents(3);

        let _ = pipeline.answer("hello").await;
        assert!(generator.prompt().is_some());
    }
}
