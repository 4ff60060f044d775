//! Request pipeline for the chat endpoint
//!
//! A query is classified first; greetings and off-topic questions get a fixed
//! reply without touching the store or the completion service. Everything
//! else is retrieved, assembled into context and handed to the generator.


pub mod classifier;
pub mod context;
pub mod retriever;

pub use classifier::QueryClassifier;
pub use context::assemble_context;
pub use retriever::{Retrieval, RetrievedPart, Retriever};

use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::completion::{CompletionClient, CompletionOutcome, build_messages};
use crate::{PartsError, Result};

pub const GREETING_REPLY: &str =
    "Hello! How can I help you with refrigerator or dishwasher parts today?";

pub const OUT_OF_SCOPE_REPLY: &str =
    "I can assist only with refrigerator and dishwasher parts. Please ask a relevant question!";

#[inline]
pub fn exact_match_prefix(part_number: &str) -> String {
    format!("I found an exact match for part number {}.\n\n", part_number)
}

/// Shared, immutable request handler. Cloning is cheap.
#[derive(Clone)]
pub struct Assistant {
    classifier: Arc<QueryClassifier>,
    retriever: Retriever,
    completion: Arc<dyn CompletionClient>,
}

impl Assistant {
    #[inline]
    pub fn new(
        classifier: QueryClassifier,
        retriever: Retriever,
        completion: Arc<dyn CompletionClient>,
    ) -> Self {
        Self {
            classifier: Arc::new(classifier),
            retriever,
            completion,
        }
    }

    /// Answer one query. Every outcome, including collaborator failures,
    /// ends as reply text.
    #[inline]
    pub async fn answer(&self, query: &str) -> String {
        let query = query.trim();
        if self.classifier.is_greeting(query) {
            debug!("Greeting detected");
            return GREETING_REPLY.to_string();
        }

        let part_number = self.classifier.extract_part_number(query);
        if part_number.is_none() && self.classifier.is_out_of_scope(query) {
            info!("Query rejected as out of scope");
            return OUT_OF_SCOPE_REPLY.to_string();
        }

        match self.answer_in_scope(query, part_number.as_deref()).await {
            Ok(reply) => reply,
            Err(e) => {
                error!("Failed to answer query: {}", e);
                format!("Backend error: {}", e)
            }
        }
    }

    async fn answer_in_scope(&self, query: &str, part_number: Option<&str>) -> Result<String> {
        let retrieval = self.retriever.retrieve(query, part_number).await?;
        if retrieval.is_empty() {
            info!("No parts retrieved; answering from an empty context");
        }
        let context = assemble_context(&retrieval.parts);
        debug!("Context for generation:\n{}", context);

        let outcome = self.generate(&context, query).await?;

        Ok(match outcome {
            CompletionOutcome::Completed(reply) => match &retrieval.exact_match {
                Some(part_number) => format!("{}{}", exact_match_prefix(part_number), reply),
                None => reply,
            },
            CompletionOutcome::ServiceError(message) => {
                warn!("Completion service reported an error: {}", message);
                format!("Completion service error: {}", message)
            }
            CompletionOutcome::Unexpected(payload) => {
                warn!("Unexpected completion response: {}", payload);
                format!("Unexpected response: {}", payload)
            }
            CompletionOutcome::Transport(message) => {
                error!("Completion request failed: {}", message);
                format!("Backend error: {}", message)
            }
        })
    }

    async fn generate(&self, context: &str, query: &str) -> Result<CompletionOutcome> {
        let completion = Arc::clone(&self.completion);
        let messages = build_messages(context, query);

        tokio::task::spawn_blocking(move || completion.complete(&messages))
            .await
            .map_err(|e| PartsError::Completion(format!("Completion task failed: {}", e)))
    }
}
