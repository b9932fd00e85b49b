//! Review entry points.
//!
//! [`ReviewService`] ties the validation gate, the pipeline runner and the
//! bridge together. One service is built at startup and shared by every
//! request.

use crate::bridge::{BridgeQueue, ReviewStream, StreamEmitter};
use crate::cancellation::CancellationToken;
use crate::config::{PipelineConfig, ReviewConfig};
use crate::core::{Capability, Envelope};
use crate::errors::ReviewError;
use crate::events::{CollectingMessageSink, EventTranslator, LifecycleEvent};
use crate::pipeline::{Pipeline, PipelineRunner};
use crate::stages::Stage;
use crate::validation::ValidationGate;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Runs design reviews.
#[derive(Debug, Clone)]
pub struct ReviewService {
    runner: PipelineRunner,
    gate: ValidationGate,
    flush_interval: Duration,
    idle_interval: Duration,
}

impl ReviewService {
    /// Creates a service over an already-built pipeline.
    #[must_use]
    pub fn new(pipeline: Arc<Pipeline>, config: &PipelineConfig) -> Self {
        let gate = config.gate();
        Self {
            runner: PipelineRunner::new(pipeline, gate).with_stage_timeout(config.stage_timeout()),
            gate,
            flush_interval: config.flush_interval(),
            idle_interval: config.idle_interval(),
        }
    }

    /// Builds the design-review pipeline from one stage per capability.
    ///
    /// # Errors
    ///
    /// Returns `ReviewError::Pipeline` if the stages do not form a valid
    /// design-review pipeline.
    pub fn from_stages(
        stages: impl IntoIterator<Item = Arc<dyn Stage>>,
        config: &ReviewConfig,
    ) -> Result<Self, ReviewError> {
        let pipeline = Pipeline::design_review(stages, |capability| config.agent_profile(capability))?;
        info!(
            pipeline = %pipeline.name(),
            order = ?pipeline.execution_order(),
            "Pipeline ready"
        );
        Ok(Self::new(Arc::new(pipeline), &config.pipeline))
    }

    /// Starts a review and returns its message stream.
    ///
    /// The pipeline runs on its own task; the returned stream yields one
    /// ndjson line per message and ends after the terminal message. A
    /// document rejected by the pre-flight check yields a single `error`
    /// line and starts no task. Must be called inside a Tokio runtime.
    #[must_use]
    pub fn review_design_document(&self, document: &str) -> ReviewStream {
        let queue = Arc::new(BridgeQueue::new());
        let token = Arc::new(CancellationToken::new());

        match self.gate.validate(document) {
            Ok(input) => {
                let runner = self.runner.clone();
                let (queue, token) = (Arc::clone(&queue), Arc::clone(&token));
                tokio::spawn(async move {
                    let run = runner.run(input, queue.as_ref(), &token).await;
                    debug!(
                        run_id = %run.run_id(),
                        pipeline = %runner.pipeline().name(),
                        status = %run.status(),
                        "Worker finished"
                    );
                });
            }
            Err(failure) => {
                warn!(feedback = %failure.feedback, "Document rejected before review");
                let error = ReviewError::from(failure);
                let message = EventTranslator::new().translate(&LifecycleEvent::PipelineFailed { error: &error });
                queue.push(Envelope::new(0, message));
            }
        }

        StreamEmitter::new(queue, self.flush_interval, self.idle_interval).into_stream(token)
    }

    /// Runs a review to the end and returns the final report.
    ///
    /// # Errors
    ///
    /// Returns the error that ended the run, including pre-flight
    /// validation failures.
    pub async fn review_to_completion(&self, document: &str) -> Result<Option<serde_json::Value>, ReviewError> {
        let input = self.gate.validate(document)?;
        let sink = CollectingMessageSink::new();
        let results = self
            .runner
            .run(input, &sink, &CancellationToken::new())
            .await
            .into_outcome()?;

        Ok(results
            .into_iter()
            .find(|r| r.capability == Capability::Synthesis)
            .and_then(|r| r.payload))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{MessageStatus, MessageType};
    use crate::testing::{assert_single_terminal_last, collect_messages, fixtures, ScriptedStage};
    use crate::validation::TOO_SHORT_FEEDBACK;
    use futures::StreamExt;

    fn fast_config() -> ReviewConfig {
        let mut config = ReviewConfig::default();
        config.pipeline.flush_interval_ms = 0;
        config.pipeline.idle_interval_ms = 1;
        config
    }

    fn service(stages: Vec<Arc<dyn Stage>>) -> ReviewService {
        ReviewService::from_stages(stages, &fast_config()).unwrap()
    }

    #[tokio::test]
    async fn test_short_document_single_error() {
        let stages = fixtures::happy_stages();
        let messages = collect_messages(service(stages).review_design_document(fixtures::SHORT_DOCUMENT)).await;

        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].status, MessageStatus::Error);
        assert!(messages[0].message.as_deref().unwrap().contains(TOO_SHORT_FEEDBACK));
    }

    #[tokio::test]
    async fn test_short_document_never_invokes_stages() {
        let first = Arc::new(ScriptedStage::ok(Capability::DocumentUnderstanding));
        let mut stages = fixtures::happy_stages();
        stages[0] = first.clone();

        let _ = collect_messages(service(stages).review_design_document(fixtures::SHORT_DOCUMENT)).await;
        assert_eq!(first.call_count(), 0);
    }

    #[tokio::test]
    async fn test_stream_ends_with_completed() {
        let messages =
            collect_messages(service(fixtures::happy_stages()).review_design_document(fixtures::SAMPLE_DOCUMENT))
                .await;

        assert_eq!(messages.len(), 9);
        assert_single_terminal_last(&messages);
        assert_eq!(messages[8].message_type, MessageType::Completed);
    }

    #[tokio::test]
    async fn test_configured_agent_names_reach_stream() {
        let mut config = fast_config();
        config.agents.insert(
            Capability::DocumentUnderstanding,
            crate::config::AgentConfig {
                display_name: Some("Archivist".to_string()),
                ..Default::default()
            },
        );
        let service = ReviewService::from_stages(fixtures::happy_stages(), &config).unwrap();

        let mut stream = service.review_design_document(fixtures::SAMPLE_DOCUMENT);
        let first = stream.next().await.unwrap();
        assert!(first.contains("\"agent\":\"Archivist\""));
    }

    #[tokio::test]
    async fn test_missing_stage_rejected() {
        let mut stages = fixtures::happy_stages();
        stages.remove(0);

        let err = ReviewService::from_stages(stages, &fast_config()).unwrap_err();
        assert!(matches!(err, ReviewError::Pipeline(_)));
    }

    #[tokio::test]
    async fn test_review_to_completion_returns_report() {
        let report = service(fixtures::happy_stages())
            .review_to_completion(fixtures::SAMPLE_DOCUMENT)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(report["data_available"], true);
    }

    #[tokio::test]
    async fn test_review_to_completion_validation_errors() {
        let err = service(fixtures::happy_stages())
            .review_to_completion(fixtures::SHORT_DOCUMENT)
            .await
            .unwrap_err();
        assert!(err.is_validation());

        let mut stages = fixtures::happy_stages();
        stages[0] = Arc::new(ScriptedStage::invalid_blueprint(&["no components described"]));
        let err = service(stages)
            .review_to_completion(fixtures::SAMPLE_DOCUMENT)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "no components described");
    }

    #[tokio::test]
    async fn test_dropping_stream_cancels_worker() {
        let slow = Arc::new(ScriptedStage::slow(
            Capability::PerformanceReview,
            Duration::from_secs(30),
        ));
        let security = Arc::new(ScriptedStage::ok(Capability::SecurityReview));
        let mut stages = fixtures::happy_stages();
        stages[1] = slow.clone();
        stages[2] = security.clone();

        let mut stream = service(stages).review_design_document(fixtures::SAMPLE_DOCUMENT);
        for _ in 0..3 {
            stream.next().await.unwrap();
        }
        drop(stream);
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert!(slow.call_count() <= 1);
        assert_eq!(security.call_count(), 0);
    }
}
