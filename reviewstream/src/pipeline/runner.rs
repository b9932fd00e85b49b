//! Sequential pipeline execution.

use super::{Pipeline, PipelineRun, StageSpec};
use crate::cancellation::CancellationToken;
use crate::core::{Capability, Envelope};
use crate::errors::{ReviewError, StageExecutionFailure};
use crate::events::{EventTranslator, Interpretation, LifecycleEvent, MessageSink};
use crate::observability::{record_stage, SpanTimer};
use crate::stages::{StageContext, StageOutput};
use crate::validation::{ValidatedInput, ValidationGate};
use chrono::Utc;
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, info_span, warn, Instrument};

/// Runs a pipeline to completion, reporting every lifecycle event to a sink.
///
/// Stages run one at a time in dependency order. Every failure inside a run
/// ends in exactly one terminal `error` message; nothing is raised to the
/// caller.
#[derive(Debug, Clone)]
pub struct PipelineRunner {
    pipeline: Arc<Pipeline>,
    gate: ValidationGate,
    translator: EventTranslator,
    stage_timeout: Option<Duration>,
}

impl PipelineRunner {
    /// Creates a runner with no stage deadline.
    #[must_use]
    pub fn new(pipeline: Arc<Pipeline>, gate: ValidationGate) -> Self {
        Self {
            pipeline,
            gate,
            translator: EventTranslator::new(),
            stage_timeout: None,
        }
    }

    /// Bounds each stage invocation. `None` disables the deadline.
    #[must_use]
    pub fn with_stage_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.stage_timeout = timeout;
        self
    }

    /// Returns the pipeline.
    #[must_use]
    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    /// Executes the pipeline for one validated input.
    ///
    /// Returns the finished run. Its status is `completed` or `failed`.
    pub async fn run(
        &self,
        input: ValidatedInput,
        sink: &dyn MessageSink,
        token: &CancellationToken,
    ) -> PipelineRun {
        let mut run = PipelineRun::new(input);
        let span = info_span!(
            "review_run",
            run_id = %run.run_id(),
            pipeline = %self.pipeline.name(),
        );

        self.execute(&mut run, sink, token).instrument(span).await;
        run
    }

    async fn execute(&self, run: &mut PipelineRun, sink: &dyn MessageSink, token: &CancellationToken) {
        let timer = SpanTimer::start(self.pipeline.name());
        run.start();
        info!(stages = self.pipeline.stage_count(), "Review started");

        match self.run_stages(run, sink, token).await {
            Ok(()) => {
                let report = run.result(Capability::Synthesis).cloned();
                self.emit(
                    run,
                    sink,
                    &LifecycleEvent::PipelineCompleted {
                        pipeline: self.pipeline.name(),
                        report: report.as_ref(),
                    },
                );
                run.complete();
                info!(
                    pipeline = timer.name(),
                    messages = run.peek_sequence(),
                    duration_ms = timer.elapsed_ms(),
                    "Review completed"
                );
            }
            Err(err) => {
                match &err {
                    ReviewError::Validation(failure) => {
                        warn!(feedback = %failure.feedback, "Review aborted by validation gate");
                    }
                    ReviewError::Cancelled(reason) => info!(reason = %reason, "Review cancelled"),
                    ReviewError::StageExecution(failure) => error!(
                        stage = %failure.stage,
                        retryable = failure.retryable,
                        error = %failure.message,
                        "Stage failed"
                    ),
                    other => error!(error = %other, "Review failed"),
                }
                self.emit(run, sink, &LifecycleEvent::PipelineFailed { error: &err });
                run.fail(err);
                debug!(duration_ms = timer.elapsed_ms(), "Review finished with failure");
            }
        }
    }

    async fn run_stages(
        &self,
        run: &mut PipelineRun,
        sink: &dyn MessageSink,
        token: &CancellationToken,
    ) -> Result<(), ReviewError> {
        for spec in self.pipeline.stages() {
            if token.is_cancelled() {
                return Err(cancelled(token));
            }

            self.emit(run, sink, &LifecycleEvent::StageStarted { profile: &spec.profile });

            let ctx = StageContext::new(
                run.run_id(),
                spec.capability,
                run.input(),
                run.results(),
                &spec.dependencies,
            );
            let started_at = Utc::now();
            let output = self.invoke(spec, &ctx, token).await?;
            debug!(
                stage = %spec.profile.display_name,
                raw_len = output.as_text().map(str::len),
                "Stage returned"
            );

            let Interpretation { result, degradation } =
                self.translator
                    .interpret(spec.capability, &spec.profile, started_at, output);
            if let Some(degradation) = &degradation {
                warn!(
                    capability = %degradation.capability,
                    reason = %degradation.reason,
                    "Stage output degraded; forwarding without report"
                );
            }
            record_stage(&result, degradation.is_some());

            self.emit(run, sink, &LifecycleEvent::StageCompleted { result: &result });

            let check = self.gate.check_extraction(&result);
            run.record(result);
            check?;
        }

        Ok(())
    }

    /// Invokes one stage under the deadline, racing it against cancellation.
    async fn invoke(
        &self,
        spec: &StageSpec,
        ctx: &StageContext,
        token: &CancellationToken,
    ) -> Result<StageOutput, ReviewError> {
        let stage_name = &spec.profile.display_name;
        let invocation = AssertUnwindSafe(spec.stage.invoke(ctx))
            .catch_unwind()
            .map(|outcome| match outcome {
                Ok(result) => result.map_err(ReviewError::from),
                Err(panic) => Err(StageExecutionFailure::new(stage_name, panic_message(&*panic)).into()),
            });

        let bounded = async {
            match self.stage_timeout {
                Some(limit) => tokio::time::timeout(limit, invocation).await.unwrap_or_else(|_| {
                    Err(ReviewError::StageTimeout {
                        stage: stage_name.clone(),
                        timeout: limit,
                    })
                }),
                None => invocation.await,
            }
        };

        tokio::select! {
            biased;
            () = token.cancelled() => Err(cancelled(token)),
            outcome = bounded => outcome,
        }
    }

    fn emit(&self, run: &mut PipelineRun, sink: &dyn MessageSink, event: &LifecycleEvent<'_>) {
        let message = self.translator.translate(event);
        let sequence = run.next_sequence();
        debug!(sequence, event = event.name(), "Emitting message");

        match (sink.deliver(Envelope::new(sequence, message)), event.is_terminal()) {
            (false, _) => debug!(sequence, event = event.name(), "Consumer detached; message dropped"),
            (true, true) => debug!(sequence, event = event.name(), "Terminal message delivered"),
            (true, false) => {}
        }
    }
}

fn cancelled(token: &CancellationToken) -> ReviewError {
    ReviewError::Cancelled(token.reason().unwrap_or_else(|| "cancelled".to_string()))
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    panic
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| panic.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "stage panicked".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{MessageStatus, MessageType, RunStatus};
    use crate::events::CollectingMessageSink;
    use crate::stages::{AgentProfile, Stage};
    use crate::testing::{fixtures, ScriptedStage};

    fn runner(stages: Vec<Arc<dyn Stage>>) -> PipelineRunner {
        let pipeline = Pipeline::design_review(stages, AgentProfile::for_capability).unwrap();
        PipelineRunner::new(Arc::new(pipeline), ValidationGate::default())
    }

    fn input() -> ValidatedInput {
        ValidationGate::default().validate(fixtures::SAMPLE_DOCUMENT).unwrap()
    }

    #[tokio::test]
    async fn test_sequences_are_contiguous() {
        let sink = CollectingMessageSink::new();
        let run = runner(fixtures::happy_stages())
            .run(input(), &sink, &CancellationToken::new())
            .await;

        assert_eq!(run.status(), RunStatus::Completed);
        let sequences: Vec<u64> = sink.envelopes().iter().map(|e| e.sequence).collect();
        assert_eq!(sequences, (0..9).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn test_stage_timeout() {
        let mut stages = fixtures::happy_stages();
        stages[1] = Arc::new(ScriptedStage::slow(
            Capability::PerformanceReview,
            Duration::from_secs(30),
        ));
        let sink = CollectingMessageSink::new();

        let run = runner(stages)
            .with_stage_timeout(Some(Duration::from_millis(20)))
            .run(input(), &sink, &CancellationToken::new())
            .await;

        assert!(matches!(run.error(), Some(ReviewError::StageTimeout { .. })));
        let terminal = sink.terminal().unwrap();
        assert_eq!(terminal.status, MessageStatus::Error);
        assert_eq!(
            terminal.message.as_deref(),
            Some("Error occurred during review: Stage 'Performance Architect' timed out after 20ms")
        );
    }

    #[derive(Debug)]
    struct OffloadedStage;

    #[async_trait::async_trait]
    impl Stage for OffloadedStage {
        fn capability(&self) -> Capability {
            Capability::DocumentUnderstanding
        }

        async fn invoke(&self, _ctx: &StageContext) -> Result<StageOutput, StageExecutionFailure> {
            tokio::task::spawn_blocking(|| std::thread::sleep(Duration::from_millis(500)))
                .await
                .map_err(|e| StageExecutionFailure::new("Librarian", e.to_string()))?;
            Ok(StageOutput::Structured(fixtures::valid_blueprint()))
        }
    }

    #[tokio::test]
    async fn test_deadline_fires_while_blocking_work_is_offloaded() {
        let mut stages = fixtures::happy_stages();
        stages[0] = Arc::new(OffloadedStage);
        let sink = CollectingMessageSink::new();
        let started = std::time::Instant::now();

        let run = runner(stages)
            .with_stage_timeout(Some(Duration::from_millis(20)))
            .run(input(), &sink, &CancellationToken::new())
            .await;

        assert!(started.elapsed() < Duration::from_millis(400));
        assert!(matches!(run.error(), Some(ReviewError::StageTimeout { .. })));
    }

    #[tokio::test]
    async fn test_cancelled_before_start() {
        let token = CancellationToken::new();
        token.cancel("client disconnected");
        let sink = CollectingMessageSink::new();

        let run = runner(fixtures::happy_stages()).run(input(), &sink, &token).await;

        assert_eq!(run.status(), RunStatus::Failed);
        assert!(run.results().is_empty());
        assert_eq!(sink.messages().len(), 1);
        assert_eq!(sink.messages()[0].message_type, MessageType::Error);
    }

    #[tokio::test]
    async fn test_cancel_interrupts_inflight_stage() {
        let mut stages = fixtures::happy_stages();
        stages[0] = Arc::new(ScriptedStage::slow(
            Capability::DocumentUnderstanding,
            Duration::from_secs(30),
        ));
        let token = Arc::new(CancellationToken::new());
        let sink = Arc::new(CollectingMessageSink::new());

        let handle = {
            let (token, sink) = (Arc::clone(&token), Arc::clone(&sink));
            let runner = runner(stages);
            tokio::spawn(async move { runner.run(input(), sink.as_ref(), &token).await })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        token.cancel("client disconnected");

        let run = tokio::time::timeout(Duration::from_secs(2), handle)
            .await
            .expect("runner should stop")
            .unwrap();
        assert!(matches!(run.error(), Some(ReviewError::Cancelled(_))));
        assert_eq!(sink.len(), 2);
    }

    #[tokio::test]
    async fn test_panicking_stage_becomes_error_message() {
        let mut stages = fixtures::happy_stages();
        stages[2] = Arc::new(ScriptedStage::panicking(Capability::SecurityReview, "boom"));
        let sink = CollectingMessageSink::new();

        let run = runner(stages).run(input(), &sink, &CancellationToken::new()).await;

        assert_eq!(run.status(), RunStatus::Failed);
        assert_eq!(
            sink.terminal().unwrap().message.as_deref(),
            Some("Error occurred during review: Stage 'Security Architect' failed: boom")
        );
    }

    #[tokio::test]
    async fn test_detached_sink_does_not_stop_run() {
        #[derive(Debug)]
        struct Detached;
        impl MessageSink for Detached {
            fn deliver(&self, _envelope: Envelope) -> bool {
                false
            }
        }

        let run = runner(fixtures::happy_stages())
            .run(input(), &Detached, &CancellationToken::new())
            .await;

        assert_eq!(run.status(), RunStatus::Completed);
        assert_eq!(run.results().len(), 4);
    }

    #[test]
    fn test_panic_message() {
        let boxed: Box<dyn std::any::Any + Send> = Box::new("static");
        assert_eq!(panic_message(&*boxed), "static");

        let boxed: Box<dyn std::any::Any + Send> = Box::new(String::from("owned"));
        assert_eq!(panic_message(&*boxed), "owned");

        let boxed: Box<dyn std::any::Any + Send> = Box::new(42);
        assert_eq!(panic_message(&*boxed), "stage panicked");
    }
}
