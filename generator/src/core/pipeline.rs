//! Scout → Coach → Writer → Referee drill pipeline

use std::sync::Arc;

use serde_json::Value;
use tokio::sync::watch;

use shared::logging::ServiceId;
use shared::{service_debug, service_info, service_warn, GenerationRequest, ValidatedDrill};

use crate::config::GeneratorConfig;
use crate::core::parser;
use crate::core::prompt::{compose, ComposedPrompt, PromptContext};
use crate::core::referee::{self, RefereeContext};
use crate::core::stages::{CoachBlueprint, DrillDraft, PipelineState, ScoutConcept, StageArtifact, Verdict};
use crate::core::validator;
use crate::error::{GeneratorError, GeneratorResult, ParseError};
use crate::traits::ModelClient;
use crate::types::{ModelRequest, Stage};

const SERVICE: ServiceId = ServiceId::Generator;

/// Resolves once `cancel` reads `true`. A dropped sender never cancels.
pub(crate) async fn cancelled(cancel: &mut watch::Receiver<bool>) {
    loop {
        if *cancel.borrow_and_update() {
            return;
        }
        if cancel.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

/// Calls the model for one stage, honouring the per-call timeout and the
/// retry policy, and converts the reply with `convert`
pub(crate) async fn call_stage<T, F>(
    client: &dyn ModelClient,
    config: &GeneratorConfig,
    stage: Stage,
    prompt: &ComposedPrompt,
    convert: F,
) -> GeneratorResult<T>
where
    F: Fn(Value) -> Result<T, ParseError>,
{
    let convert = &convert;
    config
        .retry_policy()
        .execute(stage, move |attempt| async move {
            let settings = config.stage(stage);
            let request = ModelRequest {
                stage,
                model: config.model_for(stage).to_string(),
                system: prompt.system.clone(),
                user: prompt.user.clone(),
                temperature: settings.temperature,
                max_tokens: settings.max_tokens,
            };
            service_debug!(SERVICE, stage = %stage, attempt, prompt = %prompt.user, "calling model");

            let response = tokio::time::timeout(config.call_timeout(), client.complete(request))
                .await
                .map_err(|_| GeneratorError::TransientCall {
                    stage,
                    reason: shared::ApiFailure::Timeout,
                })?
                .map_err(|reason| GeneratorError::TransientCall { stage, reason })?;

            service_debug!(
                SERVICE,
                stage = %stage,
                tokens = response.tokens_used(),
                elapsed_ms = response.response_time.as_millis() as u64,
                "model replied"
            );

            parser::parse(&response.content)
                .and_then(convert)
                .map_err(|source| GeneratorError::Parse { stage, source })
        })
        .await
}

/// Turns a validated request into a drill through four model stages
#[derive(Clone)]
pub struct DrillPipeline {
    client: Arc<dyn ModelClient>,
    config: GeneratorConfig,
}

impl DrillPipeline {
    pub fn new(client: Arc<dyn ModelClient>, config: GeneratorConfig) -> Self {
        Self { client, config }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Generate without external cancellation
    pub async fn generate(&self, request: &GenerationRequest, history_summary: Option<&str>) -> GeneratorResult<ValidatedDrill> {
        let (_keep_open, cancel) = watch::channel(false);
        self.generate_with_cancel(request, history_summary, cancel).await
    }

    /// Generate a drill, stopping with [`GeneratorError::Cancelled`] as soon
    /// as `cancel` flips to `true`. The in-flight model call is dropped and no
    /// later stage runs. The whole run is bounded by the drill budget.
    pub async fn generate_with_cancel(
        &self,
        request: &GenerationRequest,
        history_summary: Option<&str>,
        mut cancel: watch::Receiver<bool>,
    ) -> GeneratorResult<ValidatedDrill> {
        validator::validate(request)?;

        let budget = self.config.drill_budget();
        service_info!(
            SERVICE,
            budget_secs = budget.as_secs(),
            focus = request.freeform_text().unwrap_or("selected weaknesses"),
            "🤖 starting drill pipeline"
        );

        tokio::select! {
            biased;
            _ = cancelled(&mut cancel) => {
                service_warn!(SERVICE, "drill generation cancelled");
                Err(GeneratorError::Cancelled)
            }
            outcome = tokio::time::timeout(budget, self.run(request, history_summary)) => {
                outcome.map_err(|_| GeneratorError::Timeout { budget_secs: budget.as_secs() })?
            }
        }
    }

    async fn run(&self, request: &GenerationRequest, history_summary: Option<&str>) -> GeneratorResult<ValidatedDrill> {
        let base = PromptContext::new(request).with_history(history_summary);
        let referee_context = RefereeContext::from_request(request);

        let mut state = PipelineState::Scout;
        loop {
            state = match state {
                PipelineState::Accepted(drill) => {
                    service_info!(SERVICE, name = %drill.name, "✅ drill accepted");
                    return Ok(*drill);
                }
                PipelineState::RejectedFinal(issues) => {
                    service_warn!(SERVICE, issues = issues.len(), "drill rejected after regeneration");
                    return Err(GeneratorError::GenerationFailed { issues });
                }
                current => {
                    let artifact = self.run_stage(&current, &base, &referee_context).await?;
                    current.advance(artifact)?
                }
            };
        }
    }

    async fn run_stage(
        &self,
        state: &PipelineState,
        base: &PromptContext<'_>,
        referee_context: &RefereeContext,
    ) -> GeneratorResult<StageArtifact> {
        match state {
            PipelineState::Scout => {
                let prompt = compose(Stage::Scout, base);
                let concept: ScoutConcept = self.call(Stage::Scout, &prompt, parser::into_shape).await?;
                service_info!(SERVICE, weakness = %concept.primary_weakness, archetype = %concept.drill_archetype, "🔍 scout");
                Ok(StageArtifact::concept(concept))
            }
            PipelineState::Coach { concept } => {
                let prompt = compose(Stage::Coach, &base.with_concept(concept));
                let blueprint: CoachBlueprint = self.call(Stage::Coach, &prompt, parser::into_shape).await?;
                service_info!(SERVICE, pattern = %blueprint.pattern_type, "📐 coach");
                Ok(StageArtifact::blueprint(blueprint))
            }
            PipelineState::Writer {
                concept,
                blueprint,
                revision,
            } => {
                let issues = revision.as_deref().unwrap_or(&[]);
                let context = base.with_concept(concept).with_blueprint(blueprint).with_revision(issues);
                let prompt = compose(Stage::Writer, &context);
                let draft = self.call(Stage::Writer, &prompt, |value| Ok(DrillDraft(value))).await?;
                service_info!(SERVICE, revision = revision.is_some(), "✍️ writer");
                Ok(StageArtifact::draft(draft))
            }
            PipelineState::Referee { concept, draft, .. } => {
                let verdict = self.review(base, concept, draft, referee_context).await?;
                Ok(StageArtifact::verdict(verdict))
            }
            PipelineState::Accepted(_) | PipelineState::RejectedFinal(_) => Err(GeneratorError::InvalidTransition {
                stage: Stage::Referee,
                message: "run already finished".to_string(),
            }),
        }
    }

    /// Programmatic checks first; the model review only sees drafts that pass them
    async fn review(
        &self,
        base: &PromptContext<'_>,
        concept: &ScoutConcept,
        draft: &DrillDraft,
        referee_context: &RefereeContext,
    ) -> GeneratorResult<Verdict> {
        let drill = match referee::check_draft(&draft.0, referee_context) {
            Ok(drill) => drill,
            Err(issues) => {
                service_info!(SERVICE, issues = issues.len(), "⚖️ referee: programmatic rejection");
                return Ok(Verdict::Rejected(issues));
            }
        };

        let prompt = compose(Stage::Referee, &base.with_concept(concept).with_draft(&draft.0));
        let issues = self.call(Stage::Referee, &prompt, referee::interpret_review).await?;

        if issues.is_empty() {
            service_info!(SERVICE, "⚖️ referee: valid");
            Ok(Verdict::Accepted(Box::new(drill)))
        } else {
            service_info!(SERVICE, issues = issues.len(), "⚖️ referee: semantic rejection");
            Ok(Verdict::Rejected(issues))
        }
    }

    async fn call<T, F>(&self, stage: Stage, prompt: &ComposedPrompt, convert: F) -> GeneratorResult<T>
    where
        F: Fn(Value) -> Result<T, ParseError>,
    {
        call_stage(self.client.as_ref(), &self.config, stage, prompt, convert).await
    }
}
