//! Diagnosis requester stage.

use std::sync::Arc;

use pipeline::{
    prompt::render_diagnosis_prompt, CompletionRequest, Diagnosis, FailureContext, LlmError,
    LlmProvider, LogExcerpt, PipelineError,
};
use tracing::{info, instrument, warn};

/// Asks the model for a diagnosis of one failure.
pub struct DiagnosisRequester {
    provider: Arc<dyn LlmProvider>,
}

impl DiagnosisRequester {
    pub fn new(provider: Arc<dyn LlmProvider>) -> Self {
        Self { provider }
    }

    /// Sends one completion request and returns the model text verbatim.
    ///
    /// A refusal becomes [`PipelineError::Blocked`]; every other provider
    /// failure becomes [`PipelineError::Inference`].
    #[instrument(
        name = "diagnose",
        skip_all,
        fields(
            model = %self.provider.model(),
            excerpt_chars = excerpt.text().chars().count(),
            truncated = excerpt.is_truncated(),
        )
    )]
    pub async fn diagnose(
        &self,
        context: &FailureContext,
        excerpt: &LogExcerpt,
    ) -> Result<Diagnosis, PipelineError> {
        let prompt = render_diagnosis_prompt(context, excerpt);
        let completion = self
            .provider
            .complete(CompletionRequest { prompt })
            .await
            .map_err(|error| {
                if let LlmError::Blocked { reason } = &error {
                    warn!(%reason, "model refused the prompt");
                }
                PipelineError::from(error)
            })?;

        info!(
            chars = completion.text.chars().count(),
            finish_reason = completion.finish_reason.as_deref().unwrap_or("unknown"),
            "diagnosis generated"
        );
        Ok(Diagnosis {
            text: completion.text,
            model: self.provider.model().clone(),
        })
    }
}
