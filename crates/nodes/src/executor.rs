//! Pipeline executor.
//!
//! Drives one failure end to end: plan the destination, fetch the log, reduce
//! it, request a diagnosis, resolve the target, and post once. Nothing is
//! retried and nothing is persisted; a failure after the diagnosis is
//! generated loses the diagnosis.

use pipeline::{
    excerpt, prompt::render_report, DeliveryOutcome, DeliveryPlan, FailureContext, IssueNumber,
    LogBudget, PipelineError, PullRequestAssociation, Timestamp,
};
use tracing::{info, instrument};

use crate::{DeliveryResolver, DiagnosisRequester, LogFetcher};

/// Per-invocation settings of the executor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutorSettings {
    /// Character budget of the log excerpt handed to the model.
    pub log_budget: LogBudget,
    /// Issue that collects failures not tied to a pull request.
    pub tracking_issue: Option<IssueNumber>,
}

impl Default for ExecutorSettings {
    fn default() -> Self {
        Self {
            log_budget: LogBudget::DEFAULT,
            tracking_issue: None,
        }
    }
}

pub struct PipelineExecutor {
    fetcher: LogFetcher,
    requester: DiagnosisRequester,
    resolver: DeliveryResolver,
    settings: ExecutorSettings,
    clock: fn() -> Timestamp,
}

impl PipelineExecutor {
    pub fn new(
        fetcher: LogFetcher,
        requester: DiagnosisRequester,
        resolver: DeliveryResolver,
        settings: ExecutorSettings,
    ) -> Self {
        Self {
            fetcher,
            requester,
            resolver,
            settings,
            clock: Timestamp::now,
        }
    }

    /// Replaces the clock used to stamp reports.
    pub fn with_clock(mut self, clock: fn() -> Timestamp) -> Self {
        self.clock = clock;
        self
    }

    /// Runs the pipeline for one failure.
    ///
    /// Returns [`DeliveryOutcome::NoDestination`] without any network call
    /// when there is neither an associated pull request nor a tracking issue.
    #[instrument(
        name = "triage",
        skip_all,
        fields(
            repo = %context.repository,
            workflow = %context.workflow_name,
            run_id = %context.run_id,
            job_id = %context.job_id,
        )
    )]
    pub async fn run(
        &self,
        context: &FailureContext,
        association: PullRequestAssociation,
    ) -> Result<DeliveryOutcome, PipelineError> {
        let Some(plan) = DeliveryPlan::decide(association, self.settings.tracking_issue) else {
            info!("no associated pull request and no tracking issue configured; nothing to deliver");
            return Ok(DeliveryOutcome::NoDestination);
        };
        info!(?plan, "delivery planned");

        let raw_log = self.fetcher.fetch(context).await?;
        let excerpt = excerpt::reduce(&raw_log, self.settings.log_budget);
        drop(raw_log);
        if excerpt.is_truncated() {
            info!(
                original_bytes = excerpt.original_len(),
                budget = %self.settings.log_budget,
                "log truncated to its tail"
            );
        }

        let diagnosis = self.requester.diagnose(context, &excerpt).await?;
        let body = render_report(context, &excerpt, &diagnosis, (self.clock)());

        let target = self.resolver.resolve(context, plan).await?;
        let receipt = self.resolver.deliver(context, target, &body).await?;
        Ok(DeliveryOutcome::Delivered(receipt))
    }
}
