//! Delivery resolver stage.
//!
//! Turns a [`DeliveryPlan`] into exactly one [`DeliveryTarget`] and performs
//! exactly one write against it. The tracking-issue probe is the only read;
//! a 404 from the probe selects a new issue, and any other probe failure
//! aborts before anything is written.

use std::sync::Arc;

use pipeline::{
    prompt::new_issue_title, DeliveryPlan, DeliveryReceipt, DeliveryTarget, FailureContext,
    IssueProbe, IssueTracker, PipelineError,
};
use tracing::{info, instrument, warn};

pub struct DeliveryResolver {
    tracker: Arc<dyn IssueTracker>,
}

impl DeliveryResolver {
    pub fn new(tracker: Arc<dyn IssueTracker>) -> Self {
        Self { tracker }
    }

    /// Resolves the plan to a target, probing the tracking issue if needed.
    #[instrument(name = "resolve_target", skip_all, fields(repo = %context.repository))]
    pub async fn resolve(
        &self,
        context: &FailureContext,
        plan: DeliveryPlan,
    ) -> Result<DeliveryTarget, PipelineError> {
        let target = match plan {
            DeliveryPlan::PullRequest(number) => DeliveryTarget::PullRequestThread { number },
            DeliveryPlan::TrackingIssue(number) => {
                let probe = IssueProbe::classify(
                    self.tracker.get_issue(&context.repository, number).await,
                )?;
                if probe == IssueProbe::NotFound {
                    warn!(issue = %number, "tracking issue not found; a new issue will be created");
                }
                DeliveryTarget::from_probe(number, &probe, new_issue_title(context))
            }
        };

        info!(destination = %target, kind = target.kind(), "resolved delivery target");
        Ok(target)
    }

    /// Posts `body` to `target` with a single comment or issue-creation call.
    #[instrument(name = "deliver", skip_all, fields(repo = %context.repository))]
    pub async fn deliver(
        &self,
        context: &FailureContext,
        target: DeliveryTarget,
        body: &str,
    ) -> Result<DeliveryReceipt, PipelineError> {
        let repo = &context.repository;
        let (number, html_url) = match &target {
            DeliveryTarget::PullRequestThread { number } => {
                let issue = number.as_issue_number();
                let comment = self.tracker.create_comment(repo, issue, body).await?;
                (issue, comment.html_url)
            }
            DeliveryTarget::ExistingIssue { number } => {
                let comment = self.tracker.create_comment(repo, *number, body).await?;
                (*number, comment.html_url)
            }
            DeliveryTarget::NewIssue { title } => {
                let issue = self.tracker.create_issue(repo, title, body).await?;
                (issue.number, issue.html_url)
            }
        };

        info!(
            destination = %target,
            kind = target.kind(),
            number = %number,
            url = html_url.as_deref().unwrap_or("-"),
            "diagnosis delivered"
        );
        Ok(DeliveryReceipt {
            target,
            number,
            html_url,
        })
    }
}
