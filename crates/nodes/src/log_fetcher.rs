//! Log fetcher stage.

use std::sync::Arc;

use pipeline::{
    FailureContext, JobLogSource, JobSummary, LogFetchStrategy, LogLocation, PipelineError,
};
use tracing::{debug, info, instrument};

/// Resolves a failed job to the full text of its log.
pub struct LogFetcher {
    source: Arc<dyn JobLogSource>,
    strategy: LogFetchStrategy,
}

impl LogFetcher {
    pub fn new(source: Arc<dyn JobLogSource>, strategy: LogFetchStrategy) -> Self {
        Self { source, strategy }
    }

    /// Fetches the log of `context.job_id`.
    ///
    /// With [`LogFetchStrategy::ListRunJobs`] the run's job listing is
    /// searched first and a missing job is [`PipelineError::JobNotFound`].
    /// With [`LogFetchStrategy::DirectJobLog`] the log is requested by job id.
    #[instrument(
        name = "fetch_log",
        skip_all,
        fields(
            repo = %context.repository,
            run_id = %context.run_id,
            job_id = %context.job_id,
            strategy = %self.strategy,
        )
    )]
    pub async fn fetch(&self, context: &FailureContext) -> Result<String, PipelineError> {
        let location = match self.strategy {
            LogFetchStrategy::ListRunJobs => {
                LogLocation::JobApiUrl(self.find_job(context).await?.url)
            }
            LogFetchStrategy::DirectJobLog => LogLocation::JobId(context.job_id.clone()),
        };

        let log = self
            .source
            .download_log(&context.repository, &location)
            .await?;
        info!(bytes = log.len(), "fetched job log");
        Ok(log)
    }

    /// Walks the run's job listing until the job turns up or the listing is
    /// exhausted.
    async fn find_job(&self, context: &FailureContext) -> Result<JobSummary, PipelineError> {
        let page_size = u64::from(self.source.page_size().max(1));
        let mut page = 1_u32;
        let mut seen = 0_u64;

        loop {
            let listing = self
                .source
                .list_run_jobs(&context.repository, context.run_id, page)
                .await?;
            let count = listing.jobs.len() as u64;
            seen = seen.saturating_add(count);

            if let Some(job) = listing
                .jobs
                .into_iter()
                .find(|job| job.id == context.job_id)
            {
                debug!(page, job_name = %job.name, "located job in run listing");
                return Ok(job);
            }

            if count < page_size || seen >= listing.total_count {
                break;
            }
            page = page.saturating_add(1);
        }

        Err(PipelineError::JobNotFound {
            job_id: context.job_id.clone(),
            run_id: context.run_id,
        })
    }
}
