//! In-memory fakes for the port traits, recording every call they receive.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use nodes::{DeliveryResolver, DiagnosisRequester, ExecutorSettings, LogFetcher, PipelineExecutor};
use pipeline::{
    CommentRecord, Completion, CompletionRequest, FailureContext, HostError, IssueNumber,
    IssueRecord, IssueTracker, JobId, JobLogSource, JobPage, JobSummary, LlmError, LlmProvider,
    LogFetchStrategy, LogLocation, ModelName, RepositoryId, RunId, Timestamp,
};

pub const JOB_ID: u64 = 5001;
pub const RUN_ID: u64 = 900;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostCall {
    ListJobs { page: u32 },
    DownloadLog(LogLocation),
    GetIssue(u64),
    CreateComment { number: u64, body: String },
    CreateIssue { title: String, body: String },
}

pub struct FakeHost {
    pub job_pages: Vec<JobPage>,
    pub page_size: u32,
    pub log: Result<String, HostError>,
    pub issue: Result<IssueRecord, HostError>,
    pub comment_error: Option<HostError>,
    pub calls: Mutex<Vec<HostCall>>,
}

impl Default for FakeHost {
    fn default() -> Self {
        Self {
            job_pages: vec![JobPage {
                total_count: 2,
                jobs: vec![job(4000, "lint"), job(JOB_ID, "test")],
            }],
            page_size: 100,
            log: Ok("step 1\nstep 2\nerror[E0425]: cannot find value `x`\n".to_string()),
            issue: Ok(issue(1)),
            comment_error: None,
            calls: Mutex::new(Vec::new()),
        }
    }
}

impl FakeHost {
    pub fn calls(&self) -> Vec<HostCall> {
        self.calls.lock().expect("calls lock").clone()
    }

    pub fn count(&self, predicate: impl Fn(&HostCall) -> bool) -> usize {
        self.calls().iter().filter(|call| predicate(call)).count()
    }

    pub fn writes(&self) -> usize {
        self.count(|call| {
            matches!(
                call,
                HostCall::CreateComment { .. } | HostCall::CreateIssue { .. }
            )
        })
    }

    fn record(&self, call: HostCall) {
        self.calls.lock().expect("calls lock").push(call);
    }
}

#[async_trait]
impl JobLogSource for FakeHost {
    fn page_size(&self) -> u32 {
        self.page_size
    }

    async fn list_run_jobs(
        &self,
        _repo: &RepositoryId,
        _run: RunId,
        page: u32,
    ) -> Result<JobPage, HostError> {
        self.record(HostCall::ListJobs { page });
        Ok(self
            .job_pages
            .get(page as usize - 1)
            .cloned()
            .unwrap_or(JobPage {
                total_count: 0,
                jobs: Vec::new(),
            }))
    }

    async fn download_log(
        &self,
        _repo: &RepositoryId,
        location: &LogLocation,
    ) -> Result<String, HostError> {
        self.record(HostCall::DownloadLog(location.clone()));
        self.log.clone()
    }
}

#[async_trait]
impl IssueTracker for FakeHost {
    async fn get_issue(
        &self,
        _repo: &RepositoryId,
        number: IssueNumber,
    ) -> Result<IssueRecord, HostError> {
        self.record(HostCall::GetIssue(number.as_u64()));
        self.issue.clone()
    }

    async fn create_comment(
        &self,
        _repo: &RepositoryId,
        number: IssueNumber,
        body: &str,
    ) -> Result<CommentRecord, HostError> {
        self.record(HostCall::CreateComment {
            number: number.as_u64(),
            body: body.to_string(),
        });
        match &self.comment_error {
            Some(error) => Err(error.clone()),
            None => Ok(CommentRecord {
                id: 1,
                html_url: Some(format!(
                    "https://github.example/octo/widgets/issues/{number}#issuecomment-1"
                )),
            }),
        }
    }

    async fn create_issue(
        &self,
        _repo: &RepositoryId,
        title: &str,
        body: &str,
    ) -> Result<IssueRecord, HostError> {
        self.record(HostCall::CreateIssue {
            title: title.to_string(),
            body: body.to_string(),
        });
        Ok(IssueRecord {
            number: IssueNumber::new(321),
            title: title.to_string(),
            state: Some("open".to_string()),
            html_url: Some("https://github.example/octo/widgets/issues/321".to_string()),
        })
    }
}

pub struct FakeModel {
    pub model: ModelName,
    pub answer: Result<String, LlmError>,
    prompts: Mutex<Vec<String>>,
}

impl FakeModel {
    pub fn answering(text: &str) -> Self {
        Self::with(Ok(text.to_string()))
    }

    pub fn failing(error: LlmError) -> Self {
        Self::with(Err(error))
    }

    fn with(answer: Result<String, LlmError>) -> Self {
        Self {
            model: ModelName::new("fake-model").expect("model name"),
            answer,
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().expect("prompts lock").clone()
    }
}

#[async_trait]
impl LlmProvider for FakeModel {
    fn model(&self) -> &ModelName {
        &self.model
    }

    async fn complete(&self, request: CompletionRequest) -> Result<Completion, LlmError> {
        self.prompts
            .lock()
            .expect("prompts lock")
            .push(request.prompt);
        self.answer.clone().map(|text| Completion {
            text,
            finish_reason: Some("STOP".to_string()),
        })
    }
}

pub fn job(id: u64, name: &str) -> JobSummary {
    JobSummary {
        id: JobId::from(id),
        name: name.to_string(),
        url: format!("https://api.github.example/repos/octo/widgets/actions/jobs/{id}"),
        conclusion: Some("failure".to_string()),
    }
}

pub fn issue(number: u64) -> IssueRecord {
    IssueRecord {
        number: IssueNumber::new(number),
        title: "CI failure log".to_string(),
        state: Some("open".to_string()),
        html_url: None,
    }
}

pub fn context() -> FailureContext {
    FailureContext {
        repository: RepositoryId::new("octo/widgets").expect("repo"),
        workflow_name: "build".to_string(),
        run_id: RunId::new(RUN_ID),
        job_id: JobId::from(JOB_ID),
        job_name: "test".to_string(),
        run_url: "https://github.example/octo/widgets/actions/runs/900".to_string(),
    }
}

pub fn fixed_clock() -> Timestamp {
    Timestamp::from_utc(
        Utc.with_ymd_and_hms(2024, 5, 1, 8, 9, 10)
            .single()
            .expect("valid date"),
    )
}

pub fn executor(
    host: &Arc<FakeHost>,
    model: &Arc<FakeModel>,
    settings: ExecutorSettings,
) -> PipelineExecutor {
    PipelineExecutor::new(
        LogFetcher::new(host.clone(), LogFetchStrategy::ListRunJobs),
        DiagnosisRequester::new(model.clone()),
        DeliveryResolver::new(host.clone()),
        settings,
    )
    .with_clock(fixed_clock)
}

pub fn tracking(number: u64) -> ExecutorSettings {
    ExecutorSettings {
        tracking_issue: Some(IssueNumber::new(number)),
        ..ExecutorSettings::default()
    }
}
