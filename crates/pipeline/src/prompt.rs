//! Prompt and report templates.
//!
//! All three renderers are pure functions of their inputs. Metadata values and
//! the log excerpt are embedded verbatim: no escaping, trimming, or quoting.

use crate::{Diagnosis, FailureContext, LogExcerpt, Timestamp};

/// Renders the single-turn diagnosis prompt sent to the model.
pub fn render_diagnosis_prompt(context: &FailureContext, excerpt: &LogExcerpt) -> String {
    format!(
        "You are an assistant specialised in analysing CI workflow logs.\n\
         The following is the log of a failed CI job.\n\
         Analyse the log and:\n\
         1. Identify the most likely root cause of the failure.\n\
         2. Propose concrete, actionable steps to resolve it.\n\
         Keep the response concise and format it as a short bulleted list.\n\
         \n\
         --- Workflow: {workflow} ---\n\
         --- Job: {job} ---\n\
         --- Run URL: {url} ---\n\
         --- Failed job log ---\n\
         {log}\n\
         --- End of log ---\n",
        workflow = context.workflow_name,
        job = context.job_name,
        url = context.run_url,
        log = excerpt.text(),
    )
}

/// Renders the comment (or issue body) that carries a diagnosis.
pub fn render_report(
    context: &FailureContext,
    excerpt: &LogExcerpt,
    diagnosis: &Diagnosis,
    generated_at: Timestamp,
) -> String {
    let mut body = String::new();
    body.push_str("## CI failure analysis\n\n");
    body.push_str(&format!("**Workflow:** {}\n", context.workflow_name));
    body.push_str(&format!(
        "**Job:** {} (`{}`)\n",
        context.job_name, context.job_id
    ));
    body.push_str(&format!("**Run ID:** {}\n", context.run_id));
    body.push_str(&format!("**Run:** [view run]({})\n\n", context.run_url));
    body.push_str("---\n\n");
    body.push_str(diagnosis.text.trim_end());
    body.push_str("\n\n---\n");
    if excerpt.is_truncated() {
        body.push_str(&format!(
            "_Only the last part of the log was analysed ({} bytes in total)._\n",
            excerpt.original_len()
        ));
    }
    body.push_str(&format!(
        "_Generated by `{}` at {}._\n",
        diagnosis.model, generated_at
    ));
    body
}

/// Title for an issue created when the tracking issue is gone.
pub fn new_issue_title(context: &FailureContext) -> String {
    format!(
        "CI failure: {} / {}",
        context.workflow_name, context.job_name
    )
}
