use std::fmt::Write as _;

use llmapi::{ProcessingStatus, RequestCounts};
use tracing::error;

use crate::batch_service::BatchService;
use crate::models::BatchTrackingRecord;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobStatus {
    pub chunk_num: usize,
    pub batch_id: String,
    pub state: JobState,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobState {
    Reported {
        status: ProcessingStatus,
        counts: RequestCounts,
    },
    QueryFailed(String),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusTotals {
    pub succeeded: u64,
    pub failed: u64,
    pub processing: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchStatusReport {
    pub jobs: Vec<JobStatus>,
    pub totals: StatusTotals,
    pub all_ended: bool,
}

/// Queries every tracked job. A job whose query fails counts as not ended
/// and contributes nothing to the totals.
pub async fn collect_batch_status(
    service: &dyn BatchService,
    records: &[BatchTrackingRecord],
) -> BatchStatusReport {
    let mut jobs = Vec::with_capacity(records.len());
    let mut totals = StatusTotals::default();
    let mut all_ended = true;

    for record in records {
        let state = match service.retrieve(&record.batch_id).await {
            Ok(batch) => {
                let counts = batch.request_counts;
                totals.succeeded += counts.succeeded;
                totals.failed += counts.failed();
                totals.processing += counts.processing;

                if !batch.processing_status.is_terminal() {
                    all_ended = false;
                }
                JobState::Reported {
                    status: batch.processing_status,
                    counts,
                }
            }
            Err(err) => {
                error!(batch_id = %record.batch_id, error = %err, "error checking batch");
                all_ended = false;
                JobState::QueryFailed(err.to_string())
            }
        };

        jobs.push(JobStatus {
            chunk_num: record.chunk_num,
            batch_id: record.batch_id.clone(),
            state,
        });
    }

    BatchStatusReport {
        jobs,
        totals,
        all_ended,
    }
}

/// Prints the per-job and total report; true once every job has ended.
pub async fn check_all_batches_status(
    service: &dyn BatchService,
    records: &[BatchTrackingRecord],
) -> bool {
    println!("Checking status of all batches...\n");
    let report = collect_batch_status(service, records).await;
    print!("{}", report.render());
    report.all_ended
}

impl BatchStatusReport {
    pub fn render(&self) -> String {
        let mut out = String::new();

        for job in &self.jobs {
            let short_id: String = job.batch_id.chars().take(12).collect();
            match &job.state {
                JobState::Reported { status, counts } => {
                    let _ = writeln!(out, "Chunk {} (ID: {short_id}...):", job.chunk_num);
                    let _ = writeln!(out, "  Status: {status}");
                    let _ = writeln!(out, "  Succeeded: {}", counts.succeeded);
                    let _ = writeln!(out, "  Failed: {}", counts.failed());
                    let _ = writeln!(out, "  Processing: {}", counts.processing);
                }
                JobState::QueryFailed(reason) => {
                    let _ = writeln!(out, "Chunk {} (ID: {short_id}...):", job.chunk_num);
                    let _ = writeln!(out, "  Error: {reason}");
                }
            }
            out.push('\n');
        }

        let _ = writeln!(out, "TOTALS:");
        let _ = writeln!(out, "  Succeeded: {}", self.totals.succeeded);
        let _ = writeln!(out, "  Failed: {}", self.totals.failed);
        let _ = writeln!(out, "  Still processing: {}", self.totals.processing);
        let _ = writeln!(
            out,
            "  All batches complete: {}",
            if self.all_ended { "Yes" } else { "No" }
        );
        out
    }
}
