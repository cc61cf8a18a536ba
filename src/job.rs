// src/job.rs

//! Single-flight job state machine.
//!
//! Process-wide `idle`/`running` state: one pipeline run at a time, no
//! queuing, no cancellation. All mutation goes through the two transition
//! functions behind one mutex; nothing reads-modifies-writes around them.

use std::sync::Mutex;

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// The job currently holding the `running` slot.
#[derive(Debug, Clone)]
pub struct RunningJob {
    pub id: String,
    pub query: String,
    pub requested_count: usize,
    pub started_at: DateTime<Utc>,
}

impl RunningJob {
    fn elapsed_seconds(&self) -> i64 {
        (Utc::now() - self.started_at).num_seconds().max(0)
    }
}

/// Outcome of a start request.
#[derive(Debug, Clone)]
pub enum StartOutcome {
    /// The slot was free; the job now owns it.
    Accepted(RunningJob),

    /// Another job is running; the request is rejected, never queued.
    Busy {
        query: String,
        elapsed_seconds: i64,
    },
}

/// Poll result for a job id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobStatus {
    Running {
        query: String,
        elapsed_seconds: i64,
    },
    Completed,
    Unknown,
}

#[derive(Default)]
struct TrackerState {
    running: Option<RunningJob>,
    completed: Vec<String>,
}

/// Process-wide job tracker.
#[derive(Default)]
pub struct JobTracker {
    state: Mutex<TrackerState>,
}

impl JobTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// `idle → running`, or a conflict report when already running.
    pub fn try_start(&self, query: &str, requested_count: usize) -> StartOutcome {
        let mut state = self.state.lock().unwrap();

        if let Some(job) = &state.running {
            return StartOutcome::Busy {
                query: job.query.clone(),
                elapsed_seconds: job.elapsed_seconds(),
            };
        }

        let job = RunningJob {
            id: Uuid::new_v4().to_string(),
            query: query.to_string(),
            requested_count,
            started_at: Utc::now(),
        };
        state.running = Some(job.clone());
        StartOutcome::Accepted(job)
    }

    /// `running → idle`. Success and failure look the same here; failures
    /// are logged where they happen and swallowed at this layer.
    pub fn complete(&self, job_id: &str) {
        let mut state = self.state.lock().unwrap();
        if state
            .running
            .as_ref()
            .is_some_and(|job| job.id == job_id)
        {
            state.running = None;
            state.completed.push(job_id.to_string());
        }
    }

    /// Status for a job id issued during this process lifetime.
    pub fn status(&self, job_id: &str) -> JobStatus {
        let state = self.state.lock().unwrap();

        if let Some(job) = state.running.as_ref().filter(|job| job.id == job_id) {
            return JobStatus::Running {
                query: job.query.clone(),
                elapsed_seconds: job.elapsed_seconds(),
            };
        }
        if state.completed.iter().any(|id| id == job_id) {
            return JobStatus::Completed;
        }
        JobStatus::Unknown
    }
}
