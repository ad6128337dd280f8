//! In-process sync job queue
//!
//! FIFO queue with a single drain task. Enqueue is fire-and-forget: callers
//! get no result channel, failures surface through the failure log sink and
//! structured logs. The drain task paces requests, pauses when the provider
//! signals quota exhaustion, and schedules bounded exponential-backoff
//! retries for transient failures.
//!
//! A failure row's `next_retry_at` is set only when a retry is actually
//! scheduled; fatal categories get `None` even with attempts remaining, so
//! the column always reflects what the queue will do.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use opsdeck_core::{FailureLogSink, RateLimitTracker, RetryPolicy};
use opsdeck_domain::constants::JOB_PACING_MS;
use opsdeck_domain::{FailureRecord, JobPayload, QueueStatus, SyncJob, SyncOperation};
use parking_lot::Mutex;
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::hubspot::client::HubSpotClient;
use crate::hubspot::errors::HubSpotError;

/// Executes one sync job against the CRM provider
#[async_trait]
pub trait JobExecutor: Send + Sync {
    async fn execute_job(&self, job: &SyncJob) -> Result<Value, HubSpotError>;
}

#[async_trait]
impl JobExecutor for HubSpotClient {
    async fn execute_job(&self, job: &SyncJob) -> Result<Value, HubSpotError> {
        self.execute(job).await
    }
}

/// Queue tuning knobs
#[derive(Debug, Clone)]
pub struct SyncQueueConfig {
    /// Delay between consecutive jobs
    pub pacing: Duration,
    /// Retry ceiling and backoff base
    pub retry: RetryPolicy,
}

impl Default for SyncQueueConfig {
    fn default() -> Self {
        Self { pacing: Duration::from_millis(JOB_PACING_MS), retry: RetryPolicy::default() }
    }
}

struct QueueState {
    queue: VecDeque<SyncJob>,
    processing: bool,
}

struct Inner {
    state: Mutex<QueueState>,
    rate: Arc<Mutex<RateLimitTracker>>,
    executor: Arc<dyn JobExecutor>,
    failure_log: Arc<dyn FailureLogSink>,
    config: SyncQueueConfig,
    cancel: CancellationToken,
}

/// Sync queue manager
///
/// Cheap to clone; all clones share one queue and one drain task. At most one
/// drain task runs at a time, guarded by the `processing` flag which is set
/// under the queue lock before the task is spawned.
#[derive(Clone)]
pub struct SyncQueueManager {
    inner: Arc<Inner>,
}

impl SyncQueueManager {
    pub fn new(
        executor: Arc<dyn JobExecutor>,
        failure_log: Arc<dyn FailureLogSink>,
        rate: Arc<Mutex<RateLimitTracker>>,
        config: SyncQueueConfig,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(QueueState { queue: VecDeque::new(), processing: false }),
                rate,
                executor,
                failure_log,
                config,
                cancel: CancellationToken::new(),
            }),
        }
    }

    /// Enqueue a job and start the drain task if idle
    ///
    /// Returns immediately; the job runs on a background task. The
    /// `processing` flag flips before this returns, so a status read right
    /// after enqueue always observes an active queue.
    pub fn push(&self, job: SyncJob) {
        let spawn_drain = {
            let mut state = self.inner.state.lock();
            state.queue.push_back(job);
            if state.processing {
                false
            } else {
                state.processing = true;
                true
            }
        };

        if spawn_drain {
            let inner = Arc::clone(&self.inner);
            tokio::spawn(async move {
                drain(inner).await;
            });
        }
    }

    /// Build and enqueue a job, returning the id it will keep across retries
    pub fn enqueue(
        &self,
        operation: SyncOperation,
        payload: JobPayload,
        object_id: Option<String>,
    ) -> Uuid {
        let mut job = SyncJob::new(operation, payload);
        job.object_id = object_id;
        let job_id = job.job_id;
        self.push(job);
        job_id
    }

    /// Snapshot of queue depth, drain activity and remaining quota
    pub fn status(&self) -> QueueStatus {
        let (pending, processing) = {
            let state = self.inner.state.lock();
            (state.queue.len(), state.processing)
        };
        QueueStatus { pending, processing, rate_limit_remaining: self.inner.rate.lock().remaining() }
    }

    /// Stop draining and cancel pending retry timers
    ///
    /// Jobs already handed to the executor run to completion; queued jobs
    /// stay in the queue and are dropped with the manager.
    pub fn shutdown(&self) {
        info!("sync queue shutting down");
        self.inner.cancel.cancel();
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Single-consumer drain loop
async fn drain(inner: Arc<Inner>) {
    loop {
        if inner.cancel.is_cancelled() {
            inner.state.lock().processing = false;
            break;
        }

        // Honor the provider's quota before touching the queue
        let pause = {
            let rate = inner.rate.lock();
            rate.should_pause().then(|| rate.pause_duration())
        };
        if let Some(wait) = pause {
            warn!(wait_ms = wait.as_millis() as u64, "rate limit low, pausing queue");
            tokio::select! {
                () = tokio::time::sleep(wait) => {}
                () = inner.cancel.cancelled() => continue,
            }
        }

        // Clearing `processing` must happen in the same critical section as
        // the emptiness check, otherwise a concurrent push could observe an
        // idle queue with jobs in it and never spawn a drain task.
        let job = {
            let mut state = inner.state.lock();
            match state.queue.pop_front() {
                Some(job) => job,
                None => {
                    state.processing = false;
                    break;
                }
            }
        };

        process_job(&inner, job).await;

        tokio::select! {
            () = tokio::time::sleep(inner.config.pacing) => {}
            () = inner.cancel.cancelled() => {}
        }
    }

    debug!("drain task finished");
}

async fn process_job(inner: &Arc<Inner>, job: SyncJob) {
    debug!(
        job_id = %job.job_id,
        operation = %job.operation,
        object_type = %job.object_type(),
        attempt = job.attempt,
        "processing sync job"
    );

    match inner.executor.execute_job(&job).await {
        Ok(_) => {
            info!(job_id = %job.job_id, operation = %job.operation, "sync job succeeded");
        }
        Err(err) => handle_failure(inner, job, err).await,
    }
}

/// Record the failed attempt and schedule a retry when the failure is
/// transient and the ceiling has not been reached.
async fn handle_failure(inner: &Arc<Inner>, job: SyncJob, err: HubSpotError) {
    let category = err.category();
    let will_retry = inner.config.retry.should_retry(category, job.attempt);
    let delay = inner.config.retry.backoff_delay(job.attempt);

    warn!(
        job_id = %job.job_id,
        operation = %job.operation,
        category = %category,
        attempt = job.attempt,
        will_retry,
        error = %err,
        "sync job failed"
    );

    let mut record = FailureRecord::new(
        category,
        job.object_type(),
        job.operation,
        err.to_string(),
    );
    record.object_id = job.object_id.clone();
    record.request_payload = serde_json::to_value(&job.payload).unwrap_or(Value::Null);
    record.retry_count = job.attempt;
    record.max_retries = inner.config.retry.max_retries();
    record.next_retry_at = will_retry
        .then(|| Utc::now() + chrono::Duration::from_std(delay).unwrap_or_default());

    // Logging failures must never take the queue down
    if let Err(log_err) = inner.failure_log.record_failure(&record).await {
        error!(job_id = %job.job_id, error = %log_err, "failed to record sync failure");
    }

    if will_retry {
        let inner = Arc::clone(inner);
        let retry_job = job.next_attempt();
        tokio::spawn(async move {
            let cancel = inner.cancel.clone();
            tokio::select! {
                () = tokio::time::sleep(delay) => {
                    debug!(job_id = %retry_job.job_id, attempt = retry_job.attempt, "re-enqueueing job");
                    SyncQueueManager { inner }.push(retry_job);
                }
                () = cancel.cancelled() => {
                    debug!(job_id = %retry_job.job_id, "retry cancelled by shutdown");
                }
            }
        });
    }
}
