//! Generic background job runner with cooperative cancellation.
//!
//! Used to run matching and preview work off the event-loop thread; jobs
//! report back over an mpsc channel that the controller drains on every
//! loop iteration.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

pub mod jobs;

use std::any::Any;

/// Sealed trait for job payloads to ensure type safety.
pub trait JobPayload: Any + Send + std::fmt::Debug + 'static {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
    fn into_any(self: Box<Self>) -> Box<dyn Any>;
}

/// Message sent from a background job back to the controller.
#[derive(Debug)]
pub enum JobMessage {
    /// Job started with ID and silent flag.
    Started(usize, bool),
    /// Progress update: job ID, percentage (0-100), status message.
    Progress(usize, u32, String),
    /// Job finished successfully with ID and silent flag.
    Finished(usize, bool),
    /// Job failed with an error message.
    Error(usize, String),
    /// Job cancelled (terminal state).
    Cancelled(usize),
    /// Custom payload for job-specific results.
    Custom(usize, Box<dyn JobPayload>),
}

/// Signal used to check whether a job has been cancelled.
#[derive(Debug, Clone)]
pub struct CancellationSignal {
    cancelled: Arc<AtomicBool>,
}

impl CancellationSignal {
    /// A fresh, uncancelled signal. Useful for one-off matching calls made
    /// outside a dispatched [`Job`] (tests, direct synchronous calls).
    pub fn new() -> Self {
        Self {
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Check if the job has been cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }

    /// Request cancellation. Idempotent.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }
}

impl Default for CancellationSignal {
    fn default() -> Self {
        Self::new()
    }
}

/// State of a background job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Running,
    Finished,
    Failed,
    Cancelled,
}

/// Handle to a running job.
pub struct JobHandle {
    pub handle: JoinHandle<()>,
    pub state: JobState,
    pub signal: CancellationSignal,
}

/// Trait defining a background job.
/// Jobs must be Send + 'static to be moved onto a thread.
pub trait Job: Send + std::fmt::Debug + 'static {
    /// Run the job.
    ///
    /// # Invariants
    /// * The job MUST NOT touch `UIState` directly; it reports results over `sender`.
    /// * The job SHOULD check `signal.is_cancelled()` at natural boundaries (chunk,
    ///   partition) and exit early once set.
    fn run(self: Box<Self>, id: usize, sender: Sender<JobMessage>, signal: CancellationSignal);

    /// Whether this job should trigger a visible notification in the UI.
    fn is_silent(&self) -> bool {
        false
    }
}

impl Job for Box<dyn Job> {
    fn run(self: Box<Self>, id: usize, sender: Sender<JobMessage>, signal: CancellationSignal) {
        (*self).run(id, sender, signal);
    }

    fn is_silent(&self) -> bool {
        (**self).is_silent()
    }
}

/// Manages background jobs.
pub struct JobManager {
    /// Sender to clone for new jobs.
    sender: Sender<JobMessage>,
    /// Receiver for the controller to poll.
    receiver: Receiver<JobMessage>,
    /// Active jobs map.
    jobs: HashMap<usize, JobHandle>,
    /// Counter for generating job IDs.
    next_job_id: usize,
}

impl JobManager {
    /// Create a new JobManager.
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            sender,
            receiver,
            jobs: HashMap::new(),
            next_job_id: 1,
        }
    }

    /// Spawn a new job, returning its job ID.
    pub fn spawn<J: Job>(&mut self, job: J) -> usize {
        let id = self.next_job_id;
        self.next_job_id += 1;

        let sender = self.sender.clone();
        let signal = CancellationSignal::new();
        let job_signal = signal.clone();
        let silent = job.is_silent();
        let job_box = Box::new(job);

        let handle = thread::spawn(move || {
            if sender.send(JobMessage::Started(id, silent)).is_ok() {
                job_box.run(id, sender, job_signal);
            }
        });

        self.jobs.insert(
            id,
            JobHandle {
                handle,
                state: JobState::Running,
                signal,
            },
        );

        id
    }

    /// Get the receiver to poll for messages.
    /// The controller should call `receiver().try_recv()` to drain without blocking.
    pub fn receiver(&self) -> &Receiver<JobMessage> {
        &self.receiver
    }

    /// Update job state based on a drained message.
    pub fn update_job_state(&mut self, message: &JobMessage) {
        match message {
            JobMessage::Finished(id, _) => {
                if let Some(job) = self.jobs.get_mut(id) {
                    job.state = JobState::Finished;
                }
            }
            JobMessage::Error(id, _) => {
                if let Some(job) = self.jobs.get_mut(id) {
                    job.state = JobState::Failed;
                }
            }
            JobMessage::Cancelled(id) => {
                if let Some(job) = self.jobs.get_mut(id) {
                    job.state = JobState::Cancelled;
                }
            }
            _ => {}
        }
    }

    /// Clean up finished/failed/cancelled jobs, joining their threads.
    /// Returns the list of cleaned-up IDs.
    pub fn cleanup_finished_jobs(&mut self) -> Vec<usize> {
        let mut finished_ids = Vec::new();

        for (id, job) in &self.jobs {
            if matches!(
                job.state,
                JobState::Finished | JobState::Failed | JobState::Cancelled
            ) && job.handle.is_finished()
            {
                finished_ids.push(*id);
            }
        }

        for id in &finished_ids {
            if let Some(job) = self.jobs.remove(id) {
                let _ = job.handle.join();
            }
        }

        finished_ids
    }

    /// Cancel a specific job. Sets the cancellation flag; the job thread is
    /// expected to notice it and exit at its next checkpoint.
    pub fn cancel_job(&mut self, id: usize) {
        if let Some(job) = self.jobs.get_mut(&id) {
            job.signal.cancel();
            job.state = JobState::Cancelled;
        }
    }
}

impl Default for JobManager {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for JobManager {
    fn drop(&mut self) {
        for job in self.jobs.values() {
            job.signal.cancel();
        }
    }
}
