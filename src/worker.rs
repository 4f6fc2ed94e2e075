//! # Parsing on a background thread
//!
//! A [`ParserWorker`] owns a thread which runs parses to completion, so that the calling thread
//! never blocks on a large bibliography. Requests are posted as owned text and answered with a
//! single [`WorkerReply`] each.
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};

use thiserror::Error;
use tracing::{debug, error, warn};

use crate::config::ParserConfig;
use crate::entry::EntryDict;
use crate::error::Result as ImportResult;
use crate::scheduler::{ChunkScheduler, NoYield};

/// What to do with a request posted while another parse is in flight.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum WorkerPolicy {
    /// Run it once the earlier requests are done.
    #[default]
    Queue,
    /// Refuse it with [`WorkerError::Busy`].
    Reject,
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum WorkerError {
    #[error("parser worker is busy with another request")]
    Busy,
    #[error("parser worker has shut down")]
    Disconnected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitStatus {
    Success,
    Fail,
}

/// The answer to one request.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkerReply {
    pub status: ExitStatus,
    /// The imported entries, on success.
    pub output: Option<EntryDict>,
    /// The error message, on failure.
    pub error: Option<String>,
}

struct Job {
    text: String,
    reply: Sender<WorkerReply>,
}

/// A handle to a background parser thread.
///
/// Dropping the handle lets the thread finish the requests already posted, then joins it.
#[derive(Debug)]
pub struct ParserWorker {
    policy: WorkerPolicy,
    jobs: Option<Sender<Job>>,
    in_flight: Arc<AtomicUsize>,
    handle: Option<JoinHandle<()>>,
}

impl ParserWorker {
    pub fn spawn(config: ParserConfig, policy: WorkerPolicy) -> std::io::Result<Self> {
        let (jobs, queue) = mpsc::channel();
        let in_flight = Arc::new(AtomicUsize::new(0));

        let handle = thread::Builder::new().name("bibtex-parser".into()).spawn({
            let in_flight = Arc::clone(&in_flight);
            move || {
                let scheduler = ChunkScheduler::new(config);
                serve(|text: &str| scheduler.run(text, NoYield), queue, in_flight)
            }
        })?;

        Ok(Self {
            policy,
            jobs: Some(jobs),
            in_flight,
            handle: Some(handle),
        })
    }

    pub fn policy(&self) -> WorkerPolicy {
        self.policy
    }

    /// Whether a posted request has not been answered yet.
    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire) > 0
    }

    /// Post `text` to be parsed.
    pub fn post(&self, text: impl Into<String>) -> Result<PendingParse, WorkerError> {
        let jobs = self.jobs.as_ref().ok_or(WorkerError::Disconnected)?;

        match self.policy {
            WorkerPolicy::Queue => {
                self.in_flight.fetch_add(1, Ordering::AcqRel);
            }
            WorkerPolicy::Reject => {
                if self
                    .in_flight
                    .compare_exchange(0, 1, Ordering::AcqRel, Ordering::Acquire)
                    .is_err()
                {
                    debug!("rejected a parse request while busy");
                    return Err(WorkerError::Busy);
                }
            }
        }

        let (reply, receiver) = mpsc::channel();
        let job = Job {
            text: text.into(),
            reply,
        };
        if jobs.send(job).is_err() {
            self.in_flight.fetch_sub(1, Ordering::AcqRel);
            return Err(WorkerError::Disconnected);
        }
        Ok(PendingParse { receiver })
    }
}

impl Drop for ParserWorker {
    fn drop(&mut self) {
        // closing the channel ends the loop in `serve`
        self.jobs.take();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("parser worker thread panicked");
            }
        }
    }
}

/// Answer every job on `queue` with the result of `parse`, until the channel closes.
///
/// A panic inside `parse` is answered as a failed request; the worker keeps serving.
fn serve<F>(parse: F, queue: Receiver<Job>, in_flight: Arc<AtomicUsize>)
where
    F: Fn(&str) -> ImportResult<EntryDict>,
{
    for job in queue {
        let reply = match panic::catch_unwind(AssertUnwindSafe(|| parse(&job.text))) {
            Ok(Ok(entries)) => WorkerReply {
                status: ExitStatus::Success,
                output: Some(entries),
                error: None,
            },
            Ok(Err(err)) => WorkerReply {
                status: ExitStatus::Fail,
                output: None,
                error: Some(err.to_string()),
            },
            Err(payload) => {
                let message = format!("parser panicked: {}", panic_message(&*payload));
                error!("{message}");
                WorkerReply {
                    status: ExitStatus::Fail,
                    output: None,
                    error: Some(message),
                }
            }
        };
        in_flight.fetch_sub(1, Ordering::AcqRel);
        // the caller may have stopped waiting
        let _ = job.reply.send(reply);
    }
    debug!("parser worker shutting down");
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message
    } else {
        "unknown error"
    }
}

/// A request which has been posted to a [`ParserWorker`].
#[derive(Debug)]
pub struct PendingParse {
    receiver: Receiver<WorkerReply>,
}

impl PendingParse {
    /// Block until the reply arrives.
    pub fn wait(self) -> Result<WorkerReply, WorkerError> {
        self.receiver.recv().map_err(|_| WorkerError::Disconnected)
    }

    /// Return the reply if it has already arrived.
    pub fn try_wait(&self) -> Option<WorkerReply> {
        self.receiver.try_recv().ok()
    }
}
