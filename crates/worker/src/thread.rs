use std::sync::{Arc, mpsc};
use std::thread;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{WorkerError, WorkerResult};

type Handler<M> = Arc<dyn Fn(M) + Send + Sync + 'static>;

enum Signal<M> {
    Message(M),
    Shutdown,
}

struct Running<M> {
    sender: mpsc::Sender<Signal<M>>,
    join: thread::JoinHandle<()>,
}

/// A restartable background thread that feeds posted messages to a handler.
///
/// Messages are handled one at a time, in the order they were posted.
/// Terminating a worker lets it finish the messages already queued, then joins
/// the thread.
pub struct WorkerThread<M: Send + 'static> {
    id: Uuid,
    entrypoint: String,
    handler: Handler<M>,
    running: Option<Running<M>>,
    started: Option<Instant>,
    created_at: Option<DateTime<Utc>>,
    terminated_at: Option<DateTime<Utc>>,
}

impl<M: Send + 'static> WorkerThread<M> {
    /// A stopped worker with a fresh time-ordered id.
    ///
    /// `entrypoint` labels the worker and names its OS thread.
    pub fn new(entrypoint: impl Into<String>, handler: impl Fn(M) + Send + Sync + 'static) -> Self {
        Self::with_id(Uuid::now_v7(), entrypoint, handler)
    }

    pub fn with_id(id: Uuid, entrypoint: impl Into<String>, handler: impl Fn(M) + Send + Sync + 'static) -> Self {
        Self {
            id,
            entrypoint: entrypoint.into(),
            handler: Arc::new(handler),
            running: None,
            started: None,
            created_at: None,
            terminated_at: None,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn entrypoint(&self) -> &str {
        &self.entrypoint
    }

    /// When the worker was last started.
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    /// When the worker was last terminated. Cleared by [`run`](Self::run).
    pub fn terminated_at(&self) -> Option<DateTime<Utc>> {
        self.terminated_at
    }

    /// Whether the thread is up. A thread whose handler panicked is not active.
    pub fn is_active(&self) -> bool {
        self.running.as_ref().is_some_and(|r| !r.join.is_finished())
    }

    /// Time since the worker was last started; zero if it never was.
    pub fn time_active(&self) -> Duration {
        self.started.map(|s| s.elapsed()).unwrap_or_default()
    }

    /// Spawn the thread.
    pub fn run(&mut self) -> WorkerResult<()> {
        if self.entrypoint.trim().is_empty() {
            return Err(WorkerError::MissingEntrypoint);
        }
        if self.running.is_some() {
            return Err(WorkerError::AlreadyRunning(self.id));
        }

        let (sender, receiver) = mpsc::channel::<Signal<M>>();
        let handler = Arc::clone(&self.handler);
        let id = self.id;
        let join = thread::Builder::new()
            .name(self.entrypoint.clone())
            .spawn(move || worker_loop(id, receiver, handler))?;

        self.running = Some(Running { sender, join });
        self.started = Some(Instant::now());
        self.created_at = Some(Utc::now());
        self.terminated_at = None;

        info!(worker_id = %self.id, entrypoint = %self.entrypoint, "worker thread started");
        Ok(())
    }

    /// Queue `message` for the handler.
    pub fn post_message(&self, message: M) -> WorkerResult<()> {
        let running = self.running.as_ref().ok_or(WorkerError::NotRunning(self.id))?;
        running
            .sender
            .send(Signal::Message(message))
            .map_err(|_| WorkerError::Disconnected(self.id))
    }

    /// Stop and join the thread. Returns `false` when nothing was running.
    ///
    /// Blocks until the handler has worked through every message already
    /// queued. A handler that never returns blocks the caller forever, and so
    /// does dropping a running worker.
    pub fn terminate(&mut self) -> bool {
        let Some(running) = self.running.take() else {
            return false;
        };

        // The receiver is gone if the handler panicked; joining still reaps the thread.
        let _ = running.sender.send(Signal::Shutdown);
        if running.join.join().is_err() {
            warn!(worker_id = %self.id, "worker thread panicked");
        }

        self.terminated_at = Some(Utc::now());
        info!(worker_id = %self.id, entrypoint = %self.entrypoint, "worker thread terminated");
        true
    }

    /// Terminate then run again. `Ok(false)` when the worker was not running.
    pub fn restart(&mut self) -> WorkerResult<bool> {
        if !self.terminate() {
            return Ok(false);
        }
        self.run()?;
        Ok(true)
    }
}

impl<M: Send + 'static> Drop for WorkerThread<M> {
    fn drop(&mut self) {
        self.terminate();
    }
}

impl<M: Send + 'static> std::fmt::Debug for WorkerThread<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerThread")
            .field("id", &self.id)
            .field("entrypoint", &self.entrypoint)
            .field("active", &self.is_active())
            .field("created_at", &self.created_at)
            .field("terminated_at", &self.terminated_at)
            .finish_non_exhaustive()
    }
}

fn worker_loop<M>(id: Uuid, receiver: mpsc::Receiver<Signal<M>>, handler: Handler<M>) {
    debug!(worker_id = %id, "worker loop entered");
    for signal in receiver {
        match signal {
            Signal::Message(message) => handler(message),
            Signal::Shutdown => break,
        }
    }
    debug!(worker_id = %id, "worker loop exited");
}
