use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum WorkerError {
    #[error("failed to start worker thread: missing entrypoint")]
    MissingEntrypoint,

    #[error("worker thread {0} is already running")]
    AlreadyRunning(Uuid),

    #[error("failed to post message: worker thread {0} is not running")]
    NotRunning(Uuid),

    #[error("worker thread {0} stopped receiving messages")]
    Disconnected(Uuid),

    #[error("failed to spawn worker thread: {0}")]
    Spawn(#[from] std::io::Error),
}

pub type WorkerResult<T> = Result<T, WorkerError>;
