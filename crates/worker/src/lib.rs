//! Background worker threads with an explicit start/stop lifecycle.
//!
//! Each [`WorkerThread`] owns its own OS thread and message channel, so any
//! number of workers can run side by side.

pub mod error;
pub mod thread;

pub use error::{WorkerError, WorkerResult};
pub use thread::WorkerThread;
