//! Background session worker.
//!
//! One thread drives a [`SpeechEngine`] in a polling loop: a failed frame acquire
//! is not an error, it just means "nothing new yet", and the loop re-invokes the
//! engine after a short sleep rather than waking on a wait/notify primitive. That
//! keeps worst-case decode-trigger latency bounded and predictable, and it
//! serializes backend calls: exactly one decode is ever in flight.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{debug, error, info_span};
use uuid::Uuid;

use crate::Result;
use crate::engine::{ProcessOutcome, SpeechEngine};
use crate::error::Error;

/// Handle to a running session worker thread.
///
/// Dropping the handle requests cancellation but does not wait for the thread;
/// call [`SessionWorker::join`] to observe the session's terminal result.
pub struct SessionWorker {
    exit: Arc<AtomicBool>,
    handle: Option<JoinHandle<Result<()>>>,
}

impl SessionWorker {
    pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(10);

    /// Spawns a worker driving `engine` until the session ends or `exit` is set.
    ///
    /// `exit` must be the same flag the engine was constructed with; it is the
    /// cooperative cancellation signal checked at buffer-release and pre-commit
    /// points.
    pub fn spawn<E>(engine: E, exit: Arc<AtomicBool>) -> Self
    where
        E: SpeechEngine + Send + 'static,
    {
        Self::spawn_with_interval(engine, exit, Self::DEFAULT_POLL_INTERVAL)
    }

    pub fn spawn_with_interval<E>(
        mut engine: E,
        exit: Arc<AtomicBool>,
        poll_interval: Duration,
    ) -> Self
    where
        E: SpeechEngine + Send + 'static,
    {
        let thread_exit = Arc::clone(&exit);

        let handle = thread::spawn(move || -> Result<()> {
            let session_id = Uuid::new_v4();
            let span = info_span!("session", %session_id);
            let _guard = span.enter();

            loop {
                if thread_exit.load(Ordering::SeqCst) {
                    debug!("exit requested");
                    return Ok(());
                }

                match engine.process() {
                    Ok(ProcessOutcome::WaitForSamples) => thread::sleep(poll_interval),
                    Ok(ProcessOutcome::SessionEnded) => {
                        debug!("session ended");
                        return Ok(());
                    }
                    Err(err) => {
                        error!(error = %err, "session terminated");
                        return Err(err);
                    }
                }
            }
        });

        Self {
            exit,
            handle: Some(handle),
        }
    }

    /// Requests cooperative cancellation. The engine observes the flag at its next
    /// check point; no further callbacks are emitted after that.
    pub fn request_exit(&self) {
        self.exit.store(true, Ordering::SeqCst);
    }

    /// True while the worker thread is still running.
    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Waits for the worker to stop and returns the session's terminal result.
    pub fn join(mut self) -> Result<()> {
        match self.handle.take() {
            None => Ok(()),
            Some(handle) => match handle.join() {
                Ok(result) => result,
                Err(_) => Err(Error::msg("session worker panicked")),
            },
        }
    }
}

impl Drop for SessionWorker {
    fn drop(&mut self) {
        self.request_exit();
    }
}
