//! Background playback rendering on Tokio's blocking pool.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::runtime::Handle;
use tokio::sync::oneshot;
use tracing::debug;

use crate::dsp::engine::AudioEngine;
use crate::error::PlaybackError;
use crate::model::SignalModel;

use super::{PlaybackKind, render_options};

/// A pending render. Resolves once the buffer is complete or the render
/// is cancelled.
pub struct PlaybackTicket {
    pub kind: PlaybackKind,
    receiver: oneshot::Receiver<Result<Vec<f64>, PlaybackError>>,
}

impl PlaybackTicket {
    pub async fn wait(self) -> Result<Vec<f64>, PlaybackError> {
        match self.receiver.await {
            Ok(result) => result,
            Err(_) => Err(PlaybackError::WorkerFailed {
                reason: "render task dropped its result".to_string(),
            }),
        }
    }
}

struct InFlight {
    cancel: Arc<AtomicBool>,
    finished: Arc<AtomicBool>,
}

impl InFlight {
    fn is_running(&self) -> bool {
        !self.finished.load(Ordering::Acquire)
    }
}

/// Runs playback renders off the caller's thread. At most one render per
/// [`PlaybackKind`] is live: starting a new one cancels the previous.
pub struct PlaybackWorker {
    handle: Handle,
    in_flight: HashMap<PlaybackKind, InFlight>,
}

impl PlaybackWorker {
    pub fn new(handle: Handle) -> Self {
        PlaybackWorker {
            handle,
            in_flight: HashMap::new(),
        }
    }

    /// A worker on the current Tokio runtime, if there is one.
    pub fn try_current() -> Option<Self> {
        Handle::try_current().ok().map(PlaybackWorker::new)
    }

    /// Start rendering `kind` from a snapshot of `model`.
    pub fn start(&mut self, model: &SignalModel, kind: PlaybackKind) -> PlaybackTicket {
        self.stop(kind);

        let cancel = Arc::new(AtomicBool::new(false));
        let finished = Arc::new(AtomicBool::new(false));
        self.in_flight.insert(
            kind,
            InFlight {
                cancel: Arc::clone(&cancel),
                finished: Arc::clone(&finished),
            },
        );

        let components = model.components.clone();
        let engine = AudioEngine::new(render_options(model, kind));
        let (tx, rx) = oneshot::channel();

        self.handle.spawn_blocking(move || {
            let result = engine
                .render_cancellable(&components, &cancel)
                .ok_or(PlaybackError::Cancelled);
            finished.store(true, Ordering::Release);
            // The ticket may already be gone; nothing to report then.
            let _ = tx.send(result);
        });
        debug!(%kind, "playback render started");

        PlaybackTicket { kind, receiver: rx }
    }

    /// Whether a render of `kind` is still running.
    pub fn is_rendering(&self, kind: PlaybackKind) -> bool {
        self.in_flight.get(&kind).is_some_and(InFlight::is_running)
    }

    /// Cancel the in-flight render of `kind`. Returns whether a running
    /// render was cancelled.
    pub fn stop(&mut self, kind: PlaybackKind) -> bool {
        match self.in_flight.remove(&kind) {
            Some(render) if render.is_running() => {
                render.cancel.store(true, Ordering::Relaxed);
                debug!(%kind, "playback render superseded");
                true
            }
            _ => false,
        }
    }
}
