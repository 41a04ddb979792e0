//! Timed auto-advance of a session.
//!
//! `AutoAdvance` drives a shared session from a worker thread: every period
//! it rotates the tape by one cycle and recomputes the waveform, then hands
//! the new waveform to an optional observer. Ticks are serialized by the
//! session lock, so a tick and a concurrent edit never interleave. The
//! period is re-read before every wait, so `SetPeriod` applies from the
//! next tick on.
//!
//! Selecting another device or resetting the session ends playback: the
//! worker exits at its next tick without touching the new tape.

use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crate::session::Session;
use crate::waveform::Waveform;

/// A session shared between a front end and the player.
pub type SharedSession = Arc<Mutex<Session>>;

/// Callback receiving every recomputed waveform. Runs on the player thread
/// with the session locked.
pub type Observer = Box<dyn FnMut(&Waveform) + Send>;

/// Handle to a running auto-advance loop. Dropping it stops the loop.
pub struct AutoAdvance {
    stop_tx: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
    ticks: Arc<AtomicU64>,
}

impl AutoAdvance {
    /// Starts advancing `session` on its own period, until stopped or until
    /// the session selects a device or resets.
    pub fn start(session: SharedSession, observer: Option<Observer>) -> std::io::Result<Self> {
        let (stop_tx, stop_rx) = mpsc::channel::<()>();
        let ticks = Arc::new(AtomicU64::new(0));
        let counter = Arc::clone(&ticks);
        let generation = session.lock().generation();

        let handle = thread::Builder::new()
            .name("seqwave-player".to_string())
            .spawn(move || {
                let mut observer = observer;
                loop {
                    let period = session.lock().period();
                    match stop_rx.recv_timeout(period) {
                        Err(RecvTimeoutError::Timeout) => {}
                        Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                    }

                    let mut guard = session.lock();
                    if guard.generation() != generation {
                        tracing::debug!("session reset, auto-advance stopped");
                        break;
                    }
                    match guard.advance() {
                        Ok(waveform) => {
                            let n = counter.fetch_add(1, Ordering::Relaxed) + 1;
                            tracing::trace!(tick = n, "auto-advance tick");
                            if let Some(observe) = observer.as_mut() {
                                observe(waveform);
                            }
                        }
                        Err(e) => {
                            tracing::warn!(error = %e, "auto-advance stopped");
                            break;
                        }
                    }
                }
            })?;

        tracing::debug!("auto-advance started");

        Ok(Self {
            stop_tx: Some(stop_tx),
            handle: Some(handle),
            ticks,
        })
    }

    /// Number of completed ticks.
    pub fn ticks(&self) -> u64 {
        self.ticks.load(Ordering::Relaxed)
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().map_or(false, |h| !h.is_finished())
    }

    /// Stops the loop and waits for the worker to exit. A tick already in
    /// progress completes first.
    pub fn stop(&mut self) {
        if let Some(tx) = self.stop_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                tracing::error!("auto-advance worker panicked");
            } else {
                tracing::debug!(ticks = self.ticks(), "auto-advance stopped");
            }
        }
    }
}

impl Drop for AutoAdvance {
    fn drop(&mut self) {
        self.stop();
    }
}

impl std::fmt::Debug for AutoAdvance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AutoAdvance")
            .field("running", &self.is_running())
            .field("ticks", &self.ticks())
            .finish()
    }
}
