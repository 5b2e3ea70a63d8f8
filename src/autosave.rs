use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use anyhow::{anyhow, Result};
use tracing::{debug, info, warn};

use crate::persist::{BoundedLocalStore, PersistOutcome};
use crate::state::SharedState;
use crate::store::DeviceStore;

/// Everything that causes a save. All of them take the same write path.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SaveTrigger {
    Interval,
    FocusLost,
    Hidden,
    BeforeUnload,
    PageHide,
}

enum Signal {
    Trigger(SaveTrigger),
    Shutdown,
}

/// Saves the shared state on a fixed interval and whenever a lifecycle
/// trigger is sent. No coalescing: back-to-back triggers write twice.
pub struct AutoSaver {
    tx: Sender<Signal>,
    handle: Option<JoinHandle<()>>,
}

pub fn save_now<S: DeviceStore>(
    shared: &SharedState,
    store: &BoundedLocalStore<S>,
    trigger: SaveTrigger,
) -> Result<PersistOutcome> {
    let mut state = shared.lock()?;
    let outcome = store.persist(&mut state.snapshot);
    debug!(?trigger, saved = outcome.is_saved(), "autosave");
    Ok(outcome)
}

impl AutoSaver {
    pub fn spawn<S: DeviceStore + 'static>(
        shared: SharedState,
        store: Arc<BoundedLocalStore<S>>,
        interval: Duration,
    ) -> Result<Self> {
        let (tx, rx) = mpsc::channel::<Signal>();
        let handle = thread::Builder::new()
            .name("autosave".to_string())
            .spawn(move || {
                info!(interval_ms = interval.as_millis() as u64, "autosave enabled");
                loop {
                    let trigger = match rx.recv_timeout(interval) {
                        Ok(Signal::Trigger(trigger)) => trigger,
                        Ok(Signal::Shutdown) | Err(RecvTimeoutError::Disconnected) => {
                            if let Err(e) = save_now(&shared, &store, SaveTrigger::BeforeUnload) {
                                warn!("final save skipped: {e:#}");
                            }
                            break;
                        }
                        Err(RecvTimeoutError::Timeout) => SaveTrigger::Interval,
                    };
                    if let Err(e) = save_now(&shared, &store, trigger) {
                        warn!("autosave skipped: {e:#}");
                    }
                }
            })?;

        Ok(Self {
            tx,
            handle: Some(handle),
        })
    }

    pub fn notify(&self, trigger: SaveTrigger) -> Result<()> {
        self.tx
            .send(Signal::Trigger(trigger))
            .map_err(|_| anyhow!("autosave worker is gone"))
    }

    /// Performs one last save and waits for the worker to exit.
    pub fn shutdown(mut self) -> Result<()> {
        self.stop()
    }

    fn stop(&mut self) -> Result<()> {
        let Some(handle) = self.handle.take() else {
            return Ok(());
        };
        let _ = self.tx.send(Signal::Shutdown);
        handle
            .join()
            .map_err(|_| anyhow!("autosave worker panicked"))
    }
}

impl Drop for AutoSaver {
    fn drop(&mut self) {
        if let Err(e) = self.stop() {
            warn!("autosave shutdown failed: {e:#}");
        }
    }
}
