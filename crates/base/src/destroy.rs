//! Ordered teardown registry of one context.

use crate::error::{Result, WireError};
use crate::wire::WireFuture;
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;
use tracing::{info, trace, warn};

/// A deferred teardown step.
pub type DestroyFn = Box<dyn FnOnce() -> WireFuture<()> + Send>;

#[derive(Default)]
struct RegistryState {
    entries: Vec<(Arc<str>, DestroyFn)>,
    draining: bool,
}

/// Append-only list of teardown steps, drained once in registration order.
#[derive(Default)]
pub struct DestroyRegistry {
    state: Mutex<RegistryState>,
}

impl DestroyRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a teardown step for the component at `path`.
    ///
    /// # Errors
    /// Returns [`WireError::Destroyed`] once the drain has started.
    pub fn register(&self, path: impl Into<Arc<str>>, teardown: DestroyFn) -> Result<()> {
        let path = path.into();
        let mut state = self.state.lock();
        if state.draining {
            return Err(WireError::destroyed("context teardown already started").at(path.to_string()));
        }
        trace!(path = %path, position = state.entries.len(), "Destroy handler registered");
        state.entries.push((path, teardown));
        Ok(())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.state.lock().entries.len()
    }

    #[must_use]
    pub fn is_draining(&self) -> bool {
        self.state.lock().draining
    }

    /// Runs every registered step in order, each settling before the next starts.
    ///
    /// The first failure stops the drain unless `continue_on_error` is set, in
    /// which case every step runs and the first failure is reported at the end.
    /// Later calls find nothing to run.
    ///
    /// # Errors
    /// Returns the first failing step's error.
    pub async fn drain(&self, continue_on_error: bool) -> Result<()> {
        let entries = {
            let mut state = self.state.lock();
            state.draining = true;
            std::mem::take(&mut state.entries)
        };
        info!(count = entries.len(), continue_on_error, "Draining destroy handlers");

        let mut first_error = None;
        for (path, teardown) in entries {
            match teardown().await {
                Ok(()) => trace!(path = %path, "Destroy handler finished"),
                Err(err) if continue_on_error => {
                    warn!(path = %path, error = %err, "Destroy handler failed, continuing");
                    if first_error.is_none() {
                        first_error = Some(err);
                    }
                },
                Err(err) => {
                    warn!(path = %path, error = %err, "Destroy handler failed, aborting teardown");
                    return Err(err);
                },
            }
        }
        first_error.map_or(Ok(()), Err)
    }
}

impl fmt::Debug for DestroyRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("DestroyRegistry")
            .field("pending", &state.entries.len())
            .field("draining", &state.draining)
            .finish()
    }
}
