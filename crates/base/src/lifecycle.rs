//! One-shot lifecycle signals for a wiring context.

use tokio::sync::watch;

/// Creates a connected trigger/signal pair, initially not fired.
#[must_use]
pub fn signal() -> (SignalTrigger, LifecycleSignal) {
    let (tx, rx) = watch::channel(false);
    (SignalTrigger(tx), LifecycleSignal(rx))
}

/// Firing side of a lifecycle signal. Fires at most once.
#[derive(Debug)]
pub struct SignalTrigger(watch::Sender<bool>);

impl SignalTrigger {
    /// Fires the signal. Returns `false` when it had already fired.
    pub fn fire(&self) -> bool {
        self.0.send_if_modified(|fired| {
            if *fired {
                false
            } else {
                *fired = true;
                true
            }
        })
    }

    #[must_use]
    pub fn subscribe(&self) -> LifecycleSignal {
        LifecycleSignal(self.0.subscribe())
    }
}

/// Observing side of a lifecycle signal; cheap to clone.
#[derive(Debug, Clone)]
pub struct LifecycleSignal(watch::Receiver<bool>);

impl LifecycleSignal {
    #[must_use]
    pub fn is_fired(&self) -> bool {
        *self.0.borrow()
    }

    /// Waits for the signal. Returns `false` if the trigger was dropped without firing.
    pub async fn fired(&self) -> bool {
        if self.is_fired() {
            return true;
        }
        let mut rx = self.0.clone();
        rx.wait_for(|fired| *fired).await.is_ok()
    }
}
