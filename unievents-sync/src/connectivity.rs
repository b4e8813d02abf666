//! Online/offline signal.

use tokio::sync::watch;

/// Shared connectivity flag.
///
/// Whoever observes the network (the host app, a probe, a test) calls
/// [`set_online`](Self::set_online); the coordinator subscribes and reacts to
/// transitions. Clones share the same flag.
#[derive(Clone, Debug)]
pub struct ConnectivityMonitor {
    tx: watch::Sender<bool>,
}

impl ConnectivityMonitor {
    pub fn new(online: bool) -> Self {
        let (tx, _rx) = watch::channel(online);
        Self { tx }
    }

    pub fn is_online(&self) -> bool {
        *self.tx.borrow()
    }

    /// Updates the flag. Subscribers are only woken on an actual change.
    /// Returns true if the value changed.
    pub fn set_online(&self, online: bool) -> bool {
        self.tx.send_if_modified(|current| {
            if *current == online {
                false
            } else {
                *current = online;
                true
            }
        })
    }

    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }
}

impl Default for ConnectivityMonitor {
    fn default() -> Self {
        Self::new(true)
    }
}
