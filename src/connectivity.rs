//! Online/offline state, injected instead of read from the environment.
//!
//! Screens call [`Connectivity::subscribe`] when they mount and drop the receiver
//! when they unmount. The shell reports changes through [`Connectivity::set_online`].

use std::sync::Arc;

use log::info;
use tokio::sync::watch;

#[derive(Debug, Clone)]
pub struct Connectivity {
    tx: Arc<watch::Sender<bool>>,
}

impl Connectivity {
    pub fn new(online: bool) -> Self {
        let (tx, _) = watch::channel(online);
        Self { tx: Arc::new(tx) }
    }

    pub fn is_online(&self) -> bool {
        *self.tx.borrow()
    }

    /// Publishes a new state. Subscribers are only woken when it actually changed.
    pub fn set_online(&self, online: bool) {
        let changed = self.tx.send_if_modified(|current| {
            if *current == online {
                return false;
            }
            *current = online;
            true
        });
        if changed {
            info!("Connectivity changed: {}", if online { "online" } else { "offline" });
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }

    /// Number of live receivers, i.e. how many screens are currently mounted.
    ///
    /// The shell can skip forwarding connectivity events while this is zero.
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for Connectivity {
    fn default() -> Self {
        Self::new(true)
    }
}
