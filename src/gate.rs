//! Launch coordination across cards

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// Single-slot coordinator for calls against the serving API
///
/// One gate is shared by every card mounted on a page, so holding the permit
/// means a launch is in flight somewhere on that page. The separate
/// `updating` flag belongs to catalog refresh; cards stay quiet while the
/// listing reloads.
pub struct LaunchGate {
    slot: Arc<Semaphore>,
    updating: AtomicBool,
}

impl LaunchGate {
    pub fn new() -> Self {
        Self {
            slot: Arc::new(Semaphore::new(1)),
            updating: AtomicBool::new(false),
        }
    }

    /// Try to claim the launch slot without waiting
    ///
    /// Returns `None` while another launch holds the slot or a catalog
    /// update is in progress. The permit reopens the gate on drop, which
    /// covers every exit path of the request it guards.
    pub fn try_acquire(&self) -> Option<LaunchPermit> {
        if self.updating.load(Ordering::SeqCst) {
            return None;
        }

        self.slot
            .clone()
            .try_acquire_owned()
            .ok()
            .map(|permit| LaunchPermit { _permit: permit })
    }

    /// Flag a catalog update in progress; new launches are refused while set
    pub fn set_updating(&self, updating: bool) {
        self.updating.store(updating, Ordering::SeqCst);
    }

    pub fn is_updating(&self) -> bool {
        self.updating.load(Ordering::SeqCst)
    }

    /// True while a launch is in flight or the catalog is updating
    pub fn is_busy(&self) -> bool {
        self.slot.available_permits() == 0 || self.is_updating()
    }
}

impl Default for LaunchGate {
    fn default() -> Self {
        Self::new()
    }
}

/// Claim on the launch slot; dropping it reopens the gate
pub struct LaunchPermit {
    _permit: OwnedSemaphorePermit,
}
