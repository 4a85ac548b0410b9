//! Online/offline signal gating the network path.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

pub trait Connectivity: Send + Sync {
    fn is_online(&self) -> bool;
}

/// Fixed answer, e.g. from a `--offline` flag.
impl Connectivity for bool {
    fn is_online(&self) -> bool {
        *self
    }
}

/// Switchable at runtime from another task or thread.
impl Connectivity for AtomicBool {
    fn is_online(&self) -> bool {
        self.load(Ordering::Acquire)
    }
}

impl<C: Connectivity + ?Sized> Connectivity for Arc<C> {
    fn is_online(&self) -> bool {
        (**self).is_online()
    }
}
