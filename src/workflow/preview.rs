//! Preview resources held for accepted source images.
//!
//! Each accepted image gets one [`PreviewHandle`] that the presentation
//! layer maps to whatever it displays (an object URL, a thumbnail file).
//! Handles are released explicitly when an image is removed or replaced,
//! and on drop otherwise, so the registry's live count returns to zero
//! once a workflow is torn down.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

#[derive(Debug, Default)]
struct Counters {
    next_id: AtomicU64,
    live: AtomicUsize,
    released: AtomicU64,
}

/// Issues preview handles and tracks how many are outstanding.
#[derive(Debug, Clone, Default)]
pub struct PreviewRegistry {
    counters: Arc<Counters>,
}

impl PreviewRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates a new handle.
    pub fn acquire(&self) -> PreviewHandle {
        let id = self.counters.next_id.fetch_add(1, Ordering::Relaxed);
        self.counters.live.fetch_add(1, Ordering::AcqRel);
        tracing::trace!(preview = id, "preview acquired");
        PreviewHandle {
            id,
            counters: Arc::clone(&self.counters),
            released: false,
        }
    }

    /// Number of handles not yet released.
    pub fn live(&self) -> usize {
        self.counters.live.load(Ordering::Acquire)
    }

    /// Total number of handles released so far.
    pub fn released(&self) -> u64 {
        self.counters.released.load(Ordering::Acquire)
    }
}

/// A preview resource owned by a workflow controller.
#[derive(Debug)]
pub struct PreviewHandle {
    id: u64,
    counters: Arc<Counters>,
    released: bool,
}

impl PreviewHandle {
    /// Identifier unique within the issuing registry.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Releases the resource now.
    pub fn release(mut self) {
        self.release_inner();
    }

    fn release_inner(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        self.counters.live.fetch_sub(1, Ordering::AcqRel);
        self.counters.released.fetch_add(1, Ordering::AcqRel);
        tracing::trace!(preview = self.id, "preview released");
    }
}

impl Drop for PreviewHandle {
    fn drop(&mut self) {
        self.release_inner();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_acquire_and_release() {
        let registry = PreviewRegistry::new();
        let a = registry.acquire();
        let b = registry.acquire();
        assert_ne!(a.id(), b.id());
        assert_eq!(registry.live(), 2);

        a.release();
        assert_eq!(registry.live(), 1);
        assert_eq!(registry.released(), 1);

        drop(b);
        assert_eq!(registry.live(), 0);
        assert_eq!(registry.released(), 2);
    }

    #[test]
    fn test_clones_share_counters() {
        let registry = PreviewRegistry::new();
        let view = registry.clone();
        let handle = registry.acquire();
        assert_eq!(view.live(), 1);
        handle.release();
        assert_eq!(view.live(), 0);
    }
}
