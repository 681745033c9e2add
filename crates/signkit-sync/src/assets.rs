//! In-memory registry backing signature preview handles.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use signkit_editor::{HandleRelease, ImageHandle};

/// Holds preview bytes for the lifetime of their handles.
#[derive(Default)]
pub struct AssetRegistry {
    blobs: RwLock<HashMap<String, Arc<Vec<u8>>>>,
}

impl AssetRegistry {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Stores `bytes` and returns a handle that frees them when dropped.
    pub fn register(self: &Arc<Self>, bytes: Vec<u8>) -> ImageHandle {
        let key = format!("blob:{}", Uuid::new_v4());
        self.blobs.write().insert(key.clone(), Arc::new(bytes));
        tracing::trace!("Registered preview {}", key);
        let releaser: Arc<dyn HandleRelease> = self.clone();
        ImageHandle::new(key, releaser)
    }

    pub fn get(&self, key: &str) -> Option<Arc<Vec<u8>>> {
        self.blobs.read().get(key).cloned()
    }

    /// Number of previews still referenced by a handle.
    pub fn live_count(&self) -> usize {
        self.blobs.read().len()
    }
}

impl HandleRelease for AssetRegistry {
    fn release(&self, key: &str) {
        if self.blobs.write().remove(key).is_some() {
            tracing::trace!("Released preview {}", key);
        }
    }
}

impl std::fmt::Debug for AssetRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssetRegistry")
            .field("live", &self.live_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_release_on_last_drop() {
        let registry = AssetRegistry::new();
        let handle = registry.register(vec![1, 2, 3]);
        let clone = handle.clone();
        assert_eq!(registry.live_count(), 1);
        assert_eq!(registry.get(handle.key()).unwrap().as_slice(), &[1, 2, 3]);

        drop(handle);
        assert_eq!(registry.live_count(), 1);
        drop(clone);
        assert_eq!(registry.live_count(), 0);
    }

    #[test]
    fn test_keys_are_unique() {
        let registry = AssetRegistry::new();
        let a = registry.register(vec![0]);
        let b = registry.register(vec![0]);
        assert_ne!(a.key(), b.key());
        assert!(a.key().starts_with("blob:"));
    }
}
