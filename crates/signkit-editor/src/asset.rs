//! Session-local image handles for signature previews.
//!
//! A handle is a revocable reference to preview bytes held by a registry.
//! Clones share one registration; the registry is told to release it when
//! the last clone is dropped, which happens when a signature is deleted,
//! when its preview is superseded and when the session is dropped.

use std::fmt;
use std::sync::Arc;

/// Registry side of an image handle.
pub trait HandleRelease: Send + Sync {
    fn release(&self, key: &str);
}

struct HandleInner {
    key: String,
    releaser: Option<Arc<dyn HandleRelease>>,
}

impl Drop for HandleInner {
    fn drop(&mut self) {
        if let Some(releaser) = &self.releaser {
            releaser.release(&self.key);
        }
    }
}

/// Revocable preview handle.
#[derive(Clone)]
pub struct ImageHandle {
    inner: Arc<HandleInner>,
}

impl ImageHandle {
    /// Creates a handle that notifies `releaser` once no clone is left.
    pub fn new(key: impl Into<String>, releaser: Arc<dyn HandleRelease>) -> Self {
        Self {
            inner: Arc::new(HandleInner {
                key: key.into(),
                releaser: Some(releaser),
            }),
        }
    }

    /// Creates a handle that is not backed by a registry.
    pub fn detached(key: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(HandleInner {
                key: key.into(),
                releaser: None,
            }),
        }
    }

    pub fn key(&self) -> &str {
        &self.inner.key
    }
}

impl PartialEq for ImageHandle {
    fn eq(&self, other: &Self) -> bool {
        self.inner.key == other.inner.key
    }
}

impl fmt::Debug for ImageHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ImageHandle").field(&self.inner.key).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder(Mutex<Vec<String>>);

    impl HandleRelease for Recorder {
        fn release(&self, key: &str) {
            self.0.lock().unwrap().push(key.to_string());
        }
    }

    #[test]
    fn test_released_after_last_clone() {
        let recorder = Arc::new(Recorder::default());
        let handle = ImageHandle::new("blob:1", recorder.clone());
        let copy = handle.clone();

        drop(handle);
        assert!(recorder.0.lock().unwrap().is_empty());

        drop(copy);
        assert_eq!(*recorder.0.lock().unwrap(), vec!["blob:1".to_string()]);
    }
}
