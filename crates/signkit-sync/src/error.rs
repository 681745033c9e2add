//! Errors raised by the synchronization layer.

use signkit_core::{
    AssetResolutionError, DocumentError, EditorError, Error, LifecycleError, NetworkError,
    ValidationError,
};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SyncError {
    /// Error from the shared taxonomy
    #[error(transparent)]
    Core(#[from] Error),

    /// A submit is already running for this session
    #[error("A submit is already in progress")]
    SubmitInProgress,

    /// The user declined the submit confirmation
    #[error("Submit was not confirmed")]
    NotConfirmed,
}

impl SyncError {
    /// HTTP status of a failed request, if the server answered
    pub fn status(&self) -> Option<u16> {
        match self {
            SyncError::Core(Error::Network(e)) => e.status(),
            _ => None,
        }
    }

    pub fn is_read_only(&self) -> bool {
        matches!(self, SyncError::Core(e) if e.is_read_only())
    }

    pub fn is_validation_error(&self) -> bool {
        matches!(self, SyncError::Core(e) if e.is_validation_error())
    }

    pub fn is_network_error(&self) -> bool {
        matches!(self, SyncError::Core(e) if e.is_network_error())
    }

    /// Whether the session cannot continue
    pub fn is_fatal(&self) -> bool {
        matches!(self, SyncError::Core(e) if e.is_fatal())
    }
}

macro_rules! via_core {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for SyncError {
                fn from(err: $ty) -> Self {
                    SyncError::Core(err.into())
                }
            }
        )*
    };
}

via_core!(
    NetworkError,
    ValidationError,
    EditorError,
    DocumentError,
    AssetResolutionError,
    LifecycleError,
    serde_json::Error,
);

pub type Result<T> = std::result::Result<T, SyncError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversions() {
        let err: SyncError = NetworkError::Status {
            endpoint: "/signing/1/submit".to_string(),
            status: 500,
            message: "boom".to_string(),
        }
        .into();
        assert!(err.is_network_error());
        assert_eq!(err.status(), Some(500));

        let err: SyncError = EditorError::ReadOnly {
            operation: "save".to_string(),
        }
        .into();
        assert!(err.is_read_only());
        assert!(!SyncError::SubmitInProgress.is_fatal());
    }
}
