//! # SignKit Core
//!
//! Shared types for the signing client: the error taxonomy, the document
//! lifecycle state machine, document metadata and the event bus.

pub mod document;
pub mod error;
pub mod event_bus;
pub mod lifecycle;
pub mod types;

pub use document::{DocumentId, DocumentMetadata};

pub use error::{
    AssetResolutionError, DocumentError, EditorError, Error, LifecycleError, NetworkError,
    Result, ValidationError,
};

pub use event_bus::{
    event_bus, AppEvent, EventBus, EventBusConfig, EventCategory, EventFilter, SubscriptionId,
};

pub use lifecycle::{DocumentStatus, LifecycleEvent};

pub use types::DataCallback;
