//! # SignKit
//!
//! Annotation placement and draft/submit client for signing PDF documents.
//!
//! ## Architecture
//!
//! SignKit is organized as a workspace with multiple crates:
//!
//! 1. **signkit-core** - Error taxonomy, document lifecycle, metadata, events
//! 2. **signkit-editor** - Viewport, annotation store, placement, drag/resize, signature capture
//! 3. **signkit-sync** - Signing API backends, draft/submit synchronizer, PDF inspection
//! 4. **signkit-settings** - Configuration files and platform paths
//! 5. **signkit** - Command-line client that ties the crates together
//!
//! All annotation geometry is stored in PDF document space. Zoom only changes
//! how it is drawn.

pub use signkit_core::{
    event_bus, AppEvent, DocumentId, DocumentMetadata, DocumentStatus, EditorError, Error,
    LifecycleEvent, NetworkError, Result, ValidationError,
};

pub use signkit_editor::{
    Annotation, AnnotationId, CaptureConfig, EditorConfig, EditorSession, PlacementMode, Point,
    Rect, Signature, Size, TextField, Viewport,
};

pub use signkit_sync::{
    AlwaysConfirm, DraftPayload, DraftSynchronizer, HttpBackend, HttpSettings, InMemoryBackend,
    PdfEngine, SigningBackend, SigningWorkspace, SubmitConfirmation, SyncError, WorkspaceContext,
};

pub use signkit_settings::{Config, SettingsPersistence};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Initialize logging with the default configuration
///
/// Sets up structured logging with:
/// - Pretty formatting on stderr, keeping stdout for command output
/// - RUST_LOG environment variable support, `info` when unset
pub fn init_logging() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .with_thread_ids(true)
        .with_thread_names(true)
        .with_line_number(true)
        .pretty();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialise logging: {}", e))?;

    Ok(())
}
