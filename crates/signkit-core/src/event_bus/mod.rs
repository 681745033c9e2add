//! Typed notifications from the editor and the synchronizer.
//!
//! Library code publishes with [`emit!`](crate::emit) and ignores the result;
//! a host shell listens with [`on_event!`](crate::on_event) or polls
//! [`EventBus::receiver`] from a tokio task.
//!
//! ```rust,ignore
//! use signkit_core::event_bus::{AppEvent, DraftEvent, EventFilter};
//! use signkit_core::on_event;
//!
//! let id = on_event!(EventFilter::Document("42".into()), |event: &AppEvent| {
//!     if let AppEvent::Draft(DraftEvent::Saved { text_fields, signatures, .. }) = event {
//!         println!("saved {} field(s), {} signature(s)", text_fields, signatures);
//!     }
//! });
//! signkit_core::event_bus::event_bus().unsubscribe(id);
//! ```

mod bus;
mod events;

pub use bus::*;
pub use events::*;
