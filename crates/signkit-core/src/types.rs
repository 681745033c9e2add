//! Callback aliases shared by the library crates.

/// Callback receiving a single value.
///
/// ```rust,ignore
/// let on_save: DataCallback<DocumentId> = Box::new(|id| println!("saved {}", id));
/// ```
pub type DataCallback<T> = Box<dyn Fn(T) + Send + Sync>;
