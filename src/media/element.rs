//! Media element capability and video identifiers
//!
//! The coordinator never inspects media elements beyond this trait. A feed
//! renderer hands over `Arc<E>` handles; two handles are the same element
//! only if they point at the same allocation.

use std::future::Future;

use super::error::PlayError;

/// A playable media element (the browser's `<video>`, a native player, ...)
///
/// All methods take `&self`; implementations use interior mutability.
pub trait MediaElement: Send + Sync + 'static {
    /// Start playback
    ///
    /// Resolves once playback actually started, or rejects. Implementations
    /// are free to take arbitrarily long; the coordinator bounds the wait.
    fn play(&self) -> impl Future<Output = Result<(), PlayError>> + Send;

    /// Pause playback
    fn pause(&self);

    /// Seek back to the start of the media
    fn reset_position(&self);

    /// Set the mute flag
    fn set_muted(&self, muted: bool);

    /// Current mute flag
    fn is_muted(&self) -> bool;
}

/// Opaque identifier of a logical video
///
/// Distinct from the element handle, since the UI layer may recycle one
/// element for several videos.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VideoId(String);

impl VideoId {
    /// Create a new video identifier
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the identifier as a string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for VideoId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for VideoId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl PartialEq<str> for VideoId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl std::fmt::Display for VideoId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
