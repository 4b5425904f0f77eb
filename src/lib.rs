//! Playback coordination for short-form vertical video feeds
//!
//! A feed renders many video elements but only the one on screen should
//! play. [`PlaybackCoordinator`] enforces that: it pauses and rewinds the
//! previous element, sequences overlapping start attempts, debounces fast
//! swipes, and falls back to muted playback when the autoplay policy
//! refuses sound.
//!
//! # Example
//! ```no_run
//! use std::sync::Arc;
//!
//! use feed_playback::media::ScriptedElement;
//! use feed_playback::{PlaybackCoordinator, PlayOutcome};
//!
//! # async fn example() {
//! let coordinator = PlaybackCoordinator::new();
//! let clip = Arc::new(ScriptedElement::new("clip-1").with_autoplay_blocked());
//!
//! match coordinator.request_play(&clip, false, "vendor-42/reel").await {
//!     PlayOutcome::Playing { muted, .. } => println!("playing (muted: {})", muted),
//!     other => println!("not playing: {:?}", other),
//! }
//! # }
//! ```

pub mod coordinator;
pub mod media;
pub mod stats;

pub use coordinator::{
    CoordinatorConfig, CoordinatorState, PlayOutcome, PlaybackCoordinator, PlaybackEvent,
    StopReason,
};
pub use media::{MediaElement, PlayError, VideoId};
pub use stats::CoordinatorStats;
