//! Request outcomes, coordinator state and playback events

use crate::media::{PlayError, VideoId};

/// Result of a play request
///
/// The coordinator never returns errors; everything that happened to a
/// request is described here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayOutcome {
    /// The requested element is current and playing
    Playing {
        /// Video that is playing
        id: VideoId,
        /// Whether it ended up muted (true after an autoplay fallback)
        muted: bool,
    },
    /// The same element and id were already current; nothing was done
    AlreadyCurrent,
    /// Dropped because it arrived inside the debounce window
    Debounced,
    /// A newer request or a pause took over before this one finished
    Superseded,
    /// Playback failed; nothing is current
    Failed(PlayError),
}

impl PlayOutcome {
    /// Whether the request left its element playing
    pub fn is_playing(&self) -> bool {
        matches!(self, PlayOutcome::Playing { .. })
    }
}

/// Coordinator state machine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoordinatorState {
    /// No current element
    Idle,
    /// An element is current (its start may still be in flight)
    Playing {
        /// Current video
        id: VideoId,
        /// Mute flag applied to the current element
        muted: bool,
    },
}

impl CoordinatorState {
    /// Whether nothing is current
    pub fn is_idle(&self) -> bool {
        matches!(self, CoordinatorState::Idle)
    }
}

/// Why a video stopped being current
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// A play request for another element took over
    Preempted,
    /// Paused by the caller
    Paused,
    /// Its start settled after ownership had moved on
    Superseded,
    /// The play request was dropped before its start settled
    Cancelled,
}

/// Playback event pushed to subscribers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaybackEvent {
    /// A video started playing
    Started { id: VideoId, muted: bool },
    /// Unmuted playback was refused; retrying muted
    MutedFallback { id: VideoId },
    /// A video stopped being current
    Stopped { id: VideoId, reason: StopReason },
    /// A video failed to start and nothing is current
    Failed { id: VideoId, error: PlayError },
}
