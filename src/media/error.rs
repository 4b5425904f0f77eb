//! Media engine error types
//!
//! Rejections a media element can report when asked to start playback.

use std::time::Duration;

/// Error returned by [`MediaElement::play`](super::MediaElement::play)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayError {
    /// Autoplay policy refused playback (usually unmuted, without a user gesture)
    NotAllowed(String),
    /// Playback was interrupted by a pause or a new load before it started
    Aborted(String),
    /// The source cannot be played
    NotSupported(String),
    /// The engine did not settle within the start timeout
    TimedOut(Duration),
    /// Any other engine failure
    Engine(String),
}

impl PlayError {
    /// Whether this rejection came from the autoplay policy
    pub fn is_autoplay_blocked(&self) -> bool {
        matches!(self, PlayError::NotAllowed(_))
    }
}

impl std::fmt::Display for PlayError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlayError::NotAllowed(msg) => write!(f, "Playback not allowed: {}", msg),
            PlayError::Aborted(msg) => write!(f, "Playback aborted: {}", msg),
            PlayError::NotSupported(msg) => write!(f, "Source not supported: {}", msg),
            PlayError::TimedOut(after) => {
                write!(f, "Playback did not start within {}ms", after.as_millis())
            }
            PlayError::Engine(msg) => write!(f, "Media engine error: {}", msg),
        }
    }
}

impl std::error::Error for PlayError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_autoplay_blocked() {
        assert!(PlayError::NotAllowed("no gesture".into()).is_autoplay_blocked());
        assert!(!PlayError::Aborted("paused".into()).is_autoplay_blocked());
        assert!(!PlayError::TimedOut(Duration::from_secs(1)).is_autoplay_blocked());
    }

    #[test]
    fn test_display() {
        let err = PlayError::TimedOut(Duration::from_millis(1500));
        assert_eq!(err.to_string(), "Playback did not start within 1500ms");

        let err = PlayError::NotSupported("video/x-unknown".into());
        assert_eq!(err.to_string(), "Source not supported: video/x-unknown");
    }
}
