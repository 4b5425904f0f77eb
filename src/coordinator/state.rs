//! Coordinator-owned playback state
//!
//! Only `PlaybackCoordinator` touches these types; callers see snapshots.

use std::sync::Arc;

use tokio::sync::watch;
use tokio::time::Instant;

use crate::media::{MediaElement, VideoId};
use crate::stats::CoordinatorStats;

use super::outcome::CoordinatorState;

/// The element currently allowed to play
///
/// Handle and id live in one struct so they are set and cleared together.
pub(super) struct Current<E> {
    pub element: Arc<E>,
    pub id: VideoId,
    pub muted: bool,
    /// Commit that made this element current
    pub generation: u64,
}

/// Single-slot marker for a start attempt that has not settled yet
pub(super) struct InFlight {
    pub generation: u64,
    /// Flips to `true` (or loses its sender) once the attempt settles
    pub settled: watch::Receiver<bool>,
}

pub(super) struct PlaybackState<E> {
    pub current: Option<Current<E>>,
    pub in_flight: Option<InFlight>,
    /// When the last non-debounced play request began
    pub last_operation: Option<Instant>,
    /// Last commit number handed out
    pub generation: u64,
    /// Ticket of the newest request that passed the debounce
    pub latest_ticket: u64,
    pub stats: CoordinatorStats,
}

impl<E: MediaElement> PlaybackState<E> {
    pub fn new() -> Self {
        Self {
            current: None,
            in_flight: None,
            last_operation: None,
            generation: 0,
            latest_ticket: 0,
            stats: CoordinatorStats::new(),
        }
    }

    /// Whether `element` is the current handle, whatever its id
    pub fn is_current_element(&self, element: &Arc<E>) -> bool {
        self.current
            .as_ref()
            .is_some_and(|c| Arc::ptr_eq(&c.element, element))
    }

    /// Whether this exact id and handle pair is current
    pub fn is_current_pair(&self, id: &VideoId, element: &Arc<E>) -> bool {
        self.current
            .as_ref()
            .is_some_and(|c| c.id == *id && Arc::ptr_eq(&c.element, element))
    }

    /// Whether the commit `generation` still owns the current slot
    pub fn owns(&self, generation: u64) -> bool {
        self.current
            .as_ref()
            .is_some_and(|c| c.generation == generation)
    }

    /// Pause and rewind the current element and forget it
    pub fn stop_current(&mut self) -> Option<VideoId> {
        let current = self.current.take()?;
        current.element.pause();
        current.element.reset_position();
        Some(current.id)
    }

    /// Clear the in-flight slot if it still belongs to `generation`
    pub fn release_in_flight(&mut self, generation: u64) {
        if self
            .in_flight
            .as_ref()
            .is_some_and(|f| f.generation == generation)
        {
            self.in_flight = None;
        }
    }

    /// Completion signal of the attempt in flight, if any
    pub fn pending(&self) -> Option<watch::Receiver<bool>> {
        self.in_flight.as_ref().map(|f| f.settled.clone())
    }

    pub fn snapshot(&self) -> CoordinatorState {
        match &self.current {
            Some(current) => CoordinatorState::Playing {
                id: current.id.clone(),
                muted: current.muted,
            },
            None => CoordinatorState::Idle,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use crate::media::ScriptedElement;

    use super::*;

    fn current(
        element: &Arc<ScriptedElement>,
        id: &str,
        generation: u64,
    ) -> Current<ScriptedElement> {
        Current {
            element: Arc::clone(element),
            id: VideoId::new(id),
            muted: false,
            generation,
        }
    }

    #[test]
    fn test_identity_is_by_handle() {
        let a = Arc::new(ScriptedElement::new("a"));
        let twin = Arc::new(ScriptedElement::new("a"));
        let mut state = PlaybackState::new();
        state.current = Some(current(&a, "v1", 1));

        assert!(state.is_current_element(&a));
        assert!(state.is_current_element(&Arc::clone(&a)));
        assert!(!state.is_current_element(&twin));
        assert!(state.is_current_pair(&VideoId::new("v1"), &a));
        assert!(!state.is_current_pair(&VideoId::new("v2"), &a));
        assert!(!state.is_current_pair(&VideoId::new("v1"), &twin));
    }

    #[test]
    fn test_stop_current_rewinds() {
        let a = Arc::new(ScriptedElement::new("a"));
        a.set_position(Duration::from_secs(4));
        let mut state = PlaybackState::new();
        state.current = Some(current(&a, "v1", 1));

        assert_eq!(state.stop_current(), Some(VideoId::new("v1")));
        assert_eq!(a.position(), Duration::ZERO);
        assert_eq!(a.snapshot().pause_calls, 1);
        assert!(state.snapshot().is_idle());
        assert_eq!(state.stop_current(), None);
    }

    #[test]
    fn test_release_in_flight_only_own_generation() {
        let (_tx, rx) = watch::channel(false);
        let mut state: PlaybackState<ScriptedElement> = PlaybackState::new();
        state.in_flight = Some(InFlight {
            generation: 2,
            settled: rx,
        });

        state.release_in_flight(1);
        assert!(state.pending().is_some());

        state.release_in_flight(2);
        assert!(state.pending().is_none());
    }
}
