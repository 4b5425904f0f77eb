//! Playback coordinator implementation
//!
//! Serializes play requests from a scrolling feed so that at most one
//! element plays at a time.

use std::sync::Arc;

use tokio::sync::{broadcast, watch, Mutex};
use tokio::time::Instant;

use crate::media::{MediaElement, PlayError, VideoId};
use crate::stats::CoordinatorStats;

use super::config::CoordinatorConfig;
use super::outcome::{CoordinatorState, PlayOutcome, PlaybackEvent, StopReason};
use super::state::{Current, InFlight, PlaybackState};

/// Request that passed the debounce and idempotence checks
struct Admitted {
    ticket: u64,
    pending: Option<watch::Receiver<bool>>,
}

/// Committed attempt that has not been reconciled yet
///
/// If the `request_play` future is dropped between commit and `finish`,
/// the drop releases the slot so the coordinator never reports an element
/// that nobody is starting.
struct AttemptGuard<E: MediaElement> {
    state: Arc<Mutex<PlaybackState<E>>>,
    events: broadcast::Sender<PlaybackEvent>,
    element: Arc<E>,
    id: VideoId,
    generation: u64,
    settled_tx: Option<watch::Sender<bool>>,
}

impl<E: MediaElement> AttemptGuard<E> {
    /// The attempt went through `finish`; wake waiting requests
    fn complete(mut self) {
        if let Some(settled_tx) = self.settled_tx.take() {
            let _ = settled_tx.send(true);
        }
    }
}

impl<E: MediaElement> Drop for AttemptGuard<E> {
    fn drop(&mut self) {
        // Held until cleanup ran; dropping it wakes waiters
        let Some(settled_tx) = self.settled_tx.take() else {
            return;
        };

        if let Ok(mut state) = self.state.try_lock() {
            abandon(&mut state, &self.events, &self.element, &self.id, self.generation);
            drop(settled_tx);
            return;
        }

        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            tracing::warn!(video = %self.id, "Cancelled play attempt left without cleanup");
            return;
        };
        let state = Arc::clone(&self.state);
        let events = self.events.clone();
        let element = Arc::clone(&self.element);
        let id = self.id.clone();
        let generation = self.generation;
        handle.spawn(async move {
            let mut state = state.lock().await;
            abandon(&mut state, &events, &element, &id, generation);
            drop(settled_tx);
        });
    }
}

/// Release a committed attempt whose request was cancelled
fn abandon<E: MediaElement>(
    state: &mut PlaybackState<E>,
    events: &broadcast::Sender<PlaybackEvent>,
    element: &Arc<E>,
    id: &VideoId,
    generation: u64,
) {
    state.release_in_flight(generation);

    if !state.owns(generation) {
        if !state.is_current_element(element) {
            element.pause();
            element.reset_position();
        }
        return;
    }

    state.current = None;
    element.pause();
    element.reset_position();
    state.stats.cancelled += 1;
    tracing::info!(video = %id, "Play request cancelled, nothing is playing");
    let _ = events.send(PlaybackEvent::Stopped {
        id: id.clone(),
        reason: StopReason::Cancelled,
    });
}

/// Arbiter that lets exactly one media element play at a time
///
/// Construct one per application (or per feed) and share it with `Arc`.
/// The internal lock is never held while the media engine is awaited.
pub struct PlaybackCoordinator<E: MediaElement> {
    /// Shared with in-flight attempt guards
    state: Arc<Mutex<PlaybackState<E>>>,

    /// Playback event fan-out
    events: broadcast::Sender<PlaybackEvent>,

    config: CoordinatorConfig,
}

impl<E: MediaElement> PlaybackCoordinator<E> {
    /// Create a coordinator with default configuration
    pub fn new() -> Self {
        Self::with_config(CoordinatorConfig::default())
    }

    /// Create a coordinator with custom configuration
    pub fn with_config(config: CoordinatorConfig) -> Self {
        let (events, _) = broadcast::channel(config.event_capacity.max(1));
        Self {
            state: Arc::new(Mutex::new(PlaybackState::new())),
            events,
            config,
        }
    }

    /// Get the coordinator configuration
    pub fn config(&self) -> &CoordinatorConfig {
        &self.config
    }

    /// Subscribe to playback events
    pub fn subscribe(&self) -> broadcast::Receiver<PlaybackEvent> {
        self.events.subscribe()
    }

    /// Ask for `element` to become the one playing video
    ///
    /// Requests inside the debounce window are dropped. A different element
    /// that is current gets paused and rewound right away. If an earlier
    /// start is still in flight, this request waits for it to settle plus
    /// the grace period, and is abandoned if a newer request arrived
    /// meanwhile. An unmuted start refused by the autoplay policy is retried
    /// once muted.
    ///
    /// Cancel-safe: dropping the future after the commit stops the element
    /// and leaves the coordinator idle.
    pub async fn request_play(
        &self,
        element: &Arc<E>,
        muted: bool,
        id: impl Into<VideoId>,
    ) -> PlayOutcome {
        let id = id.into();

        let admitted = match self.admit(element, &id).await {
            Ok(admitted) => admitted,
            Err(outcome) => return outcome,
        };

        if let Some(mut settled) = admitted.pending {
            tracing::debug!(video = %id, "Waiting for pending play attempt");
            // Previous outcome is irrelevant; a dropped sender also means settled
            let _ = settled.wait_for(|done| *done).await;
            tokio::time::sleep(self.config.settle_grace).await;
        }

        let Some(guard) = self.commit(element, &id, muted, admitted.ticket).await else {
            return PlayOutcome::Superseded;
        };

        let outcome = self.attempt(element, &id, guard.generation).await;
        guard.complete();
        outcome
    }

    /// Pause `element` if it is the current one
    ///
    /// Returns whether anything was stopped. Safe to call on any element.
    pub async fn request_pause(&self, element: &Arc<E>) -> bool {
        let mut state = self.state.lock().await;

        if !state.is_current_element(element) {
            return false;
        }

        state.in_flight = None;
        if let Some(id) = state.stop_current() {
            state.stats.pauses += 1;
            tracing::info!(video = %id, "Video paused");
            self.emit(PlaybackEvent::Stopped {
                id,
                reason: StopReason::Paused,
            });
        }
        true
    }

    /// Stop whatever is current and clear all playback state
    ///
    /// Only the current element is touched. Elements whose start is still
    /// pending lost ownership at preemption, and their attempt pauses and
    /// rewinds them when it settles, so no late start survives this call.
    pub async fn pause_all(&self) -> Option<VideoId> {
        let mut state = self.state.lock().await;

        state.in_flight = None;
        let id = state.stop_current()?;
        state.stats.pauses += 1;
        tracing::info!(video = %id, "All playback stopped");
        self.emit(PlaybackEvent::Stopped {
            id: id.clone(),
            reason: StopReason::Paused,
        });
        Some(id)
    }

    /// Whether `id` is the current video
    pub async fn is_current(&self, id: &str) -> bool {
        let state = self.state.lock().await;
        state.current.as_ref().is_some_and(|c| c.id == *id)
    }

    /// Identifier of the current video
    pub async fn current_id(&self) -> Option<VideoId> {
        let state = self.state.lock().await;
        state.current.as_ref().map(|c| c.id.clone())
    }

    /// Current state machine position
    pub async fn state(&self) -> CoordinatorState {
        self.state.lock().await.snapshot()
    }

    /// Request statistics
    pub async fn stats(&self) -> CoordinatorStats {
        self.state.lock().await.stats.clone()
    }

    /// Debounce, idempotence and synchronous preemption
    async fn admit(&self, element: &Arc<E>, id: &VideoId) -> Result<Admitted, PlayOutcome> {
        let now = Instant::now();
        let mut state = self.state.lock().await;
        state.stats.requests += 1;

        if let Some(last) = state.last_operation {
            let elapsed = now.saturating_duration_since(last);
            if elapsed < self.config.debounce {
                state.stats.debounced += 1;
                tracing::debug!(
                    video = %id,
                    elapsed = ?elapsed,
                    "Debouncing play request"
                );
                return Err(PlayOutcome::Debounced);
            }
        }
        state.last_operation = Some(now);

        if state.is_current_pair(id, element) {
            state.stats.already_current += 1;
            tracing::debug!(video = %id, "Video is already current");
            return Err(PlayOutcome::AlreadyCurrent);
        }

        state.latest_ticket += 1;
        let ticket = state.latest_ticket;

        // Same handle under a new id keeps playing until the commit swaps ids
        if state.current.is_some() && !state.is_current_element(element) {
            if let Some(previous) = state.stop_current() {
                state.stats.preemptions += 1;
                tracing::info!(video = %previous, next = %id, "Stopping current video");
                self.emit(PlaybackEvent::Stopped {
                    id: previous,
                    reason: StopReason::Preempted,
                });
            }
        }

        Ok(Admitted {
            ticket,
            pending: state.pending(),
        })
    }

    /// Make `element` current and open the in-flight slot
    ///
    /// Returns `None` if a newer request has been admitted meanwhile.
    async fn commit(
        &self,
        element: &Arc<E>,
        id: &VideoId,
        muted: bool,
        ticket: u64,
    ) -> Option<AttemptGuard<E>> {
        let mut state = self.state.lock().await;

        if ticket != state.latest_ticket {
            state.stats.superseded += 1;
            tracing::debug!(video = %id, "Play request overtaken by a newer one");
            return None;
        }

        if let Some(previous) = state.current.take() {
            if !Arc::ptr_eq(&previous.element, element) {
                previous.element.pause();
                previous.element.reset_position();
            }
            if previous.id != *id {
                state.stats.preemptions += 1;
                self.emit(PlaybackEvent::Stopped {
                    id: previous.id,
                    reason: StopReason::Preempted,
                });
            }
        }

        state.generation += 1;
        let generation = state.generation;

        element.set_muted(muted);
        state.current = Some(Current {
            element: Arc::clone(element),
            id: id.clone(),
            muted,
            generation,
        });

        let (settled_tx, settled) = watch::channel(false);
        state.in_flight = Some(InFlight {
            generation,
            settled,
        });

        tracing::info!(video = %id, muted = muted, generation = generation, "Starting playback");
        Some(AttemptGuard {
            state: Arc::clone(&self.state),
            events: self.events.clone(),
            element: Arc::clone(element),
            id: id.clone(),
            generation,
            settled_tx: Some(settled_tx),
        })
    }

    /// Run the start call, with one muted retry on autoplay refusal
    async fn attempt(&self, element: &Arc<E>, id: &VideoId, generation: u64) -> PlayOutcome {
        let started = Instant::now();
        let mut result = self.start(element).await;

        let autoplay_blocked = matches!(&result, Err(err) if err.is_autoplay_blocked());
        if autoplay_blocked
            && self.config.muted_retry
            && !element.is_muted()
            && self.prepare_muted_retry(element, id, generation).await
        {
            result = self.start(element).await;
        }

        self.finish(element, id, generation, result, started).await
    }

    async fn start(&self, element: &Arc<E>) -> Result<(), PlayError> {
        match self.config.play_timeout {
            Some(limit) => tokio::time::timeout(limit, element.play())
                .await
                .unwrap_or(Err(PlayError::TimedOut(limit))),
            None => element.play().await,
        }
    }

    /// Mute the element for a retry, if this attempt still owns it
    async fn prepare_muted_retry(&self, element: &Arc<E>, id: &VideoId, generation: u64) -> bool {
        let mut state = self.state.lock().await;

        let Some(current) = state.current.as_mut().filter(|c| c.generation == generation) else {
            return false;
        };
        element.set_muted(true);
        current.muted = true;
        state.stats.muted_retries += 1;

        tracing::info!(video = %id, "Autoplay blocked, retrying muted");
        self.emit(PlaybackEvent::MutedFallback { id: id.clone() });
        true
    }

    /// Reconcile a settled attempt with the current state
    async fn finish(
        &self,
        element: &Arc<E>,
        id: &VideoId,
        generation: u64,
        result: Result<(), PlayError>,
        started: Instant,
    ) -> PlayOutcome {
        let mut state = self.state.lock().await;
        state.release_in_flight(generation);

        if !state.owns(generation) {
            // Ownership moved on while the engine was busy; make sure a late
            // start does not leave a second element running
            if !state.is_current_element(element) {
                element.pause();
                element.reset_position();
            }
            state.stats.superseded += 1;
            tracing::debug!(video = %id, "Play attempt settled after losing ownership");
            return PlayOutcome::Superseded;
        }

        match result {
            Ok(()) => {
                let muted = element.is_muted();
                state.stats.record_start(started.elapsed());
                tracing::info!(video = %id, muted = muted, "Video playing");
                self.emit(PlaybackEvent::Started {
                    id: id.clone(),
                    muted,
                });
                PlayOutcome::Playing {
                    id: id.clone(),
                    muted,
                }
            }
            Err(error) => {
                state.current = None;
                state.stats.failures += 1;
                if matches!(error, PlayError::TimedOut(_)) {
                    // The engine may still start later
                    element.pause();
                    element.reset_position();
                }
                tracing::warn!(video = %id, error = %error, "Play failed, nothing is playing");
                self.emit(PlaybackEvent::Failed {
                    id: id.clone(),
                    error: error.clone(),
                });
                PlayOutcome::Failed(error)
            }
        }
    }

    fn emit(&self, event: PlaybackEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }
}

impl<E: MediaElement> Default for PlaybackCoordinator<E> {
    fn default() -> Self {
        Self::new()
    }
}
