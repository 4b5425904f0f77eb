//! Single-active-video playback coordination
//!
//! The coordinator arbitrates between many media elements in a scrolling
//! feed so that at most one of them plays. Requests are not queued: a
//! request inside the debounce window is dropped, and of several requests
//! waiting on the same in-flight start only the newest one commits.
//!
//! # Architecture
//!
//! ```text
//!   feed renderer                 Arc<PlaybackCoordinator<E>>
//!   ─────────────            ┌──────────────────────────────────┐
//!   request_play(el, m, id) ─►│ current:   Option<Current<E>>    │
//!   request_pause(el)       ─►│ in_flight: Option<InFlight>      │──► broadcast
//!   is_current(id)          ─►│ last_operation, tickets          │    PlaybackEvent
//!                            └───────────────┬──────────────────┘
//!                                            │ play() / pause() / mute
//!                                            ▼
//!                                      MediaElement (E)
//! ```
//!
//! # State machine
//!
//! `Idle` becomes `Playing` on commit. `Playing` returns to `Idle` when the
//! current element is paused or its start fails for good, and moves to a
//! new `Playing` when another element is requested.

pub mod config;
pub mod outcome;
pub mod playback;
mod state;

pub use config::CoordinatorConfig;
pub use outcome::{CoordinatorState, PlayOutcome, PlaybackEvent, StopReason};
pub use playback::PlaybackCoordinator;
