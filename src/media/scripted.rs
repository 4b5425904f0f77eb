//! In-memory media element with scripted playback results
//!
//! `ScriptedElement` behaves like a browser video element for the parts the
//! coordinator cares about: `play()` may take time, may be refused by the
//! autoplay policy, and a pending `play()` is aborted when `pause()` is
//! called before it settles. Elements built with
//! [`ignoring_pause`](ScriptedElement::ignoring_pause) model engines that
//! settle their start regardless of a pause in between.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::watch;

use super::element::MediaElement;
use super::error::PlayError;

/// Scripted result for one `play()` call
#[derive(Debug, Clone)]
pub enum ScriptedPlay {
    /// Start playing after `delay`
    Resolve { delay: Duration },
    /// Reject with `error` after `delay`
    Reject { delay: Duration, error: PlayError },
    /// Never settle unless paused (never at all when pause is ignored)
    Hang,
}

impl ScriptedPlay {
    /// Resolve immediately
    pub fn resolve() -> Self {
        ScriptedPlay::Resolve {
            delay: Duration::ZERO,
        }
    }

    /// Resolve after a delay
    pub fn resolve_after(delay: Duration) -> Self {
        ScriptedPlay::Resolve { delay }
    }

    /// Reject immediately
    pub fn reject(error: PlayError) -> Self {
        ScriptedPlay::Reject {
            delay: Duration::ZERO,
            error,
        }
    }

    /// Reject after a delay
    pub fn reject_after(delay: Duration, error: PlayError) -> Self {
        ScriptedPlay::Reject { delay, error }
    }
}

/// Observable element state
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ElementSnapshot {
    /// Whether playback is running
    pub playing: bool,
    /// Mute flag
    pub muted: bool,
    /// Playback position
    pub position: Duration,
    /// Number of `play()` calls received
    pub play_calls: u32,
    /// Number of `pause()` calls received
    pub pause_calls: u32,
}

/// Scripted media element
#[derive(Debug)]
pub struct ScriptedElement {
    name: String,
    state: Mutex<ElementSnapshot>,
    script: Mutex<VecDeque<ScriptedPlay>>,
    autoplay_blocked: AtomicBool,
    ignores_pause: AtomicBool,
    /// Bumped on every pause so pending plays can abort
    pause_epoch: watch::Sender<u64>,
}

impl ScriptedElement {
    /// Create an element whose plays succeed immediately
    pub fn new(name: impl Into<String>) -> Self {
        let (pause_epoch, _) = watch::channel(0);
        Self {
            name: name.into(),
            state: Mutex::new(ElementSnapshot::default()),
            script: Mutex::new(VecDeque::new()),
            autoplay_blocked: AtomicBool::new(false),
            ignores_pause: AtomicBool::new(false),
            pause_epoch,
        }
    }

    /// Refuse unmuted playback, as a browser does before any user gesture
    pub fn with_autoplay_blocked(self) -> Self {
        self.autoplay_blocked.store(true, Ordering::Relaxed);
        self
    }

    /// Let pending starts settle as scripted even if paused meanwhile
    pub fn ignoring_pause(self) -> Self {
        self.ignores_pause.store(true, Ordering::Relaxed);
        self
    }

    /// Simulate a user gesture lifting the autoplay restriction
    pub fn allow_autoplay(&self) {
        self.autoplay_blocked.store(false, Ordering::Relaxed);
    }

    /// Queue the result of the next unscripted `play()` call
    pub fn push_play(&self, play: ScriptedPlay) {
        lock(&self.script).push_back(play);
    }

    /// Builder form of [`push_play`](Self::push_play)
    pub fn with_play(self, play: ScriptedPlay) -> Self {
        self.push_play(play);
        self
    }

    /// Element name, for logs
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Copy of the current element state
    pub fn snapshot(&self) -> ElementSnapshot {
        lock(&self.state).clone()
    }

    /// Whether playback is running
    pub fn is_playing(&self) -> bool {
        lock(&self.state).playing
    }

    /// Current playback position
    pub fn position(&self) -> Duration {
        lock(&self.state).position
    }

    /// Move the playback position (as if the viewer watched part of it)
    pub fn set_position(&self, position: Duration) {
        lock(&self.state).position = position;
    }

    /// Number of `play()` calls received
    pub fn play_calls(&self) -> u32 {
        lock(&self.state).play_calls
    }

    /// Record a play call and pick its scripted result
    fn begin_play(&self) -> Result<ScriptedPlay, PlayError> {
        let mut state = lock(&self.state);
        state.play_calls += 1;

        if !state.muted && self.autoplay_blocked.load(Ordering::Relaxed) {
            return Err(PlayError::NotAllowed(format!(
                "{}: unmuted autoplay requires a user gesture",
                self.name
            )));
        }

        Ok(lock(&self.script)
            .pop_front()
            .unwrap_or_else(ScriptedPlay::resolve))
    }

    fn aborted(&self) -> PlayError {
        PlayError::Aborted(format!("{}: play() interrupted by pause()", self.name))
    }
}

impl MediaElement for ScriptedElement {
    async fn play(&self) -> Result<(), PlayError> {
        let mut paused = self.pause_epoch.subscribe();
        let scripted = self.begin_play()?;
        let ignores_pause = self.ignores_pause.load(Ordering::Relaxed);

        let (delay, result) = match scripted {
            ScriptedPlay::Resolve { delay } => (delay, Ok(())),
            ScriptedPlay::Reject { delay, error } => (delay, Err(error)),
            ScriptedPlay::Hang => {
                if ignores_pause {
                    std::future::pending::<()>().await;
                }
                let _ = paused.changed().await;
                return Err(self.aborted());
            }
        };

        if ignores_pause {
            tokio::time::sleep(delay).await;
        } else if !delay.is_zero() {
            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                _ = paused.changed() => return Err(self.aborted()),
            }
        }

        if result.is_ok() {
            lock(&self.state).playing = true;
        }
        result
    }

    fn pause(&self) {
        {
            let mut state = lock(&self.state);
            state.playing = false;
            state.pause_calls += 1;
        }
        self.pause_epoch.send_modify(|epoch| *epoch += 1);
    }

    fn reset_position(&self) {
        lock(&self.state).position = Duration::ZERO;
    }

    fn set_muted(&self, muted: bool) {
        lock(&self.state).muted = muted;
    }

    fn is_muted(&self) -> bool {
        lock(&self.state).muted
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use tokio_test::{assert_pending, assert_ready_err, assert_ready_ok, task};

    use super::*;

    #[tokio::test]
    async fn test_default_play_succeeds() {
        let el = ScriptedElement::new("a");

        el.play().await.unwrap();

        assert!(el.is_playing());
        assert_eq!(el.play_calls(), 1);
    }

    #[tokio::test]
    async fn test_autoplay_policy() {
        let el = ScriptedElement::new("a").with_autoplay_blocked();

        let err = el.play().await.unwrap_err();
        assert!(err.is_autoplay_blocked());
        assert!(!el.is_playing());

        // Muted playback is always allowed
        el.set_muted(true);
        el.play().await.unwrap();
        assert!(el.is_playing());
    }

    #[tokio::test]
    async fn test_allow_autoplay_after_gesture() {
        let el = ScriptedElement::new("a").with_autoplay_blocked();
        el.allow_autoplay();

        el.play().await.unwrap();
        assert!(el.is_playing());
        assert!(!el.is_muted());
    }

    #[tokio::test]
    async fn test_script_order() {
        let el = ScriptedElement::new("a")
            .with_play(ScriptedPlay::reject(PlayError::Engine("decode".into())))
            .with_play(ScriptedPlay::resolve());

        assert_eq!(el.play().await, Err(PlayError::Engine("decode".into())));
        assert!(el.play().await.is_ok());
        assert_eq!(el.play_calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_pause_aborts_pending_play() {
        let el = Arc::new(
            ScriptedElement::new("a")
                .with_play(ScriptedPlay::resolve_after(Duration::from_secs(1))),
        );

        let mut play = task::spawn(el.play());
        assert_pending!(play.poll());

        el.pause();
        assert!(play.is_woken());
        let err = assert_ready_err!(play.poll());
        assert!(matches!(err, PlayError::Aborted(_)));
        assert!(!el.is_playing());
    }

    #[tokio::test(start_paused = true)]
    async fn test_ignoring_pause_starts_late() {
        let el = ScriptedElement::new("a")
            .ignoring_pause()
            .with_play(ScriptedPlay::resolve_after(Duration::from_secs(1)));

        let mut play = task::spawn(el.play());
        assert_pending!(play.poll());

        el.pause();
        assert_pending!(play.poll());
        assert!(!el.is_playing());

        tokio::time::advance(Duration::from_secs(1)).await;
        assert_ready_ok!(play.poll());
        assert!(el.is_playing());
    }

    #[tokio::test(start_paused = true)]
    async fn test_hang_settles_only_on_pause() {
        let el = ScriptedElement::new("a").with_play(ScriptedPlay::Hang);

        let mut play = task::spawn(el.play());
        assert_pending!(play.poll());

        tokio::time::advance(Duration::from_secs(3600)).await;
        assert_pending!(play.poll());

        el.pause();
        assert_ready_err!(play.poll());
    }

    #[tokio::test(start_paused = true)]
    async fn test_delayed_resolve() {
        let el = ScriptedElement::new("a")
            .with_play(ScriptedPlay::resolve_after(Duration::from_millis(200)));

        let mut play = task::spawn(el.play());
        assert_pending!(play.poll());

        tokio::time::advance(Duration::from_millis(200)).await;
        assert_ready_ok!(play.poll());
        assert!(el.is_playing());
    }

    #[test]
    fn test_reset_position() {
        let el = ScriptedElement::new("a");
        el.set_position(Duration::from_secs(12));

        el.reset_position();

        assert_eq!(el.position(), Duration::ZERO);
    }
}
