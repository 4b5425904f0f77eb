//! Simulated vertical feed with fast swiping
//!
//! Run with: cargo run --example feed_simulation [SWIPE_MS]
//!
//! Examples:
//!   cargo run --example feed_simulation          # swipes every 250ms
//!   cargo run --example feed_simulation 80       # very fast swiping, mostly debounced
//!   RUST_LOG=feed_playback=debug cargo run --example feed_simulation
//!
//! Every clip needs 400ms to start and refuses unmuted playback until the
//! viewer "taps" halfway through the feed, so the first clips fall back to
//! muted playback.

use std::sync::Arc;
use std::time::Duration;

use feed_playback::media::{ScriptedElement, ScriptedPlay};
use feed_playback::{CoordinatorConfig, PlaybackCoordinator, PlaybackEvent};

const CLIPS: [&str; 8] = [
    "golden-hour-photography",
    "lakeside-venue-tour",
    "string-quartet-first-dance",
    "dj-reception-set",
    "floral-arch-install",
    "vintage-car-arrival",
    "cake-tasting",
    "sparkler-exit",
];

fn print_usage() {
    eprintln!("Usage: feed_simulation [SWIPE_MS]");
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let swipe = match std::env::args().nth(1) {
        Some(arg) => match arg.parse::<u64>() {
            Ok(ms) => Duration::from_millis(ms),
            Err(e) => {
                eprintln!("Error: {}", e);
                print_usage();
                std::process::exit(1);
            }
        },
        None => Duration::from_millis(250),
    };

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("feed_playback=info".parse()?)
                .add_directive("feed_simulation=info".parse()?),
        )
        .init();

    let coordinator = Arc::new(PlaybackCoordinator::with_config(
        CoordinatorConfig::default().play_timeout(Duration::from_secs(3)),
    ));

    let feed: Vec<Arc<ScriptedElement>> = CLIPS
        .iter()
        .map(|name| {
            Arc::new(
                ScriptedElement::new(*name)
                    .with_autoplay_blocked()
                    .with_play(ScriptedPlay::resolve_after(Duration::from_millis(400))),
            )
        })
        .collect();

    // Log events
    let mut events = coordinator.subscribe();
    let event_task = tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            match event {
                PlaybackEvent::Started { id, muted } => {
                    tracing::info!(video = %id, muted = muted, "Now playing")
                }
                PlaybackEvent::MutedFallback { id } => {
                    tracing::info!(video = %id, "Autoplay blocked, muted")
                }
                PlaybackEvent::Stopped { id, reason } => {
                    tracing::info!(video = %id, reason = ?reason, "Stopped")
                }
                PlaybackEvent::Failed { id, error } => {
                    tracing::warn!(video = %id, error = %error, "Failed")
                }
            }
        }
    });

    let mut requests = Vec::new();
    for (index, element) in feed.iter().enumerate() {
        if index == feed.len() / 2 {
            tracing::info!("Viewer tapped the screen, sound allowed");
            for el in &feed {
                el.allow_autoplay();
            }
        }

        let coordinator = Arc::clone(&coordinator);
        let element = Arc::clone(element);
        requests.push(tokio::spawn(async move {
            let id = element.name().to_string();
            let outcome = coordinator.request_play(&element, false, id.clone()).await;
            (id, outcome)
        }));

        tokio::time::sleep(swipe).await;
    }

    for request in requests {
        let (id, outcome) = request.await?;
        println!("{:<28} {:?}", id, outcome);
    }

    // Viewer lingers on the last clip, then leaves the feed
    tokio::time::sleep(Duration::from_secs(1)).await;
    coordinator.pause_all().await;

    let playing: Vec<&str> = feed
        .iter()
        .filter(|el| el.is_playing())
        .map(|el| el.name())
        .collect();
    let stats = coordinator.stats().await;

    println!();
    println!(
        "requests={} debounced={} preemptions={} muted_retries={} superseded={} started={} avg_start={:?}",
        stats.requests,
        stats.debounced,
        stats.preemptions,
        stats.muted_retries,
        stats.superseded,
        stats.started,
        stats.average_start_latency(),
    );
    println!("still playing: {:?}", playing);

    drop(coordinator);
    event_task.abort();

    Ok(())
}
