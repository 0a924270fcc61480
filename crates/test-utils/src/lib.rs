pub mod builders;
pub mod scripted_runner;

use std::sync::Once;
use tracing_subscriber::{fmt, EnvFilter};

use codex::exec::{Event, EventFeed};

static INIT: Once = Once::new();

/// Initialise tracing for tests.
///
/// - Uses `with_test_writer()`, so logs are captured per-test.
/// - The Rust test harness only prints captured output for **failing** tests
///   (unless you run with `-- --nocapture`).
///
/// Enable levels with e.g.:
/// `RUST_LOG=debug cargo test`
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        fmt()
            .with_env_filter(filter)
            .with_test_writer() // print only for failing tests unless --nocapture
            .with_target(true)
            .init();
    });
}

/// Run a future with a 5-second timeout.
pub async fn with_timeout<F, T>(f: F) -> T
where
    F: std::future::Future<Output = T>,
{
    tokio::time::timeout(std::time::Duration::from_secs(5), f)
        .await
        .expect("Test timed out after 5 seconds")
}

/// Drain a feed, failing the test if it does not close within 5 seconds.
pub async fn collect_events(feed: EventFeed) -> Vec<Event> {
    with_timeout(feed.collect()).await
}

/// Assert the feed ended with exactly one `Exit` event and return its code.
pub fn assert_single_trailing_exit(events: &[Event]) -> i32 {
    let exits = events.iter().filter(|e| e.is_exit()).count();
    assert_eq!(exits, 1, "expected exactly one Exit event, got {events:?}");
    events
        .last()
        .and_then(Event::exit_code)
        .unwrap_or_else(|| panic!("Exit was not the last event: {events:?}"))
}

/// Build an argv vector from string literals.
pub fn argv(parts: &[&str]) -> Vec<String> {
    parts.iter().map(|s| s.to_string()).collect()
}
