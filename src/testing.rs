//! Test doubles shared by the unit tests.

use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::Result;
use async_trait::async_trait;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::Layer;

use crate::platform::MessageSender;

/// Records every send attempt. The first `fail_count` attempts fail.
#[derive(Default)]
pub struct RecordingSender {
    fail_count: usize,
    attempts: Mutex<Vec<(i64, String)>>,
    sent: Mutex<Vec<(i64, String)>>,
}

impl RecordingSender {
    pub fn failing_first(fail_count: usize) -> Self {
        Self {
            fail_count,
            ..Default::default()
        }
    }

    pub fn attempts(&self) -> Vec<(i64, String)> {
        self.attempts.lock().unwrap().clone()
    }

    pub fn sent(&self) -> Vec<(i64, String)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl MessageSender for RecordingSender {
    async fn send_message(&self, chat_id: i64, text: &str) -> Result<()> {
        let attempt = {
            let mut attempts = self.attempts.lock().unwrap();
            attempts.push((chat_id, text.to_string()));
            attempts.len()
        };
        if attempt <= self.fail_count {
            anyhow::bail!("simulated network failure");
        }
        self.sent.lock().unwrap().push((chat_id, text.to_string()));
        Ok(())
    }
}

/// Counts events at `level`, or at every level when `None`.
struct EventCounter {
    count: Arc<AtomicUsize>,
    level: Option<Level>,
}

impl<S: Subscriber> Layer<S> for EventCounter {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        if self.level.map_or(true, |l| *event.metadata().level() == l) {
            self.count.fetch_add(1, Ordering::SeqCst);
        }
    }
}

fn counting_subscriber(level: Option<Level>) -> (impl Subscriber + Send + Sync, Arc<AtomicUsize>) {
    let count = Arc::new(AtomicUsize::new(0));
    let subscriber = tracing_subscriber::registry().with(EventCounter {
        count: count.clone(),
        level,
    });
    (subscriber, count)
}

/// Run `fut` on the current thread and return how many error events it logged.
pub async fn count_errors<F: Future<Output = ()>>(fut: F) -> usize {
    let (subscriber, count) = counting_subscriber(Some(Level::ERROR));
    let _guard = tracing::subscriber::set_default(subscriber);
    fut.await;
    count.load(Ordering::SeqCst)
}

/// Run `f` and return its output with the number of events it logged at any level.
pub fn count_events<T>(f: impl FnOnce() -> T) -> (T, usize) {
    let (subscriber, count) = counting_subscriber(None);
    let out = tracing::subscriber::with_default(subscriber, f);
    (out, count.load(Ordering::SeqCst))
}
