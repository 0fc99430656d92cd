//! Shared helpers for the integration suite.
//!
//! `capture` runs a closure under a thread-local subscriber whose only layer
//! records every event's level and message, so tests can assert on log lines.

#![allow(dead_code)]

use std::fmt;
use std::fs;
use std::io::Write;
use std::path::Path;
use std::sync::{Arc, Mutex};

use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

#[derive(Debug, Clone)]
pub struct CapturedEvent {
    pub level: Level,
    pub message: String,
}

#[derive(Debug, Clone, Default)]
pub struct EventStore(Arc<Mutex<Vec<CapturedEvent>>>);

impl EventStore {
    pub fn events(&self) -> Vec<CapturedEvent> {
        self.0.lock().unwrap().clone()
    }

    pub fn messages(&self) -> Vec<String> {
        self.events().into_iter().map(|e| e.message).collect()
    }

    /// Messages that start with `prefix`, in emission order.
    pub fn starting_with(&self, prefix: &str) -> Vec<String> {
        self.messages()
            .into_iter()
            .filter(|m| m.starts_with(prefix))
            .collect()
    }
}

struct CaptureLayer {
    store: EventStore,
}

struct MessageVisitor(String);

impl Visit for MessageVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.0 = format!("{value:?}");
        }
    }
}

impl<S: Subscriber> Layer<S> for CaptureLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = MessageVisitor(String::new());
        event.record(&mut visitor);
        self.store.0.lock().unwrap().push(CapturedEvent {
            level: *event.metadata().level(),
            message: visitor.0,
        });
    }
}

/// Run `f` with a capturing subscriber installed for this thread.
pub fn capture<T>(f: impl FnOnce() -> T) -> (T, EventStore) {
    let store = EventStore::default();
    let subscriber = tracing_subscriber::registry().with(CaptureLayer {
        store: store.clone(),
    });
    let out = tracing::subscriber::with_default(subscriber, f);
    (out, store)
}

pub fn write_file(path: &Path, bytes: &[u8]) {
    let mut file = fs::File::create(path).expect("Failed to create test file");
    file.write_all(bytes).expect("Failed to write test file");
}

/// `rows` data lines under an `id,name,age,email` header.
pub fn setup_test_csv(path: &Path, rows: usize) {
    let mut file = fs::File::create(path).expect("Failed to create test file");
    writeln!(file, "id,name,age,email").expect("Failed to write header");
    for i in 0..rows {
        writeln!(
            file,
            "{},Person{},{},person{}@test.com",
            i,
            i,
            20 + (i % 50),
            i
        )
        .expect("Failed to write row");
    }
}
