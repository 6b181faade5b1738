// Copyright 2025 Google LLC
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     https://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::{Event, Level, Subscriber, field};
use tracing_subscriber::{Layer, layer::Context, prelude::*};

/// Represents a captured tracing event with its fields.
#[derive(Debug, Clone)]
pub struct CapturedEvent {
    /// The level of the event.
    pub level: Level,
    /// The event target, typically the module path that emitted it.
    pub target: String,
    /// A map of field names to their string representations.
    ///
    /// The formatted message, if any, is stored under `message`.
    pub fields: HashMap<String, String>,
}

impl CapturedEvent {
    /// Returns the formatted message of the event.
    pub fn message(&self) -> Option<&str> {
        self.fields.get("message").map(String::as_str)
    }
}

/// A `tracing::field::Visit` implementation to extract key-value pairs from events.
struct TestVisitor<'a>(&'a mut HashMap<String, String>);

impl field::Visit for TestVisitor<'_> {
    fn record_str(&mut self, field: &field::Field, value: &str) {
        self.0.insert(field.name().to_string(), value.to_string());
    }

    fn record_debug(&mut self, field: &field::Field, value: &dyn std::fmt::Debug) {
        self.0
            .insert(field.name().to_string(), format!("{:?}", value));
    }

    fn record_i64(&mut self, field: &field::Field, value: i64) {
        self.0.insert(field.name().to_string(), value.to_string());
    }

    fn record_u64(&mut self, field: &field::Field, value: u64) {
        self.0.insert(field.name().to_string(), value.to_string());
    }

    fn record_bool(&mut self, field: &field::Field, value: bool) {
        self.0.insert(field.name().to_string(), value.to_string());
    }
}

/// A tracing layer for capturing and inspecting events within tests.
///
/// The layer is installed as the thread-local default subscriber, so it only
/// observes events emitted on the test thread. Use it with single-threaded
/// runtimes, such as the default `#[tokio::test]` runtime.
///
/// # Example
///
/// ```rust
/// use google_cloud_test_utils::test_layer::TestLayer;
///
/// let guard = TestLayer::initialize();
/// tracing::error!(status = 500, "something failed");
///
/// let captured = guard.capture();
/// assert_eq!(captured.len(), 1);
/// assert_eq!(captured[0].message(), Some("something failed"));
/// assert_eq!(captured[0].fields.get("status"), Some(&"500".to_string()));
/// ```
#[derive(Clone, Default)]
pub struct TestLayer {
    events: Arc<Mutex<Vec<CapturedEvent>>>,
}

/// Keeps the [TestLayer] installed while in scope.
pub struct CaptureGuard {
    layer: TestLayer,
    _default: tracing::subscriber::DefaultGuard,
}

impl TestLayer {
    /// Installs a new `TestLayer` as the default subscriber for this thread.
    ///
    /// Events are captured until the returned guard is dropped.
    pub fn initialize() -> CaptureGuard {
        let layer = TestLayer::default();
        let subscriber = tracing_subscriber::registry().with(layer.clone());
        let default = tracing::subscriber::set_default(subscriber);
        CaptureGuard {
            layer,
            _default: default,
        }
    }

    fn push(&self, event: CapturedEvent) {
        self.events.lock().unwrap().push(event);
    }

    fn take(&self) -> Vec<CapturedEvent> {
        std::mem::take(&mut *self.events.lock().unwrap())
    }
}

impl CaptureGuard {
    /// Retrieves and removes all the events captured so far.
    pub fn capture(&self) -> Vec<CapturedEvent> {
        self.layer.take()
    }

    /// Retrieves and removes the events captured so far at the given level.
    pub fn capture_level(&self, level: Level) -> Vec<CapturedEvent> {
        self.layer
            .take()
            .into_iter()
            .filter(|e| e.level == level)
            .collect()
    }
}

impl<S> Layer<S> for TestLayer
where
    S: Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut fields = HashMap::new();
        event.record(&mut TestVisitor(&mut fields));
        let metadata = event.metadata();
        self.push(CapturedEvent {
            level: *metadata.level(),
            target: metadata.target().to_string(),
            fields,
        });
    }
}
