//! Event stream (§4.8).
//!
//! Typed, ordered, append-only events with unique ids and monotonically
//! non-decreasing timestamps. Consumers treat events as idempotent by
//! `event_id` and process them in timestamp order. The orchestrator never
//! rewrites a past event.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use uuid::Uuid;

/// Event types emitted during an investigation run (§4.8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    StepStart,
    StepUpdate,
    StepComplete,
    Research,
    Strategy,
    CandidateDiscovery,
    LlmSelection,
    Evidence,
    PathUpdate,
    ImageResult,
    Backtrack,
    Final,
    NoPath,
    Error,
}

impl EventType {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Final | Self::NoPath | Self::Error)
    }
}

/// Outcome of a completed orchestrator step (§4.7).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Done,
    Failed,
    Skipped,
}

/// A single typed event in the stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub event_id: Uuid,
    pub event_type: EventType,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<HashMap<String, Value>>,
    pub timestamp: DateTime<Utc>,
}

impl Event {
    fn with_data(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.data
            .get_or_insert_with(HashMap::new)
            .insert(key.into(), value.into());
        self
    }
}

/// Append-only, ordered log of events for a single `InvestigationRun`.
///
/// Guarantees a monotonically non-decreasing timestamp across all events it
/// emits, even if the system clock ticks backwards between calls.
#[derive(Debug, Default)]
pub struct EventLog {
    events: Vec<Event>,
    last_timestamp: Option<DateTime<Utc>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// True once a terminal event (`final`, `no_path`, `error`) has been emitted.
    pub fn is_terminated(&self) -> bool {
        self.events.last().is_some_and(|e| e.event_type.is_terminal())
    }

    fn next_timestamp(&mut self) -> DateTime<Utc> {
        let now = Utc::now();
        let ts = match self.last_timestamp {
            Some(prev) if prev > now => prev,
            _ => now,
        };
        self.last_timestamp = Some(ts);
        ts
    }

    /// Append an event. Panics (a programmer error, not a runtime one) if
    /// the log has already terminated — the orchestrator must never emit
    /// past a terminal event.
    pub fn push(&mut self, event_type: EventType, message: impl Into<String>) -> &Event {
        assert!(
            !self.is_terminated(),
            "attempted to emit an event after the run already terminated"
        );
        let timestamp = self.next_timestamp();
        let event = Event {
            event_id: Uuid::new_v4(),
            event_type,
            message: message.into(),
            data: None,
            timestamp,
        };
        self.events.push(event);
        self.events.last().expect("just pushed")
    }

    pub fn push_with_data(
        &mut self,
        event_type: EventType,
        message: impl Into<String>,
        data: HashMap<String, Value>,
    ) -> &Event {
        self.push(event_type, message);
        let event = self.events.last_mut().expect("just pushed");
        event.data = Some(data);
        event
    }

    /// Convenience for a single-field data payload.
    pub fn push_with(
        &mut self,
        event_type: EventType,
        message: impl Into<String>,
        key: impl Into<String>,
        value: impl Into<Value>,
    ) -> &Event {
        let mut data = HashMap::new();
        data.insert(key.into(), value.into());
        self.push_with_data(event_type, message, data)
    }
}
