// Copyright (c) 2025 - Cowboy AI, Inc.
//! Event Stream Collection
//!
//! Drains the provisioning engine's asynchronous event stream into an ordered,
//! filtered, in-memory sequence.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐   bounded mpsc    ┌─────────────────────┐
//! │ EventSource  │ ────────────────> │ EventStreamCollector │ ──> CollectedEvents
//! │  (task)      │   ChangeEvent     │  (single reader)     │
//! └──────┬───────┘                   └──────────┬──────────┘
//!        │ returns (producer done)               │ awaits producer
//!        └───────────────────────────────────────┘
//! ```
//!
//! The producer runs in its own task and only waits when the buffer is full.
//! The collector returns once the channel is closed *and* the producer task
//! has been joined, so the final sequence length is never observed early.

use async_trait::async_trait;
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::errors::{MapperError, MapperResult};
use crate::events::ChangeEvent;

/// Default buffer size of the collector channel
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1024;

/// Whether a run observed no resources.
///
/// A run whose retained events amount to at most one (the trailing summary)
/// saw an empty state. This is distinct from a run that saw resources but
/// produced no nodes.
pub fn is_empty_state(events: &[ChangeEvent]) -> bool {
    events.iter().filter(|event| event.kind.is_retained()).count() <= 1
}

/// Producer half handed to an [`EventSource`]
#[derive(Debug, Clone)]
pub struct EventSink {
    sender: mpsc::Sender<ChangeEvent>,
}

impl EventSink {
    fn new(sender: mpsc::Sender<ChangeEvent>) -> Self {
        Self { sender }
    }

    /// Push one event, waiting only while the buffer is full
    pub async fn send(&self, event: ChangeEvent) -> MapperResult<()> {
        self.sender
            .send(event)
            .await
            .map_err(|_| MapperError::EventSource("event collector closed".to_string()))
    }
}

/// Asynchronous producer of change events
#[async_trait]
pub trait EventSource: Send {
    /// Push every event of the run into `sink` and return when the run is over
    async fn run(self: Box<Self>, sink: EventSink) -> MapperResult<()>;
}

/// Retained events of one run, in emission order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CollectedEvents {
    events: Vec<ChangeEvent>,
    discarded: usize,
}

impl CollectedEvents {
    pub fn events(&self) -> &[ChangeEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Number of events dropped because of their kind
    pub fn discarded(&self) -> usize {
        self.discarded
    }

    pub fn is_empty_state(&self) -> bool {
        is_empty_state(&self.events)
    }
}

impl FromIterator<ChangeEvent> for CollectedEvents {
    fn from_iter<I: IntoIterator<Item = ChangeEvent>>(iter: I) -> Self {
        let mut collected = Self::default();
        for event in iter {
            collected.push(event);
        }
        collected
    }
}

impl CollectedEvents {
    fn push(&mut self, event: ChangeEvent) {
        if event.kind.is_retained() {
            self.events.push(event);
        } else {
            self.discarded += 1;
        }
    }
}

/// Drains an [`EventSource`] into [`CollectedEvents`]
#[derive(Debug, Clone)]
pub struct EventStreamCollector {
    capacity: usize,
}

impl EventStreamCollector {
    /// Collector with a channel of `capacity` (at least one slot)
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Run `source` to completion and return its retained events
    pub async fn collect<S>(&self, source: S) -> MapperResult<CollectedEvents>
    where
        S: EventSource + 'static,
    {
        let (sender, mut receiver) = mpsc::channel(self.capacity);
        let producer = tokio::spawn(Box::new(source).run(EventSink::new(sender)));

        let mut collected = CollectedEvents::default();
        while let Some(event) = receiver.recv().await {
            collected.push(event);
        }

        producer
            .await
            .map_err(|e| MapperError::EventSource(format!("event source task failed: {}", e)))??;

        info!(
            retained = collected.len(),
            discarded = collected.discarded(),
            "collected engine events"
        );
        Ok(collected)
    }
}

impl Default for EventStreamCollector {
    fn default() -> Self {
        Self::new(DEFAULT_CHANNEL_CAPACITY)
    }
}

/// Source replaying a fixed list of events
#[derive(Debug, Clone, Default)]
pub struct VecEventSource {
    events: Vec<ChangeEvent>,
}

impl VecEventSource {
    pub fn new(events: Vec<ChangeEvent>) -> Self {
        Self { events }
    }
}

#[async_trait]
impl EventSource for VecEventSource {
    async fn run(self: Box<Self>, sink: EventSink) -> MapperResult<()> {
        for event in self.events {
            sink.send(event).await?;
        }
        Ok(())
    }
}

/// Source reading one JSON-encoded event per line from a file
#[derive(Debug, Clone)]
pub struct JsonLinesEventSource {
    path: PathBuf,
}

impl JsonLinesEventSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl EventSource for JsonLinesEventSource {
    async fn run(self: Box<Self>, sink: EventSink) -> MapperResult<()> {
        let file = tokio::fs::File::open(&self.path).await?;
        let mut lines = BufReader::new(file).lines();
        let mut line_number = 0usize;

        while let Some(line) = lines.next_line().await? {
            line_number += 1;
            if line.trim().is_empty() {
                continue;
            }
            let event: ChangeEvent = serde_json::from_str(&line).map_err(|e| {
                MapperError::Deserialization(format!(
                    "{}:{}: {}",
                    self.path.display(),
                    line_number,
                    e
                ))
            })?;
            sink.send(event).await?;
        }

        debug!(path = %self.path.display(), lines = line_number, "event file drained");
        Ok(())
    }
}
