//! Event bus.
//!
//! One instance per editor, shared as `Arc<EventBus>`. Two ways to listen:
//! synchronous handlers registered with [`EventBus::subscribe`], run on the
//! publishing thread, and broadcast receivers from [`EventBus::receiver`]
//! that consumers drain at their own pace. Receivers are bounded; a
//! consumer that must not miss an event subscribes a handler instead.

use parking_lot::RwLock;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;
use uuid::Uuid;

use super::events::{AppEvent, EventCategory};

/// Handle returned by [`EventBus::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(Uuid);

impl std::fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let simple = self.0.simple().to_string();
        write!(f, "sub-{}", &simple[..8])
    }
}

/// Which events a handler wants.
#[derive(Debug, Clone, Default)]
pub enum EventFilter {
    #[default]
    All,
    /// Any of these categories.
    Categories(Vec<EventCategory>),
}

impl EventFilter {
    pub fn matches(&self, event: &AppEvent) -> bool {
        match self {
            EventFilter::All => true,
            EventFilter::Categories(categories) => categories.contains(&event.category()),
        }
    }
}

type Handler = Arc<dyn Fn(AppEvent) + Send + Sync>;

struct Subscription {
    id: SubscriptionId,
    filter: EventFilter,
    handler: Handler,
}

#[derive(Debug, Clone)]
pub struct EventBusConfig {
    /// Broadcast buffer per receiver. A receiver that falls further behind
    /// skips the oldest events.
    pub channel_capacity: usize,
    /// Keep a journal of published events.
    pub enable_history: bool,
    /// Journal length; older records are dropped first.
    pub max_history_size: usize,
}

impl Default for EventBusConfig {
    fn default() -> Self {
        Self {
            channel_capacity: 256,
            enable_history: false,
            max_history_size: 500,
        }
    }
}

/// A journaled event with its publication sequence number.
#[derive(Debug, Clone)]
pub struct EventRecord {
    pub seq: u64,
    pub event: AppEvent,
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum EventBusError {
    /// Neither a handler nor a receiver saw the event.
    #[error("event {0} had no listeners")]
    NoListeners(&'static str),
}

pub struct EventBus {
    sender: broadcast::Sender<AppEvent>,
    subscriptions: RwLock<Vec<Subscription>>,
    journal: RwLock<VecDeque<EventRecord>>,
    next_seq: AtomicU64,
    config: EventBusConfig,
}

impl EventBus {
    pub fn new() -> Self {
        Self::with_config(EventBusConfig::default())
    }

    pub fn with_config(config: EventBusConfig) -> Self {
        let (sender, _) = broadcast::channel(config.channel_capacity.max(1));
        Self {
            sender,
            subscriptions: RwLock::new(Vec::new()),
            journal: RwLock::new(VecDeque::new()),
            next_seq: AtomicU64::new(1),
            config,
        }
    }

    /// Publishes `event` to matching handlers, then to receivers.
    ///
    /// Handlers are called after the subscription lock is released, so a
    /// handler may subscribe or publish. Returns the number of receivers
    /// the event was queued for. Callers that do not care whether anyone
    /// listens discard the error.
    pub fn publish(&self, event: AppEvent) -> Result<usize, EventBusError> {
        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
        if self.config.enable_history {
            self.record(seq, &event);
        }

        let handlers: Vec<Handler> = self
            .subscriptions
            .read()
            .iter()
            .filter(|sub| sub.filter.matches(&event))
            .map(|sub| Arc::clone(&sub.handler))
            .collect();
        let handled = !handlers.is_empty();
        for handler in handlers {
            handler(event.clone());
        }

        let kind = event.category().name();
        match self.sender.send(event) {
            Ok(receivers) => Ok(receivers),
            Err(_) if handled => Ok(0),
            Err(_) => Err(EventBusError::NoListeners(kind)),
        }
    }

    /// Registers a handler. It runs on the publishing thread and should
    /// return quickly.
    pub fn subscribe<F>(&self, filter: EventFilter, handler: F) -> SubscriptionId
    where
        F: Fn(AppEvent) + Send + Sync + 'static,
    {
        let id = SubscriptionId(Uuid::new_v4());
        self.subscriptions.write().push(Subscription {
            id,
            filter,
            handler: Arc::new(handler),
        });
        tracing::debug!(%id, "Handler subscribed");
        id
    }

    /// A receiver for events published from now on. Single-threaded
    /// consumers drain it with `try_recv`.
    pub fn receiver(&self) -> broadcast::Receiver<AppEvent> {
        self.sender.subscribe()
    }

    /// Returns `false` for an unknown or already removed id.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscriptions = self.subscriptions.write();
        let before = subscriptions.len();
        subscriptions.retain(|sub| sub.id != id);
        let removed = subscriptions.len() != before;
        if removed {
            tracing::debug!(%id, "Handler unsubscribed");
        }
        removed
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscriptions.read().len()
    }

    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Journaled events with a sequence number greater than `after`, or the
    /// whole journal. Empty unless history is enabled.
    pub fn history(&self, after: Option<u64>) -> Vec<EventRecord> {
        let journal = self.journal.read();
        journal
            .iter()
            .filter(|record| after.map_or(true, |seq| record.seq > seq))
            .cloned()
            .collect()
    }

    pub fn clear_history(&self) {
        self.journal.write().clear();
    }

    pub fn config(&self) -> &EventBusConfig {
        &self.config
    }

    fn record(&self, seq: u64, event: &AppEvent) {
        let mut journal = self.journal.write();
        journal.push_back(EventRecord {
            seq,
            event: event.clone(),
        });
        while journal.len() > self.config.max_history_size {
            journal.pop_front();
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscriber_count())
            .field("receivers", &self.receiver_count())
            .field("config", &self.config)
            .finish()
    }
}
