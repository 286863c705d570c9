//! # Event Bus Module
//!
//! Decoupled publish/subscribe communication between editor components.
//!
//! ## Overview
//!
//! - Publishers emit typed events without knowing subscribers
//! - Synchronous handlers filter by category; a handler may just queue
//!   events for a component that applies them lazily
//! - Broadcast receivers see every event but drop the oldest ones when
//!   they fall behind
//!
//! ## Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use scenemark_core::event_bus::{AppEvent, EventBus, EventCategory, EventFilter, SelectionEvent};
//! use scenemark_core::SelectionMode;
//!
//! let bus = Arc::new(EventBus::new());
//! let subscription = bus.subscribe(
//!     EventFilter::Categories(vec![EventCategory::Selection]),
//!     |event| {
//!         if let AppEvent::Selection(SelectionEvent::Changed { ids, .. }) = event {
//!             println!("{} rows highlighted", ids.len());
//!         }
//!     },
//! );
//!
//! bus.publish(AppEvent::Selection(SelectionEvent::Changed {
//!     ids: vec![1, 2],
//!     mode: SelectionMode::Multi,
//! }))
//! .ok();
//!
//! bus.unsubscribe(subscription);
//! ```

mod bus;
mod events;

pub use bus::*;
pub use events::*;
