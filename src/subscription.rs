// src/subscription.rs
//! Subscription index: which state tables must refresh after an operation.

use std::collections::HashMap;

use log::trace;

use crate::state_table::{StateDescriptor, TableId};

/// Operation name → subscribed tables, in subscription order.
///
/// Append-only. A table appears at most once under any operation, however
/// many of its descriptors name that operation.
#[derive(Debug, Default)]
pub struct SubscriptionIndex {
    subscribers: HashMap<String, Vec<TableId>>,
    /// Operation names in first-subscription order.
    order: Vec<String>,
}

impl SubscriptionIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` if `table` was already subscribed to `operation`.
    pub fn subscribe(&mut self, operation: &str, table: TableId) -> bool {
        if !self.subscribers.contains_key(operation) {
            self.order.push(operation.to_string());
        }
        let tables = self.subscribers.entry(operation.to_string()).or_default();
        if tables.contains(&table) {
            return false;
        }
        trace!("SubscriptionIndex: {:?} <- {}", table, operation);
        tables.push(table);
        true
    }

    /// Subscribes `table` to every setter of every descriptor.
    pub fn subscribe_table(&mut self, table: TableId, descriptors: &[StateDescriptor]) {
        for descriptor in descriptors {
            for setter in descriptor.setters {
                self.subscribe(setter, table);
            }
        }
    }

    pub fn subscribers(&self, operation: &str) -> &[TableId] {
        self.subscribers
            .get(operation)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Every operation with at least one subscriber.
    pub fn operations(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }
}
