//! Per-connection table filter.
//!
//! Tracks which tables one WebSocket connection asked for, so that
//! table-targeted deliveries can be filtered server-side and so the
//! connection can release exactly its own tables on disconnect.

use std::collections::HashSet;

/// Manages the set of table subscriptions for a single WebSocket connection.
#[derive(Debug, Default)]
pub struct SubscriptionManager {
    tables: HashSet<String>,
}

impl SubscriptionManager {
    /// Creates a new empty subscription manager.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds tables to the filter, ignoring blank names.
    pub fn subscribe(&mut self, tables: &[String]) {
        self.tables.extend(
            tables
                .iter()
                .filter(|t| !t.trim().is_empty())
                .cloned(),
        );
    }

    /// Removes tables from the filter.
    pub fn unsubscribe(&mut self, tables: &[String]) {
        for table in tables {
            self.tables.remove(table);
        }
    }

    /// Returns `true` if a delivery for `table` should reach this connection.
    #[must_use]
    pub fn matches(&self, table: &str) -> bool {
        self.tables.contains(table)
    }

    /// Returns the number of subscribed tables.
    #[must_use]
    pub fn count(&self) -> usize {
        self.tables.len()
    }

    /// Returns the subscribed tables, sorted.
    #[must_use]
    pub fn tables(&self) -> Vec<String> {
        let mut tables: Vec<String> = self.tables.iter().cloned().collect();
        tables.sort_unstable();
        tables
    }
}
