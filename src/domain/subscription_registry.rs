//! In-memory map of user identity to subscribed table names.
//!
//! [`SubscriptionRegistry`] stores one `HashSet<String>` per user in a
//! [`DashMap`]. Every mutation runs under the lock of the shard that holds
//! the user's key, so concurrent updates for the same user are serialized
//! while updates for different users proceed in parallel.
//!
//! A user key is present only while its set is non-empty: the entry is
//! dropped in the same critical section that removes its last table.

use std::collections::HashSet;

use dashmap::DashMap;

/// Per-user table subscriptions.
///
/// # Concurrency
///
/// - Mutations of one user's set are atomic with respect to each other.
/// - Mutations of different users do not contend unless their keys hash to
///   the same shard.
/// - No method suspends; all operations are synchronous and in-memory.
#[derive(Debug, Default)]
pub struct SubscriptionRegistry {
    users: DashMap<String, HashSet<String>>,
}

impl SubscriptionRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `tables` to the user's set, creating the set if absent.
    ///
    /// Already-subscribed tables and blank names are ignored. An input with
    /// no usable table names leaves the registry untouched.
    pub fn subscribe<I, S>(&self, user_id: &str, tables: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut tables = tables
            .into_iter()
            .map(Into::into)
            .filter(|t: &String| !t.trim().is_empty())
            .peekable();
        if tables.peek().is_none() {
            return;
        }
        self.users
            .entry(user_id.to_string())
            .or_default()
            .extend(tables);
    }

    /// Removes `tables` from the user's set.
    ///
    /// Tables the user never subscribed to are ignored, as is a user with no
    /// entry at all. When the set becomes empty the user's entry is removed.
    pub fn unsubscribe<I, S>(&self, user_id: &str, tables: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let tables = tables.into_iter();
        self.users.remove_if_mut(user_id, move |_, subscribed| {
            for table in tables {
                subscribed.remove(table.as_ref());
            }
            subscribed.is_empty()
        });
    }

    /// Drops every subscription of the user, returning what was removed.
    pub fn remove_user(&self, user_id: &str) -> Option<HashSet<String>> {
        self.users.remove(user_id).map(|(_, tables)| tables)
    }

    /// Returns the user's tables, sorted by name. Empty if the user has no
    /// entry.
    #[must_use]
    pub fn list_subscriptions(&self, user_id: &str) -> Vec<String> {
        let mut tables: Vec<String> = self
            .users
            .get(user_id)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default();
        tables.sort_unstable();
        tables
    }

    /// Returns `true` if the user is subscribed to `table`.
    #[must_use]
    pub fn is_subscribed(&self, user_id: &str, table: &str) -> bool {
        self.users
            .get(user_id)
            .is_some_and(|set| set.contains(table))
    }

    /// Returns `true` if the user has an entry.
    #[must_use]
    pub fn contains_user(&self, user_id: &str) -> bool {
        self.users.contains_key(user_id)
    }

    /// Returns the number of users with at least one subscription.
    #[must_use]
    pub fn user_count(&self) -> usize {
        self.users.len()
    }

    /// Returns `true` if no user has a subscription.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn subscribe_then_partial_unsubscribe() {
        let registry = SubscriptionRegistry::new();
        registry.subscribe("u1", ["goals", "plans"]);
        registry.unsubscribe("u1", ["goals"]);
        assert_eq!(registry.list_subscriptions("u1"), vec!["plans".to_string()]);
        assert!(registry.is_subscribed("u1", "plans"));
        assert!(!registry.is_subscribed("u1", "goals"));
    }

    #[test]
    fn subscribe_is_idempotent() {
        let registry = SubscriptionRegistry::new();
        registry.subscribe("u1", ["goals"]);
        registry.subscribe("u1", ["goals", "goals"]);
        assert_eq!(registry.list_subscriptions("u1"), vec!["goals".to_string()]);
    }

    #[test]
    fn empty_subscribe_creates_no_entry() {
        let registry = SubscriptionRegistry::new();
        registry.subscribe("u1", Vec::<String>::new());
        registry.subscribe("u1", ["", "  "]);
        assert!(!registry.contains_user("u1"));
        assert!(registry.is_empty());
    }

    #[test]
    fn unsubscribe_unknown_user_is_noop() {
        let registry = SubscriptionRegistry::new();
        registry.unsubscribe("u2", ["goals"]);
        assert!(!registry.contains_user("u2"));
        assert!(registry.list_subscriptions("u2").is_empty());
    }

    #[test]
    fn unsubscribe_unrelated_table_keeps_set() {
        let registry = SubscriptionRegistry::new();
        registry.subscribe("u1", ["goals"]);
        registry.unsubscribe("u1", ["plans"]);
        assert_eq!(registry.list_subscriptions("u1"), vec!["goals".to_string()]);
    }

    #[test]
    fn last_unsubscribe_removes_entry() {
        let registry = SubscriptionRegistry::new();
        registry.subscribe("u1", ["goals", "plans"]);
        registry.unsubscribe("u1", ["goals", "plans"]);
        assert!(!registry.contains_user("u1"));
        assert_eq!(registry.user_count(), 0);
    }

    #[test]
    fn remove_user_returns_tables() {
        let registry = SubscriptionRegistry::new();
        registry.subscribe("u1", ["goals", "plans"]);
        let Some(removed) = registry.remove_user("u1") else {
            panic!("expected an entry for u1");
        };
        assert_eq!(removed.len(), 2);
        assert!(registry.remove_user("u1").is_none());
    }

    #[test]
    fn replay_matches_set_semantics() {
        let registry = SubscriptionRegistry::new();
        let mut model: HashSet<String> = HashSet::new();
        let ops: [(bool, &[&str]); 6] = [
            (true, &["a", "b"]),
            (false, &["a"]),
            (true, &["c", "b"]),
            (false, &["x"]),
            (false, &["b", "c"]),
            (true, &["d"]),
        ];
        for (add, tables) in ops {
            if add {
                registry.subscribe("u", tables.iter().copied());
                model.extend(tables.iter().map(|t| (*t).to_string()));
            } else {
                registry.unsubscribe("u", tables.iter().copied());
                for t in tables {
                    model.remove(*t);
                }
            }
            let mut expected: Vec<String> = model.iter().cloned().collect();
            expected.sort_unstable();
            assert_eq!(registry.list_subscriptions("u"), expected);
            assert_eq!(registry.contains_user("u"), !model.is_empty());
        }
    }

    #[test]
    fn concurrent_subscribes_for_same_user_are_not_lost() {
        let registry = SubscriptionRegistry::new();
        std::thread::scope(|scope| {
            for worker in 0..8 {
                let registry = &registry;
                scope.spawn(move || {
                    for n in 0..50 {
                        registry.subscribe("shared", [format!("t{worker}-{n}")]);
                    }
                });
            }
        });
        assert_eq!(registry.list_subscriptions("shared").len(), 400);
    }

    #[test]
    fn concurrent_drain_leaves_no_empty_entry() {
        let registry = SubscriptionRegistry::new();
        let tables: Vec<String> = (0..64).map(|n| format!("t{n}")).collect();
        registry.subscribe("u1", tables.iter().cloned());
        std::thread::scope(|scope| {
            for chunk in tables.chunks(8) {
                let registry = &registry;
                scope.spawn(move || registry.unsubscribe("u1", chunk));
            }
        });
        assert!(!registry.contains_user("u1"));
    }
}
