//! Row-level change notifications from the backing store.
//!
//! A [`ChangeEvent`] is built by the upstream change feed once per observed
//! mutation, handed to the mediator, and dropped after dispatch. Decoding
//! goes through [`RawChangeEvent`] so that a malformed event is rejected
//! before it can produce a bogus event name.

use std::fmt;
use std::str::FromStr;

use chrono::Utc;
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;

use crate::error::RelayError;

/// Kind of row mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChangeAction {
    /// A row was inserted.
    Insert,
    /// A row was updated.
    Update,
    /// A row was deleted.
    Delete,
}

impl ChangeAction {
    /// Lowercase wire form used in event names (`"insert"`, ...).
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Insert => "insert",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }
}

impl fmt::Display for ChangeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChangeAction {
    type Err = RelayError;

    /// Parses `INSERT` / `UPDATE` / `DELETE`, ignoring ASCII case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("insert") {
            Ok(Self::Insert)
        } else if s.eq_ignore_ascii_case("update") {
            Ok(Self::Update)
        } else if s.eq_ignore_ascii_case("delete") {
            Ok(Self::Delete)
        } else {
            Err(RelayError::UnknownAction(s.to_string()))
        }
    }
}

impl<'de> Deserialize<'de> for ChangeAction {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// A notification that a row in a backing table was inserted, updated, or
/// deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(try_from = "RawChangeEvent")]
pub struct ChangeEvent {
    /// Name of the mutated table. Never empty once decoded.
    pub table: String,
    /// Mutation kind.
    pub action: ChangeAction,
    /// Owning user. Empty when the row is not attributable to one user.
    pub user_id: String,
    /// Opaque row payload, passed through untouched.
    #[schema(value_type = Object)]
    pub data: serde_json::Value,
    /// ISO-8601 timestamp. Informational only.
    pub timestamp: String,
}

/// Wire shape of a change event before validation.
///
/// Accepts both `user_id` and `userId`, and a `null` or missing owner.
#[derive(Debug, Deserialize)]
pub struct RawChangeEvent {
    #[serde(default)]
    table: String,
    #[serde(default)]
    action: String,
    #[serde(default, alias = "userId", deserialize_with = "null_as_empty")]
    user_id: String,
    #[serde(default)]
    data: serde_json::Value,
    #[serde(default, deserialize_with = "null_as_empty")]
    timestamp: String,
}

fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

impl TryFrom<RawChangeEvent> for ChangeEvent {
    type Error = RelayError;

    fn try_from(raw: RawChangeEvent) -> Result<Self, Self::Error> {
        let action = raw.action.parse()?;
        let event = Self {
            table: raw.table,
            action,
            user_id: raw.user_id,
            data: raw.data,
            timestamp: if raw.timestamp.is_empty() {
                Utc::now().to_rfc3339()
            } else {
                raw.timestamp
            },
        };
        event.validate()?;
        Ok(event)
    }
}

impl ChangeEvent {
    /// Creates an event stamped with the current time.
    #[must_use]
    pub fn new(
        table: impl Into<String>,
        action: ChangeAction,
        user_id: impl Into<String>,
        data: serde_json::Value,
    ) -> Self {
        Self {
            table: table.into(),
            action,
            user_id: user_id.into(),
            data,
            timestamp: Utc::now().to_rfc3339(),
        }
    }

    /// Decodes and validates an event from its JSON wire form.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::InvalidEvent`] for undecodable JSON or an empty
    /// table, and [`RelayError::UnknownAction`] for an unrecognized action.
    pub fn from_json(payload: &str) -> Result<Self, RelayError> {
        let raw: RawChangeEvent =
            serde_json::from_str(payload).map_err(|e| RelayError::InvalidEvent(e.to_string()))?;
        Self::try_from(raw)
    }

    /// Checks the fields the event name is built from.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::InvalidEvent`] if the table name is empty or
    /// contains the `:` separator.
    pub fn validate(&self) -> Result<(), RelayError> {
        if self.table.trim().is_empty() {
            return Err(RelayError::InvalidEvent(
                "table must not be empty".to_string(),
            ));
        }
        if self.table.contains(':') {
            return Err(RelayError::InvalidEvent(format!(
                "table name {:?} contains ':'",
                self.table
            )));
        }
        Ok(())
    }

    /// Returns the wire event name, `"<table>:<action>"`.
    #[must_use]
    pub fn event_name(&self) -> String {
        format!("{}:{}", self.table, self.action)
    }

    /// Returns the owning user, or `None` when the event is unattributed.
    #[must_use]
    pub fn owner(&self) -> Option<&str> {
        if self.user_id.is_empty() {
            None
        } else {
            Some(&self.user_id)
        }
    }

    /// Returns `true` when `data` holds only the row's key and owner columns.
    ///
    /// The database trigger sends this reduced form, flagged with
    /// `"truncated": true`, when the full row would exceed the notification
    /// size limit. Clients should refetch the row in that case.
    #[must_use]
    pub fn is_truncated(&self) -> bool {
        self.data
            .get("truncated")
            .and_then(serde_json::Value::as_bool)
            .unwrap_or(false)
    }
}
