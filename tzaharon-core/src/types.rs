//! Domain types for the attendance board.
//!
//! Field names on the wire follow the browser client (`firstName`,
//! `statusId`, `lastUpdated`), so a payload written by any client of the
//! HTTP API deserializes unchanged.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::registry::StatusRegistry;

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// Opaque identifier of a status, stable for the lifetime of the status.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StatusId(pub String);

impl StatusId {
    /// A fresh random identifier (UUID v4).
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StatusId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for StatusId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for StatusId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// Opaque identifier of a child, assigned at creation and never changed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChildId(pub String);

impl ChildId {
    /// A fresh random identifier (UUID v4).
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChildId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for ChildId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ChildId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Label of the absent status in the seeded registry. Only consulted by
/// [`AppState::migrate_absent_marker`]; the view relies on [`StatusKind`].
pub const ABSENT_LABEL: &str = "לא הגיע";

/// Color given to statuses created from the settings editor.
pub const NEW_STATUS_COLOR: &str = "bg-gray-400";

/// Palette offered by the settings editor.
pub const STATUS_COLORS: [&str; 8] = [
    "bg-slate-500",
    "bg-green-500",
    "bg-purple-500",
    "bg-red-500",
    "bg-yellow-500",
    "bg-indigo-500",
    "bg-pink-500",
    "bg-blue-500",
];

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Category of a status. Children in an `Absent` status sort last on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StatusKind {
    #[default]
    Present,
    Absent,
}

impl fmt::Display for StatusKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusKind::Present => write!(f, "present"),
            StatusKind::Absent => write!(f, "absent"),
        }
    }
}

// ---------------------------------------------------------------------------
// Domain structs
// ---------------------------------------------------------------------------

/// A named category a child can be in ("classroom", "gate", ...).
#[derive(Debug, Clone, Eq, Serialize, Deserialize)]
#[serde(from = "StatusRecord")]
pub struct Status {
    pub id: StatusId,
    /// Free-form display text, any script.
    pub label: String,
    /// Display tag (a CSS color class on the web client); opaque here.
    pub color: String,
    pub kind: StatusKind,
    /// Read from a record with no `kind` field. Never serialized.
    #[serde(skip)]
    kind_missing: bool,
}

/// Wire form of [`Status`]; `kind` is absent in records from older clients.
#[derive(Deserialize)]
struct StatusRecord {
    id: StatusId,
    label: String,
    color: String,
    #[serde(default)]
    kind: Option<StatusKind>,
}

impl From<StatusRecord> for Status {
    fn from(record: StatusRecord) -> Self {
        Self {
            id: record.id,
            label: record.label,
            color: record.color,
            kind_missing: record.kind.is_none(),
            kind: record.kind.unwrap_or_default(),
        }
    }
}

impl PartialEq for Status {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.label == other.label
            && self.color == other.color
            && self.kind == other.kind
    }
}

impl Status {
    pub fn new(id: impl Into<StatusId>, label: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            color: color.into(),
            kind: StatusKind::Present,
            kind_missing: false,
        }
    }

    pub fn absent(mut self) -> Self {
        self.kind = StatusKind::Absent;
        self
    }

    pub fn is_absent(&self) -> bool {
        self.kind == StatusKind::Absent
    }
}

/// A tracked child.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Child {
    pub id: ChildId,
    pub first_name: String,
    pub last_name: String,
    /// Always resolves to a status in the registry once a mutation completes.
    pub status_id: StatusId,
    #[serde(
        default,
        deserialize_with = "empty_note_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub notes: Option<String>,
    /// Time of the last status change; display only.
    #[serde(default)]
    pub last_updated: Option<DateTime<Utc>>,
}

impl Child {
    /// `"<first> <last>"`, the key the board sorts by.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Registry and roster, always read and written together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct AppState {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub children: Vec<Child>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub statuses: StatusRegistry,
}

impl AppState {
    /// Empty roster with the default four statuses.
    pub fn seeded() -> Self {
        Self {
            children: Vec::new(),
            statuses: StatusRegistry::defaults(),
        }
    }

    /// `null` and `[]` statuses both mean "never initialized".
    pub fn needs_seeding(&self) -> bool {
        self.statuses.is_empty()
    }

    pub fn child(&self, id: &ChildId) -> Option<&Child> {
        self.children.iter().find(|c| &c.id == id)
    }

    /// Children whose `status_id` is not in the registry.
    pub fn dangling_children(&self) -> impl Iterator<Item = &Child> {
        self.children
            .iter()
            .filter(|c| !self.statuses.contains(&c.status_id))
    }

    /// True when every stored status predates the `kind` field.
    pub fn is_legacy(&self) -> bool {
        !self.statuses.is_empty() && self.statuses.iter().all(|s| s.kind_missing)
    }

    /// Upgrade a payload written before statuses carried a `kind` by marking
    /// the status labelled [`ABSENT_LABEL`] absent. Records that already carry
    /// kinds are left alone, so a cleared marker stays cleared.
    ///
    /// Returns `true` when a status was marked.
    pub fn migrate_absent_marker(&mut self) -> bool {
        if !self.is_legacy() {
            return false;
        }
        for status in self.statuses.iter_mut() {
            status.kind_missing = false;
        }
        if self.statuses.absent().is_some() {
            return false;
        }
        let Some(id) = self
            .statuses
            .iter()
            .find(|s| s.label == ABSENT_LABEL)
            .map(|s| s.id.clone())
        else {
            return false;
        };
        self.statuses.mark_absent(&id).is_ok()
    }
}

// ---------------------------------------------------------------------------
// Serde helpers
// ---------------------------------------------------------------------------

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn empty_note_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.filter(|n| !n.is_empty()))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
