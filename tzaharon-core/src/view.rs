//! Derived board view: filter, sort, and per-status counts.
//!
//! Sort order: children in the absent status go after everyone else; within
//! each group, `"<first> <last>"` in Hebrew collation order. `sort_by` is
//! stable, so equal keys keep their roster order.

use std::cmp::Ordering;

use icu_collator::{Collator, CollatorOptions};
use icu_locid::locale;
use serde::{Deserialize, Serialize};

use crate::registry::StatusRegistry;
use crate::types::{AppState, Child, Status, StatusId};

/// Active board filter.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "filter", content = "status")]
pub enum Filter {
    #[default]
    All,
    Status(StatusId),
}

impl Filter {
    pub fn matches(&self, child: &Child) -> bool {
        match self {
            Filter::All => true,
            Filter::Status(id) => &child.status_id == id,
        }
    }

    pub fn status(&self) -> Option<&StatusId> {
        match self {
            Filter::All => None,
            Filter::Status(id) => Some(id),
        }
    }
}

impl From<Option<StatusId>> for Filter {
    fn from(id: Option<StatusId>) -> Self {
        id.map(Filter::Status).unwrap_or_default()
    }
}

/// Locale-aware name comparison for the Hebrew locale.
///
/// Falls back to code-point order, with a warning, if collation data cannot
/// be loaded.
pub struct NameCollator {
    inner: Option<Collator>,
}

thread_local! {
    static HEBREW: NameCollator = NameCollator::hebrew();
}

impl NameCollator {
    pub fn hebrew() -> Self {
        let inner = match Collator::try_new(&locale!("he").into(), CollatorOptions::new()) {
            Ok(collator) => Some(collator),
            Err(err) => {
                tracing::warn!(error = ?err, "hebrew collation unavailable, sorting names by code point");
                None
            }
        };
        Self { inner }
    }

    /// Runs `f` with this thread's Hebrew collator, built on first use.
    pub fn with_hebrew<R>(f: impl FnOnce(&NameCollator) -> R) -> R {
        HEBREW.with(f)
    }

    pub fn is_locale_aware(&self) -> bool {
        self.inner.is_some()
    }

    pub fn compare(&self, a: &str, b: &str) -> Ordering {
        match &self.inner {
            Some(collator) => collator.compare(a, b),
            None => a.cmp(b),
        }
    }
}

impl Default for NameCollator {
    fn default() -> Self {
        Self::hebrew()
    }
}

/// The board: children passing `filter`, absent group last, names collated.
pub fn sorted_and_filtered<'a>(
    children: &'a [Child],
    registry: &StatusRegistry,
    filter: &Filter,
) -> Vec<&'a Child> {
    NameCollator::with_hebrew(|collator| {
        sorted_and_filtered_with(collator, children, registry, filter)
    })
}

pub fn sorted_and_filtered_with<'a>(
    collator: &NameCollator,
    children: &'a [Child],
    registry: &StatusRegistry,
    filter: &Filter,
) -> Vec<&'a Child> {
    let absent = registry.absent().map(|s| &s.id);
    let is_absent = |c: &Child| absent == Some(&c.status_id);

    let mut rows: Vec<(&Child, String, bool)> = children
        .iter()
        .filter(|c| filter.matches(c))
        .map(|c| (c, c.full_name(), is_absent(c)))
        .collect();

    rows.sort_by(|(_, name_a, absent_a), (_, name_b, absent_b)| {
        absent_a
            .cmp(absent_b)
            .then_with(|| collator.compare(name_a, name_b))
    });

    rows.into_iter().map(|(c, _, _)| c).collect()
}

/// Children in one status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusCount<'a> {
    pub status: &'a Status,
    pub count: usize,
}

/// Footer figures: total plus one entry per status, in registry order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tally<'a> {
    pub total: usize,
    pub per_status: Vec<StatusCount<'a>>,
}

pub fn tally(state: &AppState) -> Tally<'_> {
    let per_status = state
        .statuses
        .iter()
        .map(|status| StatusCount {
            status,
            count: state
                .children
                .iter()
                .filter(|c| c.status_id == status.id)
                .count(),
        })
        .collect();
    Tally {
        total: state.children.len(),
        per_status,
    }
}
