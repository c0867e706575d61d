//! Status registry: the ordered set of statuses.
//!
//! Order is meaningful. The first entry is the default status for new
//! children and for a bulk reset; the settings editor may rearrange it.
//!
//! The editing operations here work on a draft copy of the registry. The
//! draft only reaches the roster through [`crate::Mutation::SaveSettings`],
//! which applies the reassignment rule in the same step.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::ReconcileError;
use crate::types::{Status, StatusId, StatusKind, NEW_STATUS_COLOR};

/// Direction for [`StatusRegistry::reorder`]. `Up` moves towards the front.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

/// Editable text field of a status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusField {
    Label,
    Color,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct StatusRegistry(Vec<Status>);

impl StatusRegistry {
    pub fn new(statuses: Vec<Status>) -> Self {
        Self(statuses)
    }

    /// The seeded registry: classroom, gate, activity, absent.
    pub fn defaults() -> Self {
        Self(vec![
            Status::new("1", "כיתה", "bg-slate-500"),
            Status::new("2", "שער", "bg-green-500"),
            Status::new("3", "חוג", "bg-purple-500"),
            Status::new("4", crate::types::ABSENT_LABEL, "bg-red-500").absent(),
        ])
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Status> {
        self.0.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> std::slice::IterMut<'_, Status> {
        self.0.iter_mut()
    }

    pub fn as_slice(&self) -> &[Status] {
        &self.0
    }

    pub fn into_inner(self) -> Vec<Status> {
        self.0
    }

    pub fn get(&self, id: &StatusId) -> Option<&Status> {
        self.0.iter().find(|s| &s.id == id)
    }

    pub fn contains(&self, id: &StatusId) -> bool {
        self.get(id).is_some()
    }

    pub fn position(&self, id: &StatusId) -> Option<usize> {
        self.0.iter().position(|s| &s.id == id)
    }

    /// Id of the first status, or `None` for an empty registry.
    pub fn default_status_id(&self) -> Option<&StatusId> {
        self.0.first().map(|s| &s.id)
    }

    /// The status whose children sort last on the board.
    pub fn absent(&self) -> Option<&Status> {
        self.0.iter().find(|s| s.is_absent())
    }

    pub fn ids(&self) -> HashSet<&StatusId> {
        self.0.iter().map(|s| &s.id).collect()
    }

    /// First id that appears more than once.
    pub fn duplicate_id(&self) -> Option<&StatusId> {
        let mut seen = HashSet::new();
        self.0.iter().map(|s| &s.id).find(|id| !seen.insert(*id))
    }

    /// Append a status with a fresh id. `color` defaults to
    /// [`NEW_STATUS_COLOR`].
    pub fn create(&mut self, label: &str, color: Option<&str>) -> Result<StatusId, ReconcileError> {
        if label.trim().is_empty() {
            return Err(ReconcileError::EmptyLabel);
        }
        let id = StatusId::generate();
        self.0.push(Status::new(
            id.clone(),
            label,
            color.unwrap_or(NEW_STATUS_COLOR),
        ));
        Ok(id)
    }

    /// Swap with the neighbour in `direction`. Returns `false` (and leaves
    /// the order unchanged) at either end of the sequence.
    pub fn reorder(&mut self, id: &StatusId, direction: Direction) -> Result<bool, ReconcileError> {
        let index = self
            .position(id)
            .ok_or_else(|| ReconcileError::UnknownStatus(id.clone()))?;
        let target = match direction {
            Direction::Up if index > 0 => index - 1,
            Direction::Down if index + 1 < self.0.len() => index + 1,
            _ => return Ok(false),
        };
        self.0.swap(index, target);
        Ok(true)
    }

    /// Update the label or color in place; the id is untouched.
    pub fn edit(
        &mut self,
        id: &StatusId,
        field: StatusField,
        value: impl Into<String>,
    ) -> Result<(), ReconcileError> {
        let value = value.into();
        if field == StatusField::Label && value.trim().is_empty() {
            return Err(ReconcileError::EmptyLabel);
        }
        let status = self
            .0
            .iter_mut()
            .find(|s| &s.id == id)
            .ok_or_else(|| ReconcileError::UnknownStatus(id.clone()))?;
        match field {
            StatusField::Label => status.label = value,
            StatusField::Color => status.color = value,
        }
        Ok(())
    }

    /// Make `id` the absent status. Any other status loses the marker.
    pub fn mark_absent(&mut self, id: &StatusId) -> Result<(), ReconcileError> {
        if !self.contains(id) {
            return Err(ReconcileError::UnknownStatus(id.clone()));
        }
        for status in &mut self.0 {
            status.kind = if &status.id == id {
                StatusKind::Absent
            } else {
                StatusKind::Present
            };
        }
        Ok(())
    }

    /// Clear the absent marker from every status.
    pub fn clear_absent(&mut self) {
        for status in &mut self.0 {
            status.kind = StatusKind::Present;
        }
    }

    pub fn remove(&mut self, id: &StatusId) -> Result<Status, ReconcileError> {
        let index = self
            .position(id)
            .ok_or_else(|| ReconcileError::UnknownStatus(id.clone()))?;
        Ok(self.0.remove(index))
    }
}

impl<'a> IntoIterator for &'a StatusRegistry {
    type Item = &'a Status;
    type IntoIter = std::slice::Iter<'a, Status>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl From<Vec<Status>> for StatusRegistry {
    fn from(statuses: Vec<Status>) -> Self {
        Self(statuses)
    }
}
