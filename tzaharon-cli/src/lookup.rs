//! Resolve user-typed references to children and statuses.
//!
//! Order: exact id, exact name (trimmed, case-insensitive), unique id prefix.

use anyhow::{bail, Result};

use tzaharon_core::{AppState, Child, Status, StatusRegistry};

pub fn child<'a>(state: &'a AppState, query: &str) -> Result<&'a Child> {
    resolve(
        &state.children,
        query,
        "child",
        |c| c.id.as_str(),
        |c| c.full_name(),
    )
}

pub fn status<'a>(registry: &'a StatusRegistry, query: &str) -> Result<&'a Status> {
    resolve(
        registry.as_slice(),
        query,
        "status",
        |s| s.id.as_str(),
        |s| s.label.clone(),
    )
}

fn resolve<'a, T>(
    items: &'a [T],
    query: &str,
    kind: &str,
    id_of: impl Fn(&T) -> &str,
    name_of: impl Fn(&T) -> String,
) -> Result<&'a T> {
    let query = query.trim();
    if query.is_empty() {
        bail!("empty {kind} reference");
    }
    if let Some(item) = items.iter().find(|item| id_of(*item) == query) {
        return Ok(item);
    }

    let wanted = query.to_lowercase();
    let by_name: Vec<&T> = items
        .iter()
        .filter(|item| name_of(*item).trim().to_lowercase() == wanted)
        .collect();
    match by_name.as_slice() {
        [item] => return Ok(*item),
        [] => {}
        many => bail!(
            "{} {kind} entries are named '{query}'; use an id: {}",
            many.len(),
            ids(many, &id_of)
        ),
    }

    let by_prefix: Vec<&T> = items
        .iter()
        .filter(|item| id_of(*item).starts_with(query))
        .collect();
    match by_prefix.as_slice() {
        [item] => Ok(*item),
        [] => bail!("no {kind} matches '{query}'"),
        many => bail!(
            "'{query}' matches {} {kind} ids: {}",
            many.len(),
            ids(many, &id_of)
        ),
    }
}

fn ids<T>(items: &[&T], id_of: &impl Fn(&T) -> &str) -> String {
    items
        .iter()
        .map(|item| id_of(*item))
        .collect::<Vec<_>>()
        .join(", ")
}
