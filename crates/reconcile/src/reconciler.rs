//! Change-set computation
//!
//! Classifies every desired entity against the fetched remote state:
//!
//! 1. not fetched → create
//! 2. fetched and managed by the web application → recorded, then diffed
//! 3. fetched, API-managed, owned by another namespace → conflict, skipped
//! 4. structurally equal → unchanged, otherwise → update
//!
//! Remote entities of the target namespace that are API-managed and no
//! longer desired are deleted.

use crate::change_set::{ChangeSet, Update};
use crate::diff::compare;
use crate::entity::Entity;
use crate::error::Result;
use crate::format::format_diff;
use crate::types::Source;
use std::collections::{HashMap, HashSet};

/// Compute the change set for `namespace`.
///
/// `desired` must already carry assigned ids. `fetched` maps id to remote
/// descriptor and holds everything the service attributes to the namespace
/// plus any desired id that lives elsewhere.
///
/// # Errors
///
/// Only fails if a descriptor cannot be serialized to its canonical form.
pub fn reconcile<T: Entity>(
    namespace: &str,
    desired: &[T],
    fetched: &HashMap<String, T>,
) -> Result<ChangeSet<T>> {
    let mut set = ChangeSet::new(namespace);

    let requested: HashSet<&str> = desired.iter().map(|e| e.id()).collect();

    // An empty global namespace with nothing desired never mass-deletes.
    let may_delete = !(namespace.is_empty() && desired.is_empty());
    if may_delete {
        let mut to_delete: Vec<String> = fetched
            .values()
            .filter(|actual| actual.namespace_id() == namespace)
            .filter(|actual| actual.source() != Some(Source::App))
            .filter(|actual| !requested.contains(actual.id()))
            .map(|actual| actual.id().to_string())
            .collect();
        to_delete.sort();
        set.to_delete = to_delete;
    }

    for entity in desired {
        let mut new = entity.clone();
        new.claim_for_api();

        let Some(origin) = fetched.get(new.id()) else {
            set.to_create.push(new);
            continue;
        };

        match origin.source() {
            Some(Source::App) => {
                set.managed_by_app.push(new.id().to_string());
            }
            Some(Source::Api) if origin.namespace_id() != namespace => {
                set.managed_by_other_namespace
                    .insert(new.id().to_string(), origin.namespace_id().to_string());
                continue;
            }
            _ => {}
        }

        let origin_value = origin.canonical()?;
        let new_value = new.canonical()?;
        let changes = compare(&origin_value, &new_value);

        if changes.is_empty() {
            set.unchanged.push(new);
        } else {
            let must_reset = T::must_reset(origin, &new);
            set.to_update.push(Update {
                origin: origin.clone(),
                diff_text: format_diff(&origin_value, &new_value),
                new,
                changes,
                must_reset,
            });
        }
    }

    log::debug!(
        "reconciled {} {}s in namespace '{}': {} create, {} update, {} delete, {} unchanged, {} conflicts",
        desired.len(),
        T::KIND,
        namespace,
        set.to_create.len(),
        set.to_update.len(),
        set.to_delete.len(),
        set.unchanged.len(),
        set.managed_by_other_namespace.len()
    );

    Ok(set)
}
