//! Stable identity derivation
//!
//! Monitors and tests in YAML are addressed by natural keys (an id that is
//! unique within an entity). The remote service needs UUIDs, so every
//! descriptor gets one derived from its semantic content:
//!
//! - the workspace seed is `uuid_v3(DNS, workspace)`
//! - a raw id that already parses as a UUID is used as-is (normalized)
//! - otherwise `uuid_v5(seed, raw_id ‖ identity parts...)` with no separator
//!
//! Monitor identity parts are `namespace ‖ monitored path`; this matches ids
//! produced by earlier releases and must not change. Test identity parts
//! (version 1) are `namespace ‖ monitored path ‖ test type`.

use crate::entity::Entity;
use crate::error::{Error, Result};
use std::collections::BTreeSet;
use std::collections::HashSet;
use uuid::Uuid;

/// Derives deterministic UUIDs for one workspace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdentityGenerator {
    seed: Uuid,
}

impl IdentityGenerator {
    /// Create a generator seeded by the workspace name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingWorkspace`] if `workspace` is empty.
    pub fn new(workspace: &str) -> Result<Self> {
        if workspace.is_empty() {
            return Err(Error::MissingWorkspace);
        }
        Ok(Self {
            seed: Uuid::new_v3(&Uuid::NAMESPACE_DNS, workspace.as_bytes()),
        })
    }

    pub fn seed(&self) -> Uuid {
        self.seed
    }

    /// Identity for a single entity, without touching it.
    pub fn derive<T: Entity>(&self, entity: &T) -> String {
        let raw = entity.id();
        if let Ok(parsed) = Uuid::parse_str(raw) {
            return parsed.hyphenated().to_string();
        }

        let mut input = String::from(raw);
        for part in entity.identity_parts() {
            input.push_str(part);
        }
        let id = Uuid::new_v5(&self.seed, input.as_bytes()).to_string();
        log::trace!("derived {} id {} from '{}'", T::KIND, id, input);
        id
    }

    /// Replace every raw id with its derived identity, then check uniqueness.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateIds`] listing every identity that occurs more
    /// than once. Ids are still rewritten when this fails.
    pub fn assign<T: Entity>(&self, namespace: &str, entities: &mut [T]) -> Result<()> {
        for entity in entities.iter_mut() {
            let id = self.derive(&*entity);
            entity.set_id(id);
        }
        ensure_unique(namespace, entities)
    }
}

/// Fail if two entities share an id.
pub fn ensure_unique<T: Entity>(namespace: &str, entities: &[T]) -> Result<()> {
    let mut seen = HashSet::new();
    let mut duplicates = BTreeSet::new();
    for entity in entities {
        if !seen.insert(entity.id()) {
            duplicates.insert(entity.id().to_string());
        }
    }

    if duplicates.is_empty() {
        Ok(())
    } else {
        Err(Error::DuplicateIds {
            kind: T::KIND,
            namespace: namespace.to_string(),
            ids: duplicates.into_iter().collect(),
        })
    }
}
