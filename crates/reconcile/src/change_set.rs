//! The outcome of reconciling one namespace

use crate::diff::FieldChange;
use crate::entity::Entity;
use std::collections::BTreeMap;

/// A desired entity that differs from its remote counterpart
#[derive(Debug, Clone)]
pub struct Update<T> {
    /// Remote state as fetched
    pub origin: T,
    /// Desired state
    pub new: T,
    /// Changed fields, in path order
    pub changes: Vec<FieldChange>,
    /// Rendered text diff (display only)
    pub diff_text: String,
    /// Whether applying the update invalidates learned baselines
    pub must_reset: bool,
}

/// Disjoint classification of desired and remote entities for one namespace.
///
/// Over desired ids, `to_create`, `to_update`, `unchanged` and
/// `managed_by_other_namespace` are pairwise disjoint and cover every desired
/// entity. `managed_by_app` overlaps `to_update`/`unchanged`: it records the
/// ids whose management moves from the web application to the API.
#[derive(Debug, Clone)]
pub struct ChangeSet<T> {
    pub namespace: String,
    pub to_create: Vec<T>,
    pub to_update: Vec<Update<T>>,
    /// Ids to delete, sorted
    pub to_delete: Vec<String>,
    pub unchanged: Vec<T>,
    pub managed_by_app: Vec<String>,
    /// Id → namespace that currently owns it
    pub managed_by_other_namespace: BTreeMap<String, String>,
}

impl<T> ChangeSet<T> {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            to_create: Vec::new(),
            to_update: Vec::new(),
            to_delete: Vec::new(),
            unchanged: Vec::new(),
            managed_by_app: Vec::new(),
            managed_by_other_namespace: BTreeMap::new(),
        }
    }

    /// Conflicts that block applying this change set
    pub fn breaking_changes(&self) -> Vec<String> {
        self.managed_by_other_namespace
            .iter()
            .map(|(id, owner)| {
                let owner = if owner.is_empty() {
                    "default"
                } else {
                    owner.as_str()
                };
                format!("{id} is managed by namespace '{owner}'")
            })
            .collect()
    }

    /// Ids of updates that require a reset
    pub fn reset_ids(&self) -> Vec<String>
    where
        T: Entity,
    {
        self.to_update
            .iter()
            .filter(|u| u.must_reset)
            .map(|u| u.new.id().to_string())
            .collect()
    }

    pub fn summary(&self) -> ChangeSummary {
        ChangeSummary {
            create: self.to_create.len(),
            update: self.to_update.len(),
            delete: self.to_delete.len(),
            unchanged: self.unchanged.len(),
            reset: self.to_update.iter().filter(|u| u.must_reset).count(),
            managed_by_app: self.managed_by_app.len(),
            conflicts: self.managed_by_other_namespace.len(),
        }
    }
}

/// Counts per bucket
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChangeSummary {
    pub create: usize,
    pub update: usize,
    pub delete: usize,
    pub unchanged: usize,
    pub reset: usize,
    pub managed_by_app: usize,
    pub conflicts: usize,
}

impl ChangeSummary {
    /// Number of writes an apply would issue
    pub fn total_changes(&self) -> usize {
        self.create + self.update + self.delete
    }

    pub fn merge(&mut self, other: &Self) {
        self.create += other.create;
        self.update += other.update;
        self.delete += other.delete;
        self.unchanged += other.unchanged;
        self.reset += other.reset;
        self.managed_by_app += other.managed_by_app;
        self.conflicts += other.conflicts;
    }
}
