//! The [`Entity`] trait: what the reconciler needs to know about a descriptor

use crate::error::{Error, Result};
use crate::types::{MonitorDescriptor, Source, TestDescriptor};
use serde::Serialize;
use serde_json::Value;

/// A managed definition that can be reconciled against remote state.
///
/// Implemented for [`MonitorDescriptor`] and [`TestDescriptor`]; the
/// reconciler, identity generator and applier are generic over it.
pub trait Entity: Clone + Serialize {
    /// Human-readable kind, used in messages ("monitor", "sql test")
    const KIND: &'static str;

    fn id(&self) -> &str;

    fn set_id(&mut self, id: String);

    fn name(&self) -> &str;

    /// Owning namespace; empty for the global namespace
    fn namespace_id(&self) -> &str;

    fn monitored_path(&self) -> &str;

    fn set_monitored_path(&mut self, path: String);

    /// Remote ownership, if this kind of entity carries one
    fn source(&self) -> Option<Source>;

    /// Mark the entity as managed through the API
    fn claim_for_api(&mut self);

    /// Identity inputs that follow the raw id, in derivation order
    fn identity_parts(&self) -> Vec<&str>;

    /// Whether replacing `origin` with `new` invalidates learned baselines
    fn must_reset(origin: &Self, new: &Self) -> bool;

    /// Field-keyed canonical form used for structural comparison
    fn canonical(&self) -> Result<Value> {
        serde_json::to_value(self).map_err(|source| Error::Serialize {
            id: self.id().to_string(),
            source,
        })
    }
}

impl Entity for MonitorDescriptor {
    const KIND: &'static str = "monitor";

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn namespace_id(&self) -> &str {
        &self.namespace_id
    }

    fn monitored_path(&self) -> &str {
        &self.monitored_path
    }

    fn set_monitored_path(&mut self, path: String) {
        self.monitored_path = path;
    }

    fn source(&self) -> Option<Source> {
        Some(self.source)
    }

    fn claim_for_api(&mut self) {
        self.source = Source::Api;
    }

    fn identity_parts(&self) -> Vec<&str> {
        vec![self.namespace_id.as_str(), self.monitored_path.as_str()]
    }

    fn must_reset(origin: &Self, new: &Self) -> bool {
        if origin.timezone != new.timezone {
            return true;
        }
        if origin.kind.metric_aggregation() != new.kind.metric_aggregation() {
            return true;
        }
        if origin.schedule.kind_name() != new.schedule.kind_name()
            || origin.schedule.offset_minutes() != new.schedule.offset_minutes()
            || origin.schedule.delay_count() != new.schedule.delay_count()
        {
            return true;
        }
        if origin.time_partitioning != new.time_partitioning {
            return true;
        }
        origin.segmentation_expression() != new.segmentation_expression()
    }
}

impl Entity for TestDescriptor {
    const KIND: &'static str = "sql test";

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn namespace_id(&self) -> &str {
        &self.namespace_id
    }

    fn monitored_path(&self) -> &str {
        &self.monitored_path
    }

    fn set_monitored_path(&mut self, path: String) {
        self.monitored_path = path;
    }

    fn source(&self) -> Option<Source> {
        None
    }

    fn claim_for_api(&mut self) {}

    fn identity_parts(&self) -> Vec<&str> {
        vec![
            self.namespace_id.as_str(),
            self.monitored_path.as_str(),
            self.variant.discriminant(),
        ]
    }

    fn must_reset(_origin: &Self, _new: &Self) -> bool {
        false
    }
}
