//! # Reconcile
//!
//! Desired-vs-actual reconciliation for monitor and SQL test definitions.
//!
//! ## Core Concepts
//!
//! - **Descriptor**: a canonical monitor or test definition
//!   ([`MonitorDescriptor`], [`TestDescriptor`])
//! - **Identity**: a stable UUID derived from the descriptor's natural key ([`IdentityGenerator`])
//! - **ChangeSet**: disjoint create/update/delete/unchanged buckets plus ownership conflicts
//! - **Apply**: batched writes through a [`ChangeSink`]
//!
//! ## Example
//!
//! ```
//! use reconcile::{IdentityGenerator, MonitorDescriptor, reconcile};
//! use std::collections::HashMap;
//!
//! let identities = IdentityGenerator::new("acme").unwrap();
//! let mut desired = vec![MonitorDescriptor::new("orders_volume", "sales", "db::orders")];
//! identities.assign("sales", &mut desired).unwrap();
//!
//! let set = reconcile("sales", &desired, &HashMap::new()).unwrap();
//! assert_eq!(set.to_create.len(), 1);
//! ```

pub mod apply;
pub mod change_set;
pub mod diff;
pub mod entity;
pub mod error;
pub mod format;
pub mod identity;
pub mod reconciler;
pub mod types;

// Re-export main types at crate root
pub use apply::{ApplyProgress, ApplyReport, ChangeSink, NoProgress, apply};
pub use change_set::{ChangeSet, ChangeSummary, Update};
pub use diff::{FieldChange, compare};
pub use entity::Entity;
pub use error::{ApplyError, Error, Result, Stage};
pub use format::{DiffLine, diff_lines, format_diff};
pub use identity::{IdentityGenerator, ensure_unique};
pub use reconciler::reconcile;
pub use types::{
    DailySchedule, HourlySchedule, Mode, MonitorDescriptor, MonitorKind, Schedule, Segmentation,
    Sensitivity, Severity, Source, TestDescriptor, TestVariant,
};
