//! Applying a change set through batched writes
//!
//! Batches run in a fixed order (create, delete, update) and empty batches
//! are skipped. The first failing batch stops the apply; batches that
//! already succeeded stay applied and are reported in the error.

use crate::change_set::ChangeSet;
use crate::entity::Entity;
use crate::error::{ApplyError, Stage};
use std::error::Error as StdError;

/// Destination for the three write batches of a change set.
///
/// Implemented by the remote client; tests use an in-memory recorder.
pub trait ChangeSink<T: Entity> {
    type Error: StdError + Send + Sync + 'static;

    /// Create new entities
    fn create(&mut self, entities: &[T]) -> Result<(), Self::Error>;

    /// Delete entities by id
    fn delete(&mut self, ids: &[String]) -> Result<(), Self::Error>;

    /// Replace entities; `reset_ids` lists those whose history must be reset
    fn update(&mut self, entities: &[T], reset_ids: &[String]) -> Result<(), Self::Error>;
}

/// Progress callback for apply operations
pub trait ApplyProgress {
    /// Called before a batch is sent
    fn on_stage_start(&mut self, stage: Stage, count: usize);

    /// Called after a batch succeeded
    fn on_stage_complete(&mut self, stage: Stage, count: usize);
}

/// No-op progress callback
pub struct NoProgress;

impl ApplyProgress for NoProgress {
    fn on_stage_start(&mut self, _stage: Stage, _count: usize) {}
    fn on_stage_complete(&mut self, _stage: Stage, _count: usize) {}
}

/// What an apply wrote
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplyReport {
    pub created: usize,
    pub deleted: usize,
    pub updated: usize,
    pub reset: usize,
    /// Stages that ran, in order
    pub completed: Vec<Stage>,
}

impl ApplyReport {
    /// Total number of entities written
    pub fn total_changes(&self) -> usize {
        self.created + self.deleted + self.updated
    }

    pub fn merge(&mut self, other: &Self) {
        self.created += other.created;
        self.deleted += other.deleted;
        self.updated += other.updated;
        self.reset += other.reset;
    }
}

/// Send the writes of `set` to `sink`.
///
/// Conflicts in `managed_by_other_namespace` are not checked here; callers
/// refuse to apply a change set with breaking changes.
///
/// # Errors
///
/// Returns [`ApplyError`] for the first batch that fails.
pub fn apply<T, S, P>(
    set: &ChangeSet<T>,
    sink: &mut S,
    progress: &mut P,
) -> Result<ApplyReport, ApplyError>
where
    T: Entity,
    S: ChangeSink<T>,
    P: ApplyProgress,
{
    let mut report = ApplyReport::default();

    if !set.to_create.is_empty() {
        let count = set.to_create.len();
        run_stage(Stage::Create, count, &report, progress, || {
            sink.create(&set.to_create)
        })?;
        report.created = count;
        report.completed.push(Stage::Create);
    }

    if !set.to_delete.is_empty() {
        let count = set.to_delete.len();
        run_stage(Stage::Delete, count, &report, progress, || {
            sink.delete(&set.to_delete)
        })?;
        report.deleted = count;
        report.completed.push(Stage::Delete);
    }

    if !set.to_update.is_empty() {
        let entities: Vec<T> = set.to_update.iter().map(|u| u.new.clone()).collect();
        let reset_ids = set.reset_ids();
        let count = entities.len();
        run_stage(Stage::Update, count, &report, progress, || {
            sink.update(&entities, &reset_ids)
        })?;
        report.updated = count;
        report.reset = reset_ids.len();
        report.completed.push(Stage::Update);
    }

    Ok(report)
}

fn run_stage<E, P, F>(
    stage: Stage,
    count: usize,
    report: &ApplyReport,
    progress: &mut P,
    call: F,
) -> Result<(), ApplyError>
where
    E: StdError + Send + Sync + 'static,
    P: ApplyProgress,
    F: FnOnce() -> Result<(), E>,
{
    progress.on_stage_start(stage, count);
    log::info!("sending {stage} batch of {count}");
    call().map_err(|e| ApplyError {
        stage,
        completed: report.completed.clone(),
        source: Box::new(e),
    })?;
    progress.on_stage_complete(stage, count);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::change_set::Update;
    use crate::types::MonitorDescriptor;
    use std::io;

    #[derive(Default)]
    struct Recorder {
        calls: Vec<String>,
        fail_on: Option<Stage>,
    }

    impl ChangeSink<MonitorDescriptor> for Recorder {
        type Error = io::Error;

        fn create(&mut self, entities: &[MonitorDescriptor]) -> io::Result<()> {
            if self.fail_on == Some(Stage::Create) {
                return Err(io::Error::other("create refused"));
            }
            self.calls.push(format!("create {}", entities.len()));
            Ok(())
        }

        fn delete(&mut self, ids: &[String]) -> io::Result<()> {
            if self.fail_on == Some(Stage::Delete) {
                return Err(io::Error::other("delete refused"));
            }
            self.calls.push(format!("delete {}", ids.join(",")));
            Ok(())
        }

        fn update(
            &mut self,
            entities: &[MonitorDescriptor],
            reset_ids: &[String],
        ) -> io::Result<()> {
            if self.fail_on == Some(Stage::Update) {
                return Err(io::Error::other("update refused"));
            }
            self.calls.push(format!(
                "update {} reset {}",
                entities.len(),
                reset_ids.join(",")
            ));
            Ok(())
        }
    }

    fn full_set() -> ChangeSet<MonitorDescriptor> {
        let monitor = MonitorDescriptor::new("u", "N", "db::orders");
        let mut set = ChangeSet::new("N");
        set.to_create
            .push(MonitorDescriptor::new("c", "N", "db::orders"));
        set.to_delete.push("d".to_string());
        set.to_update.push(Update {
            origin: monitor.clone(),
            new: monitor,
            changes: vec![],
            diff_text: String::new(),
            must_reset: true,
        });
        set
    }

    #[test]
    fn test_batches_run_in_order() {
        let mut sink = Recorder::default();
        let report = apply(&full_set(), &mut sink, &mut NoProgress).unwrap();
        assert_eq!(
            sink.calls,
            vec!["create 1", "delete d", "update 1 reset u"]
        );
        assert_eq!(report.total_changes(), 3);
        assert_eq!(report.reset, 1);
        assert_eq!(
            report.completed,
            vec![Stage::Create, Stage::Delete, Stage::Update]
        );
    }

    #[test]
    fn test_empty_batches_are_skipped() {
        let set: ChangeSet<MonitorDescriptor> = ChangeSet::new("N");
        let mut sink = Recorder::default();
        let report = apply(&set, &mut sink, &mut NoProgress).unwrap();
        assert!(sink.calls.is_empty());
        assert_eq!(report, ApplyReport::default());
    }

    #[test]
    fn test_failure_stops_and_reports_completed_stages() {
        let mut sink = Recorder {
            fail_on: Some(Stage::Delete),
            ..Recorder::default()
        };
        let err = apply(&full_set(), &mut sink, &mut NoProgress).unwrap_err();
        assert_eq!(err.stage, Stage::Delete);
        assert_eq!(err.completed, vec![Stage::Create]);
        assert_eq!(err.source.to_string(), "delete refused");
        assert_eq!(sink.calls, vec!["create 1"]);
    }

    #[test]
    fn test_progress_callbacks() {
        #[derive(Default)]
        struct Counting {
            started: usize,
            completed: usize,
        }
        impl ApplyProgress for Counting {
            fn on_stage_start(&mut self, _stage: Stage, _count: usize) {
                self.started += 1;
            }
            fn on_stage_complete(&mut self, _stage: Stage, _count: usize) {
                self.completed += 1;
            }
        }

        let mut progress = Counting::default();
        let mut sink = Recorder {
            fail_on: Some(Stage::Update),
            ..Recorder::default()
        };
        assert!(apply(&full_set(), &mut sink, &mut progress).is_err());
        assert_eq!(progress.started, 3);
        assert_eq!(progress.completed, 2);
    }
}
