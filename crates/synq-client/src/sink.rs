//! [`ChangeSink`] adapters that write change sets through a [`Backend`]

use crate::backend::Backend;
use crate::error::Error;
use reconcile::{ChangeSink, MonitorDescriptor, TestDescriptor};

/// Sends apply batches to the service.
///
/// SQL tests have no separate create and update calls; both go through upsert.
pub struct RemoteSink<'a, B: Backend + ?Sized> {
    backend: &'a B,
}

impl<'a, B: Backend + ?Sized> RemoteSink<'a, B> {
    pub fn new(backend: &'a B) -> Self {
        Self { backend }
    }
}

impl<B: Backend + ?Sized> ChangeSink<MonitorDescriptor> for RemoteSink<'_, B> {
    type Error = Error;

    fn create(&mut self, entities: &[MonitorDescriptor]) -> Result<(), Error> {
        self.backend.create_monitors(entities)
    }

    fn delete(&mut self, ids: &[String]) -> Result<(), Error> {
        self.backend.delete_monitors(ids)
    }

    fn update(
        &mut self,
        entities: &[MonitorDescriptor],
        reset_ids: &[String],
    ) -> Result<(), Error> {
        self.backend.update_monitors(entities, reset_ids)
    }
}

impl<B: Backend + ?Sized> ChangeSink<TestDescriptor> for RemoteSink<'_, B> {
    type Error = Error;

    fn create(&mut self, entities: &[TestDescriptor]) -> Result<(), Error> {
        self.backend.upsert_tests(entities)
    }

    fn delete(&mut self, ids: &[String]) -> Result<(), Error> {
        self.backend.delete_tests(ids)
    }

    fn update(&mut self, entities: &[TestDescriptor], reset_ids: &[String]) -> Result<(), Error> {
        if !reset_ids.is_empty() {
            log::warn!("sql tests cannot be reset; ignoring {} reset ids", reset_ids.len());
        }
        self.backend.upsert_tests(entities)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MockBackend;
    use reconcile::{NoProgress, Stage, apply, reconcile};
    use std::collections::HashMap;

    #[test]
    fn test_monitor_apply_through_mock() {
        let mock = MockBackend::new();
        mock.add_monitor(MonitorDescriptor::new("stale", "sales", "db::orders"));
        let fetched = mock.fetch_monitors_by_namespace("sales").unwrap();

        let desired = vec![MonitorDescriptor::new("fresh", "sales", "db::orders")];
        let set = reconcile("sales", &desired, &fetched).unwrap();
        let report = apply(&set, &mut RemoteSink::new(&mock), &mut NoProgress).unwrap();

        assert_eq!(report.created, 1);
        assert_eq!(report.deleted, 1);
        assert_eq!(
            mock.calls(),
            vec!["ListMonitors", "BatchCreateMonitor", "BatchDeleteMonitor"]
        );
        assert!(mock.monitors().contains_key("fresh"));
        assert!(!mock.monitors().contains_key("stale"));
    }

    #[test]
    fn test_failed_batch_keeps_earlier_batches() {
        let mock = MockBackend::new();
        mock.add_monitor(MonitorDescriptor::new("stale", "sales", "db::orders"));
        mock.fail_on("BatchDeleteMonitor");
        let fetched = mock.fetch_monitors_by_namespace("sales").unwrap();

        let desired = vec![MonitorDescriptor::new("fresh", "sales", "db::orders")];
        let set = reconcile("sales", &desired, &fetched).unwrap();
        let err = apply(&set, &mut RemoteSink::new(&mock), &mut NoProgress).unwrap_err();

        assert_eq!(err.stage, Stage::Delete);
        assert_eq!(err.completed, vec![Stage::Create]);
        assert!(mock.monitors().contains_key("fresh"));
        assert!(mock.monitors().contains_key("stale"));
    }

    #[test]
    fn test_tests_created_through_upsert() {
        let mock = MockBackend::new();
        let test = TestDescriptor {
            id: "t1".to_string(),
            name: "t1".to_string(),
            description: None,
            namespace_id: "sales".to_string(),
            monitored_path: "db::orders".to_string(),
            variant: reconcile::TestVariant::BusinessRule {
                sql_expression: "amount >= 0".to_string(),
            },
            severity: reconcile::Severity::Warning,
            schedule: None,
        };
        let set = reconcile("sales", &[test], &HashMap::new()).unwrap();
        apply(&set, &mut RemoteSink::new(&mock), &mut NoProgress).unwrap();
        assert_eq!(mock.calls(), vec!["BatchUpsertSqlTests"]);
        assert!(mock.tests().contains_key("t1"));
    }
}
