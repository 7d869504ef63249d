//! Backend trait and implementations for talking to the monitoring service.
//!
//! This module provides the [`Backend`] trait and implementations for
//! different transports. The primary implementation is [`http::HttpBackend`]
//! which speaks JSON over HTTP with a bearer token.
//!
//! # Testing
//!
//! Use [`MockBackend`] for testing without network access:
//!
//! ```
//! use synq_client::backend::{Backend, MockBackend};
//! use reconcile::MonitorDescriptor;
//!
//! let mock = MockBackend::new();
//! mock.add_monitor(MonitorDescriptor::new("m1", "sales", "db::orders"));
//!
//! let monitors = mock.fetch_monitors_by_namespace("sales").unwrap();
//! assert!(monitors.contains_key("m1"));
//! ```

pub mod http;

use crate::error::{Error, Result};
use crate::types::{
    CoordinateCandidate, CoordinateMatch, EntityInfo, MonitorQuery, PathCoordinates, SourceFilter,
};
use reconcile::{MonitorDescriptor, Source, TestDescriptor};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, Mutex};

/// Operations the deploy and export flows need from the service.
///
/// Every call is blocking and independently failable. Nothing is retried.
pub trait Backend: Send + Sync {
    /// Name of the workspace the credentials belong to.
    fn workspace(&self) -> Result<String>;

    /// List monitors matching `query`.
    fn list_monitors(&self, query: &MonitorQuery) -> Result<Vec<MonitorDescriptor>>;

    /// Every monitor the service attributes to `namespace`, keyed by id.
    fn fetch_monitors_by_namespace(
        &self,
        namespace: &str,
    ) -> Result<HashMap<String, MonitorDescriptor>> {
        let monitors = self.list_monitors(&MonitorQuery::namespace(namespace))?;
        Ok(monitors.into_iter().map(|m| (m.id.clone(), m)).collect())
    }

    /// Specific monitors by id, wherever they live.
    fn fetch_monitors_by_ids(&self, ids: &[String]) -> Result<HashMap<String, MonitorDescriptor>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let monitors = self.list_monitors(&MonitorQuery::ids(ids.to_vec()))?;
        Ok(monitors.into_iter().map(|m| (m.id.clone(), m)).collect())
    }

    fn create_monitors(&self, monitors: &[MonitorDescriptor]) -> Result<()>;

    fn delete_monitors(&self, ids: &[String]) -> Result<()>;

    /// Replace monitor definitions. Monitors in `reset_ids` lose their history.
    fn update_monitors(&self, monitors: &[MonitorDescriptor], reset_ids: &[String]) -> Result<()>;

    /// SQL tests scoped to `namespace`, keyed by id.
    fn fetch_tests_by_namespace(&self, namespace: &str) -> Result<HashMap<String, TestDescriptor>>;

    /// Specific SQL tests by id.
    fn fetch_tests_by_ids(&self, ids: &[String]) -> Result<HashMap<String, TestDescriptor>>;

    /// Create or replace SQL tests.
    fn upsert_tests(&self, tests: &[TestDescriptor]) -> Result<()>;

    fn delete_tests(&self, ids: &[String]) -> Result<()>;

    /// Look up canonical entity paths. Unknown paths are omitted from the result.
    fn get_entities(&self, paths: &[String]) -> Result<Vec<EntityInfo>>;

    /// Look up database coordinates such as `db.schema.table`.
    fn ids_by_coordinates(&self, coordinates: &[String]) -> Result<Vec<CoordinateMatch>>;

    /// Database coordinates of canonical paths. Unknown paths are omitted.
    fn coordinates_by_paths(&self, paths: &[String]) -> Result<Vec<PathCoordinates>>;
}

/// Mock backend for testing without network access.
///
/// State lives behind `Arc<Mutex<..>>` so clones share it, which lets a test
/// keep a handle and inspect what a command did.
#[derive(Debug, Clone, Default)]
pub struct MockBackend {
    workspace: Arc<Mutex<String>>,
    monitors: Arc<Mutex<HashMap<String, MonitorDescriptor>>>,
    tests: Arc<Mutex<HashMap<String, TestDescriptor>>>,
    entities: Arc<Mutex<HashMap<String, String>>>,
    coordinates: Arc<Mutex<HashMap<String, Vec<Vec<String>>>>>,
    calls: Arc<Mutex<Vec<String>>>,
    resets: Arc<Mutex<Vec<String>>>,
    failing: Arc<Mutex<HashSet<String>>>,
}

impl MockBackend {
    /// Create a new empty mock backend for workspace `test`.
    #[must_use]
    pub fn new() -> Self {
        let mock = Self::default();
        mock.set_workspace("test");
        mock
    }

    pub fn set_workspace(&self, workspace: impl Into<String>) {
        *self.workspace.lock().unwrap() = workspace.into();
    }

    /// Store a monitor as if it already existed remotely.
    pub fn add_monitor(&self, monitor: MonitorDescriptor) {
        let mut monitors = self.monitors.lock().unwrap();
        monitors.insert(monitor.id.clone(), monitor);
    }

    /// Store a SQL test as if it already existed remotely.
    pub fn add_test(&self, test: TestDescriptor) {
        let mut tests = self.tests.lock().unwrap();
        tests.insert(test.id.clone(), test);
    }

    /// Register a catalog entity with its type.
    pub fn add_entity(&self, path: impl Into<String>, entity_type: impl Into<String>) {
        let mut entities = self.entities.lock().unwrap();
        entities.insert(path.into(), entity_type.into());
    }

    /// Register a database coordinate. Each inner list is one candidate.
    pub fn add_coordinate(&self, coordinate: impl Into<String>, candidates: Vec<Vec<String>>) {
        let mut coordinates = self.coordinates.lock().unwrap();
        coordinates.insert(coordinate.into(), candidates);
    }

    /// Make every call to `method` fail with an RPC error.
    pub fn fail_on(&self, method: &str) {
        self.failing.lock().unwrap().insert(method.to_string());
    }

    /// Methods called so far, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Ids passed for reset across all update calls.
    #[must_use]
    pub fn resets(&self) -> Vec<String> {
        self.resets.lock().unwrap().clone()
    }

    #[must_use]
    pub fn monitors(&self) -> HashMap<String, MonitorDescriptor> {
        self.monitors.lock().unwrap().clone()
    }

    #[must_use]
    pub fn tests(&self) -> HashMap<String, TestDescriptor> {
        self.tests.lock().unwrap().clone()
    }

    fn record(&self, method: &str) -> Result<()> {
        self.calls.lock().unwrap().push(method.to_string());
        if self.failing.lock().unwrap().contains(method) {
            return Err(Error::Rpc {
                method: method.to_string(),
                message: "mock failure".to_string(),
            });
        }
        Ok(())
    }
}

fn matches_query(monitor: &MonitorDescriptor, query: &MonitorQuery) -> bool {
    let source_ok = match query.source {
        SourceFilter::All => true,
        SourceFilter::Api => monitor.source == Source::Api,
        SourceFilter::App => monitor.source == Source::App,
    };
    source_ok
        && query
            .namespace
            .as_ref()
            .is_none_or(|ns| &monitor.namespace_id == ns)
        && (query.monitor_ids.is_empty() || query.monitor_ids.contains(&monitor.id))
        && (query.monitored_paths.is_empty()
            || query.monitored_paths.contains(&monitor.monitored_path))
}

impl Backend for MockBackend {
    fn workspace(&self) -> Result<String> {
        self.record("Iam")?;
        Ok(self.workspace.lock().unwrap().clone())
    }

    fn list_monitors(&self, query: &MonitorQuery) -> Result<Vec<MonitorDescriptor>> {
        self.record("ListMonitors")?;
        let monitors = self.monitors.lock().unwrap();
        // Sorted so callers see a stable order.
        let matching: BTreeMap<&String, &MonitorDescriptor> = monitors
            .iter()
            .filter(|(_, m)| matches_query(m, query))
            .collect();
        Ok(matching.into_values().cloned().collect())
    }

    fn create_monitors(&self, monitors: &[MonitorDescriptor]) -> Result<()> {
        self.record("BatchCreateMonitor")?;
        for monitor in monitors {
            self.add_monitor(monitor.clone());
        }
        Ok(())
    }

    fn delete_monitors(&self, ids: &[String]) -> Result<()> {
        self.record("BatchDeleteMonitor")?;
        let mut stored = self.monitors.lock().unwrap();
        for id in ids {
            stored.remove(id);
        }
        Ok(())
    }

    fn update_monitors(&self, monitors: &[MonitorDescriptor], reset_ids: &[String]) -> Result<()> {
        self.record("BatchUpdateMonitor")?;
        for monitor in monitors {
            self.add_monitor(monitor.clone());
        }
        self.resets.lock().unwrap().extend(reset_ids.iter().cloned());
        Ok(())
    }

    fn fetch_tests_by_namespace(&self, namespace: &str) -> Result<HashMap<String, TestDescriptor>> {
        self.record("ListSqlTests")?;
        let tests = self.tests.lock().unwrap();
        Ok(tests
            .iter()
            .filter(|(_, t)| t.namespace_id == namespace)
            .map(|(id, t)| (id.clone(), t.clone()))
            .collect())
    }

    fn fetch_tests_by_ids(&self, ids: &[String]) -> Result<HashMap<String, TestDescriptor>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        self.record("ListSqlTests")?;
        let tests = self.tests.lock().unwrap();
        Ok(ids
            .iter()
            .filter_map(|id| tests.get(id).map(|t| (id.clone(), t.clone())))
            .collect())
    }

    fn upsert_tests(&self, tests: &[TestDescriptor]) -> Result<()> {
        self.record("BatchUpsertSqlTests")?;
        for test in tests {
            self.add_test(test.clone());
        }
        Ok(())
    }

    fn delete_tests(&self, ids: &[String]) -> Result<()> {
        self.record("BatchDeleteSqlTests")?;
        let mut stored = self.tests.lock().unwrap();
        for id in ids {
            stored.remove(id);
        }
        Ok(())
    }

    fn get_entities(&self, paths: &[String]) -> Result<Vec<EntityInfo>> {
        self.record("BatchGetEntities")?;
        let entities = self.entities.lock().unwrap();
        Ok(paths
            .iter()
            .filter_map(|path| {
                entities.get(path).map(|entity_type| EntityInfo {
                    path: path.clone(),
                    entity_type: entity_type.clone(),
                })
            })
            .collect())
    }

    fn ids_by_coordinates(&self, coordinates: &[String]) -> Result<Vec<CoordinateMatch>> {
        self.record("BatchIdsByCoordinates")?;
        let known = self.coordinates.lock().unwrap();
        Ok(coordinates
            .iter()
            .map(|coordinate| CoordinateMatch {
                coordinate: coordinate.clone(),
                candidates: known
                    .get(coordinate)
                    .map(|candidates| {
                        candidates
                            .iter()
                            .map(|paths| CoordinateCandidate {
                                paths: paths.clone(),
                            })
                            .collect()
                    })
                    .unwrap_or_default(),
            })
            .collect())
    }

    fn coordinates_by_paths(&self, paths: &[String]) -> Result<Vec<PathCoordinates>> {
        self.record("BatchDatabaseCoordinates")?;
        let known = self.coordinates.lock().unwrap();
        let mut found = Vec::new();
        for path in paths {
            // Reverse lookup: every coordinate whose candidates mention the path.
            for (coordinate, candidates) in known.iter() {
                if candidates.iter().any(|c| c.contains(path)) {
                    let mut all: Vec<String> = candidates.iter().flatten().cloned().collect();
                    all.sort();
                    all.dedup();
                    found.push(PathCoordinates {
                        coordinate: coordinate.clone(),
                        paths: all,
                    });
                }
            }
        }
        Ok(found)
    }
}
