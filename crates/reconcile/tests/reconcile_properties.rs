//! End-to-end properties of identity assignment, reconciliation and apply.

use reconcile::{
    ChangeSink, DailySchedule, Entity, HourlySchedule, IdentityGenerator, MonitorDescriptor,
    MonitorKind, NoProgress, Schedule, Source, apply, reconcile,
};
use std::collections::{HashMap, HashSet};
use std::io;

/// In-memory remote state that applies batches the way the service does.
#[derive(Default)]
struct Remote {
    monitors: HashMap<String, MonitorDescriptor>,
    resets: Vec<String>,
}

impl ChangeSink<MonitorDescriptor> for Remote {
    type Error = io::Error;

    fn create(&mut self, entities: &[MonitorDescriptor]) -> io::Result<()> {
        for monitor in entities {
            self.monitors.insert(monitor.id.clone(), monitor.clone());
        }
        Ok(())
    }

    fn delete(&mut self, ids: &[String]) -> io::Result<()> {
        for id in ids {
            self.monitors.remove(id);
        }
        Ok(())
    }

    fn update(
        &mut self,
        entities: &[MonitorDescriptor],
        reset_ids: &[String],
    ) -> io::Result<()> {
        self.create(entities)?;
        self.resets.extend(reset_ids.iter().cloned());
        Ok(())
    }
}

fn desired(namespace: &str) -> Vec<MonitorDescriptor> {
    let mut freshness = MonitorDescriptor::new("orders_fresh", namespace, "warehouse::orders");
    freshness.kind = MonitorKind::Freshness {
        expression: "MAX(updated_at)".to_string(),
    };
    let mut numeric = MonitorDescriptor::new("orders_amount", namespace, "warehouse::orders");
    numeric.kind = MonitorKind::CustomNumeric {
        metric_aggregation: "SUM(amount)".to_string(),
    };
    vec![
        MonitorDescriptor::new("orders_volume", namespace, "warehouse::orders"),
        freshness,
        numeric,
    ]
}

fn assigned(namespace: &str) -> Vec<MonitorDescriptor> {
    let identities = IdentityGenerator::new("acme").unwrap();
    let mut monitors = desired(namespace);
    identities.assign(namespace, &mut monitors).unwrap();
    monitors
}

#[test]
fn identities_are_stable_across_runs() {
    let first: Vec<String> = assigned("sales").into_iter().map(|m| m.id).collect();
    let second: Vec<String> = assigned("sales").into_iter().map(|m| m.id).collect();
    assert_eq!(first, second);

    let elsewhere: Vec<String> = assigned("finance").into_iter().map(|m| m.id).collect();
    assert!(first.iter().all(|id| !elsewhere.contains(id)));
}

#[test]
fn apply_then_reconcile_is_a_no_op() {
    let monitors = assigned("sales");
    let mut remote = Remote::default();

    let set = reconcile("sales", &monitors, &remote.monitors).unwrap();
    assert_eq!(set.to_create.len(), 3);
    apply(&set, &mut remote, &mut NoProgress).unwrap();

    let again = reconcile("sales", &monitors, &remote.monitors).unwrap();
    assert_eq!(again.summary().total_changes(), 0);
    assert_eq!(again.unchanged.len(), 3);
}

#[test]
fn buckets_are_disjoint_and_cover_desired() {
    let mut monitors = assigned("sales");
    let mut remote = Remote::default();

    // unchanged
    remote
        .monitors
        .insert(monitors[0].id.clone(), monitors[0].clone());
    // owned by another namespace
    let mut foreign = monitors[1].clone();
    foreign.namespace_id = "finance".to_string();
    remote.monitors.insert(foreign.id.clone(), foreign);
    // stale, to delete
    let stale = MonitorDescriptor::new("stale", "sales", "warehouse::orders");
    remote.monitors.insert(stale.id.clone(), stale);
    // updated: the last desired monitor exists with another schedule
    let mut previous = monitors[2].clone();
    previous.schedule = Schedule::Hourly(HourlySchedule::default());
    remote.monitors.insert(previous.id.clone(), previous);
    // and a brand new one
    let mut extra = MonitorDescriptor::new("orders_rows", "sales", "warehouse::order_lines");
    IdentityGenerator::new("acme")
        .unwrap()
        .assign("sales", std::slice::from_mut(&mut extra))
        .unwrap();
    monitors.push(extra);

    let set = reconcile("sales", &monitors, &remote.monitors).unwrap();

    let mut seen = HashSet::new();
    let ids = set
        .to_create
        .iter()
        .map(|m| m.id.clone())
        .chain(set.to_update.iter().map(|u| u.new.id.clone()))
        .chain(set.unchanged.iter().map(|m| m.id.clone()))
        .chain(set.managed_by_other_namespace.keys().cloned());
    for id in ids {
        assert!(seen.insert(id), "id classified twice");
    }
    let all: HashSet<String> = monitors.iter().map(|m| m.id.clone()).collect();
    assert_eq!(seen, all);

    assert_eq!(set.to_delete, vec!["stale".to_string()]);
    assert!(set.to_update[0].must_reset);
    assert!(!set.breaking_changes().is_empty());
}

#[test]
fn delete_never_touches_app_or_foreign_entities() {
    let mut remote = Remote::default();
    let mut app = MonitorDescriptor::new("app_made", "sales", "warehouse::orders");
    app.source = Source::App;
    remote.monitors.insert(app.id.clone(), app);
    let foreign = MonitorDescriptor::new("theirs", "finance", "warehouse::orders");
    remote.monitors.insert(foreign.id.clone(), foreign);

    let set = reconcile("sales", &assigned("sales"), &remote.monitors).unwrap();
    assert!(set.to_delete.is_empty());
}

#[test]
fn reset_flag_reaches_the_sink() {
    let monitors = assigned("sales");
    let mut remote = Remote::default();
    for monitor in &monitors {
        let mut previous = monitor.clone();
        previous.schedule = Schedule::Daily(DailySchedule {
            minutes_since_midnight: 120,
            ..DailySchedule::default()
        });
        remote.monitors.insert(previous.id.clone(), previous);
    }
    // filter-only change on top of the reset for the first monitor
    let mut changed = monitors.clone();
    changed[0].filter = Some("status = 'paid'".to_string());

    let set = reconcile("sales", &changed, &remote.monitors).unwrap();
    assert_eq!(set.to_update.len(), 3);
    apply(&set, &mut remote, &mut NoProgress).unwrap();

    let mut resets = remote.resets.clone();
    resets.sort();
    let mut expected: Vec<String> = monitors.iter().map(|m| m.id().to_string()).collect();
    expected.sort();
    assert_eq!(resets, expected);
}
