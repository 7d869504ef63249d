//! Descriptor to document generation
//!
//! The inverse of [`convert`](super::convert) for monitors: fields equal to
//! their defaults are left out so exported files stay short.

use super::VERSION;
use super::duration::Duration;
use super::model::{
    AnomalyEngineDef, Document, EntityDef, FixedThresholdsDef, ModeDef, MonitorDef, ScheduleDef,
    SegmentationDef,
};
use anyhow::{Context, Result};
use reconcile::{Mode, MonitorDescriptor, MonitorKind, Schedule, Severity};
use std::collections::{BTreeMap, HashMap};

/// Build a document from monitors.
///
/// `paths` maps a canonical monitored path to the path written in the file;
/// paths missing from it are written unchanged. Entities are sorted by id.
pub fn generate(
    namespace: &str,
    monitors: &[MonitorDescriptor],
    paths: &HashMap<String, String>,
) -> Document {
    let mut entities: BTreeMap<String, EntityDef> = BTreeMap::new();

    for monitor in monitors {
        let entity_id = paths
            .get(&monitor.monitored_path)
            .cloned()
            .unwrap_or_else(|| monitor.monitored_path.clone());

        let entity = entities
            .entry(entity_id.clone())
            .or_insert_with(|| EntityDef {
                id: entity_id,
                ..EntityDef::default()
            });
        if entity.time_partitioning_column.is_none() {
            entity.time_partitioning_column = monitor.time_partitioning.clone();
        }
        entity.monitors.push(monitor_def(monitor));
    }

    Document {
        version: Some(VERSION.to_string()),
        namespace: namespace.to_string(),
        defaults: Default::default(),
        entities: entities.into_values().collect(),
    }
}

/// Serialize a document to YAML
pub fn to_yaml(doc: &Document) -> Result<String> {
    serde_yaml::to_string(doc).context("Failed to serialize YAML")
}

fn monitor_def(monitor: &MonitorDescriptor) -> MonitorDef {
    let mut def = MonitorDef {
        kind: monitor.kind.type_name().to_string(),
        id: Some(monitor.id.clone()),
        name: (monitor.name != monitor.id && !monitor.name.is_empty())
            .then(|| monitor.name.clone()),
        filter: monitor.filter.clone(),
        timezone: (!monitor.timezone.is_empty()).then(|| monitor.timezone.clone()),
        severity: (monitor.severity != Severity::Error)
            .then(|| monitor.severity.as_str().to_string()),
        mode: mode_def(&monitor.mode),
        segmentation: monitor.segmentation.as_ref().map(|s| SegmentationDef {
            expression: s.expression.clone(),
            include_values: s.include_values.clone().unwrap_or_default(),
            exclude_values: s.exclude_values.clone().unwrap_or_default(),
        }),
        ..MonitorDef::default()
    };

    match &monitor.kind {
        MonitorKind::Volume => {}
        MonitorKind::Freshness { expression } => def.expression = Some(expression.clone()),
        MonitorKind::CustomNumeric { metric_aggregation } => {
            def.metric_aggregation = Some(metric_aggregation.clone());
        }
        MonitorKind::FieldStats { fields } => def.columns = fields.clone(),
    }

    if monitor.schedule != Schedule::default() {
        let block = schedule_def(&monitor.schedule);
        match monitor.schedule {
            Schedule::Daily(_) => def.daily = Some(block),
            Schedule::Hourly(_) => def.hourly = Some(block),
        }
    }

    def
}

fn mode_def(mode: &Mode) -> Option<ModeDef> {
    if *mode == Mode::default() {
        return None;
    }
    Some(match mode {
        Mode::AnomalyEngine { sensitivity } => ModeDef {
            anomaly_engine: Some(AnomalyEngineDef {
                sensitivity: sensitivity.as_str().to_string(),
            }),
            fixed_thresholds: None,
        },
        Mode::FixedThresholds { min, max } => ModeDef {
            anomaly_engine: None,
            fixed_thresholds: Some(FixedThresholdsDef {
                min: *min,
                max: *max,
            }),
        },
    })
}

fn schedule_def(schedule: &Schedule) -> ScheduleDef {
    let offset = Duration::from_minutes(i64::from(schedule.offset_minutes()));
    let mut def = ScheduleDef {
        ignore_last: schedule.delay_count().filter(|n| *n != 0),
        ..ScheduleDef::default()
    };
    if schedule.only_schedule_delay() {
        def.query_delay = Some(offset);
    } else if offset.seconds() != 0 {
        def.time_partitioning_shift = Some(offset);
    }
    def
}
