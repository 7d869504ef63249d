//! Document to descriptor conversion
//!
//! Conversion never stops at the first problem: every invalid field in the
//! document is collected into [`ConversionErrors`]. Monitored paths are left
//! as written; resolving them to canonical paths happens later.

use super::model::{
    Defaults, Document, EntityDef, ModeDef, MonitorDef, ScheduleDef, SegmentationDef, TestDef,
};
use super::{ConversionError, ConversionErrors};
use reconcile::{
    DailySchedule, HourlySchedule, Mode, MonitorDescriptor, MonitorKind, Schedule, Segmentation,
    Sensitivity, Severity, Source, TestDescriptor, TestVariant,
};
use std::collections::HashSet;

/// Descriptors produced from one document
#[derive(Debug, Clone, Default)]
pub struct Converted {
    pub namespace: String,
    pub monitors: Vec<MonitorDescriptor>,
    pub tests: Vec<TestDescriptor>,
}

/// Convert a parsed document into monitor and test descriptors
pub fn convert(doc: &Document) -> Result<Converted, ConversionErrors> {
    let mut errors = ConversionErrors::default();
    let mut converted = Converted {
        namespace: doc.namespace.clone(),
        ..Converted::default()
    };

    for (index, entity) in doc.entities.iter().enumerate() {
        let label = if entity.id.trim().is_empty() {
            errors.push(
                ConversionError::new("id", "must be set").in_entity(&format!("#{}", index + 1)),
            );
            continue;
        } else {
            entity.id.trim()
        };

        convert_monitors(doc, entity, label, &mut converted.monitors, &mut errors);
        convert_tests(doc, entity, label, &mut converted.tests, &mut errors);
    }

    if errors.is_empty() {
        log::debug!(
            "Converted namespace '{}': {} monitors, {} tests",
            converted.namespace,
            converted.monitors.len(),
            converted.tests.len()
        );
        Ok(converted)
    } else {
        Err(errors)
    }
}

// ============================================================================
// Monitors
// ============================================================================

fn convert_monitors(
    doc: &Document,
    entity: &EntityDef,
    label: &str,
    out: &mut Vec<MonitorDescriptor>,
    errors: &mut ConversionErrors,
) {
    let mut seen = HashSet::new();
    for def in &entity.monitors {
        let id = def
            .id
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(def.kind.as_str())
            .to_string();

        let mut local = Vec::new();
        if !seen.insert(id.clone()) {
            local.push(ConversionError::new("id", "must be unique within entity"));
        }

        let monitor = monitor_from_def(doc, entity, label, def, &id, &mut local);
        if local.is_empty() {
            if let Some(monitor) = monitor {
                out.push(monitor);
            }
        } else {
            for error in local {
                errors.push(error.in_entity(label).in_monitor(&id));
            }
        }
    }
}

fn monitor_from_def(
    doc: &Document,
    entity: &EntityDef,
    label: &str,
    def: &MonitorDef,
    id: &str,
    errors: &mut Vec<ConversionError>,
) -> Option<MonitorDescriptor> {
    let defaults = &doc.defaults;

    let kind = monitor_kind(def, errors);

    let severity = match def.severity.as_deref().or(defaults.severity.as_deref()) {
        None => Severity::Error,
        Some(raw) => match Severity::parse(raw) {
            Some(Severity::Info) | None => {
                errors.push(ConversionError::new(
                    "severity",
                    format!("invalid severity: {raw}"),
                ));
                Severity::Error
            }
            Some(severity) => severity,
        },
    };

    let mode = match def.mode.as_ref().or(defaults.mode.as_ref()) {
        Some(mode) => convert_mode(mode, errors),
        None => Mode::default(),
    };

    let schedule = monitor_schedule(def, defaults, errors);

    let segmentation = def
        .segmentation
        .as_ref()
        .and_then(|s| convert_segmentation(s, errors));

    let timezone = def
        .timezone
        .as_deref()
        .or(defaults.timezone.as_deref())
        .unwrap_or_default()
        .to_string();

    let time_partitioning = entity
        .time_partitioning_column
        .as_deref()
        .or(defaults.time_partitioning.as_deref())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from);

    let kind = kind?;
    Some(MonitorDescriptor {
        id: id.to_string(),
        name: def
            .name
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(id)
            .to_string(),
        namespace_id: doc.namespace.clone(),
        monitored_path: label.to_string(),
        kind,
        source: Source::Api,
        severity,
        mode,
        schedule,
        timezone,
        segmentation,
        filter: def
            .filter
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from),
        time_partitioning,
    })
}

fn monitor_kind(def: &MonitorDef, errors: &mut Vec<ConversionError>) -> Option<MonitorKind> {
    let non_empty = |value: &Option<String>| {
        value
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
    };

    match def.kind.as_str() {
        "volume" => Some(MonitorKind::Volume),
        "freshness" => match non_empty(&def.expression) {
            Some(expression) => Some(MonitorKind::Freshness { expression }),
            None => {
                errors.push(ConversionError::new(
                    "expression",
                    "expression is required for freshness monitors",
                ));
                None
            }
        },
        "custom_numeric" => match non_empty(&def.metric_aggregation) {
            Some(metric_aggregation) => Some(MonitorKind::CustomNumeric { metric_aggregation }),
            None => {
                errors.push(ConversionError::new(
                    "metric_aggregation",
                    "metric_aggregation is required for custom_numeric monitors",
                ));
                None
            }
        },
        "field_stats" => {
            if def.columns.is_empty() {
                errors.push(ConversionError::new(
                    "columns",
                    "columns are required for field_stats monitors",
                ));
                None
            } else {
                Some(MonitorKind::FieldStats {
                    fields: def.columns.clone(),
                })
            }
        }
        "" => {
            errors.push(ConversionError::new("type", "must be set"));
            None
        }
        other => {
            errors.push(ConversionError::new(
                "type",
                format!("unsupported monitor type: {other}"),
            ));
            None
        }
    }
}

fn convert_mode(def: &ModeDef, errors: &mut Vec<ConversionError>) -> Mode {
    if let Some(fixed) = &def.fixed_thresholds {
        return Mode::FixedThresholds {
            min: fixed.min,
            max: fixed.max,
        };
    }
    match &def.anomaly_engine {
        Some(engine) => match Sensitivity::parse(&engine.sensitivity) {
            Some(sensitivity) => Mode::AnomalyEngine { sensitivity },
            None => {
                errors.push(ConversionError::new(
                    "mode.anomaly_engine.sensitivity",
                    format!("invalid sensitivity: {}", engine.sensitivity),
                ));
                Mode::default()
            }
        },
        None => Mode::default(),
    }
}

fn convert_segmentation(
    def: &SegmentationDef,
    errors: &mut Vec<ConversionError>,
) -> Option<Segmentation> {
    let expression = def.expression.trim();
    if expression.is_empty() {
        errors.push(ConversionError::new(
            "segmentation.expression",
            "segmentation expression is required",
        ));
        return None;
    }
    if !def.include_values.is_empty() && !def.exclude_values.is_empty() {
        errors.push(ConversionError::new(
            "segmentation",
            "cannot use segmentation include_values and exclude_values simultaneously",
        ));
        return None;
    }

    Some(Segmentation {
        expression: expression.to_string(),
        include_values: (!def.include_values.is_empty()).then(|| def.include_values.clone()),
        exclude_values: (!def.exclude_values.is_empty()).then(|| def.exclude_values.clone()),
    })
}

// ============================================================================
// Schedules
// ============================================================================

fn monitor_schedule(
    def: &MonitorDef,
    defaults: &Defaults,
    errors: &mut Vec<ConversionError>,
) -> Schedule {
    if def.daily.is_some() && def.hourly.is_some() {
        errors.push(ConversionError::new(
            "daily/hourly",
            "daily and hourly schedules are mutually exclusive",
        ));
    }

    if let Some(daily) = &def.daily {
        daily_schedule(daily, errors)
    } else if let Some(hourly) = &def.hourly {
        hourly_schedule(hourly, errors)
    } else if let Some(daily) = &defaults.daily {
        daily_schedule(daily, errors)
    } else if let Some(hourly) = &defaults.hourly {
        hourly_schedule(hourly, errors)
    } else {
        Schedule::default()
    }
}

/// Offset in minutes and whether it only delays the run
fn schedule_offset(
    def: &ScheduleDef,
    period: &str,
    errors: &mut Vec<ConversionError>,
) -> (i64, bool) {
    if def.query_delay.is_some() && def.time_partitioning_shift.is_some() {
        let message = format!(
            "time_partitioning_shift and query_delay are mutually exclusive within {period} schedule"
        );
        errors.push(ConversionError::new(period, message));
    }
    match (def.query_delay, def.time_partitioning_shift) {
        (Some(delay), _) => (delay.minutes(), true),
        (None, Some(shift)) => (shift.minutes(), false),
        (None, None) => (0, false),
    }
}

/// Periods to leave out of each run; zero means none
fn ignore_last(
    def: &ScheduleDef,
    period: &str,
    errors: &mut Vec<ConversionError>,
) -> Option<i32> {
    match def.ignore_last {
        Some(n) if n < 0 => {
            errors.push(ConversionError::new(
                format!("{period}.ignore_last"),
                format!("must not be negative, got {n}"),
            ));
            None
        }
        Some(0) | None => None,
        Some(n) => Some(n),
    }
}

fn daily_schedule(def: &ScheduleDef, errors: &mut Vec<ConversionError>) -> Schedule {
    let (minutes, only_schedule_delay) = schedule_offset(def, "daily", errors);
    Schedule::Daily(DailySchedule {
        minutes_since_midnight: (minutes % 1440) as i32,
        delay_num_days: ignore_last(def, "daily", errors),
        only_schedule_delay,
    })
}

fn hourly_schedule(def: &ScheduleDef, errors: &mut Vec<ConversionError>) -> Schedule {
    let (minutes, only_schedule_delay) = schedule_offset(def, "hourly", errors);
    Schedule::Hourly(HourlySchedule {
        minute_of_hour: (minutes % 60) as i32,
        delay_num_hours: ignore_last(def, "hourly", errors),
        only_schedule_delay,
    })
}

// ============================================================================
// SQL Tests
// ============================================================================

fn sanitize_id_part(part: &str) -> String {
    part.replace(['.', '-'], "_")
}

/// `<type>_<columns>` for tests written without an id
fn default_test_id(def: &TestDef) -> String {
    let mut parts: Vec<String> = def.columns.iter().map(|c| sanitize_id_part(c)).collect();
    for single in [&def.column, &def.time_partition_column] {
        if let Some(column) = single.as_deref().filter(|c| !c.is_empty()) {
            parts.push(sanitize_id_part(column));
        }
    }
    if parts.is_empty() {
        def.kind.clone()
    } else {
        format!("{}_{}", def.kind, parts.join("_"))
    }
}

fn convert_tests(
    doc: &Document,
    entity: &EntityDef,
    label: &str,
    out: &mut Vec<TestDescriptor>,
    errors: &mut ConversionErrors,
) {
    let mut seen = HashSet::new();
    for def in &entity.tests {
        let id = def
            .id
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map_or_else(|| default_test_id(def), String::from);

        let mut local = Vec::new();
        if !seen.insert(id.clone()) {
            local.push(ConversionError::new("id", "must be unique within entity"));
        }

        let test = test_from_def(doc, label, def, &id, &mut local);
        if local.is_empty() {
            if let Some(test) = test {
                out.push(test);
            }
        } else {
            for error in local {
                errors.push(error.in_entity(label).in_test(&id));
            }
        }
    }
}

fn test_from_def(
    doc: &Document,
    label: &str,
    def: &TestDef,
    id: &str,
    errors: &mut Vec<ConversionError>,
) -> Option<TestDescriptor> {
    let variant = test_variant(def, errors);

    let severity = match def.severity.as_deref().or(doc.defaults.severity.as_deref()) {
        None => Severity::Error,
        Some(raw) => Severity::parse(raw).unwrap_or_else(|| {
            errors.push(ConversionError::new(
                "severity",
                format!("invalid severity: {raw}"),
            ));
            Severity::Error
        }),
    };

    let schedule = match (&def.daily, &def.hourly) {
        (Some(_), Some(_)) => {
            errors.push(ConversionError::new(
                "daily/hourly",
                "daily and hourly schedules are mutually exclusive",
            ));
            None
        }
        (Some(daily), None) => Some(daily_schedule(daily, errors)),
        (None, Some(hourly)) => Some(hourly_schedule(hourly, errors)),
        (None, None) => None,
    };

    let variant = variant?;
    Some(TestDescriptor {
        id: id.to_string(),
        name: def
            .name
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(id)
            .to_string(),
        description: def.description.clone().filter(|d| !d.trim().is_empty()),
        namespace_id: doc.namespace.clone(),
        monitored_path: label.to_string(),
        variant,
        severity,
        schedule,
    })
}

fn test_variant(def: &TestDef, errors: &mut Vec<ConversionError>) -> Option<TestVariant> {
    let kind = def.kind.as_str();
    let mut missing = |field: &str, message: String| {
        errors.push(ConversionError::new(field, message));
    };

    let text = |value: &Option<String>| {
        value
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
    };

    match kind {
        "not_null" | "empty" | "unique" => {
            if def.columns.is_empty() {
                missing("columns", format!("columns are required for {kind} tests"));
                return None;
            }
            let columns = def.columns.clone();
            Some(match kind {
                "not_null" => TestVariant::NotNull { columns },
                "empty" => TestVariant::Empty { columns },
                _ => TestVariant::Unique {
                    columns,
                    time_partition_column: text(&def.time_partition_column),
                    time_window_seconds: def.time_partition_seconds,
                },
            })
        }
        "accepted_values" | "rejected_values" => {
            let column = text(&def.column);
            if column.is_none() {
                missing("column", format!("column is required for {kind} tests"));
            }
            if def.values.is_empty() {
                missing("values", format!("values are required for {kind} tests"));
            }
            let column = column?;
            if def.values.is_empty() {
                return None;
            }
            let values = def.values.clone();
            Some(if kind == "accepted_values" {
                TestVariant::AcceptedValues { column, values }
            } else {
                TestVariant::RejectedValues { column, values }
            })
        }
        "min_max" => {
            let column = text(&def.column);
            if column.is_none() {
                missing("column", "column is required for min_max tests".to_string());
            }
            if def.min_value.is_none() && def.max_value.is_none() {
                missing(
                    "min_value/max_value",
                    "at least one of min_value or max_value is required for min_max tests"
                        .to_string(),
                );
                return None;
            }
            Some(TestVariant::MinMax {
                column: column?,
                min_value: def.min_value,
                max_value: def.max_value,
            })
        }
        "min_value" | "max_value" => {
            let column = text(&def.column);
            if column.is_none() {
                missing("column", format!("column is required for {kind} tests"));
            }
            let bound = if kind == "min_value" {
                def.min_value
            } else {
                def.max_value
            };
            if bound.is_none() {
                missing(kind, format!("{kind} is required for {kind} tests"));
            }
            let (column, bound) = (column?, bound?);
            Some(if kind == "min_value" {
                TestVariant::MinValue {
                    column,
                    min_value: bound,
                }
            } else {
                TestVariant::MaxValue {
                    column,
                    max_value: bound,
                }
            })
        }
        "freshness" => {
            let column = text(&def.time_partition_column);
            if column.is_none() {
                missing(
                    "time_partition_column",
                    "time_partition_column is required for freshness tests".to_string(),
                );
            }
            if def.time_partition_seconds.is_none() {
                missing(
                    "time_partition_seconds",
                    "time_partition_seconds is required for freshness tests".to_string(),
                );
            }
            Some(TestVariant::Freshness {
                time_partition_column: column?,
                time_window_seconds: def.time_partition_seconds?,
            })
        }
        "relative_time" => {
            let column = text(&def.column);
            let relative = text(&def.relative_column);
            if column.is_none() {
                missing(
                    "column",
                    "column is required for relative_time tests".to_string(),
                );
            }
            if relative.is_none() {
                missing(
                    "relative_column",
                    "relative_column is required for relative_time tests".to_string(),
                );
            }
            Some(TestVariant::RelativeTime {
                column: column?,
                relative_column: relative?,
            })
        }
        "business_rule" => match text(&def.sql_expression) {
            Some(sql_expression) => Some(TestVariant::BusinessRule { sql_expression }),
            None => {
                missing(
                    "sql_expression",
                    "sql_expression is required for business_rule tests".to_string(),
                );
                None
            }
        },
        "" => {
            missing("type", "must be set".to_string());
            None
        }
        other => {
            missing("type", format!("unsupported test type: {other}"));
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::parse_document;

    fn convert_yaml(yaml: &str) -> Result<Converted, ConversionErrors> {
        convert(&parse_document(yaml).unwrap())
    }

    #[test]
    fn test_monitor_defaults() {
        let converted = convert_yaml(
            r"
version: v1beta2
namespace: sales
entities:
  - id: warehouse.sales.orders
    monitors:
      - type: volume
",
        )
        .unwrap();

        assert_eq!(converted.namespace, "sales");
        let monitor = &converted.monitors[0];
        assert_eq!(monitor.id, "volume");
        assert_eq!(monitor.name, "volume");
        assert_eq!(monitor.namespace_id, "sales");
        assert_eq!(monitor.monitored_path, "warehouse.sales.orders");
        assert_eq!(monitor.severity, Severity::Error);
        assert_eq!(monitor.mode, Mode::default());
        assert_eq!(monitor.schedule, Schedule::default());
        assert!(monitor.time_partitioning.is_none());
    }

    #[test]
    fn test_document_defaults_apply() {
        let converted = convert_yaml(
            r"
version: v1beta2
namespace: sales
defaults:
  severity: WARN
  time_partitioning: updated_at
  timezone: Europe/Berlin
  hourly:
    time_partitioning_shift: 75m
    ignore_last: 2
  mode:
    anomaly_engine:
      sensitivity: relaxed
entities:
  - id: db.orders
    monitors:
      - id: fresh
        type: freshness
        expression: max(updated_at)
",
        )
        .unwrap();

        let monitor = &converted.monitors[0];
        assert_eq!(monitor.severity, Severity::Warning);
        assert_eq!(monitor.timezone, "Europe/Berlin");
        assert_eq!(monitor.time_partitioning.as_deref(), Some("updated_at"));
        assert_eq!(
            monitor.mode,
            Mode::AnomalyEngine {
                sensitivity: Sensitivity::Relaxed
            }
        );
        assert_eq!(
            monitor.schedule,
            Schedule::Hourly(HourlySchedule {
                minute_of_hour: 15,
                delay_num_hours: Some(2),
                only_schedule_delay: false,
            })
        );
    }

    #[test]
    fn test_negative_ignore_last_is_rejected() {
        let errors = convert_yaml(
            r"
version: v1beta2
namespace: sales
entities:
  - id: db.orders
    monitors:
      - id: rows
        type: volume
        daily:
          ignore_last: -1
",
        )
        .unwrap_err();

        assert_eq!(
            errors.to_string(),
            "Entity 'db.orders', Monitor 'rows': daily.ignore_last - must not be negative, got -1"
        );
    }

    #[test]
    fn test_monitor_schedule_overrides_defaults() {
        let converted = convert_yaml(
            r"
version: v1beta2
namespace: sales
defaults:
  hourly:
    query_delay: 10m
entities:
  - id: db.orders
    time_partitioning_column: created_at
    monitors:
      - type: volume
        daily:
          query_delay: 26h
",
        )
        .unwrap();

        let monitor = &converted.monitors[0];
        assert_eq!(
            monitor.schedule,
            Schedule::Daily(DailySchedule {
                minutes_since_midnight: 120,
                delay_num_days: None,
                only_schedule_delay: true,
            })
        );
        assert_eq!(monitor.time_partitioning.as_deref(), Some("created_at"));
    }

    #[test]
    fn test_fixed_thresholds_win_over_anomaly_engine() {
        let converted = convert_yaml(
            r"
version: v1beta2
namespace: ns
entities:
  - id: db.orders
    monitors:
      - type: custom_numeric
        metric_aggregation: sum(amount)
        mode:
          anomaly_engine:
            sensitivity: PRECISE
          fixed_thresholds:
            min: 0
            max: 100
",
        )
        .unwrap();
        assert_eq!(
            converted.monitors[0].mode,
            Mode::FixedThresholds {
                min: Some(0.0),
                max: Some(100.0)
            }
        );
    }

    #[test]
    fn test_errors_are_collected() {
        let errors = convert_yaml(
            r"
version: v1beta2
namespace: ns
entities:
  - id: db.orders
    monitors:
      - id: a
        type: freshness
      - id: b
        type: field_stats
        severity: LOUD
      - id: c
        type: volume
        segmentation:
          expression: country
          include_values: [US]
          exclude_values: [DE]
      - id: c
        type: volume
  - monitors:
      - type: volume
",
        )
        .unwrap_err();

        let rendered = errors.to_string();
        assert!(rendered.starts_with("Multiple conversion errors:"));
        assert!(rendered.contains(
            "Entity 'db.orders', Monitor 'a': expression - expression is required for freshness monitors"
        ));
        assert!(rendered.contains("columns are required for field_stats monitors"));
        assert!(rendered.contains("invalid severity: LOUD"));
        assert!(rendered.contains("cannot use segmentation include_values and exclude_values"));
        assert!(rendered.contains("Monitor 'c': id - must be unique within entity"));
        assert!(rendered.contains("Entity '#2': id - must be set"));
        assert_eq!(errors.0.len(), 6);
    }

    #[test]
    fn test_invalid_sensitivity() {
        let errors = convert_yaml(
            r"
version: v1beta2
namespace: ns
defaults:
  mode:
    anomaly_engine:
      sensitivity: paranoid
entities:
  - id: db.orders
    monitors:
      - type: volume
",
        )
        .unwrap_err();
        assert!(
            errors.0[0].to_string().contains(
                "mode.anomaly_engine.sensitivity - invalid sensitivity: paranoid"
            )
        );
    }

    #[test]
    fn test_unsupported_monitor_type() {
        let errors = convert_yaml(
            "version: v1beta2\nnamespace: ns\nentities:\n  - id: t\n    monitors:\n      - type: latency\n",
        )
        .unwrap_err();
        assert!(errors.to_string().contains("unsupported monitor type: latency"));
    }

    #[test]
    fn test_tests_default_ids_and_variants() {
        let converted = convert_yaml(
            r"
version: v1beta2
namespace: sales
defaults:
  severity: WARNING
entities:
  - id: db.orders
    tests:
      - type: not_null
        columns: [order.id, customer-id]
      - type: accepted_values
        column: status
        values: [open, closed]
        severity: INFO
      - type: min_max
        column: amount
        min_value: 0
      - type: freshness
        time_partition_column: created_at
        time_partition_seconds: 3600
        daily:
          time_partitioning_shift: 30m
      - id: positive_total
        type: business_rule
        sql_expression: total > 0
        description: totals are positive
",
        )
        .unwrap();

        let ids: Vec<&str> = converted.tests.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(
            ids,
            vec![
                "not_null_order_id_customer_id",
                "accepted_values_status",
                "min_max_amount",
                "freshness_created_at",
                "positive_total",
            ]
        );

        assert_eq!(converted.tests[0].severity, Severity::Warning);
        assert_eq!(converted.tests[1].severity, Severity::Info);
        assert!(converted.tests[0].schedule.is_none());
        assert_eq!(
            converted.tests[3].schedule,
            Some(Schedule::Daily(DailySchedule {
                minutes_since_midnight: 30,
                delay_num_days: None,
                only_schedule_delay: false,
            }))
        );
        assert_eq!(
            converted.tests[2].variant,
            TestVariant::MinMax {
                column: "amount".to_string(),
                min_value: Some(0.0),
                max_value: None,
            }
        );
        assert_eq!(
            converted.tests[4].description.as_deref(),
            Some("totals are positive")
        );
        assert_eq!(converted.tests[4].namespace_id, "sales");
    }

    #[test]
    fn test_test_validation_messages() {
        let errors = convert_yaml(
            r"
version: v1beta2
namespace: ns
entities:
  - id: db.orders
    tests:
      - type: unique
      - id: range
        type: min_max
        column: amount
      - id: fresh
        type: freshness
        time_partition_column: created_at
      - id: rel
        type: relative_time
        column: shipped_at
      - id: rule
        type: business_rule
      - id: odd
        type: histogram
      - id: sched
        type: not_null
        columns: [id]
        daily: {}
        hourly: {}
",
        )
        .unwrap_err();

        let rendered = errors.to_string();
        assert!(rendered.contains("Test 'unique': columns - columns are required for unique tests"));
        assert!(rendered.contains(
            "min_value/max_value - at least one of min_value or max_value is required for min_max tests"
        ));
        assert!(rendered.contains("time_partition_seconds is required for freshness tests"));
        assert!(rendered.contains("relative_column is required for relative_time tests"));
        assert!(rendered.contains("sql_expression is required for business_rule tests"));
        assert!(rendered.contains("unsupported test type: histogram"));
        assert!(rendered.contains("daily and hourly schedules are mutually exclusive"));
    }

    #[test]
    fn test_query_delay_and_shift_exclusive() {
        let errors = convert_yaml(
            r"
version: v1beta2
namespace: ns
entities:
  - id: db.orders
    monitors:
      - type: volume
        daily:
          query_delay: 1h
          time_partitioning_shift: 2h
",
        )
        .unwrap_err();
        assert!(errors.to_string().contains(
            "time_partitioning_shift and query_delay are mutually exclusive within daily schedule"
        ));
    }
}
