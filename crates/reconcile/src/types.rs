//! Descriptor types for monitors and SQL tests
//!
//! These are the canonical, field-keyed representations that both sides of a
//! reconciliation are expressed in. Desired descriptors come from parsed YAML,
//! actual descriptors come from the remote service.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Who manages an entity on the remote side
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Source {
    /// Managed through this tool (or any other API client)
    #[default]
    Api,
    /// Created and edited in the web application
    App,
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Api => write!(f, "API"),
            Self::App => write!(f, "APP"),
        }
    }
}

/// Alert severity
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    /// Informational only (SQL tests)
    Info,
    Warning,
    #[default]
    Error,
}

impl Severity {
    /// Parse a severity as written in YAML. `WARN` is accepted as an alias.
    ///
    /// The empty string maps to the default (`ERROR`).
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "INFO" => Some(Self::Info),
            "WARNING" | "WARN" => Some(Self::Warning),
            "ERROR" | "" => Some(Self::Error),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "INFO",
            Self::Warning => "WARNING",
            Self::Error => "ERROR",
        }
    }
}

/// Anomaly engine sensitivity
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Sensitivity {
    Precise,
    #[default]
    Balanced,
    Relaxed,
}

impl Sensitivity {
    /// Parse a sensitivity string; empty means the default (`BALANCED`)
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "PRECISE" => Some(Self::Precise),
            "BALANCED" | "" => Some(Self::Balanced),
            "RELAXED" => Some(Self::Relaxed),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Precise => "PRECISE",
            Self::Balanced => "BALANCED",
            Self::Relaxed => "RELAXED",
        }
    }
}

/// How a monitor decides that a value is anomalous
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    AnomalyEngine {
        sensitivity: Sensitivity,
    },
    FixedThresholds {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max: Option<f64>,
    },
}

impl Default for Mode {
    fn default() -> Self {
        Self::AnomalyEngine {
            sensitivity: Sensitivity::Balanced,
        }
    }
}

/// Daily schedule, anchored at a minute of the day
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailySchedule {
    pub minutes_since_midnight: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delay_num_days: Option<i32>,
    /// `true` when the offset only delays the run instead of shifting the partition
    #[serde(default)]
    pub only_schedule_delay: bool,
}

/// Hourly schedule, anchored at a minute of the hour
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HourlySchedule {
    pub minute_of_hour: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delay_num_hours: Option<i32>,
    #[serde(default)]
    pub only_schedule_delay: bool,
}

/// When a monitor (or test) runs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Schedule {
    Daily(DailySchedule),
    Hourly(HourlySchedule),
}

impl Default for Schedule {
    fn default() -> Self {
        Self::Daily(DailySchedule::default())
    }
}

impl Schedule {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Daily(_) => "daily",
            Self::Hourly(_) => "hourly",
        }
    }

    /// Minute offset within the period (day or hour)
    pub fn offset_minutes(&self) -> i32 {
        match self {
            Self::Daily(d) => d.minutes_since_midnight,
            Self::Hourly(h) => h.minute_of_hour,
        }
    }

    /// Number of trailing periods ignored
    pub fn delay_count(&self) -> Option<i32> {
        match self {
            Self::Daily(d) => d.delay_num_days,
            Self::Hourly(h) => h.delay_num_hours,
        }
    }

    pub fn only_schedule_delay(&self) -> bool {
        match self {
            Self::Daily(d) => d.only_schedule_delay,
            Self::Hourly(h) => h.only_schedule_delay,
        }
    }
}

/// Splits a monitor into one series per distinct value of an expression
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segmentation {
    pub expression: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include_values: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude_values: Option<Vec<String>>,
}

/// What a monitor measures
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MonitorKind {
    Volume,
    Freshness { expression: String },
    CustomNumeric { metric_aggregation: String },
    FieldStats { fields: Vec<String> },
}

impl MonitorKind {
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Volume => "volume",
            Self::Freshness { .. } => "freshness",
            Self::CustomNumeric { .. } => "custom_numeric",
            Self::FieldStats { .. } => "field_stats",
        }
    }

    pub fn metric_aggregation(&self) -> Option<&str> {
        match self {
            Self::CustomNumeric { metric_aggregation } => Some(metric_aggregation),
            _ => None,
        }
    }
}

/// A single monitor definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonitorDescriptor {
    pub id: String,
    pub name: String,
    /// Owning namespace; empty for the global namespace
    #[serde(default)]
    pub namespace_id: String,
    pub monitored_path: String,
    pub kind: MonitorKind,
    #[serde(default)]
    pub source: Source,
    #[serde(default)]
    pub severity: Severity,
    #[serde(default)]
    pub mode: Mode,
    #[serde(default)]
    pub schedule: Schedule,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub timezone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub segmentation: Option<Segmentation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_partitioning: Option<String>,
}

impl MonitorDescriptor {
    /// A volume monitor on `path` with every optional field at its default
    pub fn new(
        id: impl Into<String>,
        namespace_id: impl Into<String>,
        path: impl Into<String>,
    ) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            namespace_id: namespace_id.into(),
            monitored_path: path.into(),
            kind: MonitorKind::Volume,
            source: Source::Api,
            severity: Severity::Error,
            mode: Mode::default(),
            schedule: Schedule::default(),
            timezone: String::new(),
            segmentation: None,
            filter: None,
            time_partitioning: None,
        }
    }

    pub fn segmentation_expression(&self) -> Option<&str> {
        self.segmentation.as_ref().map(|s| s.expression.as_str())
    }
}

/// The check a SQL test performs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestVariant {
    NotNull {
        columns: Vec<String>,
    },
    Empty {
        columns: Vec<String>,
    },
    Unique {
        columns: Vec<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        time_partition_column: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        time_window_seconds: Option<i64>,
    },
    AcceptedValues {
        column: String,
        values: Vec<String>,
    },
    RejectedValues {
        column: String,
        values: Vec<String>,
    },
    MinMax {
        column: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min_value: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max_value: Option<f64>,
    },
    MinValue {
        column: String,
        min_value: f64,
    },
    MaxValue {
        column: String,
        max_value: f64,
    },
    Freshness {
        time_partition_column: String,
        time_window_seconds: i64,
    },
    RelativeTime {
        column: String,
        relative_column: String,
    },
    BusinessRule {
        sql_expression: String,
    },
}

impl TestVariant {
    /// Stable discriminant used in YAML and in derived test identities
    pub fn discriminant(&self) -> &'static str {
        match self {
            Self::NotNull { .. } => "not_null",
            Self::Empty { .. } => "empty",
            Self::Unique { .. } => "unique",
            Self::AcceptedValues { .. } => "accepted_values",
            Self::RejectedValues { .. } => "rejected_values",
            Self::MinMax { .. } => "min_max",
            Self::MinValue { .. } => "min_value",
            Self::MaxValue { .. } => "max_value",
            Self::Freshness { .. } => "freshness",
            Self::RelativeTime { .. } => "relative_time",
            Self::BusinessRule { .. } => "business_rule",
        }
    }

    /// Columns the test touches, in declaration order
    pub fn columns(&self) -> Vec<&str> {
        match self {
            Self::NotNull { columns } | Self::Empty { columns } | Self::Unique { columns, .. } => {
                columns.iter().map(String::as_str).collect()
            }
            Self::AcceptedValues { column, .. }
            | Self::RejectedValues { column, .. }
            | Self::MinMax { column, .. }
            | Self::MinValue { column, .. }
            | Self::MaxValue { column, .. }
            | Self::RelativeTime { column, .. } => vec![column.as_str()],
            Self::Freshness {
                time_partition_column,
                ..
            } => vec![time_partition_column.as_str()],
            Self::BusinessRule { .. } => Vec::new(),
        }
    }
}

/// A single SQL test definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestDescriptor {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Only used to scope deletion
    #[serde(default)]
    pub namespace_id: String,
    pub monitored_path: String,
    pub variant: TestVariant,
    #[serde(default)]
    pub severity: Severity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule: Option<Schedule>,
}
