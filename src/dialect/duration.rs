//! Durations written like `2h30m`, `45m` or `90s`

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::sync::LazyLock;

static COMPONENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d+(?:\.\d+)?)(h|m|s)").expect("duration pattern is a valid regex")
});

/// A non-negative duration with second precision
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Duration {
    seconds: i64,
}

impl Duration {
    pub const fn from_minutes(minutes: i64) -> Self {
        Self {
            seconds: minutes * 60,
        }
    }

    pub const fn seconds(self) -> i64 {
        self.seconds
    }

    /// Whole minutes, rounded down
    pub const fn minutes(self) -> i64 {
        self.seconds / 60
    }

    /// Parse `1h`, `2h30m`, `45m`, `90s`, `1.5h` or a bare `0`.
    pub fn parse(input: &str) -> Result<Self, String> {
        let text = input.trim();
        if text == "0" {
            return Ok(Self::default());
        }
        if text.is_empty() {
            return Err("empty duration".to_string());
        }

        let mut consumed = 0;
        let mut seconds = 0.0_f64;
        for caps in COMPONENT.captures_iter(text) {
            let whole = caps.get(0).map_or(0..0, |m| m.range());
            if whole.start != consumed {
                return Err(format!("invalid duration '{input}'"));
            }
            consumed = whole.end;

            let value: f64 = caps[1]
                .parse()
                .map_err(|_| format!("invalid number in duration '{input}'"))?;
            let unit = match &caps[2] {
                "h" => 3600.0,
                "m" => 60.0,
                _ => 1.0,
            };
            seconds += value * unit;
        }
        if consumed != text.len() {
            return Err(format!(
                "invalid duration '{input}', expected e.g. 2h30m, 45m or 90s"
            ));
        }

        #[allow(clippy::cast_possible_truncation)]
        Ok(Self {
            seconds: seconds.round() as i64,
        })
    }
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hours = self.seconds / 3600;
        let minutes = (self.seconds % 3600) / 60;
        let seconds = self.seconds % 60;
        if self.seconds == 0 {
            return write!(f, "0m");
        }
        if hours > 0 {
            write!(f, "{hours}h")?;
        }
        if minutes > 0 {
            write!(f, "{minutes}m")?;
        }
        if seconds > 0 {
            write!(f, "{seconds}s")?;
        }
        Ok(())
    }
}

impl Serialize for Duration {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Duration {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Self::parse(&text).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_components() {
        assert_eq!(Duration::parse("2h30m").unwrap().minutes(), 150);
        assert_eq!(Duration::parse("45m").unwrap().minutes(), 45);
        assert_eq!(Duration::parse("90s").unwrap().seconds(), 90);
        assert_eq!(Duration::parse("1h0m0s").unwrap().minutes(), 60);
        assert_eq!(Duration::parse("1.5h").unwrap().minutes(), 90);
        assert_eq!(Duration::parse("0").unwrap().seconds(), 0);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(Duration::parse("").is_err());
        assert!(Duration::parse("10").is_err());
        assert!(Duration::parse("2 hours").is_err());
        assert!(Duration::parse("x1h").is_err());
        assert!(Duration::parse("1h-").is_err());
        assert!(Duration::parse("1d").is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(Duration::from_minutes(150).to_string(), "2h30m");
        assert_eq!(Duration::from_minutes(45).to_string(), "45m");
        assert_eq!(Duration::from_minutes(60).to_string(), "1h");
        assert_eq!(Duration::default().to_string(), "0m");
        assert_eq!(Duration::parse("90s").unwrap().to_string(), "1m30s");
    }

    #[test]
    fn test_serde() {
        let parsed: Duration = serde_yaml::from_str("\"2h30m\"").unwrap();
        assert_eq!(parsed.minutes(), 150);
        let written = serde_yaml::to_string(&parsed).unwrap();
        assert_eq!(written.trim(), "2h30m");
    }
}
