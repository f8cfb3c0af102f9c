// Vital sign readings and their alert levels
use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq)]
pub enum AlertLevel {
    Critical,
    Warning,
    Normal,
    Other(String),
}

/// How prominently a reading should be shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertEmphasis {
    Error,
    Warning,
    Success,
    Plain,
}

impl AlertLevel {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "Critical" => AlertLevel::Critical,
            "Warning" => AlertLevel::Warning,
            "Normal" => AlertLevel::Normal,
            other => AlertLevel::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            AlertLevel::Critical => "Critical",
            AlertLevel::Warning => "Warning",
            AlertLevel::Normal => "Normal",
            AlertLevel::Other(other) => other,
        }
    }

    pub fn emphasis(&self) -> AlertEmphasis {
        match self {
            AlertLevel::Critical => AlertEmphasis::Error,
            AlertLevel::Warning => AlertEmphasis::Warning,
            AlertLevel::Normal => AlertEmphasis::Success,
            AlertLevel::Other(_) => AlertEmphasis::Plain,
        }
    }

    /// Critical and Warning readings are rendered bold.
    pub fn is_bold(&self) -> bool {
        matches!(self, AlertLevel::Critical | AlertLevel::Warning)
    }
}

impl Serialize for AlertLevel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VitalReading {
    pub id: String,
    pub recorded_at: Option<DateTime<Utc>>,
    pub alert_level: AlertLevel,
    pub measurements: BTreeMap<String, f64>,
}

impl VitalReading {
    pub fn new(
        id: String,
        recorded_at: Option<DateTime<Utc>>,
        alert_level: AlertLevel,
        measurements: BTreeMap<String, f64>,
    ) -> Self {
        Self {
            id,
            recorded_at,
            alert_level,
            measurements,
        }
    }
}
