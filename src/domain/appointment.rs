// Appointment domain model
use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};

#[derive(Debug, Clone, PartialEq)]
pub enum AppointmentStatus {
    Scheduled,
    Cancelled,
    Other(String),
}

impl AppointmentStatus {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "Scheduled" => AppointmentStatus::Scheduled,
            "Cancelled" => AppointmentStatus::Cancelled,
            other => AppointmentStatus::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            AppointmentStatus::Scheduled => "Scheduled",
            AppointmentStatus::Cancelled => "Cancelled",
            AppointmentStatus::Other(other) => other,
        }
    }
}

impl Serialize for AppointmentStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Appointment {
    pub id: String,
    /// `None` when the provider sent a date-time that could not be parsed.
    pub scheduled_at: Option<DateTime<Utc>>,
    pub status: AppointmentStatus,
}

impl Appointment {
    pub fn new(id: String, scheduled_at: Option<DateTime<Utc>>, status: AppointmentStatus) -> Self {
        Self {
            id,
            scheduled_at,
            status,
        }
    }

    /// Strictly after `now` and not cancelled.
    pub fn is_upcoming(&self, now: DateTime<Utc>) -> bool {
        match self.scheduled_at {
            Some(at) => at > now && self.status != AppointmentStatus::Cancelled,
            None => false,
        }
    }
}
