// Mapper from provider JSON records to domain models
use crate::domain::appointment::{Appointment, AppointmentStatus};
use crate::domain::vital::{AlertLevel, VitalReading};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::BTreeMap;

#[derive(Debug, Deserialize)]
pub struct AppointmentRecord {
    pub id: String,
    #[serde(default)]
    pub scheduled_at: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct VitalRecord {
    pub id: String,
    #[serde(default)]
    pub recorded_at: Option<String>,
    #[serde(default)]
    pub alert_level: Option<String>,
    #[serde(default)]
    pub measurements: BTreeMap<String, f64>,
}

pub fn appointment_from_record(record: AppointmentRecord) -> Appointment {
    let scheduled_at = parse_timestamp(record.scheduled_at.as_deref(), &record.id);
    let status = AppointmentStatus::parse(record.status.as_deref().unwrap_or_default());
    Appointment::new(record.id, scheduled_at, status)
}

pub fn vital_from_record(record: VitalRecord) -> VitalReading {
    let recorded_at = parse_timestamp(record.recorded_at.as_deref(), &record.id);
    let alert_level = AlertLevel::parse(record.alert_level.as_deref().unwrap_or_default());
    VitalReading::new(record.id, recorded_at, alert_level, record.measurements)
}

fn parse_timestamp(raw: Option<&str>, record_id: &str) -> Option<DateTime<Utc>> {
    let raw = raw?;
    match DateTime::parse_from_rfc3339(raw) {
        Ok(ts) => Some(ts.with_timezone(&Utc)),
        Err(e) => {
            tracing::warn!("Unparseable timestamp {:?} on record {}: {}", raw, record_id, e);
            None
        }
    }
}
