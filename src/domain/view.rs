// View projection - display-ready subsets recomputed from state on every read
use super::appointment::Appointment;
use super::dashboard::{DashboardPhase, DashboardState};
use super::patient::PatientId;
use super::source::{SourceError, SourceKind};
use super::vital::{AlertEmphasis, VitalReading};
use chrono::{DateTime, Local, TimeZone, Utc};
use serde::Serialize;

pub const UPCOMING_APPOINTMENTS_LIMIT: usize = 5;
pub const RECENT_VITALS_LIMIT: usize = 5;

const DISPLAY_FORMAT: &str = "%-m/%-d/%Y, %-I:%M:%S %p";

/// Upcoming, non-cancelled appointments in provider order, capped. No re-sort.
pub fn upcoming_appointments(appointments: &[Appointment], now: DateTime<Utc>) -> Vec<&Appointment> {
    appointments
        .iter()
        .filter(|apt| apt.is_upcoming(now))
        .take(UPCOMING_APPOINTMENTS_LIMIT)
        .collect()
}

/// Vitals arrive most-recent-first, so the head of the list is the recent window.
pub fn recent_vitals(vitals: &[VitalReading]) -> &[VitalReading] {
    &vitals[..vitals.len().min(RECENT_VITALS_LIMIT)]
}

pub fn latest_vital(vitals: &[VitalReading]) -> Option<&VitalReading> {
    vitals.first()
}

/// Timestamp in server-local time, or an empty string when there is none.
pub fn format_timestamp(ts: Option<DateTime<Utc>>) -> String {
    format_timestamp_in(ts, &Local)
}

pub fn format_timestamp_in<Tz: TimeZone>(ts: Option<DateTime<Utc>>, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    ts.map(|ts| ts.with_timezone(tz).format(DISPLAY_FORMAT).to_string())
        .unwrap_or_default()
}

#[derive(Debug, Clone, Serialize)]
pub struct AppointmentView {
    #[serde(flatten)]
    pub appointment: Appointment,
    pub scheduled_display: String,
}

impl From<&Appointment> for AppointmentView {
    fn from(appointment: &Appointment) -> Self {
        Self {
            scheduled_display: format_timestamp(appointment.scheduled_at),
            appointment: appointment.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct VitalView {
    #[serde(flatten)]
    pub reading: VitalReading,
    pub recorded_display: String,
    pub emphasis: AlertEmphasis,
    pub bold: bool,
}

impl From<&VitalReading> for VitalView {
    fn from(reading: &VitalReading) -> Self {
        Self {
            recorded_display: format_timestamp(reading.recorded_at),
            emphasis: reading.alert_level.emphasis(),
            bold: reading.alert_level.is_bold(),
            reading: reading.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SourceErrorView {
    pub source: SourceKind,
    pub message: String,
}

impl From<&SourceError> for SourceErrorView {
    fn from(error: &SourceError) -> Self {
        Self {
            source: error.kind(),
            message: error.to_string(),
        }
    }
}

/// Snapshot of everything the dashboard renders.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardView {
    pub patient_id: Option<PatientId>,
    pub phase: DashboardPhase,
    pub loading: bool,
    pub version: u64,
    pub upcoming_appointments: Vec<AppointmentView>,
    pub recent_vitals: Vec<VitalView>,
    pub latest_vital: Option<VitalView>,
    pub has_upcoming_appointments: bool,
    pub has_recent_vitals: bool,
    pub has_latest_vital: bool,
    pub errors: Vec<SourceErrorView>,
    pub last_error: Option<SourceErrorView>,
}

impl DashboardView {
    pub fn project(state: &DashboardState, now: DateTime<Utc>) -> Self {
        let upcoming: Vec<AppointmentView> = upcoming_appointments(state.appointments(), now)
            .into_iter()
            .map(AppointmentView::from)
            .collect();
        let recent: Vec<VitalView> = recent_vitals(state.vitals()).iter().map(VitalView::from).collect();
        let latest = latest_vital(state.vitals()).map(VitalView::from);

        let errors = [SourceKind::Appointments, SourceKind::Vitals]
            .into_iter()
            .filter_map(|kind| state.error(kind))
            .map(SourceErrorView::from)
            .collect();

        Self {
            patient_id: state.patient().cloned(),
            phase: state.phase(),
            loading: state.is_loading(),
            version: state.version(),
            has_upcoming_appointments: !upcoming.is_empty(),
            has_recent_vitals: !recent.is_empty(),
            has_latest_vital: latest.is_some(),
            upcoming_appointments: upcoming,
            recent_vitals: recent,
            latest_vital: latest,
            errors,
            last_error: state.last_error().map(SourceErrorView::from),
        }
    }
}
