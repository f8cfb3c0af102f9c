// Provider traits for the remote clinical data sources
use crate::domain::appointment::Appointment;
use crate::domain::patient::PatientId;
use crate::domain::vital::VitalReading;
use async_trait::async_trait;
use std::sync::Arc;

/// Number of vitals requested per fetch; the dashboard shows a subset.
pub const DEFAULT_VITALS_LIMIT: usize = 10;

#[async_trait]
pub trait AppointmentProvider: Send + Sync {
    /// All appointments for a patient, in the provider's order. May be empty.
    async fn patient_appointments(&self, patient: &PatientId) -> anyhow::Result<Vec<Appointment>>;
}

#[async_trait]
pub trait VitalsProvider: Send + Sync {
    /// At most `limit` readings, most recent first.
    async fn patient_vitals(&self, patient: &PatientId, limit: usize) -> anyhow::Result<Vec<VitalReading>>;
}

/// One keyed query a source binding re-runs on every fetch.
#[async_trait]
pub trait SourceQuery<T>: Send + Sync {
    async fn fetch(&self, patient: &PatientId) -> anyhow::Result<Vec<T>>;
}

pub struct AppointmentsQuery {
    provider: Arc<dyn AppointmentProvider>,
}

impl AppointmentsQuery {
    pub fn new(provider: Arc<dyn AppointmentProvider>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl SourceQuery<Appointment> for AppointmentsQuery {
    async fn fetch(&self, patient: &PatientId) -> anyhow::Result<Vec<Appointment>> {
        self.provider.patient_appointments(patient).await
    }
}

pub struct VitalsQuery {
    provider: Arc<dyn VitalsProvider>,
    limit: usize,
}

impl VitalsQuery {
    pub fn new(provider: Arc<dyn VitalsProvider>, limit: usize) -> Self {
        Self { provider, limit }
    }
}

#[async_trait]
impl SourceQuery<VitalReading> for VitalsQuery {
    async fn fetch(&self, patient: &PatientId) -> anyhow::Result<Vec<VitalReading>> {
        self.provider.patient_vitals(patient, self.limit).await
    }
}
