// Dashboard domain model - aggregate state of both clinical sources
use super::appointment::Appointment;
use super::patient::PatientId;
use super::source::{SourceError, SourceKind, SourceResult};
use super::vital::VitalReading;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DashboardPhase {
    Initializing,
    Ready,
    Refreshing,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct SettleFlags {
    appointments: bool,
    vitals: bool,
}

impl SettleFlags {
    fn mark(&mut self, kind: SourceKind) {
        match kind {
            SourceKind::Appointments => self.appointments = true,
            SourceKind::Vitals => self.vitals = true,
        }
    }

    fn get(&self, kind: SourceKind) -> bool {
        match kind {
            SourceKind::Appointments => self.appointments,
            SourceKind::Vitals => self.vitals,
        }
    }

    fn all(&self) -> bool {
        self.appointments && self.vitals
    }
}

/// Identifies one refresh so that only the latest one, for the current
/// patient, can end the `Refreshing` phase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RefreshTicket {
    epoch: u64,
    seq: u64,
}

/// Written only by the source completion handlers and the refresh
/// orchestrator; everything else reads snapshots.
#[derive(Debug, Clone)]
pub struct DashboardState {
    patient: Option<PatientId>,
    phase: DashboardPhase,
    appointments: Option<SourceResult<Appointment>>,
    vitals: Option<SourceResult<VitalReading>>,
    settled: SettleFlags,
    last_error_source: Option<SourceKind>,
    version: u64,
    epoch: u64,
    refresh_seq: u64,
}

impl Default for DashboardState {
    fn default() -> Self {
        Self::new(None)
    }
}

impl DashboardState {
    pub fn new(patient: Option<PatientId>) -> Self {
        Self {
            patient,
            phase: DashboardPhase::Initializing,
            appointments: None,
            vitals: None,
            settled: SettleFlags::default(),
            last_error_source: None,
            version: 0,
            epoch: 0,
            refresh_seq: 0,
        }
    }

    /// Drops everything known about the previous patient and goes back to loading.
    pub fn reset_for(&mut self, patient: Option<PatientId>) {
        let epoch = self.epoch + 1;
        let version = self.version;
        *self = Self::new(patient);
        self.epoch = epoch;
        self.version = version;
    }

    pub fn record_appointments(&mut self, result: SourceResult<Appointment>) {
        self.appointments = Some(result);
        self.settle(SourceKind::Appointments);
    }

    pub fn record_vitals(&mut self, result: SourceResult<VitalReading>) {
        self.vitals = Some(result);
        self.settle(SourceKind::Vitals);
    }

    fn settle(&mut self, kind: SourceKind) {
        self.version += 1;
        self.settled.mark(kind);

        if self.error(kind).is_some() {
            self.last_error_source = Some(kind);
        } else if self.last_error_source == Some(kind) {
            let other = other_source(kind);
            self.last_error_source = self.error(other).map(|_| other);
        }

        if self.phase == DashboardPhase::Initializing && self.settled.all() {
            self.phase = DashboardPhase::Ready;
        }
    }

    /// Clears the settle flags before any re-fetch starts.
    pub fn begin_refresh(&mut self) -> RefreshTicket {
        self.settled = SettleFlags::default();
        self.phase = DashboardPhase::Refreshing;
        self.refresh_seq += 1;
        RefreshTicket {
            epoch: self.epoch,
            seq: self.refresh_seq,
        }
    }

    /// Returns false when the ticket is stale (patient changed or a newer
    /// refresh started) and the state was left alone.
    pub fn finish_refresh(&mut self, ticket: RefreshTicket) -> bool {
        if ticket.epoch != self.epoch || ticket.seq != self.refresh_seq {
            return false;
        }
        if self.phase == DashboardPhase::Refreshing {
            self.phase = DashboardPhase::Ready;
        }
        true
    }

    pub fn patient(&self) -> Option<&PatientId> {
        self.patient.as_ref()
    }

    pub fn phase(&self) -> DashboardPhase {
        self.phase
    }

    pub fn is_loading(&self) -> bool {
        self.phase != DashboardPhase::Ready
    }

    pub fn is_settled(&self, kind: SourceKind) -> bool {
        self.settled.get(kind)
    }

    pub fn appointments(&self) -> &[Appointment] {
        self.appointments.as_ref().map(SourceResult::data).unwrap_or_default()
    }

    pub fn vitals(&self) -> &[VitalReading] {
        self.vitals.as_ref().map(SourceResult::data).unwrap_or_default()
    }

    pub fn error(&self, kind: SourceKind) -> Option<&SourceError> {
        match kind {
            SourceKind::Appointments => self.appointments.as_ref().and_then(SourceResult::error),
            SourceKind::Vitals => self.vitals.as_ref().and_then(SourceResult::error),
        }
    }

    /// Most recently observed error among sources still in error.
    pub fn last_error(&self) -> Option<&SourceError> {
        self.last_error_source.and_then(|kind| self.error(kind))
    }

    /// Incremented on every settle.
    pub fn version(&self) -> u64 {
        self.version
    }
}

fn other_source(kind: SourceKind) -> SourceKind {
    match kind {
        SourceKind::Appointments => SourceKind::Vitals,
        SourceKind::Vitals => SourceKind::Appointments,
    }
}
