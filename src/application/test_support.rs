// In-memory collaborators for exercising the coordination logic
use crate::application::clinical_provider::{AppointmentProvider, SourceQuery, VitalsProvider};
use crate::application::notification::{NotificationKind, NotificationSink};
use crate::domain::appointment::Appointment;
use crate::domain::patient::PatientId;
use crate::domain::vital::{AlertLevel, VitalReading};
use async_trait::async_trait;
use std::collections::{BTreeMap, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::oneshot;

type Scripted<T> = Result<Vec<T>, String>;

enum Step<T> {
    Ready(Scripted<T>),
    Gated(oneshot::Receiver<Scripted<T>>),
    Never,
}

/// Answers fetches from a script, one step per call. An exhausted script
/// answers with an empty collection.
pub struct ScriptedQuery<T> {
    steps: Mutex<VecDeque<Step<T>>>,
    calls: Mutex<Vec<PatientId>>,
}

impl<T> ScriptedQuery<T> {
    pub fn new() -> Self {
        Self {
            steps: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn push_data(&self, items: Vec<T>) {
        self.push(Step::Ready(Ok(items)));
    }

    pub fn push_error(&self, message: &str) {
        self.push(Step::Ready(Err(message.to_string())));
    }

    /// The fetch waits until the returned sender fires.
    pub fn push_gated(&self) -> oneshot::Sender<Scripted<T>> {
        let (tx, rx) = oneshot::channel();
        self.push(Step::Gated(rx));
        tx
    }

    /// The fetch never completes.
    pub fn push_never(&self) {
        self.push(Step::Never);
    }

    pub fn calls(&self) -> Vec<PatientId> {
        self.calls.lock().unwrap().clone()
    }

    pub async fn wait_for_calls(&self, count: usize) {
        while self.calls.lock().unwrap().len() < count {
            tokio::task::yield_now().await;
        }
    }

    fn push(&self, step: Step<T>) {
        self.steps.lock().unwrap().push_back(step);
    }
}

#[async_trait]
impl<T: Send + Sync + 'static> SourceQuery<T> for ScriptedQuery<T> {
    async fn fetch(&self, patient: &PatientId) -> anyhow::Result<Vec<T>> {
        self.calls.lock().unwrap().push(patient.clone());
        let step = self.steps.lock().unwrap().pop_front();

        let outcome = match step {
            None => Ok(Vec::new()),
            Some(Step::Ready(outcome)) => outcome,
            Some(Step::Gated(rx)) => rx.await.unwrap_or_else(|_| Err("gate dropped".to_string())),
            Some(Step::Never) => std::future::pending().await,
        };
        outcome.map_err(|message| anyhow::anyhow!(message))
    }
}

#[derive(Default)]
pub struct RecordingSink {
    entries: Mutex<Vec<(NotificationKind, String)>>,
}

impl RecordingSink {
    pub fn entries(&self) -> Vec<(NotificationKind, String)> {
        self.entries.lock().unwrap().clone()
    }

    pub fn count(&self, kind: NotificationKind) -> usize {
        self.entries.lock().unwrap().iter().filter(|(k, _)| *k == kind).count()
    }
}

impl NotificationSink for RecordingSink {
    fn notify(&self, kind: NotificationKind, message: &str) {
        self.entries.lock().unwrap().push((kind, message.to_string()));
    }
}

/// Serves the same records to every patient and counts requests.
#[derive(Default)]
pub struct FixedProvider {
    pub appointments: Vec<Appointment>,
    pub vitals: Vec<VitalReading>,
    pub requests: AtomicUsize,
}

#[async_trait]
impl AppointmentProvider for FixedProvider {
    async fn patient_appointments(&self, _patient: &PatientId) -> anyhow::Result<Vec<Appointment>> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        Ok(self.appointments.clone())
    }
}

#[async_trait]
impl VitalsProvider for FixedProvider {
    async fn patient_vitals(&self, _patient: &PatientId, limit: usize) -> anyhow::Result<Vec<VitalReading>> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        Ok(self.vitals.iter().take(limit).cloned().collect())
    }
}

pub fn reading(id: &str) -> VitalReading {
    VitalReading::new(id.to_string(), None, AlertLevel::Normal, BTreeMap::new())
}
