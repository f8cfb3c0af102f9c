// Dashboard service - keeps both clinical sources in sync behind one loading state
use crate::application::clinical_provider::{
    AppointmentProvider, AppointmentsQuery, SourceQuery, VitalsProvider, VitalsQuery,
};
use crate::application::notification::{NotificationKind, NotificationSink};
use crate::application::refresh_orchestrator::{join_fail_fast, RefreshOutcome};
use crate::application::source_binding::SourceBinding;
use crate::domain::appointment::Appointment;
use crate::domain::dashboard::{DashboardState, RefreshTicket};
use crate::domain::patient::PatientId;
use crate::domain::source::{SourceError, SourceKind, SourceResult};
use crate::domain::view::DashboardView;
use crate::domain::vital::VitalReading;
use chrono::{DateTime, Utc};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;

pub const APPOINTMENTS_ERROR_MESSAGE: &str = "Error loading appointments";
pub const VITALS_ERROR_MESSAGE: &str = "Error loading vitals";

fn load_error_message(kind: SourceKind) -> &'static str {
    match kind {
        SourceKind::Appointments => APPOINTMENTS_ERROR_MESSAGE,
        SourceKind::Vitals => VITALS_ERROR_MESSAGE,
    }
}

/// Per-patient clinical summary backed by two independently fetched sources.
///
/// State lives in a `watch` channel: the two binding observers and the
/// refresh path are its only writers, and `send_modify` serializes them.
/// Readers take snapshots or subscribe.
#[derive(Clone)]
pub struct Dashboard {
    inner: Arc<DashboardInner>,
}

struct DashboardInner {
    appointments: Arc<SourceBinding<Appointment>>,
    vitals: Arc<SourceBinding<VitalReading>>,
    state: Arc<watch::Sender<DashboardState>>,
    notifier: Arc<dyn NotificationSink>,
}

impl Dashboard {
    pub fn new(
        appointments: Arc<dyn SourceQuery<Appointment>>,
        vitals: Arc<dyn SourceQuery<VitalReading>>,
        notifier: Arc<dyn NotificationSink>,
    ) -> Self {
        let (state, _) = watch::channel(DashboardState::default());
        let state = Arc::new(state);

        let appointments = Arc::new(SourceBinding::new(SourceKind::Appointments, appointments));
        let vitals = Arc::new(SourceBinding::new(SourceKind::Vitals, vitals));
        observe(&appointments, &state, &notifier, DashboardState::record_appointments);
        observe(&vitals, &state, &notifier, DashboardState::record_vitals);

        Self {
            inner: Arc::new(DashboardInner {
                appointments,
                vitals,
                state,
                notifier,
            }),
        }
    }

    pub fn from_providers(
        appointments: Arc<dyn AppointmentProvider>,
        vitals: Arc<dyn VitalsProvider>,
        vitals_limit: usize,
        notifier: Arc<dyn NotificationSink>,
    ) -> Self {
        Self::new(
            Arc::new(AppointmentsQuery::new(appointments)),
            Arc::new(VitalsQuery::new(vitals, vitals_limit)),
            notifier,
        )
    }

    /// Re-subscribes both sources when the patient changes and goes back to
    /// loading. Setting the current patient again does nothing.
    pub fn set_patient(&self, patient: Option<PatientId>) {
        if self.inner.state.borrow().patient() == patient.as_ref() {
            return;
        }

        match &patient {
            Some(p) => tracing::info!(patient = %p, "loading dashboard"),
            None => tracing::info!("dashboard cleared, no patient"),
        }

        // Re-key first so no result from the previous patient can land in the fresh state.
        self.inner.appointments.rekey(patient.clone());
        self.inner.vitals.rekey(patient.clone());
        self.inner.state.send_modify(|s| s.reset_for(patient.clone()));

        // Detached; completion is observed through the bindings.
        drop(self.inner.appointments.bind(patient.clone()));
        drop(self.inner.vitals.bind(patient));
    }

    /// Marks the dashboard as refreshing and starts both re-fetches before
    /// returning. The join, the end of the `Refreshing` phase and the
    /// notification run on a spawned task, so they happen even when the
    /// returned future is dropped.
    pub fn refresh(&self) -> impl Future<Output = RefreshOutcome> + Send + use<> {
        let mut ticket = RefreshTicket::default();
        self.inner.state.send_modify(|s| ticket = s.begin_refresh());

        let fetches = vec![
            (SourceKind::Appointments, self.inner.appointments.refetch()),
            (SourceKind::Vitals, self.inner.vitals.refetch()),
        ];
        let task = tokio::spawn(complete_refresh(Arc::clone(&self.inner), fetches, ticket));
        let inner = Arc::clone(&self.inner);

        async move {
            match task.await {
                Ok(outcome) => outcome,
                Err(e) => {
                    tracing::error!("refresh task failed: {}", e);
                    let outcome = RefreshOutcome::Interrupted;
                    inner.finish(ticket, &outcome);
                    outcome
                }
            }
        }
    }

    pub fn snapshot(&self) -> DashboardState {
        self.inner.state.borrow().clone()
    }

    pub fn view(&self, now: DateTime<Utc>) -> DashboardView {
        DashboardView::project(&self.inner.state.borrow(), now)
    }

    pub fn is_loading(&self) -> bool {
        self.inner.state.borrow().is_loading()
    }

    pub fn subscribe(&self) -> watch::Receiver<DashboardState> {
        self.inner.state.subscribe()
    }

    /// Waits, without a timeout, until the dashboard is no longer loading.
    pub async fn wait_until_ready(&self) -> DashboardState {
        let mut rx = self.subscribe();
        // The sender lives as long as `self`, so the wait cannot fail.
        let _ = rx.wait_for(|s| !s.is_loading()).await;
        rx.borrow().clone()
    }
}

async fn complete_refresh(
    inner: Arc<DashboardInner>,
    fetches: Vec<(SourceKind, JoinHandle<Result<(), SourceError>>)>,
    ticket: RefreshTicket,
) -> RefreshOutcome {
    let outcome = match join_fail_fast(fetches).await {
        Ok(()) => RefreshOutcome::Refreshed,
        Err(e) => {
            tracing::warn!("dashboard refresh failed: {}", e);
            RefreshOutcome::failed(&e)
        }
    };
    inner.finish(ticket, &outcome);
    outcome
}

impl DashboardInner {
    fn finish(&self, ticket: RefreshTicket, outcome: &RefreshOutcome) {
        self.state.send_modify(|s| {
            if !s.finish_refresh(ticket) {
                tracing::debug!("refresh superseded, leaving loading state alone");
            }
        });

        let (kind, message) = outcome.notification();
        self.notifier.notify(kind, message);
    }
}

fn observe<T>(
    binding: &SourceBinding<T>,
    state: &Arc<watch::Sender<DashboardState>>,
    notifier: &Arc<dyn NotificationSink>,
    record: fn(&mut DashboardState, SourceResult<T>),
) where
    T: Clone + Send + Sync + 'static,
{
    let kind = binding.kind();
    let state = Arc::clone(state);
    let notifier = Arc::clone(notifier);

    binding.on_result(move |result| {
        state.send_modify(|s| record(s, result.clone()));
        if result.error().is_some() {
            notifier.notify(NotificationKind::Error, load_error_message(kind));
        }
    });
}
