// Dashboard registry - live dashboards for recently viewed patients
use crate::application::clinical_provider::{AppointmentProvider, VitalsProvider};
use crate::application::dashboard_service::Dashboard;
use crate::application::notification::NotificationSink;
use crate::domain::patient::PatientId;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::time::Instant;

/// Dashboards kept alive when no limit is configured.
pub const DEFAULT_MAX_DASHBOARDS: usize = 256;

struct Entry {
    dashboard: Dashboard,
    last_opened: Instant,
}

/// At most `max_dashboards` are kept; opening one more evicts the least
/// recently opened. An evicted dashboard's in-flight fetches still finish,
/// and reopening the patient starts a fresh load.
#[derive(Clone)]
pub struct DashboardRegistry {
    appointments: Arc<dyn AppointmentProvider>,
    vitals: Arc<dyn VitalsProvider>,
    vitals_limit: usize,
    max_dashboards: usize,
    notifier: Arc<dyn NotificationSink>,
    dashboards: Arc<Mutex<HashMap<PatientId, Entry>>>,
}

impl DashboardRegistry {
    pub fn new(
        appointments: Arc<dyn AppointmentProvider>,
        vitals: Arc<dyn VitalsProvider>,
        vitals_limit: usize,
        max_dashboards: usize,
        notifier: Arc<dyn NotificationSink>,
    ) -> Self {
        Self {
            appointments,
            vitals,
            vitals_limit,
            max_dashboards: max_dashboards.max(1),
            notifier,
            dashboards: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Returns the patient's dashboard, creating it and starting its initial load on first use.
    pub async fn open(&self, patient: PatientId) -> Dashboard {
        let mut dashboards = self.dashboards.lock().await;
        let now = Instant::now();

        if let Some(entry) = dashboards.get_mut(&patient) {
            entry.last_opened = now;
            return entry.dashboard.clone();
        }

        while dashboards.len() >= self.max_dashboards {
            let oldest = dashboards
                .iter()
                .min_by_key(|(_, entry)| entry.last_opened)
                .map(|(id, _)| id.clone());
            match oldest {
                Some(id) => {
                    tracing::debug!(patient = %id, "evicting idle dashboard");
                    dashboards.remove(&id);
                }
                None => break,
            }
        }

        let dashboard = Dashboard::from_providers(
            self.appointments.clone(),
            self.vitals.clone(),
            self.vitals_limit,
            self.notifier.clone(),
        );
        dashboard.set_patient(Some(patient.clone()));
        dashboards.insert(
            patient,
            Entry {
                dashboard: dashboard.clone(),
                last_opened: now,
            },
        );
        dashboard
    }

    pub async fn len(&self) -> usize {
        self.dashboards.lock().await.len()
    }

    pub async fn contains(&self, patient: &PatientId) -> bool {
        self.dashboards.lock().await.contains_key(patient)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::test_support::{reading, FixedProvider, RecordingSink};
    use std::sync::atomic::Ordering;
    use std::time::Duration;

    fn registry(provider: &Arc<FixedProvider>, vitals_limit: usize, max_dashboards: usize) -> DashboardRegistry {
        DashboardRegistry::new(
            provider.clone(),
            provider.clone(),
            vitals_limit,
            max_dashboards,
            Arc::new(RecordingSink::default()),
        )
    }

    fn patient(id: &str) -> PatientId {
        PatientId::parse(id).unwrap()
    }

    #[tokio::test]
    async fn test_open_reuses_dashboard_per_patient() {
        let provider = Arc::new(FixedProvider::default());
        let registry = registry(&provider, 10, DEFAULT_MAX_DASHBOARDS);

        registry.open(patient("p1")).await.wait_until_ready().await;
        registry.open(patient("p1")).await.wait_until_ready().await;
        registry.open(patient("p2")).await.wait_until_ready().await;

        assert_eq!(registry.len().await, 2);
        assert_eq!(provider.requests.load(Ordering::SeqCst), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_least_recently_opened_is_evicted_at_capacity() {
        let provider = Arc::new(FixedProvider::default());
        let registry = registry(&provider, 10, 2);

        registry.open(patient("p1")).await;
        tokio::time::advance(Duration::from_secs(1)).await;
        registry.open(patient("p2")).await;
        tokio::time::advance(Duration::from_secs(1)).await;
        registry.open(patient("p1")).await;
        tokio::time::advance(Duration::from_secs(1)).await;
        registry.open(patient("p3")).await;

        assert_eq!(registry.len().await, 2);
        assert!(registry.contains(&patient("p1")).await);
        assert!(!registry.contains(&patient("p2")).await);
        assert!(registry.contains(&patient("p3")).await);

        // Reopening an evicted patient loads it again.
        registry.open(patient("p2")).await.wait_until_ready().await;
        assert_eq!(registry.len().await, 2);
        assert!(!registry.contains(&patient("p1")).await);
    }

    #[tokio::test]
    async fn test_vitals_limit_is_passed_to_provider() {
        let provider = Arc::new(FixedProvider {
            vitals: (0..12).map(|i| reading(&format!("v{}", i))).collect(),
            ..Default::default()
        });
        let registry = registry(&provider, 10, DEFAULT_MAX_DASHBOARDS);

        let state = registry.open(patient("p1")).await.wait_until_ready().await;
        assert_eq!(state.vitals().len(), 10);
    }
}
