// Refresh orchestration - joins the re-fetch of every source into one outcome
use crate::application::notification::NotificationKind;
use crate::domain::source::{SourceError, SourceKind};
use futures::future::try_join_all;
use serde::Serialize;
use tokio::task::JoinHandle;

pub const REFRESH_SUCCESS_MESSAGE: &str = "Dashboard refreshed";
pub const REFRESH_FAILURE_MESSAGE: &str = "Error refreshing dashboard";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RefreshOutcome {
    Refreshed,
    Failed {
        source: SourceKind,
        #[serde(rename = "error")]
        reason: String,
    },
    /// The refresh task itself died before reporting.
    Interrupted,
}

impl RefreshOutcome {
    pub fn failed(error: &SourceError) -> Self {
        RefreshOutcome::Failed {
            source: error.kind(),
            reason: error.to_string(),
        }
    }

    pub fn notification(&self) -> (NotificationKind, &'static str) {
        match self {
            RefreshOutcome::Refreshed => (NotificationKind::Success, REFRESH_SUCCESS_MESSAGE),
            RefreshOutcome::Failed { .. } | RefreshOutcome::Interrupted => {
                (NotificationKind::Error, REFRESH_FAILURE_MESSAGE)
            }
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, RefreshOutcome::Refreshed)
    }
}

/// Resolves with the first failure, without waiting for the other fetches.
///
/// Handles still pending at that point are dropped, which detaches their
/// tasks rather than aborting them: those fetches finish and emit as usual.
pub async fn join_fail_fast(
    fetches: Vec<(SourceKind, JoinHandle<Result<(), SourceError>>)>,
) -> Result<(), SourceError> {
    try_join_all(fetches.into_iter().map(|(kind, handle)| async move {
        match handle.await {
            Ok(status) => status,
            Err(join_error) => {
                tracing::error!(source = %kind, "re-fetch task failed: {}", join_error);
                Err(SourceError::Aborted(kind))
            }
        }
    }))
    .await
    .map(|_| ())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::sync::oneshot;

    fn failure(kind: SourceKind) -> SourceError {
        SourceError::Provider {
            kind,
            message: "boom".to_string(),
        }
    }

    #[tokio::test]
    async fn test_all_succeed() {
        let fetches = vec![
            (SourceKind::Appointments, tokio::spawn(async { Ok(()) })),
            (SourceKind::Vitals, tokio::spawn(async { Ok(()) })),
        ];
        assert_eq!(join_fail_fast(fetches).await, Ok(()));
    }

    #[tokio::test]
    async fn test_first_failure_wins_and_pending_task_keeps_running() {
        let (release, gate) = oneshot::channel::<()>();
        let (done_tx, done_rx) = oneshot::channel::<()>();

        let pending = tokio::spawn(async move {
            let _ = gate.await;
            let _ = done_tx.send(());
            Ok(())
        });
        let fetches = vec![
            (SourceKind::Appointments, tokio::spawn(async { Err(failure(SourceKind::Appointments)) })),
            (SourceKind::Vitals, pending),
        ];

        let joined = tokio::time::timeout(Duration::from_secs(5), join_fail_fast(fetches))
            .await
            .expect("join waited for the pending fetch");
        assert_eq!(joined, Err(failure(SourceKind::Appointments)));

        release.send(()).unwrap();
        done_rx.await.expect("detached fetch was aborted");
    }

    #[tokio::test]
    async fn test_panicked_fetch_is_reported_as_aborted() {
        let fetches = vec![(
            SourceKind::Vitals,
            tokio::spawn(async {
                if true {
                    panic!("provider exploded");
                }
                Ok(())
            }),
        )];
        assert_eq!(join_fail_fast(fetches).await, Err(SourceError::Aborted(SourceKind::Vitals)));
    }

    #[test]
    fn test_outcome_notification() {
        assert_eq!(
            RefreshOutcome::Refreshed.notification(),
            (NotificationKind::Success, "Dashboard refreshed")
        );
        let failed = RefreshOutcome::failed(&failure(SourceKind::Vitals));
        assert_eq!(failed.notification(), (NotificationKind::Error, "Error refreshing dashboard"));
        assert!(!failed.is_success());

        let json = serde_json::to_value(&failed).unwrap();
        assert_eq!(json["status"], "failed");
        assert_eq!(json["source"], "vitals");
        assert_eq!(json["error"], "vitals provider failed: boom");
    }
}
