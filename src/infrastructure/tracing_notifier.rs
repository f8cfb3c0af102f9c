// Notification sink that reports through tracing
use crate::application::notification::{NotificationKind, NotificationSink};

#[derive(Debug, Clone, Default)]
pub struct TracingNotifier;

impl NotificationSink for TracingNotifier {
    fn notify(&self, kind: NotificationKind, message: &str) {
        match kind {
            NotificationKind::Success => tracing::info!(title = kind.title(), "{}", message),
            NotificationKind::Error => tracing::error!(title = kind.title(), "{}", message),
        }
    }
}
