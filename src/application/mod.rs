// Application layer - Source synchronization, refresh orchestration and use cases
pub mod clinical_provider;
pub mod dashboard_registry;
pub mod dashboard_service;
pub mod notification;
pub mod refresh_orchestrator;
pub mod source_binding;

#[cfg(test)]
pub mod test_support;
