// Domain layer - Clinical records, dashboard state and view projection
pub mod appointment;
pub mod dashboard;
pub mod patient;
pub mod source;
pub mod view;
pub mod vital;
