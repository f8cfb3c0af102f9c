// HTTP clinical data provider implementation
use crate::application::clinical_provider::{AppointmentProvider, VitalsProvider};
use crate::domain::appointment::Appointment;
use crate::domain::patient::PatientId;
use crate::domain::vital::VitalReading;
use crate::infrastructure::record_mapper::{
    appointment_from_record, vital_from_record, AppointmentRecord, VitalRecord,
};
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;

#[derive(Debug, Clone)]
pub struct HttpClinicalProvider {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl HttpClinicalProvider {
    pub fn new(base_url: String, token: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        }
    }

    fn appointments_url(&self, patient: &PatientId) -> String {
        format!(
            "{}/patients/{}/appointments",
            self.base_url,
            urlencoding::encode(patient.as_str())
        )
    }

    fn vitals_url(&self, patient: &PatientId, limit: usize) -> String {
        format!(
            "{}/patients/{}/vitals?limit={}",
            self.base_url,
            urlencoding::encode(patient.as_str()),
            limit
        )
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let mut request = self.client.get(url).header("Accept", "application/json");
        if let Some(token) = &self.token {
            request = request.header("Authorization", format!("Token {}", token));
        }

        let response = request
            .send()
            .await
            .context("Failed to send request to clinical provider")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Clinical provider request failed with status {}: {}", status, body);
        }

        response
            .json::<T>()
            .await
            .context("Failed to parse clinical provider response")
    }
}

#[async_trait]
impl AppointmentProvider for HttpClinicalProvider {
    async fn patient_appointments(&self, patient: &PatientId) -> Result<Vec<Appointment>> {
        let url = self.appointments_url(patient);
        tracing::debug!("Fetching appointments: {}", url);

        let records: Vec<AppointmentRecord> = self.get_json(&url).await?;
        Ok(records.into_iter().map(appointment_from_record).collect())
    }
}

#[async_trait]
impl VitalsProvider for HttpClinicalProvider {
    async fn patient_vitals(&self, patient: &PatientId, limit: usize) -> Result<Vec<VitalReading>> {
        let url = self.vitals_url(patient, limit);
        tracing::debug!("Fetching vitals: {}", url);

        let records: Vec<VitalRecord> = self.get_json(&url).await?;
        // Guard against providers that ignore the limit.
        Ok(records.into_iter().take(limit).map(vital_from_record).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_urls_encode_patient_and_trim_base() {
        let provider = HttpClinicalProvider::new("http://ehr.local/api/".to_string(), None);
        let patient = PatientId::parse("003 A/1").unwrap();

        assert_eq!(
            provider.appointments_url(&patient),
            "http://ehr.local/api/patients/003%20A%2F1/appointments"
        );
        assert_eq!(
            provider.vitals_url(&patient, 10),
            "http://ehr.local/api/patients/003%20A%2F1/vitals?limit=10"
        );
    }

    #[tokio::test]
    async fn test_unreachable_provider_is_an_error() {
        let provider = HttpClinicalProvider::new("http://127.0.0.1:9".to_string(), None);
        let patient = PatientId::parse("p1").unwrap();

        let err = provider.patient_appointments(&patient).await.unwrap_err();
        assert!(err.to_string().contains("Failed to send request"));
    }
}
