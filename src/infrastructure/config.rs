use crate::application::clinical_provider::DEFAULT_VITALS_LIMIT;
use crate::application::dashboard_registry::DEFAULT_MAX_DASHBOARDS;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct DashboardConfig {
    #[serde(default)]
    pub server: ServerSettings,
    pub provider: ProviderSettings,
    #[serde(default)]
    pub vitals: VitalsSettings,
    #[serde(default)]
    pub dashboards: DashboardsSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self { bind: default_bind() }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ProviderSettings {
    pub base_url: String,
    pub token: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct VitalsSettings {
    #[serde(default = "default_vitals_limit")]
    pub limit: usize,
}

impl Default for VitalsSettings {
    fn default() -> Self {
        Self {
            limit: default_vitals_limit(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct DashboardsSettings {
    #[serde(default = "default_max_open")]
    pub max_open: usize,
}

impl Default for DashboardsSettings {
    fn default() -> Self {
        Self {
            max_open: default_max_open(),
        }
    }
}

fn default_max_open() -> usize {
    DEFAULT_MAX_DASHBOARDS
}

fn default_bind() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_vitals_limit() -> usize {
    DEFAULT_VITALS_LIMIT
}

/// Reads `config/dashboard.*`, overridable with `DASHBOARD__SECTION__KEY` variables.
pub fn load_dashboard_config() -> anyhow::Result<DashboardConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/dashboard").required(false))
        .add_source(config::Environment::with_prefix("DASHBOARD").separator("__"))
        .build()?;

    Ok(settings.try_deserialize()?)
}
