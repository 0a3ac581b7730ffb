use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use figment::{providers::{Env, Format, Toml}, Figment};
use serde::Deserialize;
use validator::Validate;

use crate::error::ConfigurationError;
use crate::optimizer::Formulation;
use crate::sweep::SweepParameter;

pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct Config {
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    #[validate(nested)]
    pub horizon: HorizonConfig,
    #[validate(nested)]
    pub demand: DemandConfig,
    #[validate(nested)]
    pub renewable: RenewableConfig,
    #[validate(nested)]
    pub plant: PlantConfig,
    #[validate(nested)]
    pub commitment: Option<CommitmentConfig>,
    #[validate(nested)]
    pub export: Option<ExportConfig>,
    #[validate(nested)]
    pub sweep: Option<SweepConfig>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ModelConfig {
    #[serde(default)]
    pub formulation: Formulation,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct HorizonConfig {
    #[validate(range(exclusive_min = 0.0))]
    #[serde(default = "default_step_hours")]
    pub step_hours: f64,
    /// RFC 3339 timestamp of the first step, used to stamp report rows
    pub start: Option<DateTime<Utc>>,
}

impl Default for HorizonConfig {
    fn default() -> Self {
        Self { step_hours: default_step_hours(), start: None }
    }
}

fn default_step_hours() -> f64 {
    1.0
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct DemandConfig {
    #[validate(length(min = 1))]
    pub series: Vec<f64>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RenewableConfig {
    #[validate(range(min = 0.0))]
    pub investment_cost: f64,
    #[validate(length(min = 1))]
    pub capacity_factor: Vec<f64>,
    #[validate(range(min = 0.0))]
    pub max_capacity: Option<f64>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PlantConfig {
    #[validate(range(min = 0.0))]
    pub investment_cost: f64,
    #[validate(range(min = 0.0))]
    pub fuel_cost: f64,
    #[validate(range(min = 0.0))]
    pub startup_cost: f64,
    #[validate(range(exclusive_min = 0.0, max = 1.0))]
    pub efficiency_min: f64,
    #[validate(range(exclusive_min = 0.0, max = 1.0))]
    pub efficiency_max: f64,
    #[validate(range(min = 0.0, exclusive_max = 1.0))]
    pub partial_load_min: f64,
    #[serde(default = "default_cold_start")]
    pub cold_start: bool,
    #[validate(range(min = 0.0))]
    pub max_capacity: Option<f64>,
}

fn default_cold_start() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CommitmentConfig {
    #[validate(range(exclusive_min = 0.0))]
    pub capacity_max: f64,
    #[validate(range(min = 0.0))]
    #[serde(default)]
    pub fixed_cost: f64,
    #[validate(range(min = 0.0))]
    #[serde(default)]
    pub shutdown_cost: f64,
    #[serde(default)]
    pub initially_online: bool,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ExportConfig {
    pub price: f64,
    #[validate(range(min = 0.0))]
    pub max_per_step: Option<f64>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SweepConfig {
    pub parameter: SweepParameter,
    #[validate(length(min = 1))]
    pub values: Vec<f64>,
}

impl Config {
    /// Load `config/default.toml` (or `$OEP_CONFIG`) and overlay `OEP__` environment variables
    pub fn load() -> Result<Self> {
        let path =
            std::env::var("OEP_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        let figment = Figment::new()
            .merge(Toml::file(&path))
            .merge(Env::prefixed("OEP__").split("__"));
        Self::from_figment(figment).with_context(|| format!("loading configuration from {path}"))
    }

    pub fn from_toml_str(toml: &str) -> Result<Self> {
        Self::from_figment(Figment::from(Toml::string(toml)))
    }

    fn from_figment(figment: Figment) -> Result<Self> {
        let config: Config = figment.extract()?;
        config.validate().map_err(ConfigurationError::from)?;
        Ok(config)
    }
}
