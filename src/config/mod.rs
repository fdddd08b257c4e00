//! Configuration loading and management

use crate::core::error::ConfigError;
use crate::core::query::DEFAULT_LIMIT;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Service names of the collections the workflow touches
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServicesConfig {
    pub invoices: String,
    pub items: String,
    pub companies: String,
    pub users: String,
}

impl Default for ServicesConfig {
    fn default() -> Self {
        Self {
            invoices: "invoices".to_string(),
            items: "items".to_string(),
            companies: "companies".to_string(),
            users: "users".to_string(),
        }
    }
}

/// Options for list and option-list queries
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    /// Page size for option lists and populated re-fetches
    pub list_limit: usize,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            list_limit: DEFAULT_LIMIT,
        }
    }
}

/// Stock reconciliation behavior
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowConfig {
    /// Invoices hold stock: create takes it, edit reconciles it, remove returns it.
    /// When off, no invoice mutation touches item stock.
    pub reserve_stock_on_create: bool,

    /// Undo committed writes when a later save step fails
    pub rollback_on_failure: bool,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            reserve_stock_on_create: true,
            rollback_on_failure: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertsConfig {
    /// Broadcast buffer per subscriber
    pub capacity: usize,
}

impl Default for AlertsConfig {
    fn default() -> Self {
        Self { capacity: 64 }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
        }
    }
}

/// Complete configuration for the admin workflows
///
/// Every section is optional in YAML and falls back to its defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminConfig {
    pub services: ServicesConfig,
    pub query: QueryConfig,
    pub workflow: WorkflowConfig,
    pub alerts: AlertsConfig,
    pub logging: LoggingConfig,
}

impl AdminConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Unreadable {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_yaml_str(&content)
    }

    /// Load configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults matching the stock admin backend
    pub fn default_config() -> Self {
        Self::default()
    }

    /// Reject values the workflows cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.query.list_limit == 0 {
            return Err(ConfigError::InvalidValue {
                field: "query.list_limit".to_string(),
                message: "must be greater than 0".to_string(),
            });
        }
        if self.alerts.capacity == 0 {
            return Err(ConfigError::InvalidValue {
                field: "alerts.capacity".to_string(),
                message: "must be greater than 0".to_string(),
            });
        }

        let services = [
            ("services.invoices", &self.services.invoices),
            ("services.items", &self.services.items),
            ("services.companies", &self.services.companies),
            ("services.users", &self.services.users),
        ];
        if let Some((field, _)) = services.iter().find(|(_, name)| name.trim().is_empty()) {
            return Err(ConfigError::InvalidValue {
                field: field.to_string(),
                message: "service name must not be empty".to_string(),
            });
        }

        Ok(())
    }
}
