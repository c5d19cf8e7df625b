//! Application-level configuration loading: the tournament catalog of categories, zones,
//! courts and rounds offered to organizers.

use std::{env, fs, io::ErrorKind, path::PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use utoipa::ToSchema;

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "PADEL_LIVE_BACK_CONFIG_PATH";

/// Immutable runtime configuration shared across the application.
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    catalog: Catalog,
}

/// Labels organizers pick from when registering teams and scheduling matches.
///
/// An empty list disables the membership check for that field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Catalog {
    /// Tournament categories (e.g. "5ta Caballeros").
    #[serde(default)]
    pub categories: Vec<String>,
    /// Zones inside a category.
    #[serde(default)]
    pub zones: Vec<String>,
    /// Courts available at the venue.
    #[serde(default)]
    pub courts: Vec<String>,
    /// Round labels, in play order.
    #[serde(default)]
    pub rounds: Vec<String>,
}

impl AppConfig {
    /// Load the application configuration from disk, falling back to the built-in catalog.
    pub fn load() -> Self {
        let path = resolve_config_path();
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<RawConfig>(&contents) {
                Ok(raw) => {
                    let app_config: Self = raw.into();
                    info!(
                        path = %path.display(),
                        categories = app_config.catalog.categories.len(),
                        courts = app_config.catalog.courts.len(),
                        "loaded tournament catalog from config"
                    );
                    app_config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        }
    }

    /// Build a configuration around an explicit catalog.
    pub fn with_catalog(catalog: Catalog) -> Self {
        Self { catalog }
    }

    /// Catalog of allowed labels.
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }
}

impl Catalog {
    /// Whether `value` may be used for a field restricted to `allowed`.
    pub fn allows(allowed: &[String], value: &str) -> bool {
        allowed.is_empty() || allowed.iter().any(|candidate| candidate == value)
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self {
            categories: labels(&[
                "5ta Caballeros",
                "6ta Caballeros",
                "7ma Mixto",
                "4ta Damas",
            ]),
            zones: labels(&["Zona A", "Zona B", "Zona C", "Zona D"]),
            courts: labels(&["Cancha 1", "Cancha 2", "Cancha 3", "Cancha Principal"]),
            rounds: labels(&[
                "Jornada 1",
                "Jornada 2",
                "Jornada 3",
                "Cuartos de Final",
                "Semifinal",
                "Final",
            ]),
        }
    }
}

#[derive(Debug, Deserialize)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    catalog: Option<Catalog>,
}

impl From<RawConfig> for AppConfig {
    fn from(value: RawConfig) -> Self {
        Self {
            catalog: value.catalog.unwrap_or_default(),
        }
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

fn labels(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| (*value).to_owned()).collect()
}
