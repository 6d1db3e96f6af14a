use std::path::{Path, PathBuf};

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::NikromeError;
use crate::checkpoint::CheckpointFilter;
use crate::geo::LatLng;
use crate::map::{DEFAULT_ZOOM, FIT_PADDING, TileLayer, course};

const CONFIG_DIR_NAME: &str = "nikrome";
const CONFIG_FILE_NAME: &str = "config.json";
pub const DEFAULT_DATASET: &str = "semi_ventoux.json";

/// Routing service the course line is requested from
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct RoutingConfig {
    pub base_url: String,
    pub profile: String,
    /// Bounds how long the map waits before drawing the straight-line fallback
    pub timeout_s: u64,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            base_url: "https://router.project-osrm.org".to_string(),
            profile: "driving".to_string(),
            timeout_s: 10,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// Results file path or http(s) URL
    pub dataset: String,
    pub routing: RoutingConfig,
    pub tile_layer: TileLayer,
    pub center: LatLng,
    pub zoom: u8,
    pub fit_padding: f64,
    pub filter: CheckpointFilter,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            dataset: DEFAULT_DATASET.to_string(),
            routing: RoutingConfig::default(),
            tile_layer: TileLayer::default(),
            center: course::FINISH,
            zoom: DEFAULT_ZOOM,
            fit_padding: FIT_PADDING,
            filter: CheckpointFilter::default(),
        }
    }
}

impl AppConfig {
    /// Location of the per-user config file
    pub fn local_path() -> Option<PathBuf> {
        Some(
            dirs::config_dir()?
                .join(CONFIG_DIR_NAME)
                .join(CONFIG_FILE_NAME),
        )
    }

    pub fn from_path(path: &Path) -> Result<Self, NikromeError> {
        let file =
            std::fs::File::open(path).map_err(|e| NikromeError::ConfigIOError { source: e })?;
        let config = serde_json::from_reader(std::io::BufReader::new(file))
            .map_err(|e| NikromeError::ConfigSerializeError { source: e })?;
        debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Per-user config, `Ok(None)` when it has not been written yet
    pub fn from_local_file() -> Result<Option<Self>, NikromeError> {
        let Some(config_path) = Self::local_path() else {
            return Ok(None);
        };

        if config_path.exists() {
            Self::from_path(&config_path).map(Some)
        } else {
            Ok(None)
        }
    }

    /// Explicit file if given, else the per-user file, else defaults
    pub fn load(path: Option<&Path>) -> Result<Self, NikromeError> {
        match path {
            Some(path) => Self::from_path(path),
            None => Ok(Self::from_local_file()?.unwrap_or_default()),
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<(), NikromeError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|e| NikromeError::ConfigIOError { source: e })?;
        }

        let file =
            std::fs::File::create(path).map_err(|e| NikromeError::ConfigIOError { source: e })?;
        serde_json::to_writer_pretty(file, self)
            .map_err(|e| NikromeError::ConfigSerializeError { source: e })?;
        info!("Config written to {}", path.display());
        Ok(())
    }

    pub fn save(&self) -> Result<(), NikromeError> {
        let config_path = Self::local_path().ok_or(NikromeError::NoConfigDir)?;
        self.save_to(&config_path)
    }
}
