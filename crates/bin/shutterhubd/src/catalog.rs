//! Catalog loading — the three JSON documents describing devices, device
//! groups, and schedules.
//!
//! The documents are read once at startup and validated entry by entry; a
//! malformed catalog aborts startup before anything is wired. Dangling
//! cross-references (a group naming an unknown device uid) are *not*
//! errors — they are dropped at resolution time.

use serde::de::DeserializeOwned;

use shutterhub_domain::device::{Device, DeviceGroup};
use shutterhub_domain::error::ShutterHubError;
use shutterhub_domain::schedule::Schedule;

use crate::config::PathsConfig;

/// The loaded catalog documents.
#[derive(Debug)]
pub struct Catalogs {
    pub devices: Vec<Device>,
    pub device_groups: Vec<DeviceGroup>,
    pub schedules: Vec<Schedule>,
}

impl Catalogs {
    /// Read and validate all three documents.
    ///
    /// # Errors
    ///
    /// Returns a [`CatalogError`] when a document cannot be read or parsed,
    /// or when an entry violates a domain invariant.
    pub fn load(paths: &PathsConfig) -> Result<Self, CatalogError> {
        let devices: Vec<Device> = read_json(&paths.devices)?;
        for device in &devices {
            device.validate().map_err(invalid(&paths.devices))?;
        }

        let device_groups: Vec<DeviceGroup> = read_json(&paths.device_groups)?;
        for group in &device_groups {
            group.validate().map_err(invalid(&paths.device_groups))?;
        }

        let schedules: Vec<Schedule> = read_json(&paths.schedules)?;
        for schedule in &schedules {
            schedule.validate().map_err(invalid(&paths.schedules))?;
        }

        Ok(Self {
            devices,
            device_groups,
            schedules,
        })
    }
}

fn read_json<T: DeserializeOwned>(path: &str) -> Result<T, CatalogError> {
    let content = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
        path: path.to_string(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| CatalogError::Parse {
        path: path.to_string(),
        source,
    })
}

fn invalid(path: &str) -> impl Fn(ShutterHubError) -> CatalogError {
    let path = path.to_string();
    move |source| CatalogError::Invalid {
        path: path.clone(),
        source,
    }
}

/// Catalog loading errors.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// The document could not be read.
    #[error("failed to read catalog {path}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// The document is not valid JSON for the expected shape.
    #[error("failed to parse catalog {path}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    /// An entry violates a domain invariant.
    #[error("invalid entry in catalog {path}")]
    Invalid {
        path: String,
        #[source]
        source: ShutterHubError,
    },
}
