//! Command events — the payloads carried on the event bus.
//!
//! An event exists only for the duration of one publish/dispatch cycle.
//! Six of the seven topics carry a plain device list; `setDeployment`
//! carries per-device target percentages.

use serde::{Deserialize, Serialize};

use crate::id::DeviceUrl;

/// Payload published on a command topic.
#[derive(Debug, Clone, PartialEq)]
pub enum CommandEvent {
    /// Device addresses for up/down/stop/my/wink/identify.
    Devices(Vec<DeviceUrl>),
    /// Device addresses with target deployment percentages.
    Deployment(Vec<DeploymentTarget>),
}

impl CommandEvent {
    /// Number of devices addressed by this event.
    #[must_use]
    pub fn device_count(&self) -> usize {
        match self {
            Self::Devices(devices) => devices.len(),
            Self::Deployment(targets) => targets.len(),
        }
    }
}

/// One device and the percentage it should deploy to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentTarget {
    pub device_url: DeviceUrl,
    pub percentage: u8,
}
