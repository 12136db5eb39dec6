//! Device — a vendor-addressable shutter — and device groups.
//!
//! Both are loaded once from the catalog documents at startup and are
//! read-only for the process lifetime.

use serde::{Deserialize, Serialize};

use crate::error::{ShutterHubError, ValidationError};
use crate::id::{DeviceUid, DeviceUrl, GroupUid};

/// A single shutter known to the vendor gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    pub uid: DeviceUid,
    pub name: String,
    pub device_url: DeviceUrl,
}

impl Device {
    /// Create a builder for constructing a [`Device`].
    #[must_use]
    pub fn builder() -> DeviceBuilder {
        DeviceBuilder::default()
    }

    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`ShutterHubError::Validation`] when `uid` or `name` is empty.
    pub fn validate(&self) -> Result<(), ShutterHubError> {
        if self.uid.is_empty() {
            return Err(ValidationError::EmptyUid.into());
        }
        if self.name.is_empty() {
            return Err(ValidationError::EmptyName.into());
        }
        Ok(())
    }
}

/// Step-by-step builder for [`Device`].
#[derive(Debug, Default)]
pub struct DeviceBuilder {
    uid: Option<DeviceUid>,
    name: Option<String>,
    device_url: Option<DeviceUrl>,
}

impl DeviceBuilder {
    #[must_use]
    pub fn uid(mut self, uid: impl Into<DeviceUid>) -> Self {
        self.uid = Some(uid.into());
        self
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn device_url(mut self, device_url: impl Into<DeviceUrl>) -> Self {
        self.device_url = Some(device_url.into());
        self
    }

    /// Consume the builder, validate, and return a [`Device`].
    ///
    /// # Errors
    ///
    /// Returns [`ShutterHubError::Validation`] if required fields are missing or empty.
    pub fn build(self) -> Result<Device, ShutterHubError> {
        let device = Device {
            uid: self.uid.unwrap_or_else(|| DeviceUid::new("")),
            name: self.name.unwrap_or_default(),
            device_url: self.device_url.unwrap_or_else(|| DeviceUrl::new("")),
        };
        device.validate()?;
        Ok(device)
    }
}

/// A named, ordered collection of device uids.
///
/// Member uids are not checked against the device table at load time;
/// unresolved references are dropped during resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceGroup {
    pub uid: GroupUid,
    pub name: String,
    pub devices: Vec<DeviceUid>,
}

impl DeviceGroup {
    /// Create a builder for constructing a [`DeviceGroup`].
    #[must_use]
    pub fn builder() -> DeviceGroupBuilder {
        DeviceGroupBuilder::default()
    }

    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`ShutterHubError::Validation`] when `uid` or `name` is empty.
    pub fn validate(&self) -> Result<(), ShutterHubError> {
        if self.uid.is_empty() {
            return Err(ValidationError::EmptyUid.into());
        }
        if self.name.is_empty() {
            return Err(ValidationError::EmptyName.into());
        }
        Ok(())
    }
}

/// Step-by-step builder for [`DeviceGroup`].
#[derive(Debug, Default)]
pub struct DeviceGroupBuilder {
    uid: Option<GroupUid>,
    name: Option<String>,
    devices: Vec<DeviceUid>,
}

impl DeviceGroupBuilder {
    #[must_use]
    pub fn uid(mut self, uid: impl Into<GroupUid>) -> Self {
        self.uid = Some(uid.into());
        self
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn device(mut self, uid: impl Into<DeviceUid>) -> Self {
        self.devices.push(uid.into());
        self
    }

    /// Consume the builder, validate, and return a [`DeviceGroup`].
    ///
    /// # Errors
    ///
    /// Returns [`ShutterHubError::Validation`] if required fields are missing or empty.
    pub fn build(self) -> Result<DeviceGroup, ShutterHubError> {
        let group = DeviceGroup {
            uid: self.uid.unwrap_or_else(|| GroupUid::new("")),
            name: self.name.unwrap_or_default(),
            devices: self.devices,
        };
        group.validate()?;
        Ok(group)
    }
}
