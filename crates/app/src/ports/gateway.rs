//! Gateway port — batched command execution and movement state against the
//! vendor home-automation gateway.

use std::fmt;
use std::future::Future;

use shutterhub_domain::command::CommandParameter;
use shutterhub_domain::error::GatewayError;
use shutterhub_domain::id::DeviceUrl;

/// One vendor command addressed to one device.
#[derive(Debug, Clone, PartialEq)]
pub struct GatewayCommand {
    pub device_url: DeviceUrl,
    pub name: String,
    pub parameters: Vec<CommandParameter>,
}

impl GatewayCommand {
    /// A command without parameters (`up`, `stop`, `my`, …).
    #[must_use]
    pub fn parameterless(device_url: DeviceUrl, name: impl Into<String>) -> Self {
        Self {
            device_url,
            name: name.into(),
            parameters: Vec::new(),
        }
    }

    /// A command carrying parameters (`setDeployment`).
    #[must_use]
    pub fn with_parameters(
        device_url: DeviceUrl,
        name: impl Into<String>,
        parameters: Vec<CommandParameter>,
    ) -> Self {
        Self {
            device_url,
            name: name.into(),
            parameters,
        }
    }
}

/// Identifier the gateway assigns to an accepted execution batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionId(pub String);

impl fmt::Display for ExecutionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Movement state of one device as reported by the gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayDeviceState {
    pub device_url: DeviceUrl,
    pub is_moving: bool,
}

/// Client for the vendor gateway.
///
/// Implementations live in adapter crates; tests use in-memory stubs.
/// Timeout behavior belongs to the implementation — callers never cancel
/// an in-flight call.
pub trait GatewayClient {
    /// Send one batched request executing all `commands` together.
    fn execute(
        &self,
        commands: Vec<GatewayCommand>,
    ) -> impl Future<Output = Result<ExecutionId, GatewayError>> + Send;

    /// Fetch the movement state of every device known to the gateway.
    fn list_devices(
        &self,
    ) -> impl Future<Output = Result<Vec<GatewayDeviceState>, GatewayError>> + Send;
}

impl<T: GatewayClient + Send + Sync> GatewayClient for std::sync::Arc<T> {
    fn execute(
        &self,
        commands: Vec<GatewayCommand>,
    ) -> impl Future<Output = Result<ExecutionId, GatewayError>> + Send {
        (**self).execute(commands)
    }

    fn list_devices(
        &self,
    ) -> impl Future<Output = Result<Vec<GatewayDeviceState>, GatewayError>> + Send {
        (**self).list_devices()
    }
}
