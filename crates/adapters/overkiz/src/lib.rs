//! # shutterhub-adapter-overkiz
//!
//! Gateway adapter for a TaHoma/Overkiz-style enduser HTTP API.
//!
//! ## Responsibilities
//! - Implement the [`GatewayClient`] port over HTTP (`reqwest`)
//! - Batch commands into a single `exec/apply` request
//! - Derive per-device movement state from the `core:MovingState` entry in
//!   the gateway's `setup/devices` listing
//! - Map transport failures, non-success statuses, and undecodable bodies
//!   onto [`GatewayError`]
//!
//! ## Dependency rule
//! Depends on `shutterhub-app` (port traits) and `shutterhub-domain` only.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use shutterhub_app::ports::{ExecutionId, GatewayClient, GatewayCommand, GatewayDeviceState};
use shutterhub_domain::command::CommandParameter;
use shutterhub_domain::error::GatewayError;
use shutterhub_domain::id::DeviceUrl;

const API_ROOT: &str = "enduser-mobile-web/1/enduserAPI";
const MOVING_STATE: &str = "core:MovingState";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Connection settings for the vendor gateway.
#[derive(Debug, Clone)]
pub struct OverkizConfig {
    /// Host (and optional port) of the gateway, without scheme.
    pub host: String,
    /// Value sent as the `X-Auth-Token` header.
    pub api_key: String,
}

/// HTTP client for the vendor gateway.
#[derive(Clone)]
pub struct OverkizClient {
    http: reqwest::Client,
    config: OverkizConfig,
}

impl OverkizClient {
    /// Create a client with a bounded request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Transport`] when the underlying HTTP client
    /// cannot be constructed.
    pub fn new(config: OverkizConfig) -> Result<Self, GatewayError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|err| GatewayError::Transport(err.to_string()))?;
        Ok(Self { http, config })
    }

    fn url(&self, path: &str) -> String {
        format!("http://{}/{API_ROOT}/{path}", self.config.host)
    }
}

impl GatewayClient for OverkizClient {
    async fn execute(&self, commands: Vec<GatewayCommand>) -> Result<ExecutionId, GatewayError> {
        let body = ExecRequest {
            actions: commands.into_iter().map(Action::from).collect(),
        };
        let response = self
            .http
            .post(self.url("exec/apply"))
            .header("X-Auth-Token", &self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|err| GatewayError::Transport(err.to_string()))?;
        let response = check_status(response)?;
        let parsed: ExecResponse = response
            .json()
            .await
            .map_err(|err| GatewayError::Decode(err.to_string()))?;
        Ok(ExecutionId(parsed.exec_id))
    }

    async fn list_devices(&self) -> Result<Vec<GatewayDeviceState>, GatewayError> {
        let response = self
            .http
            .get(self.url("setup/devices"))
            .header("X-Auth-Token", &self.config.api_key)
            .send()
            .await
            .map_err(|err| GatewayError::Transport(err.to_string()))?;
        let response = check_status(response)?;
        let entries: Vec<DeviceEntry> = response
            .json()
            .await
            .map_err(|err| GatewayError::Decode(err.to_string()))?;
        Ok(entries.into_iter().map(device_state).collect())
    }
}

fn check_status(response: reqwest::Response) -> Result<reqwest::Response, GatewayError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(GatewayError::Status(status.as_u16()))
    }
}

fn device_state(entry: DeviceEntry) -> GatewayDeviceState {
    let is_moving = entry
        .states
        .iter()
        .find(|state| state.name == MOVING_STATE)
        .is_some_and(|state| is_truthy(&state.value));
    GatewayDeviceState {
        device_url: entry.device_url,
        is_moving,
    }
}

/// The gateway reports `core:MovingState` as a number or boolean; a missing
/// or null entry means the device is not moving.
fn is_truthy(value: &serde_json::Value) -> bool {
    match value {
        serde_json::Value::Null => false,
        serde_json::Value::Bool(b) => *b,
        serde_json::Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        serde_json::Value::String(s) => !s.is_empty(),
        serde_json::Value::Array(_) | serde_json::Value::Object(_) => true,
    }
}

// ── Wire shapes ────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct ExecRequest {
    actions: Vec<Action>,
}

#[derive(Serialize)]
struct Action {
    #[serde(rename = "deviceURL")]
    device_url: DeviceUrl,
    commands: Vec<ActionCommand>,
}

#[derive(Serialize)]
struct ActionCommand {
    name: String,
    parameters: Vec<CommandParameter>,
}

impl From<GatewayCommand> for Action {
    fn from(command: GatewayCommand) -> Self {
        Self {
            device_url: command.device_url,
            commands: vec![ActionCommand {
                name: command.name,
                parameters: command.parameters,
            }],
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ExecResponse {
    exec_id: String,
}

#[derive(Deserialize)]
struct DeviceEntry {
    #[serde(rename = "deviceURL")]
    device_url: DeviceUrl,
    #[serde(default)]
    states: Vec<StateEntry>,
}

#[derive(Deserialize)]
struct StateEntry {
    name: String,
    #[serde(default)]
    value: serde_json::Value,
}
