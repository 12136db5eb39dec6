//! Command dispatcher — terminal consumer of command events.
//!
//! Subscribes once, at startup, to every command topic and translates each
//! incoming event into one batched gateway call. Execution is
//! fire-and-forget: the handler spawns a task and returns immediately, and
//! gateway failures are logged, never retried and never re-raised. The
//! "my" command carries a safety interlock: if any requested shutter is
//! already moving, "stop" is sent instead.

use std::sync::Arc;

use shutterhub_domain::command::{CommandParameter, Topic};
use shutterhub_domain::event::{CommandEvent, DeploymentTarget};
use shutterhub_domain::id::DeviceUrl;

use crate::event_bus::{EventBus, Subscription};
use crate::ports::{GatewayClient, GatewayCommand};

/// Dispatches command events against the vendor gateway.
pub struct CommandDispatcher<G> {
    gateway: Arc<G>,
}

impl<G> CommandDispatcher<G>
where
    G: GatewayClient + Send + Sync + 'static,
{
    /// Create a new dispatcher around the given gateway client.
    pub fn new(gateway: G) -> Self {
        Self {
            gateway: Arc::new(gateway),
        }
    }

    /// Subscribe to all command topics on `bus`.
    ///
    /// Returns the subscriptions; dropping them does not unsubscribe, so
    /// the caller may simply hold or discard them.
    pub fn start(&self, bus: &EventBus) -> Vec<Subscription> {
        Topic::ALL
            .iter()
            .map(|&topic| {
                let gateway = Arc::clone(&self.gateway);
                bus.subscribe(topic, move |topic, event| {
                    let gateway = Arc::clone(&gateway);
                    let event = event.clone();
                    // Fire-and-forget: the publisher never waits for, or
                    // observes, the gateway call.
                    tokio::spawn(async move {
                        dispatch(gateway.as_ref(), topic, event).await;
                    });
                })
            })
            .collect()
    }
}

async fn dispatch<G: GatewayClient>(gateway: &G, topic: Topic, event: CommandEvent) {
    match (topic, event) {
        (Topic::My, CommandEvent::Devices(devices)) => execute_my(gateway, devices).await,
        (Topic::SetDeployment, CommandEvent::Deployment(targets)) => {
            execute_deployment(gateway, targets).await;
        }
        (
            topic @ (Topic::Up | Topic::Down | Topic::Stop | Topic::Wink | Topic::Identify),
            CommandEvent::Devices(devices),
        ) => execute_plain(gateway, topic.command_name(), devices).await,
        (topic, _) => {
            tracing::debug!(%topic, "dropping command event with mismatched payload shape");
        }
    }
}

/// Up/Down/Stop/Wink/Identify: one parameterless command per device, one
/// batched call.
async fn execute_plain<G: GatewayClient>(gateway: &G, command: &str, devices: Vec<DeviceUrl>) {
    if devices.is_empty() {
        return;
    }
    let commands = devices
        .into_iter()
        .map(|device_url| GatewayCommand::parameterless(device_url, command))
        .collect();
    execute_logged(gateway, command, commands).await;
}

/// "my" returns shutters to their favorite position, which is undesirable
/// while they are moving — so movement state is checked first and "stop"
/// substituted when anything in the requested set is in motion. A failed
/// movement query suppresses the command entirely.
async fn execute_my<G: GatewayClient>(gateway: &G, devices: Vec<DeviceUrl>) {
    if devices.is_empty() {
        return;
    }

    let states = match gateway.list_devices().await {
        Ok(states) => states,
        Err(err) => {
            tracing::error!(error = %err, "movement-state query failed, dropping \"my\" command");
            return;
        }
    };

    let any_moving = states
        .iter()
        .any(|state| state.is_moving && devices.contains(&state.device_url));

    let command = if any_moving {
        tracing::info!("sending \"stop\" instead of \"my\" because at least one shutter is moving");
        "stop"
    } else {
        "my"
    };

    let commands = devices
        .into_iter()
        .map(|device_url| GatewayCommand::parameterless(device_url, command))
        .collect();
    execute_logged(gateway, command, commands).await;
}

/// setDeployment: one command per device, each carrying its percentage as
/// the single parameter.
async fn execute_deployment<G: GatewayClient>(gateway: &G, targets: Vec<DeploymentTarget>) {
    if targets.is_empty() {
        return;
    }
    let command = Topic::SetDeployment.command_name();
    let commands = targets
        .into_iter()
        .map(|target| {
            GatewayCommand::with_parameters(
                target.device_url,
                command,
                vec![CommandParameter::Number(i64::from(target.percentage))],
            )
        })
        .collect();
    execute_logged(gateway, command, commands).await;
}

async fn execute_logged<G: GatewayClient>(
    gateway: &G,
    command: &str,
    commands: Vec<GatewayCommand>,
) {
    match gateway.execute(commands).await {
        Ok(execution) => {
            tracing::info!(command, %execution, "command sent to gateway");
        }
        Err(err) => {
            tracing::error!(command, error = %err, "failed to send command");
        }
    }
}
