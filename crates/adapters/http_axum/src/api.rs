//! JSON REST handlers.
//!
//! Command posts accept device **uids** and resolve them to vendor
//! addresses through the directory before publishing — exactly the
//! contract the scheduler uses. Catalog views never expose vendor
//! addresses.

use axum::Json;
use axum::extract::State;
use serde::{Deserialize, Serialize};

use shutterhub_app::scheduler::fire_schedule;
use shutterhub_domain::command::{Command, Topic};
use shutterhub_domain::device::DeviceGroup;
use shutterhub_domain::directory::DeviceDirectory;
use shutterhub_domain::error::{NotFoundError, ShutterHubError};
use shutterhub_domain::event::CommandEvent;
use shutterhub_domain::id::{DeviceUid, GroupUid, ScheduleUid};
use shutterhub_domain::schedule::Schedule;

use crate::error::ApiError;
use crate::state::AppState;

/// Request body for the command endpoints.
#[derive(Deserialize)]
pub struct DevicesRequest {
    pub devices: Vec<DeviceUid>,
}

/// Request body for `/schedule/execute`.
#[derive(Deserialize)]
pub struct ExecuteScheduleRequest {
    pub schedule: ScheduleUid,
}

/// Uniform acknowledgement body.
#[derive(Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

/// A device as exposed by catalog views (no vendor address).
#[derive(Serialize)]
pub struct DeviceView {
    pub uid: DeviceUid,
    pub name: String,
}

/// A device group with member devices expanded.
#[derive(Serialize)]
pub struct DeviceGroupView {
    pub uid: GroupUid,
    pub name: String,
    pub devices: Vec<DeviceView>,
}

/// A schedule with its device groups expanded.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleView {
    pub uid: ScheduleUid,
    pub dow: Vec<String>,
    pub command: Command,
    pub trigger: String,
    pub device_groups: Vec<DeviceGroupView>,
}

fn group_view(directory: &DeviceDirectory, group: &DeviceGroup) -> DeviceGroupView {
    DeviceGroupView {
        uid: group.uid.clone(),
        name: group.name.clone(),
        devices: group
            .devices
            .iter()
            .filter_map(|uid| directory.device(uid))
            .map(|device| DeviceView {
                uid: device.uid.clone(),
                name: device.name.clone(),
            })
            .collect(),
    }
}

fn schedule_view(directory: &DeviceDirectory, schedule: &Schedule) -> ScheduleView {
    ScheduleView {
        uid: schedule.uid().clone(),
        dow: schedule.dow().to_vec(),
        command: schedule.command().clone(),
        trigger: schedule.to_string(),
        device_groups: schedule
            .device_groups()
            .iter()
            .filter_map(|uid| directory.group(uid))
            .map(|group| group_view(directory, group))
            .collect(),
    }
}

/// `GET /shutter/deviceGroups`
pub async fn list_device_groups(State(state): State<AppState>) -> Json<Vec<DeviceGroupView>> {
    let views = state
        .directory
        .groups()
        .iter()
        .map(|group| group_view(&state.directory, group))
        .collect();
    Json(views)
}

/// `GET /shutter/schedules`
pub async fn list_schedules(State(state): State<AppState>) -> Json<Vec<ScheduleView>> {
    let views = state
        .schedules
        .iter()
        .map(|schedule| schedule_view(&state.directory, schedule))
        .collect();
    Json(views)
}

/// `POST /schedule/execute` — fire a schedule immediately, bypassing its
/// trigger condition.
pub async fn execute_schedule(
    State(state): State<AppState>,
    Json(req): Json<ExecuteScheduleRequest>,
) -> Result<Json<SuccessResponse>, ApiError> {
    tracing::info!(schedule = %req.schedule, "received schedule execute command");

    let schedule = state
        .schedules
        .iter()
        .find(|schedule| schedule.uid() == &req.schedule)
        .ok_or_else(|| {
            ApiError::from(ShutterHubError::from(NotFoundError {
                entity: "Schedule",
                id: req.schedule.to_string(),
            }))
        })?;

    fire_schedule(schedule, &state.directory, &state.bus);
    Ok(Json(SuccessResponse { success: true }))
}

/// `POST /shutter/up`
pub async fn shutter_up(
    State(state): State<AppState>,
    Json(req): Json<DevicesRequest>,
) -> Json<SuccessResponse> {
    publish_command(&state, Topic::Up, &req.devices)
}

/// `POST /shutter/down`
pub async fn shutter_down(
    State(state): State<AppState>,
    Json(req): Json<DevicesRequest>,
) -> Json<SuccessResponse> {
    publish_command(&state, Topic::Down, &req.devices)
}

/// `POST /shutter/stop`
pub async fn shutter_stop(
    State(state): State<AppState>,
    Json(req): Json<DevicesRequest>,
) -> Json<SuccessResponse> {
    publish_command(&state, Topic::Stop, &req.devices)
}

/// `POST /shutter/wink`
pub async fn shutter_wink(
    State(state): State<AppState>,
    Json(req): Json<DevicesRequest>,
) -> Json<SuccessResponse> {
    publish_command(&state, Topic::Wink, &req.devices)
}

/// `POST /shutter/identify`
pub async fn shutter_identify(
    State(state): State<AppState>,
    Json(req): Json<DevicesRequest>,
) -> Json<SuccessResponse> {
    publish_command(&state, Topic::Identify, &req.devices)
}

/// `POST /shutter/my`
pub async fn shutter_my(
    State(state): State<AppState>,
    Json(req): Json<DevicesRequest>,
) -> Json<SuccessResponse> {
    publish_command(&state, Topic::My, &req.devices)
}

fn publish_command(state: &AppState, topic: Topic, devices: &[DeviceUid]) -> Json<SuccessResponse> {
    let uids = devices
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ");
    tracing::info!(command = topic.command_name(), devices = %uids, "received shutter command");

    let urls = state.directory.resolve_device_urls(devices);
    state.bus.publish(topic, &CommandEvent::Devices(urls));
    Json(SuccessResponse { success: true })
}
