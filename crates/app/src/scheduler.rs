//! Scheduler engine — evaluates trigger conditions on a fixed-interval tick.
//!
//! Every tick captures the current instant and checks each schedule's
//! condition against it; fixed-time schedules are evaluated and fired before
//! solar schedules. Matching is minute-wide, so one qualifying minute spans
//! many ticks — a per-schedule leading-edge debounce guarantees a single
//! firing per window. Firing resolves device groups to vendor addresses and
//! publishes a command event; execution is somebody else's concern.

use std::sync::Arc;
use std::time::Duration;

use shutterhub_domain::command::Topic;
use shutterhub_domain::directory::DeviceDirectory;
use shutterhub_domain::event::{CommandEvent, DeploymentTarget};
use shutterhub_domain::schedule::Schedule;
use shutterhub_domain::time::{Timestamp, now};

use crate::event_bus::EventBus;

/// Default evaluation cadence. Must stay well under a minute so no
/// qualifying minute is missed.
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(500);

/// Default debounce window: one firing per qualifying minute, with slack
/// for tick jitter at minute boundaries.
pub const DEFAULT_DEBOUNCE_WINDOW: Duration = Duration::from_secs(60);

/// Tuning knobs for the scheduler.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    pub tick_interval: Duration,
    pub debounce_window: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            tick_interval: DEFAULT_TICK_INTERVAL,
            debounce_window: DEFAULT_DEBOUNCE_WINDOW,
        }
    }
}

/// Leading-edge debounce guard owned by a single schedule.
///
/// The first call inside a quiet period fires immediately; subsequent calls
/// within the window are suppressed. Holds a plain timestamp so tests can
/// drive it without timers.
#[derive(Debug)]
pub struct Debounce {
    window: chrono::Duration,
    last_fired: Option<Timestamp>,
}

impl Debounce {
    /// Create a guard with the given suppression window.
    #[must_use]
    pub fn new(window: Duration) -> Self {
        Self {
            window: chrono::Duration::from_std(window)
                .unwrap_or_else(|_| chrono::Duration::seconds(60)),
            last_fired: None,
        }
    }

    /// Whether a trigger at `now` should fire, recording it if so.
    pub fn should_fire(&mut self, now: Timestamp) -> bool {
        match self.last_fired {
            Some(last) if now - last < self.window => false,
            _ => {
                self.last_fired = Some(now);
                true
            }
        }
    }
}

struct ScheduledTask {
    schedule: Schedule,
    debounce: Debounce,
}

/// Periodic evaluator over the configured schedules.
pub struct SchedulerEngine {
    tasks: Vec<ScheduledTask>,
    directory: Arc<DeviceDirectory>,
    bus: EventBus,
    tick_interval: Duration,
}

impl SchedulerEngine {
    /// Create an engine over the loaded schedule catalog.
    #[must_use]
    pub fn new(
        schedules: Vec<Schedule>,
        directory: Arc<DeviceDirectory>,
        bus: EventBus,
        config: &SchedulerConfig,
    ) -> Self {
        let tasks = schedules
            .into_iter()
            .map(|schedule| ScheduledTask {
                schedule,
                debounce: Debounce::new(config.debounce_window),
            })
            .collect();
        Self {
            tasks,
            directory,
            bus,
            tick_interval: config.tick_interval,
        }
    }

    /// Run the tick loop forever. Intended to be spawned as its own task.
    pub async fn run(mut self) {
        let mut ticker = tokio::time::interval(self.tick_interval);
        loop {
            ticker.tick().await;
            self.evaluate_tick(now());
        }
    }

    /// One evaluation pass at the given instant.
    ///
    /// Exposed so tests can drive the engine without waiting on timers.
    /// Fixed-time schedules are evaluated and fired before solar schedules.
    pub fn evaluate_tick(&mut self, now: Timestamp) {
        let Self {
            tasks,
            directory,
            bus,
            ..
        } = self;

        for task in tasks.iter_mut().filter(|t| t.schedule.is_fixed_time()) {
            evaluate(task, now, directory, bus);
        }
        for task in tasks.iter_mut().filter(|t| !t.schedule.is_fixed_time()) {
            evaluate(task, now, directory, bus);
        }
    }
}

fn evaluate(task: &mut ScheduledTask, now: Timestamp, directory: &DeviceDirectory, bus: &EventBus) {
    if !task.schedule.matches_at(now) {
        return;
    }
    if !task.debounce.should_fire(now) {
        return;
    }
    fire_schedule(&task.schedule, directory, bus);
}

/// Resolve a schedule's device groups and publish its command event.
///
/// Shared by the tick loop and by manual execution through the REST API;
/// condition matching and debouncing are the caller's concern.
pub fn fire_schedule(schedule: &Schedule, directory: &DeviceDirectory, bus: &EventBus) {
    let command = schedule.command().name.as_str();
    let groups = schedule
        .device_groups()
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ");
    // Intent is logged even when resolution yields zero devices.
    tracing::info!(command, device_groups = %groups, "firing scheduled command");

    let Some(topic) = Topic::from_command_name(command) else {
        // Unmapped command names are configuration drift, not failure.
        return;
    };

    let urls = directory.resolve_groups_to_urls(schedule.device_groups());
    let event = match topic {
        Topic::SetDeployment => {
            let percentage = schedule
                .command()
                .first_number()
                .and_then(|n| u8::try_from(n).ok())
                .filter(|p| *p <= 100);
            let Some(percentage) = percentage else {
                tracing::debug!(
                    schedule = %schedule.uid(),
                    "setDeployment schedule without a valid percentage parameter"
                );
                return;
            };
            CommandEvent::Deployment(
                urls.into_iter()
                    .map(|device_url| DeploymentTarget {
                        device_url,
                        percentage,
                    })
                    .collect(),
            )
        }
        _ => CommandEvent::Devices(urls),
    };

    bus.publish(topic, &event);
}
