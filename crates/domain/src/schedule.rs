//! Schedules — fixed-time and solar-event trigger rules.
//!
//! A schedule fires a command at a moment in time: either a fixed time of
//! day in a named timezone, or a named solar event at a geocoordinate. The
//! two shapes form a tagged union discriminated by `type` in the catalog
//! documents; evaluation sites match exhaustively so a new schedule kind
//! cannot be silently ignored.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, Timelike, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::command::Command;
use crate::error::{ShutterHubError, ValidationError};
use crate::id::{GroupUid, ScheduleUid};
use crate::sun::{Coordinates, SolarEvent};

/// A trigger rule loaded from the schedule catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Schedule {
    /// Fires at a fixed local time of day.
    #[serde(rename = "fixed_time")]
    FixedTime(FixedTimeSchedule),
    /// Fires at a named solar event.
    #[serde(rename = "suncalc")]
    SunCalc(SunCalcSchedule),
}

/// Fixed time-of-day schedule, evaluated in its own timezone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FixedTimeSchedule {
    pub uid: ScheduleUid,
    pub dow: Vec<String>,
    pub device_groups: Vec<GroupUid>,
    pub command: Command,
    pub time: TimeOfDay,
    pub timezone: Tz,
}

/// Solar-event schedule, evaluated at a geocoordinate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SunCalcSchedule {
    pub uid: ScheduleUid,
    pub dow: Vec<String>,
    pub device_groups: Vec<GroupUid>,
    pub command: Command,
    pub kind: SolarEvent,
    pub coordinates: Coordinates,
}

impl Schedule {
    /// The schedule's uid.
    #[must_use]
    pub fn uid(&self) -> &ScheduleUid {
        match self {
            Self::FixedTime(s) => &s.uid,
            Self::SunCalc(s) => &s.uid,
        }
    }

    /// Configured weekday short-names.
    #[must_use]
    pub fn dow(&self) -> &[String] {
        match self {
            Self::FixedTime(s) => &s.dow,
            Self::SunCalc(s) => &s.dow,
        }
    }

    /// Device groups addressed when this schedule fires.
    #[must_use]
    pub fn device_groups(&self) -> &[GroupUid] {
        match self {
            Self::FixedTime(s) => &s.device_groups,
            Self::SunCalc(s) => &s.device_groups,
        }
    }

    /// The command fired by this schedule.
    #[must_use]
    pub fn command(&self) -> &Command {
        match self {
            Self::FixedTime(s) => &s.command,
            Self::SunCalc(s) => &s.command,
        }
    }

    /// Whether this is a fixed-time schedule (these are evaluated before
    /// solar schedules within a tick).
    #[must_use]
    pub fn is_fixed_time(&self) -> bool {
        matches!(self, Self::FixedTime(_))
    }

    /// Whether this schedule's trigger condition holds at `now`.
    ///
    /// Matching is minute-wide: seconds and sub-seconds are ignored, so a
    /// short-enough tick interval sees at least one matching tick per
    /// qualifying minute. Idempotence within the minute is the caller's
    /// debounce concern.
    #[must_use]
    pub fn matches_at(&self, now: DateTime<Utc>) -> bool {
        match self {
            Self::FixedTime(s) => s.matches_at(now),
            Self::SunCalc(s) => s.matches_at(now),
        }
    }

    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`ShutterHubError::Validation`] when `uid` is empty.
    pub fn validate(&self) -> Result<(), ShutterHubError> {
        if self.uid().is_empty() {
            return Err(ValidationError::EmptyUid.into());
        }
        Ok(())
    }
}

impl FixedTimeSchedule {
    fn matches_at(&self, now: DateTime<Utc>) -> bool {
        let zoned = now.with_timezone(&self.timezone);
        dow_contains(&self.dow, zoned.weekday().to_string())
            && zoned.hour() == u32::from(self.time.hour)
            && zoned.minute() == u32::from(self.time.minute)
    }
}

impl SunCalcSchedule {
    fn matches_at(&self, now: DateTime<Utc>) -> bool {
        if !dow_contains(&self.dow, now.weekday().to_string()) {
            return false;
        }
        // An event that does not occur on this date/latitude is simply
        // no match, never an error.
        let Some(event_time) = self.kind.time_on(now, self.coordinates) else {
            return false;
        };
        now.hour() == event_time.hour() && now.minute() == event_time.minute()
    }
}

/// Weekday matching is case-insensitive: both sides are lowercased.
fn dow_contains(dow: &[String], weekday_short: String) -> bool {
    let weekday = weekday_short.to_lowercase();
    dow.iter().any(|day| day.to_lowercase() == weekday)
}

impl fmt::Display for Schedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FixedTime(s) => write!(f, "fixed_time({} {})", s.time, s.timezone),
            Self::SunCalc(s) => write!(f, "suncalc({:?})", s.kind),
        }
    }
}

/// A wall-clock time of day, parsed from `"HH:MM"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TimeOfDay {
    pub hour: u8,
    pub minute: u8,
}

impl FromStr for TimeOfDay {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ValidationError::InvalidTime(s.to_string());
        let (hour, minute) = s.split_once(':').ok_or_else(invalid)?;
        let hour: u8 = hour.parse().map_err(|_| invalid())?;
        let minute: u8 = minute.parse().map_err(|_| invalid())?;
        if hour > 23 || minute > 59 {
            return Err(invalid());
        }
        Ok(Self { hour, minute })
    }
}

impl TryFrom<String> for TimeOfDay {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TimeOfDay> for String {
    fn from(value: TimeOfDay) -> Self {
        value.to_string()
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}
