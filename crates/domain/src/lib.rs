//! # shutterhub-domain
//!
//! Pure domain model for the shutterhub shutter-automation bridge.
//!
//! ## Responsibilities
//! - Foundational types: string-backed identifiers, error conventions, timestamps
//! - Define **Devices** (vendor-addressable shutters) and **Device groups**
//! - Define **Schedules** (fixed-time and solar-event trigger rules)
//! - Define **Commands** and the command-name → topic mapping
//! - Define **Command events** (the payloads carried on the event bus)
//! - Resolve device/group identifiers to vendor device URLs (the directory)
//! - Compute solar-event instants from date and coordinates
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod command;
pub mod device;
pub mod directory;
pub mod error;
pub mod event;
pub mod id;
pub mod schedule;
pub mod sun;
pub mod time;
