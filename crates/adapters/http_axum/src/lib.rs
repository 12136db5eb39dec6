//! # shutterhub-adapter-http-axum
//!
//! HTTP adapter built on [axum](https://docs.rs/axum).
//!
//! ## Responsibilities
//! - Serve the REST API: catalog views (`/shutter/deviceGroups`,
//!   `/shutter/schedules`), command posts (`/shutter/up`, …), and manual
//!   schedule execution (`/schedule/execute`)
//! - Publish the **same command events** the scheduler publishes — this
//!   crate is just another producer on the event bus
//! - Guard everything except `/health` behind HTTP basic auth, with a
//!   configurable CORS allow-list
//!
//! ## Dependency rule
//! Depends on `shutterhub-app` (event bus, firing logic) and
//! `shutterhub-domain` (catalog types used in request/response mapping).
//! Never leaks axum types into the domain.

pub mod api;
pub mod error;
pub mod router;
pub mod state;
