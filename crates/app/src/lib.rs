//! # shutterhub-app
//!
//! Application layer — the event bus, the scheduler engine, the command
//! dispatcher, and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Provide the **in-process event bus** that decouples command producers
//!   (scheduler, REST gateway) from the command dispatcher
//! - Run the **scheduler engine**: tick, match trigger conditions, debounce,
//!   resolve device groups, publish command events
//! - Run the **command dispatcher**: consume command events and execute them
//!   against the vendor gateway, fire-and-forget
//! - Define the **gateway port** that the vendor adapter implements
//!
//! ## Dependency rule
//! Depends on `shutterhub-domain` only (plus `tokio` for timers and task
//! spawning). Never imports adapter crates. Adapters depend on *this* crate,
//! not the reverse.

pub mod dispatcher;
pub mod event_bus;
pub mod ports;
pub mod scheduler;
