//! tsgate gateway library entry.
//!
//! Wires config, the datastore backends, the timeseries service, and the HTTP
//! transport into one axum application. Consumed by the binary (`main.rs`) and
//! by integration tests.

pub mod app_state;
pub mod config;
pub mod obs;
pub mod ops;
pub mod router;
pub mod services;
pub mod store;
pub mod transport;
