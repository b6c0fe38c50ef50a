//! hostpanel authentication daemon library.
//!
//! Exposes the credential store, gRPC services, request gate, and
//! configuration so integration tests can drive the production types
//! directly; the `hostpanel-authd` binary wires them to a listener.

pub mod config;
pub mod gate;
pub mod services;
pub mod store;
