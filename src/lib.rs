//! # gatesim
//!
//! A digital logic simulation kernel. Gates and composite circuits are wired
//! together through named buses inside an [`Environment`] and evaluated to a
//! steady state each time their inputs change. Wired circuits can be
//! registered as blueprints and instantiated again by type name.
pub mod blueprint;
pub mod components;
pub mod configuration;
pub mod errors;
pub mod identity;
pub mod logging;
pub mod structures;

#[cfg(test)]
mod tests;

pub use blueprint::{Blueprint, BlueprintRegistry};
pub use components::{Circuit, Device, Endpoint, System, SystemData};
pub use errors::{SimError, SimResult};
pub use structures::{
    connection::{OutputPointer, SystemIdx},
    environment::Environment,
};
