//! Application core: pure domain logic, zero I/O.
//!
//! This module contains the business rules for the agitator: run start and
//! stop, the forward/reverse cycle, manual jogs and the bench diagnostics.
//! All interaction with hardware happens through **port traits** defined
//! in [`ports`], keeping this layer fully testable without real peripherals.

pub mod commands;
pub mod events;
pub mod inbox;
pub mod ports;
pub mod service;
