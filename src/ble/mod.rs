//! Bluetooth Low Energy module
//!
//! Provides the UART-over-GATT profiles and the central transport the bridge
//! drives, with a btleplug backend for real adapters.

#[cfg(feature = "hardware")]
pub mod btle;
pub mod profile;
pub mod transport;

pub use profile::{ConnectionProfile, ProfileSelection, MICROBIT_UART, NORDIC_UART};
pub use transport::{Device, DeviceFilter, LinkEvent, Transport, WriteMode};
