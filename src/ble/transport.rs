//! BLE central transport traits for abstraction and testability
//!
//! These traits define the slice of a platform Bluetooth API the bridge needs,
//! allowing the real btleplug backend to be swapped with a mock for testing.

use core::future::Future;

use futures::Stream;
use uuid::Uuid;

use crate::error::TransportError;

/// GATT write flavour
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// Acknowledged write request
    WithResponse,
    /// Write command, no acknowledgement from the device
    WithoutResponse,
}

/// Asynchronous event delivered by an open session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkEvent {
    /// A characteristic value changed on the device
    Notification { characteristic: Uuid, value: Vec<u8> },
    /// The session dropped
    Disconnected,
}

/// Hint passed to device selection
///
/// Backends may offer devices that match neither field; the bridge always
/// verifies the service after opening the session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceFilter {
    /// Services the device is expected to expose
    pub services: Vec<Uuid>,
    /// Advertised local name prefix
    pub name_prefix: Option<String>,
}

/// Host Bluetooth capability
pub trait Transport {
    type Device: Device;

    /// Whether the host can do BLE at all
    fn is_available(&self) -> impl Future<Output = bool>;

    /// Select a device (scan, picker, ...). Does not open a session.
    fn request_device(
        &self,
        filter: &DeviceFilter,
    ) -> impl Future<Output = Result<Self::Device, TransportError>>;
}

/// A selected remote device and its GATT session
pub trait Device: Clone {
    /// Handle to a resolved characteristic
    type Characteristic: Clone;
    /// Stream of notifications and disconnection for this device
    type Events: Stream<Item = LinkEvent> + Unpin;

    /// Stable identifier for log output and event matching
    fn id(&self) -> String;

    /// Open the GATT session
    fn open(&self) -> impl Future<Output = Result<(), TransportError>>;

    /// Close the GATT session
    fn close(&self) -> impl Future<Output = Result<(), TransportError>>;

    /// Resolve a primary service
    fn has_service(&self, service: Uuid) -> impl Future<Output = Result<bool, TransportError>>;

    /// Resolve a characteristic within a service
    fn characteristic(
        &self,
        service: Uuid,
        uuid: Uuid,
    ) -> impl Future<Output = Result<Self::Characteristic, TransportError>>;

    /// Whether the characteristic accepts write commands
    fn supports_write_without_response(&self, characteristic: &Self::Characteristic) -> bool;

    /// Write one payload to a characteristic
    ///
    /// Resolves once the stack has accepted (or the device acknowledged) the write.
    fn write(
        &self,
        characteristic: &Self::Characteristic,
        data: &[u8],
        mode: WriteMode,
    ) -> impl Future<Output = Result<(), TransportError>>;

    /// Enable value-change notifications
    fn subscribe(
        &self,
        characteristic: &Self::Characteristic,
    ) -> impl Future<Output = Result<(), TransportError>>;

    /// Disable value-change notifications
    fn unsubscribe(
        &self,
        characteristic: &Self::Characteristic,
    ) -> impl Future<Output = Result<(), TransportError>>;

    /// Event stream for this device
    fn events(&self) -> impl Future<Output = Result<Self::Events, TransportError>>;
}
