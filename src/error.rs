//! Error types for the transport and the bridge.

use core::fmt;

use thiserror::Error;
use uuid::Uuid;

/// Errors reported by a transport backend
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// No Bluetooth adapter on this host
    #[error("no Bluetooth adapter available")]
    NoAdapter,
    /// Device selection ended without a device
    #[error("no matching device found")]
    DeviceNotFound,
    /// The opened session does not expose the service
    #[error("service {0} not found")]
    ServiceNotFound(Uuid),
    /// The service does not expose the characteristic
    #[error("characteristic {0} not found")]
    CharacteristicNotFound(Uuid),
    /// Operation on a session that is not open
    #[error("device not connected")]
    NotConnected,
    /// Characteristic does not support the requested operation
    #[error("operation not supported: {0}")]
    NotSupported(String),
    /// The device or stack rejected a write
    #[error("write rejected: {0}")]
    WriteRejected(String),
    /// Anything else the platform stack reported
    #[error("{0}")]
    Backend(String),
}

/// Step of the connect sequence that failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectStage {
    SelectDevice,
    OpenSession,
    ResolveService,
    ResolveCharacteristic,
    SubscribeEvents,
}

impl fmt::Display for ConnectStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConnectStage::SelectDevice => "device selection",
            ConnectStage::OpenSession => "session open",
            ConnectStage::ResolveService => "service resolution",
            ConnectStage::ResolveCharacteristic => "characteristic resolution",
            ConnectStage::SubscribeEvents => "event subscription",
        };
        f.write_str(name)
    }
}

/// Errors surfaced by [`UartBridge`](crate::bridge::UartBridge)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BridgeError {
    #[error("Bluetooth is not supported on this host")]
    CapabilityUnavailable,

    #[error("{stage} failed: {source}")]
    ConnectionFailure {
        stage: ConnectStage,
        #[source]
        source: TransportError,
    },

    #[error("notifications not available: {0}")]
    NotificationUnavailable(#[source] TransportError),

    #[error("write of chunk {chunk} at offset {offset} failed: {source}")]
    TransferFailure {
        chunk: usize,
        offset: usize,
        #[source]
        source: TransportError,
    },

    #[error("a connection attempt is already in progress")]
    ConnectInProgress,
}

impl BridgeError {
    pub(crate) fn connect(stage: ConnectStage) -> impl FnOnce(TransportError) -> Self {
        move |source| BridgeError::ConnectionFailure { stage, source }
    }
}
