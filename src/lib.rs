//! Serial-over-BLE bridge to a micro:bit (or any Nordic UART device).
//!
//! Connect, send newline-terminated text in MTU-sized chunks, receive
//! notifications as text.

pub mod ble;
pub mod bridge;
pub mod config;
pub mod debug;
pub mod error;
pub mod protocol;

pub use bridge::{BridgeConfig, InboundMode, LinkStatus, SendOutcome, UartBridge};
pub use error::{BridgeError, ConnectStage, TransportError};
