//! Inbound notification decoding and event dispatch

use futures::StreamExt;
use log::{debug, info};
use uuid::Uuid;

use super::{lock, ConnectionState, UartBridge};
use crate::ble::transport::{LinkEvent, Transport};
use crate::protocol::framing::LineAccumulator;

/// How notifications become observer calls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InboundMode {
    /// One call per notification, whatever it contains
    #[default]
    Raw,
    /// One call per complete `\n`-terminated line
    Lines,
}

/// Turns notification payloads into text
pub struct InboundDecoder {
    mode: InboundMode,
    session: u64,
    accumulator: LineAccumulator,
}

impl InboundDecoder {
    pub fn new(mode: InboundMode) -> Self {
        Self {
            mode,
            session: 0,
            accumulator: LineAccumulator::new(),
        }
    }

    pub fn mode(&self) -> InboundMode {
        self.mode
    }

    /// Attach reassembly state to a session, dropping leftovers from the last one
    pub fn bind(&mut self, session: u64) {
        if self.session != session {
            self.accumulator.reset();
            self.session = session;
        }
    }

    /// Discard any partial line
    pub fn reset(&mut self) {
        self.accumulator.reset();
    }

    /// Decode one payload into zero or more text units
    pub fn decode(&mut self, payload: &[u8]) -> Vec<String> {
        match self.mode {
            InboundMode::Raw => vec![String::from_utf8_lossy(payload).into_owned()],
            InboundMode::Lines => self
                .accumulator
                .extend(payload)
                .iter()
                .map(|line| String::from_utf8_lossy(line).into_owned())
                .collect(),
        }
    }
}

impl<T: Transport> UartBridge<T> {
    /// Deliver a characteristic value change from the device.
    ///
    /// Values for anything but the bound inbound characteristic are ignored.
    /// An empty payload decodes to an empty string.
    pub fn handle_notification(&self, characteristic: Uuid, value: &[u8]) {
        let bound = match &*lock(&self.state) {
            ConnectionState::Connected(session) => session.profile.inbound == characteristic,
            _ => false,
        };
        if !bound {
            debug!("ignoring notification from {}", characteristic);
            return;
        }

        let texts = lock(&self.inbound).decode(value);
        let hook = lock(&self.observers).data.clone();

        for text in texts {
            match &hook {
                Some(hook) => {
                    debug!("RX <= {:?}", text);
                    hook(&text);
                }
                None => info!("RX <= {:?}", text),
            }
        }
    }

    /// Drive the current session's event stream until it disconnects.
    ///
    /// Returns immediately when not connected or when another task is
    /// already running the stream.
    pub async fn run_events(&self) {
        let taken = match &mut *lock(&self.state) {
            ConnectionState::Connected(session) => {
                session.events.take().map(|events| (events, session.id))
            }
            _ => None,
        };

        let Some((mut events, session_id)) = taken else {
            debug!("no event stream to run");
            return;
        };

        while let Some(event) = events.next().await {
            match event {
                LinkEvent::Notification {
                    characteristic,
                    value,
                } => self.handle_notification(characteristic, &value),
                LinkEvent::Disconnected => break,
            }
        }

        // Either an explicit disconnect event or the backend dropped the stream
        self.drop_session(|session| session.id == session_id);
    }
}
