//! Outbound transfer over the bound write characteristic

use log::{debug, error, warn};

use super::{lock, ConnectionState, UartBridge};
use crate::ble::transport::{Device, Transport};
use crate::error::BridgeError;
use crate::protocol::line::{chunks, terminate_line};

/// Result of a send that did not fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// No session was bound, nothing was written
    Skipped,
    /// Every chunk was written
    Sent { chunks: usize, bytes: usize },
}

impl<T: Transport> UartBridge<T> {
    /// Send one line of text.
    ///
    /// A terminator is appended if missing, the UTF-8 bytes are split into
    /// profile-sized chunks and each chunk is written only after the previous
    /// write resolved. The first rejected write aborts the transfer.
    ///
    /// Separate calls are not serialised against each other.
    pub async fn send(&self, text: &str) -> Result<SendOutcome, BridgeError> {
        let link = match &*lock(&self.state) {
            ConnectionState::Connected(session) => Some((
                session.device.clone(),
                session.outbound.clone(),
                session.write_mode,
                session.profile.max_chunk_size,
            )),
            _ => None,
        };

        let Some((device, outbound, mode, max_chunk_size)) = link else {
            warn!("send called but not connected");
            return Ok(SendOutcome::Skipped);
        };

        let line = terminate_line(text);
        let data = line.as_bytes();

        let mut written = 0;
        let mut offset = 0;
        for (index, chunk) in chunks(data, max_chunk_size).enumerate() {
            device
                .write(&outbound, chunk, mode)
                .await
                .map_err(|source| BridgeError::TransferFailure {
                    chunk: index,
                    offset,
                    source,
                })?;
            written += 1;
            offset += chunk.len();
        }

        debug!("TX => {:?}", line);
        Ok(SendOutcome::Sent {
            chunks: written,
            bytes: data.len(),
        })
    }

    /// Send and only log failures.
    ///
    /// For callers that do not want transfer errors in their control flow.
    pub async fn send_or_log(&self, text: &str) {
        if let Err(err) = self.send(text).await {
            error!("UART write failed: {}", err);
        }
    }
}
