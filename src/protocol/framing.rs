//! Line accumulator for inbound UART text
//!
//! Accumulates notification bytes until a complete line (terminated by `\n`)
//! is received.

use crate::config::inbound::{LINE_TERMINATOR, MAX_LINE_LEN};
use heapless::Vec;

/// Accumulates incoming bytes and extracts complete lines.
///
/// Lines are delimited by `\n`. The accumulator buffers bytes until a
/// terminator is received, then returns the line without the terminator
/// (and without a trailing `\r`). Empty lines are returned too: on a text
/// link a blank line is data.
pub struct LineAccumulator {
    buffer: Vec<u8, MAX_LINE_LEN>,
    overflowed: bool,
}

impl LineAccumulator {
    /// Create a new empty line accumulator.
    pub fn new() -> Self {
        Self {
            buffer: Vec::new(),
            overflowed: false,
        }
    }

    /// Push a byte into the accumulator.
    ///
    /// Returns `Some(line)` when a terminator completes a line.
    /// Returns `None` if more bytes are needed or the line overflowed.
    pub fn push(&mut self, byte: u8) -> Option<Vec<u8, MAX_LINE_LEN>> {
        if byte == LINE_TERMINATOR {
            if self.overflowed {
                // Tail of an oversized line, drop it and start fresh
                self.overflowed = false;
                self.buffer.clear();
                return None;
            }

            let mut line = core::mem::replace(&mut self.buffer, Vec::new());
            if line.last() == Some(&b'\r') {
                line.pop();
            }
            return Some(line);
        }

        if self.overflowed {
            return None;
        }

        if self.buffer.push(byte).is_err() {
            // Buffer overflow - discard everything up to the next terminator
            log::warn!("Inbound line exceeds {} bytes, discarding", MAX_LINE_LEN);
            self.buffer.clear();
            self.overflowed = true;
        }

        None
    }

    /// Push a notification payload, collecting every line it completes.
    pub fn extend(&mut self, data: &[u8]) -> std::vec::Vec<Vec<u8, MAX_LINE_LEN>> {
        data.iter().filter_map(|&byte| self.push(byte)).collect()
    }

    /// Reset the accumulator, discarding any partial line.
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.overflowed = false;
    }

    /// Returns true if no partial line is in progress.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty() && !self.overflowed
    }

    /// Returns the current number of bytes in the buffer.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }
}

impl Default for LineAccumulator {
    fn default() -> Self {
        Self::new()
    }
}
