//! Outbound line encoding
//!
//! Turns caller text into newline-terminated UTF-8 and splits it into
//! write-sized chunks.

use crate::config::inbound::LINE_TERMINATOR;

/// Ensure the text ends with a line terminator.
///
/// Only a missing terminator is corrected; text that already ends with one
/// (or several) is returned unchanged.
pub fn terminate_line(text: &str) -> String {
    let mut line = String::with_capacity(text.len() + 1);
    line.push_str(text);
    if !text.as_bytes().ends_with(&[LINE_TERMINATOR]) {
        line.push(LINE_TERMINATOR as char);
    }
    line
}

/// Terminate and encode a line as UTF-8 bytes
pub fn encode_line(text: &str) -> Vec<u8> {
    terminate_line(text).into_bytes()
}

/// Split bytes into consecutive chunks of at most `max_chunk_size`.
///
/// The last chunk may be shorter. Yields nothing for empty input, which
/// cannot happen for an encoded line.
pub fn chunks(data: &[u8], max_chunk_size: usize) -> core::slice::Chunks<'_, u8> {
    // A zero size would panic in slice::chunks; profiles reject it on construction
    data.chunks(max_chunk_size.max(1))
}

/// Number of chunks `len` bytes split into
pub fn chunk_count(len: usize, max_chunk_size: usize) -> usize {
    len.div_ceil(max_chunk_size.max(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminator_appended() {
        assert_eq!(terminate_line("hello"), "hello\n");
        assert_eq!(terminate_line(""), "\n");
    }

    #[test]
    fn test_existing_terminator_kept() {
        assert_eq!(terminate_line("hello\n"), "hello\n");
        // Multiple trailing terminators remain as given
        assert_eq!(terminate_line("hello\n\n"), "hello\n\n");
        // A carriage return alone is not a terminator
        assert_eq!(terminate_line("hello\r"), "hello\r\n");
    }

    #[test]
    fn test_encode_utf8() {
        assert_eq!(encode_line("héllo"), "héllo\n".as_bytes());
        assert_eq!(encode_line("").len(), 1);
    }

    #[test]
    fn test_chunking_sizes() {
        let data = encode_line(&"x".repeat(25));
        assert_eq!(data.len(), 26);

        let lengths: Vec<usize> = chunks(&data, 20).map(|c| c.len()).collect();
        assert_eq!(lengths, vec![20, 6]);
        assert_eq!(chunk_count(data.len(), 20), 2);
    }

    #[test]
    fn test_chunking_reassembles_in_order() {
        for n in [1usize, 19, 20, 21, 40, 41, 100] {
            let data: Vec<u8> = (0..n).map(|i| i as u8).collect();
            let parts: Vec<&[u8]> = chunks(&data, 20).collect();

            assert_eq!(parts.len(), chunk_count(n, 20), "n = {}", n);
            assert!(parts.iter().all(|p| !p.is_empty() && p.len() <= 20));
            assert_eq!(parts.concat(), data);
        }
    }

    #[test]
    fn test_single_chunk_for_short_line() {
        let data = encode_line("hello");
        let parts: Vec<&[u8]> = chunks(&data, 20).collect();
        assert_eq!(parts, vec![b"hello\n".as_slice()]);
    }
}
