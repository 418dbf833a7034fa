// Line framing for a polled byte stream
//
// Serial reads return whatever bytes happen to be available. Nothing is handed
// to the parser until its '\n' has arrived.

use tracing::warn;

/// Longest line kept before the buffer is discarded as garbage
pub const MAX_LINE_LEN: usize = 256;

#[derive(Debug, Default)]
pub struct LineBuffer {
    pending: Vec<u8>,
}

impl LineBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append raw bytes from the link
    pub fn extend(&mut self, bytes: &[u8]) {
        self.pending.extend_from_slice(bytes);
    }

    /// Take the next complete line, trimmed, if one has arrived.
    ///
    /// A partial line longer than MAX_LINE_LEN with no terminator in sight is
    /// dropped so a noisy link cannot grow the buffer without bound.
    pub fn next_line(&mut self) -> Option<String> {
        match self.pending.iter().position(|&b| b == b'\n') {
            Some(end) => {
                let raw: Vec<u8> = self.pending.drain(..=end).collect();
                Some(String::from_utf8_lossy(&raw).trim().to_string())
            }
            None => {
                if self.pending.len() > MAX_LINE_LEN {
                    warn!(
                        "Discarding {} bytes without line terminator",
                        self.pending.len()
                    );
                    self.pending.clear();
                }
                None
            }
        }
    }

    /// Bytes received that are not yet part of a complete line
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }
}
