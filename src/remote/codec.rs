//! Newline-delimited text codec.
//!
//! Wire format:
//! ```text
//! ┌──────────────────────────┬────┐
//! │ verb text (≤ 64 B, UTF-8)│ \n │
//! └──────────────────────────┴────┘
//! ```
//!
//! The decoder accumulates incoming bytes and yields complete lines.  A
//! single `Transport::read` may return part of a line or several lines at
//! once.  A line that outgrows the buffer is dropped whole: everything up
//! to the next newline is discarded.

use heapless::{String, Vec};
use log::warn;

/// Maximum line length, excluding the newline.
pub const MAX_LINE_LEN: usize = 64;

/// One decoded line.
pub type Line = String<MAX_LINE_LEN>;

/// Streaming line decoder.
pub struct LineDecoder {
    buf: Vec<u8, MAX_LINE_LEN>,
    /// Current line overflowed; skip until newline.
    discarding: bool,
    dropped: u32,
}

impl Default for LineDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl LineDecoder {
    pub const fn new() -> Self {
        Self {
            buf: Vec::new(),
            discarding: false,
            dropped: 0,
        }
    }

    /// Feed one byte.  Returns a line when `byte` completes one.
    ///
    /// Blank lines are skipped; `\r` is left for the verb parser to trim.
    pub fn push(&mut self, byte: u8) -> Option<Line> {
        if byte == b'\n' {
            if self.discarding {
                self.discarding = false;
                return None;
            }
            let bytes = core::mem::take(&mut self.buf);
            if bytes.iter().all(u8::is_ascii_whitespace) {
                return None;
            }
            return match String::from_utf8(bytes) {
                Ok(line) => Some(line),
                Err(_) => {
                    self.dropped = self.dropped.saturating_add(1);
                    warn!("codec: dropping non-UTF-8 line");
                    None
                }
            };
        }

        if self.discarding {
            return None;
        }
        if self.buf.push(byte).is_err() {
            self.buf.clear();
            self.discarding = true;
            self.dropped = self.dropped.saturating_add(1);
            warn!("codec: line longer than {} bytes dropped", MAX_LINE_LEN);
        }
        None
    }

    /// Lines dropped for length or encoding.
    pub fn dropped(&self) -> u32 {
        self.dropped
    }

    /// Discard any partial line.
    pub fn reset(&mut self) {
        self.buf.clear();
        self.discarding = false;
    }
}
