//! Command link: text verbs in, status lines out.
//!
//! Reads whatever the transport has, splits it into lines, decodes each line
//! once into a typed [`Command`] and pushes it into the command inbox.  The
//! link never touches the service directly.
//!
//! As an [`EventSink`] the link answers on the same channel: status reports
//! go out as one JSON object per line, `help` as the verb list.

use log::{debug, warn};

use crate::app::commands::Command;
use crate::app::events::AppEvent;
use crate::app::inbox::CommandSender;
use crate::app::ports::EventSink;

use super::codec::LineDecoder;
use super::transport::Transport;

/// Bytes pulled from the transport per read.
const READ_CHUNK: usize = 32;

pub struct CommandLink<T: Transport> {
    transport: T,
    decoder: LineDecoder,
    rejected: u32,
    write_failures: u32,
}

impl<T: Transport> CommandLink<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            decoder: LineDecoder::new(),
            rejected: 0,
            write_failures: 0,
        }
    }

    /// Drain the transport, forwarding every recognised verb to `inbox`.
    /// Returns the number of commands queued.
    pub fn poll(&mut self, inbox: &mut CommandSender<'_>) -> usize {
        let mut queued = 0;
        let mut chunk = [0u8; READ_CHUNK];
        loop {
            let n = match self.transport.read(&mut chunk) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) => {
                    warn!("link: read failed: {:?}", e);
                    self.decoder.reset();
                    break;
                }
            };
            for &byte in &chunk[..n] {
                let Some(line) = self.decoder.push(byte) else {
                    continue;
                };
                match Command::parse(&line) {
                    Ok(cmd) => {
                        debug!("link: {:?}", cmd);
                        if inbox.send(cmd) {
                            queued += 1;
                        }
                    }
                    Err(e) => {
                        self.rejected = self.rejected.saturating_add(1);
                        warn!("link: {}: {:?}", e, line.trim());
                    }
                }
            }
        }
        queued
    }

    /// Lines that did not decode to a command.
    pub fn rejected(&self) -> u32 {
        self.rejected
    }

    pub fn write_failures(&self) -> u32 {
        self.write_failures
    }

    fn send_line(&mut self, text: &str) {
        let result = self
            .transport
            .write(text.as_bytes())
            .and_then(|()| self.transport.write(b"\n"));
        if let Err(e) = result {
            self.write_failures = self.write_failures.saturating_add(1);
            warn!("link: write failed: {:?}", e);
        }
    }
}

impl<T: Transport> EventSink for CommandLink<T> {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Status(report) => match report.to_json() {
                Ok(json) => self.send_line(&json),
                Err(e) => warn!("link: status encode failed: {}", e),
            },
            AppEvent::Help(verbs) => {
                let list = verbs.join(" ");
                self.send_line(&list);
            }
            _ => {}
        }
    }
}
