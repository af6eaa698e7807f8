//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the ESP-IDF logger (which goes to UART / USB-CDC in production).
//! The remote link implements the same trait for its own channel.

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started { duration_ms: Some(ms) } => {
                info!("START | timed, {} s", ms / 1000);
            }
            AppEvent::Started { duration_ms: None } => {
                info!("START | continuous");
            }
            AppEvent::PhaseChanged { from, to } => {
                info!("PHASE | {} -> {}", from.as_str(), to.as_str());
            }
            AppEvent::Stopped { braked } => {
                info!("STOP  | {}", if *braked { "brake" } else { "coast" });
            }
            AppEvent::CruiseChanged(pct) => {
                info!("CRUISE| {:.1}%", pct);
            }
            AppEvent::Jog(direction) => {
                info!("JOG   | {:?}", direction);
            }
            AppEvent::Diagnostic(output) => {
                warn!("DIAG  | {:?} (phase bookkeeping bypassed)", output);
            }
            AppEvent::Status(s) => {
                info!(
                    "STATUS| up={}ms running={} phase={} cruise={:.1}% out={:?} remaining={:?}",
                    s.uptime_ms,
                    s.is_running,
                    s.phase.as_str(),
                    s.cruise_percent,
                    s.output,
                    s.run_remaining_ms,
                );
            }
            AppEvent::CommandIgnored(cmd) => {
                info!("IGNORE| {:?}", cmd);
            }
            AppEvent::Help(verbs) => {
                info!("HELP  | {}", verbs.join(" "));
            }
        }
    }
}
