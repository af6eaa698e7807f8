//! Tick driver.
//!
//! [`Agitator`] owns everything the control loop touches: the service, the
//! hardware adapter, the debounced buttons and the consumer end of the
//! command inbox.  The firmware main loop calls [`Agitator::tick`] forever;
//! each tick runs, in order:
//!
//! 1. the oldest queued remote command, if any,
//! 2. the start (toggle) button, then the optional stop button,
//! 3. the phase check (run end, then phase timeout),
//! 4. the periodic status broadcast.
//!
//! A ramp started by any of these blocks the tick until it completes.  Only
//! one queued command runs per tick so the main loop feeds the watchdog
//! between motions; a burst of verbs drains over consecutive ticks.

use embedded_hal::digital::InputPin;
use log::info;

use crate::app::commands::Command;
use crate::app::inbox::CommandReceiver;
use crate::app::ports::{EventSink, MotorPort, TimePort};
use crate::app::service::AgitationService;
use crate::config::AgitatorConfig;
use crate::drivers::button::DebouncedInput;

pub struct Agitator<'q, HW, P> {
    service: AgitationService,
    hw: HW,
    start_button: DebouncedInput<P>,
    stop_button: Option<DebouncedInput<P>>,
    inbox: CommandReceiver<'q>,
}

impl<'q, HW, P> Agitator<'q, HW, P>
where
    HW: MotorPort + TimePort,
    P: InputPin,
{
    /// Assemble the controller.  `config` is expected to be validated.
    pub fn new(
        config: AgitatorConfig,
        hw: HW,
        start_button: P,
        stop_button: Option<P>,
        inbox: CommandReceiver<'q>,
    ) -> Self {
        let window = config.debounce_ms;
        info!(
            "agitator: {} Hz, {} bit, cruise {:.1}%, fwd/rev {}/{} ms",
            config.pwm_frequency_hz,
            config.pwm_resolution_bits,
            config.cruise_percent,
            config.timings.forward_run_ms,
            config.timings.reverse_run_ms,
        );
        Self {
            service: AgitationService::new(config),
            hw,
            start_button: DebouncedInput::with_window(start_button, window),
            stop_button: stop_button.map(|pin| DebouncedInput::with_window(pin, window)),
            inbox,
        }
    }

    /// One pass of the control loop.
    pub fn tick(&mut self, sink: &mut impl EventSink) {
        if let Some(cmd) = self.inbox.recv() {
            self.service.handle_command(cmd, &mut self.hw, sink);
        }

        if self.start_button.poll(self.hw.now_ms()) {
            info!("button: start/stop");
            self.service.handle_command(Command::Toggle, &mut self.hw, sink);
        }
        let stop_pressed = match self.stop_button.as_mut() {
            Some(button) => button.poll(self.hw.now_ms()),
            None => false,
        };
        if stop_pressed {
            info!("button: stop");
            self.service.handle_command(Command::StopCoast, &mut self.hw, sink);
        }

        self.service.tick(&mut self.hw, sink);
    }

    /// Execute a command immediately, bypassing the inbox.
    pub fn handle(&mut self, cmd: Command, sink: &mut impl EventSink) {
        self.service.handle_command(cmd, &mut self.hw, sink);
    }

    /// Commands still waiting in the inbox.
    pub fn queued(&self) -> usize {
        self.inbox.pending()
    }

    pub fn service(&self) -> &AgitationService {
        &self.service
    }

    pub fn hw(&self) -> &HW {
        &self.hw
    }

    pub fn hw_mut(&mut self) -> &mut HW {
        &mut self.hw
    }
}
