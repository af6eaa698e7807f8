//! Film-tank agitator firmware: main entry point.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  HardwareAdapter     LogEventSink     CommandLink<UartTransport>│
//! │  (Motor+Time)        (EventSink)      (Transport + EventSink)  │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │  Agitator::tick  →  AgitationService (pure logic)      │    │
//! │  │  inbox · buttons · PhaseMachine · Ramps                │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use anyhow::Result;
use esp_idf_hal::delay::FreeRtos;
use esp_idf_hal::gpio::{AnyIOPin, AnyOutputPin};
use esp_idf_hal::ledc::config::TimerConfig;
use esp_idf_hal::ledc::{LedcDriver, LedcTimerDriver, Resolution};
use esp_idf_hal::peripherals::Peripherals;
use esp_idf_hal::uart::{UartDriver, config::Config as UartConfig};
use esp_idf_hal::units::Hertz;
use log::info;

use agitator::adapters::hardware::HardwareAdapter;
use agitator::adapters::log_sink::LogEventSink;
use agitator::adapters::serial::UartTransport;
use agitator::adapters::time::Esp32TimeAdapter;
use agitator::agitator::Agitator;
use agitator::app::commands::Command;
use agitator::app::inbox::{self, CommandQueue};
use agitator::app::ports::ConfigError;
use agitator::config::AgitatorConfig;
use agitator::drivers::hbridge::HBridgeDriver;
use agitator::drivers::hw_init::{self, GpioInput};
use agitator::drivers::watchdog::{self, Watchdog};
use agitator::error::Error;
use agitator::pins;
use agitator::remote::CommandLink;

/// Control loop period between ticks.
const LOOP_PERIOD_MS: u32 = 5;

const CONSOLE_BAUD: u32 = 115_200;

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  Agitator v{}                        ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Configuration (board preset, optional build-time JSON) ──
    let config = AgitatorConfig::load(option_env!("AGITATOR_CONFIG"))?;
    info!(
        "Boot. PWM={} Hz, bits={}, duty_max={}",
        config.pwm_frequency_hz,
        config.pwm_resolution_bits,
        config.duty_max()
    );

    // ── 3. Peripherals ────────────────────────────────────────
    hw_init::init_inputs(&config.pins).map_err(Error::from)?;
    let watchdog = Watchdog::new(watchdog::timeout_for(&config.timings));
    let p = Peripherals::take()?;

    let timer = LedcTimerDriver::new(
        p.ledc.timer0,
        &TimerConfig::new()
            .frequency(Hertz(config.pwm_frequency_hz))
            .resolution(ledc_resolution(config.pwm_resolution_bits)?),
    )?;
    // SAFETY: pin numbers come from the validated board preset and no other
    // driver claims them.
    let in1 = LedcDriver::new(p.ledc.channel0, &timer, unsafe {
        AnyOutputPin::new(config.pins.in1)
    })?;
    let in2 = LedcDriver::new(p.ledc.channel1, &timer, unsafe {
        AnyOutputPin::new(config.pins.in2)
    })?;
    let bridge = HBridgeDriver::new(in1, in2, config.duty_max()).map_err(Error::from)?;
    info!(
        "Bridge on GPIO {}/{} (LEDC ch {}/{}), coasting",
        config.pins.in1,
        config.pins.in2,
        pins::LEDC_CHANNEL_IN1,
        pins::LEDC_CHANNEL_IN2
    );

    let (tx_pin, rx_pin) = pins::console_uart();
    // SAFETY: the console pins are reserved for this driver.
    let uart = UartDriver::new(
        p.uart0,
        unsafe { AnyIOPin::new(tx_pin) },
        unsafe { AnyIOPin::new(rx_pin) },
        Option::<AnyIOPin>::None,
        Option::<AnyIOPin>::None,
        &UartConfig::default().baudrate(Hertz(CONSOLE_BAUD)),
    )?;

    // ── 4. Command inbox + controller ─────────────────────────
    let mut queue = CommandQueue::new();
    let (mut tx, rx) = inbox::channel(&mut queue);

    if let Some(verb) = option_env!("AGITATOR_BOOT_COMMAND") {
        let cmd = Command::parse(verb).map_err(Error::from)?;
        info!("Boot command: {:?}", cmd);
        tx.send(cmd);
    }

    let start_button = GpioInput::new(config.pins.start_button);
    let stop_button = config.pins.stop_button.map(GpioInput::new);
    let hw = HardwareAdapter::new(bridge, Esp32TimeAdapter::new());
    let mut agitator = Agitator::new(config, hw, start_button, stop_button, rx);

    let mut log_sink = LogEventSink::new();
    let mut link = CommandLink::new(UartTransport::new(uart));

    info!("System ready. Entering control loop.");

    // ── 5. Control loop ───────────────────────────────────────
    loop {
        link.poll(&mut tx);
        agitator.tick(&mut (&mut log_sink, &mut link));
        watchdog.feed();
        FreeRtos::delay_ms(LOOP_PERIOD_MS);
    }
}

/// LEDC timer resolution for `bits`.
fn ledc_resolution(bits: u8) -> Result<Resolution, Error> {
    let res = match bits {
        1 => Resolution::Bits1,
        2 => Resolution::Bits2,
        3 => Resolution::Bits3,
        4 => Resolution::Bits4,
        5 => Resolution::Bits5,
        6 => Resolution::Bits6,
        7 => Resolution::Bits7,
        8 => Resolution::Bits8,
        9 => Resolution::Bits9,
        10 => Resolution::Bits10,
        11 => Resolution::Bits11,
        12 => Resolution::Bits12,
        13 => Resolution::Bits13,
        14 => Resolution::Bits14,
        _ => {
            return Err(Error::Config(ConfigError::ValidationFailed(
                "LEDC supports at most 14 bits",
            )));
        }
    };
    Ok(res)
}
