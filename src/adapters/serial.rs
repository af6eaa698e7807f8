//! UART console transport.
//!
//! Non-blocking reads so a quiet console never stalls the control loop.
//! Writes loop until the driver has accepted every byte.

use esp_idf_hal::delay::NON_BLOCK;
use esp_idf_hal::sys::EspError;
use esp_idf_hal::uart::UartDriver;

use crate::remote::Transport;

pub struct UartTransport<'d> {
    uart: UartDriver<'d>,
}

impl<'d> UartTransport<'d> {
    pub fn new(uart: UartDriver<'d>) -> Self {
        Self { uart }
    }
}

impl Transport for UartTransport<'_> {
    type Error = EspError;

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, EspError> {
        self.uart.read(buf, NON_BLOCK)
    }

    fn write(&mut self, mut data: &[u8]) -> Result<(), EspError> {
        while !data.is_empty() {
            let n = self.uart.write(data)?;
            data = &data[n..];
        }
        Ok(())
    }
}
