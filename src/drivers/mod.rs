pub mod button;
pub mod hbridge;
pub mod hw_init;
pub mod watchdog;
