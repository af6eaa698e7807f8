//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter        | Implements         | Connects to              |
//! |----------------|--------------------|--------------------------|
//! | `hardware`     | MotorPort          | DRV8871 via LEDC PWM     |
//! |                | TimePort           | ESP32 system timer       |
//! | `log_sink`     | EventSink          | Serial log output        |
//! | `serial`       | Transport          | UART console (device)    |
//! | `time`         | TimePort           | ESP32 system timer       |

pub mod hardware;
pub mod log_sink;
#[cfg(target_os = "espidf")]
pub mod serial;
pub mod time;
