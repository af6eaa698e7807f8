//! Open-loop motion control: percent → duty mapping and blocking ramps.
//!
//! There is no speed feedback on this machine; duty is the only proxy for
//! speed, so everything here is pure arithmetic plus timed writes.

pub mod duty;
pub mod ramp;
