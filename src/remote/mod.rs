//! Remote command surface.
//!
//! ```text
//!  Transport ──bytes──▶ LineDecoder ──line──▶ Command::parse ──▶ inbox
//!      ▲                                                          │
//!      └──────────── status JSON ◀── EventSink ◀── service ◀──────┘
//! ```

pub mod codec;
pub mod link;
pub mod transport;

pub use link::CommandLink;
pub use transport::Transport;
