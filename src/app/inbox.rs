//! Command inbox.
//!
//! Every transport (button excepted) pushes typed commands here; the tick
//! driver is the single consumer, so commands reach the service strictly
//! in arrival order no matter which transport produced them.
//!
//! ```text
//! ┌─────────────┐     ┌──────────────┐     ┌──────────────┐
//! │ Serial link │────▶│              │     │              │
//! │ Dashboard   │────▶│ Command Inbox│────▶│ Agitator     │
//! │ (any text)  │────▶│  (SPSC, 16)  │     │  ::tick      │
//! └─────────────┘     └──────────────┘     └──────────────┘
//! ```
//!
//! With more than one transport, each must hold the producer in turn (the
//! queue has exactly one producer end).  Moving a transport onto another
//! thread only requires handing it the [`CommandSender`].

use heapless::spsc::{Consumer, Producer, Queue};
use log::warn;

use super::commands::Command;

/// Queue storage size.  A heapless SPSC queue of `N` holds `N - 1` items.
pub const INBOX_CAP: usize = 16;

pub type CommandQueue = Queue<Command, INBOX_CAP>;

/// Producer half handed to transports.
pub struct CommandSender<'q> {
    producer: Producer<'q, Command, INBOX_CAP>,
    dropped: u32,
}

/// Consumer half owned by the tick driver.
pub struct CommandReceiver<'q> {
    consumer: Consumer<'q, Command, INBOX_CAP>,
}

/// Split caller-owned queue storage into its two ends.
pub fn channel(queue: &mut CommandQueue) -> (CommandSender<'_>, CommandReceiver<'_>) {
    let (producer, consumer) = queue.split();
    (
        CommandSender {
            producer,
            dropped: 0,
        },
        CommandReceiver { consumer },
    )
}

impl CommandSender<'_> {
    /// Enqueue a command.  Returns `false` (and logs) when the inbox is full.
    pub fn send(&mut self, cmd: Command) -> bool {
        match self.producer.enqueue(cmd) {
            Ok(()) => true,
            Err(cmd) => {
                self.dropped = self.dropped.saturating_add(1);
                warn!("inbox full, dropping {:?}", cmd);
                false
            }
        }
    }

    /// Commands lost to a full inbox.
    pub fn dropped(&self) -> u32 {
        self.dropped
    }
}

impl CommandReceiver<'_> {
    pub fn recv(&mut self) -> Option<Command> {
        self.consumer.dequeue()
    }

    pub fn pending(&self) -> usize {
        self.consumer.len()
    }
}
