//! The event channel connecting an in-flight migration to its caller.
//!
//! A migration executes in the background and its outcome travels over a
//! pipe. The producer closes the pipe by dropping the [EventSender];
//! consumers treat closure, not any sentinel event, as the end of the
//! stream, because a call that emits no events at all is valid.

use std::sync::mpsc::{sync_channel, Receiver, SyncSender};

use crate::error::Error;
use crate::file::{Direction, Version};

/// Buffered slots in a pipe. One is enough: a migration emits at most one
/// event before closing, so the producer never blocks on a slow consumer.
const PIPE_CAPACITY: usize = 1;

/// An event emitted by an in-flight migration.
#[derive(Debug, PartialEq)]
pub enum MigrationEvent {
    /// The payload executed and the version bookkeeping committed.
    Committed {
        version: Version,
        direction: Direction,
    },
    /// The migration failed. If the payload ran outside a transaction, the
    /// database may be left in an intermediate state.
    Failed(Error),
}

/// Create a connected pipe. Hand the sender to a driver's `migrate` and
/// read the receiver until it reports closure.
pub fn channel() -> (EventSender, EventReceiver) {
    let (tx, rx) = sync_channel(PIPE_CAPACITY);
    (EventSender { tx }, EventReceiver { rx })
}

/// Producer half of a migration pipe. Dropping it closes the pipe.
#[derive(Debug)]
pub struct EventSender {
    tx: SyncSender<MigrationEvent>,
}

impl EventSender {
    /// Emit one event. A hung-up receiver is tolerated: what the migration
    /// did to the database does not depend on anyone listening.
    pub fn send(&self, event: MigrationEvent) {
        let _ = self.tx.send(event);
    }
}

/// Consumer half of a migration pipe.
#[derive(Debug)]
pub struct EventReceiver {
    rx: Receiver<MigrationEvent>,
}

impl EventReceiver {
    /// Block until the next event arrives, or return `None` once the pipe
    /// has closed.
    pub fn recv(&self) -> Option<MigrationEvent> {
        self.rx.recv().ok()
    }

    /// Block until the pipe closes, returning every event in emission
    /// order.
    pub fn drain(self) -> Vec<MigrationEvent> {
        self.rx.into_iter().collect()
    }

    /// Block until the pipe closes, returning only the failures.
    ///
    /// Informational events are skipped, so an empty result means the
    /// migration committed (or emitted nothing).
    pub fn errors(self) -> Vec<Error> {
        self.rx
            .into_iter()
            .filter_map(|event| match event {
                MigrationEvent::Failed(err) => Some(err),
                MigrationEvent::Committed { .. } => None,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;

    #[test]
    fn closing_without_events_ends_the_stream() {
        let (tx, rx) = channel();
        drop(tx);
        assert_eq!(rx.drain(), vec![]);
    }

    #[test]
    fn recv_returns_none_after_closure() {
        let (tx, rx) = channel();
        tx.send(MigrationEvent::Committed {
            version: 20060102150405,
            direction: Direction::Up,
        });
        drop(tx);
        assert_eq!(
            rx.recv(),
            Some(MigrationEvent::Committed {
                version: 20060102150405,
                direction: Direction::Up,
            })
        );
        assert_eq!(rx.recv(), None);
        assert_eq!(rx.recv(), None);
    }

    #[test]
    fn drain_preserves_emission_order() {
        let (tx, rx) = channel();
        let producer = thread::spawn(move || {
            tx.send(MigrationEvent::Committed {
                version: 1,
                direction: Direction::Up,
            });
            tx.send(MigrationEvent::Failed(Error::Query("boom".to_string())));
        });
        assert_eq!(
            rx.drain(),
            vec![
                MigrationEvent::Committed {
                    version: 1,
                    direction: Direction::Up,
                },
                MigrationEvent::Failed(Error::Query("boom".to_string())),
            ]
        );
        producer.join().unwrap();
    }

    #[test]
    fn errors_skips_informational_events() {
        let (tx, rx) = channel();
        tx.send(MigrationEvent::Committed {
            version: 2,
            direction: Direction::Down,
        });
        drop(tx);
        assert_eq!(rx.errors(), vec![]);
    }

    #[test]
    fn errors_collects_failures() {
        let (tx, rx) = channel();
        tx.send(MigrationEvent::Failed(Error::Constraint(
            "version 2 is already recorded as applied".to_string(),
        )));
        drop(tx);
        assert_eq!(
            rx.errors(),
            vec![Error::Constraint(
                "version 2 is already recorded as applied".to_string()
            )]
        );
    }

    #[test]
    fn sending_into_a_hung_up_receiver_is_harmless() {
        let (tx, rx) = channel();
        drop(rx);
        tx.send(MigrationEvent::Committed {
            version: 3,
            direction: Direction::Up,
        });
    }
}
