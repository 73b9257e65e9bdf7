//! The Command Queue (§4.3): an unbounded, single-producer/single-consumer
//! handoff from the Datagram Receiver to the Render Tick, backed by
//! `crossbeam-channel` rather than a mutex-guarded `VecDeque` — matching the
//! teacher's preference for channel-based thread handoff over shared locks.

use core_proto::Command;
use crossbeam_channel::{Receiver, Sender, TryRecvError};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

#[derive(Debug, Default)]
struct Counters {
    enqueued: AtomicU64,
    dropped: AtomicU64,
}

/// Point-in-time enqueue/drop totals, for diagnostics and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct QueueStats {
    pub enqueued: u64,
    pub dropped: u64,
}

/// The receiver-thread side: feeds parsed commands into the queue.
#[derive(Clone)]
pub struct Producer {
    sender: Sender<Command>,
    counters: Arc<Counters>,
}

impl Producer {
    /// Enqueue a command. Only fails if every `Consumer` has been dropped
    /// (render driver shut down), in which case the drop counter advances
    /// instead of panicking — the receiver keeps running regardless.
    pub fn enqueue(&self, command: Command) {
        match self.sender.send(command) {
            Ok(()) => {
                self.counters.enqueued.fetch_add(1, Ordering::Relaxed);
            }
            Err(_) => {
                self.counters.dropped.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    pub fn stats(&self) -> QueueStats {
        stats_from(&self.counters)
    }
}

/// The render-driver side: drained once per tick by the Coalescer.
pub struct Consumer {
    receiver: Receiver<Command>,
    counters: Arc<Counters>,
}

impl Consumer {
    /// Non-blocking drain of every command currently queued, in FIFO order.
    pub fn drain(&self) -> Vec<Command> {
        let mut drained = Vec::new();
        loop {
            match self.receiver.try_recv() {
                Ok(command) => drained.push(command),
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        drained
    }

    pub fn stats(&self) -> QueueStats {
        stats_from(&self.counters)
    }
}

fn stats_from(counters: &Counters) -> QueueStats {
    QueueStats {
        enqueued: counters.enqueued.load(Ordering::Relaxed),
        dropped: counters.dropped.load(Ordering::Relaxed),
    }
}

/// Build a fresh queue, returning the producer and consumer halves.
pub fn unbounded() -> (Producer, Consumer) {
    let (sender, receiver) = crossbeam_channel::unbounded();
    let counters = Arc::new(Counters::default());
    (
        Producer { sender, counters: counters.clone() },
        Consumer { receiver, counters },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_proto::Anchor;

    fn sample_command() -> Command {
        Command::SetBg { row: 0, col: 0, bg: "#000000".into() }
    }

    #[test]
    fn drains_in_fifo_order() {
        let (producer, consumer) = unbounded();
        producer.enqueue(Command::SetAlign { row: 0, col: 0, align: Anchor::Left });
        producer.enqueue(sample_command());
        let drained = consumer.drain();
        assert_eq!(drained.len(), 2);
        assert!(matches!(drained[0], Command::SetAlign { .. }));
        assert!(matches!(drained[1], Command::SetBg { .. }));
    }

    #[test]
    fn counts_enqueued_and_drained_leave_drop_count_zero() {
        let (producer, consumer) = unbounded();
        producer.enqueue(sample_command());
        producer.enqueue(sample_command());
        assert_eq!(producer.stats(), QueueStats { enqueued: 2, dropped: 0 });
        consumer.drain();
        assert_eq!(consumer.stats().dropped, 0);
    }

    #[test]
    fn enqueue_after_consumer_dropped_counts_as_dropped() {
        let (producer, consumer) = unbounded();
        drop(consumer);
        producer.enqueue(sample_command());
        assert_eq!(producer.stats(), QueueStats { enqueued: 0, dropped: 1 });
    }

    #[test]
    fn empty_drain_returns_empty_vec() {
        let (_producer, consumer) = unbounded();
        assert!(consumer.drain().is_empty());
    }
}
