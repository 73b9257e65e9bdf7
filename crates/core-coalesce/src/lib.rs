//! The Coalescer (§4.4): drains the Command Queue once per tick into a
//! `(class, row, col)`-keyed map with last-write-wins semantics, then
//! applies pending entries to the Cell Model in strict class order, capped
//! at `max_applies_per_tick` with deferral (never loss) of the remainder.

use core_grid::Grid;
use core_proto::Command;
use core_queue::Consumer;
use core_surface::Surface;
use std::collections::HashMap;
use tracing::trace;

/// The eight command classes, declared in the exact order the Render Tick
/// must apply them within a single tick (§4.4). Deriving `Ord` on the
/// declaration order is what makes `sort_by_key` below implement the
/// class-precedence rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
enum Class {
    Bg,
    Align,
    Bar,
    RingSet,
    RingStyle,
    RingValue,
    Arc,
    Set,
}

fn classify(command: &Command) -> Class {
    match command {
        Command::SetBg { .. } => Class::Bg,
        Command::SetAlign { .. } => Class::Align,
        Command::BarValue { .. } => Class::Bar,
        Command::RingAll { .. } => Class::RingSet,
        Command::RingStyle { .. } => Class::RingStyle,
        Command::RingValue { .. } => Class::RingValue,
        Command::RingExtraArcs { .. } => Class::Arc,
        Command::Set { .. } => Class::Set,
    }
}

type Key = (Class, i64, i64);

/// Outcome of a single `tick` call, for telemetry and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TickReport {
    pub applied: usize,
    pub deferred: usize,
}

pub struct Coalescer {
    pending: HashMap<Key, Command>,
    /// First-seen order of each key still pending. Re-sorted by class every
    /// tick; stable sort keeps relative order within a class, which is the
    /// "insertion order" the within-class ordering rule calls for.
    order: Vec<Key>,
    max_applies_per_tick: usize,
}

impl Coalescer {
    pub fn new(max_applies_per_tick: usize) -> Self {
        Self {
            pending: HashMap::new(),
            order: Vec::new(),
            max_applies_per_tick,
        }
    }

    /// Number of distinct `(class, row, col)` entries still awaiting
    /// application, across however many ticks they've been deferred.
    pub fn pending_len(&self) -> usize {
        self.order.len()
    }

    fn enqueue(&mut self, command: Command) {
        let (row, col) = command.address();
        let key = (classify(&command), row, col);
        if !self.pending.contains_key(&key) {
            self.order.push(key);
        }
        self.pending.insert(key, command);
    }

    /// Drain the queue, merge into the pending map, then apply up to the
    /// per-tick cap in class order. Safe to call with an empty queue (a
    /// tick with nothing new still tries to work off the backlog).
    pub fn tick(&mut self, consumer: &Consumer, grid: &mut Grid, surface: &mut dyn Surface) -> TickReport {
        for command in consumer.drain() {
            self.enqueue(command);
        }

        self.order.sort_by_key(|key| key.0);

        let mut applied = 0;
        let mut remaining = Vec::with_capacity(self.order.len());
        for key in self.order.drain(..) {
            if applied >= self.max_applies_per_tick {
                remaining.push(key);
                continue;
            }
            if let Some(command) = self.pending.remove(&key) {
                grid.apply(command, surface);
                applied += 1;
            }
        }
        self.order = remaining;

        let deferred = self.order.len();
        if deferred > 0 {
            trace!(deferred, applied, "tick deferred entries beyond per-tick cap");
        }
        TickReport { applied, deferred }
    }
}
