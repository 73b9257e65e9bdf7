//! Owns the single-threaded side of the system: the Cell Model, the
//! Coalescer, and the Surface it renders to. One [`Runtime::tick`] call is
//! exactly one Render Tick (§4.7).

use core_coalesce::{Coalescer, TickReport};
use core_config::Config;
use core_grid::Grid;
use core_queue::Consumer;
use core_surface::TextSurface;

pub struct Runtime {
    grid: Grid,
    coalescer: Coalescer,
    consumer: Consumer,
    surface: TextSurface,
}

impl Runtime {
    pub fn new(config: &Config, consumer: Consumer) -> Self {
        Self {
            grid: Grid::new(config.grid()),
            coalescer: Coalescer::new(config.tick().max_applies),
            consumer,
            surface: TextSurface::new(&config.grid().cols_per_row),
        }
    }

    pub fn tick(&mut self) -> TickReport {
        self.coalescer.tick(&self.consumer, &mut self.grid, &mut self.surface)
    }

    /// Plain-text dump of the current grid state, for the headless demo
    /// backend and smoke tests.
    pub fn render_snapshot(&self) -> String {
        let mut buf = Vec::new();
        self.surface.render(&mut buf).expect("writing to an in-memory buffer cannot fail");
        String::from_utf8(buf).expect("TextSurface only ever writes UTF-8")
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_proto::parse;

    fn test_config() -> Config {
        core_config::load_from(Some(std::path::PathBuf::from("__no_such_kiosk_toml__"))).unwrap()
    }

    #[test]
    fn tick_applies_queued_commands_and_renders() {
        let (producer, consumer) = core_queue::unbounded();
        let mut runtime = Runtime::new(&test_config(), consumer);
        producer.enqueue(parse("0 0 #ffffff #000000 left HELLO").unwrap());
        let report = runtime.tick();
        assert_eq!(report.applied, 1);
        assert!(runtime.render_snapshot().contains("HELLO"));
    }

    #[test]
    fn empty_tick_applies_nothing() {
        let (_producer, consumer) = core_queue::unbounded();
        let mut runtime = Runtime::new(&test_config(), consumer);
        let report = runtime.tick();
        assert_eq!(report.applied, 0);
        assert_eq!(report.deferred, 0);
    }
}
