use std::{
    io,
    time::{Duration, Instant},
};

use crossterm::event::{self, Event};

/// What the loop produced: a simulation tick, a redraw request, or terminal
/// input.
#[derive(Debug)]
pub(super) enum TuiEvent {
    Tick,
    Render,
    Input(Event),
}

/// Tick-and-dirty event source.
///
/// Ticks fire at a fixed interval while one is configured; a render is
/// emitted after anything that may have changed state (a tick or an input
/// event), so the screen redraws exactly when needed and the loop otherwise
/// sleeps in `event::poll`.
#[derive(Debug)]
pub(super) struct EventLoop {
    tick_interval: Option<Duration>,
    last_tick: Instant,
    dirty: bool,
}

impl EventLoop {
    pub(super) fn new() -> Self {
        Self {
            tick_interval: None,
            last_tick: Instant::now(),
            // the first frame always renders
            dirty: true,
        }
    }

    /// Sets the tick interval; `None` disables ticks entirely.
    pub(super) fn set_tick_interval(&mut self, interval: Option<Duration>) {
        self.tick_interval = interval;
    }

    /// Blocks until the next tick deadline, pending render, or input event.
    pub(super) fn next(&mut self) -> io::Result<TuiEvent> {
        loop {
            let now = Instant::now();
            if let Some(interval) = self.tick_interval
                && now.duration_since(self.last_tick) >= interval
            {
                self.last_tick = now;
                self.dirty = true;
                return Ok(TuiEvent::Tick);
            }

            if self.dirty {
                self.dirty = false;
                return Ok(TuiEvent::Render);
            }

            if let Some(interval) = self.tick_interval {
                let deadline = self.last_tick + interval;
                let timeout = deadline.saturating_duration_since(now);
                if !event::poll(timeout)? {
                    continue;
                }
            }
            // without a tick interval, block until input arrives

            self.dirty = true;
            return Ok(TuiEvent::Input(event::read()?));
        }
    }
}
