use std::time::Duration;

use crate::tui::{
    App,
    event_loop::{EventLoop, TuiEvent},
};

/// TUI runtime: owns the event loop and drives an [`App`] until it asks to
/// exit.
#[derive(Debug)]
pub struct Tui {
    events: EventLoop,
}

impl Default for Tui {
    fn default() -> Self {
        Self::new()
    }
}

impl Tui {
    #[must_use]
    pub fn new() -> Self {
        Self {
            events: EventLoop::new(),
        }
    }

    /// Sets the tick rate in Hz; `None` suspends ticking.
    pub fn set_tick_rate(&mut self, rate: Option<f64>) {
        self.events
            .set_tick_interval(rate.map(|rate| Duration::from_secs_f64(1.0 / rate)));
    }

    /// Runs the application:
    ///
    /// - `TuiEvent::Tick` → `app.update()`
    /// - `TuiEvent::Render` → `app.draw()`
    /// - `TuiEvent::Input` → `app.handle_event()`
    pub fn run<A>(mut self, app: &mut A) -> anyhow::Result<()>
    where
        A: App,
    {
        app.init(&mut self);

        ratatui::run(|terminal| {
            while !app.should_exit() {
                match self.events.next()? {
                    TuiEvent::Tick => app.update(&mut self),
                    TuiEvent::Render => {
                        terminal.draw(|frame| app.draw(frame))?;
                    }
                    TuiEvent::Input(event) => app.handle_event(&mut self, event),
                }
            }
            Ok(())
        })
    }
}
