mod event_loop;
mod runner;

pub use self::runner::Tui;

use crossterm::event::Event;
use ratatui::Frame;

/// Trait for TUI applications driven by [`Tui::run`].
pub trait App {
    /// Called once before the event loop starts. Configure the tick rate
    /// here.
    fn init(&mut self, tui: &mut Tui);

    /// Returns whether the event loop should stop.
    fn should_exit(&self) -> bool;

    /// Handles a terminal event (key input, resize, ...).
    fn handle_event(&mut self, tui: &mut Tui, event: Event);

    /// Draws the screen; called whenever state may have changed.
    fn draw(&self, frame: &mut Frame);

    /// Advances the simulation; called on every timer tick.
    fn update(&mut self, tui: &mut Tui);
}
