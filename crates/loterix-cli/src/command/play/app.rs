use crossterm::event::{Event, KeyCode};
use ratatui::{
    Frame,
    layout::{Constraint, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Sparkline},
};

use loterix_engine::{GameSession, SessionState};
use loterix_model::Network;

use crate::{
    tui::{App, Tui},
    ui::widgets::{BoardDisplay, LogDisplay, PlayerTable},
};

#[derive(Debug)]
pub(crate) struct PlayApp {
    session: GameSession<Network>,
    model_name: String,
    tick_rate: f64,
    is_exiting: bool,
}

impl PlayApp {
    pub(crate) fn new(session: GameSession<Network>, model_name: String, tick_rate: f64) -> Self {
        Self {
            session,
            model_name,
            tick_rate,
            is_exiting: false,
        }
    }

    fn status_line(&self) -> Line<'_> {
        let (state_text, state_style) = match self.session.state() {
            SessionState::Idle => ("IDLE", Style::default().fg(Color::DarkGray)),
            SessionState::Running => ("RUNNING", Style::default().fg(Color::Green)),
            SessionState::Paused => ("PAUSED", Style::default().fg(Color::Yellow)),
        };
        let draw_text = match self.session.current_draw() {
            Some(draw) => format!(" | draw #{} ({})", draw.id, draw.date),
            None => String::new(),
        };
        Line::from(vec![
            Span::styled(state_text, state_style.add_modifier(Modifier::BOLD)),
            Span::raw(format!(
                " | model {} | generation {} | {}/{} draws{draw_text}",
                self.model_name,
                self.session.generation(),
                self.session.progress(),
                self.session.archive().len(),
            )),
        ])
    }
}

impl App for PlayApp {
    fn init(&mut self, tui: &mut Tui) {
        tui.set_tick_rate(Some(self.tick_rate));
    }

    fn should_exit(&self) -> bool {
        self.is_exiting
    }

    fn handle_event(&mut self, _tui: &mut Tui, event: Event) {
        let Some(key) = event.as_key_event() else {
            return;
        };
        match key.code {
            KeyCode::Char('q') => self.is_exiting = true,
            // refusals land in the event log, which is on screen
            KeyCode::Char('s') => {
                let _ = self.session.start();
            }
            KeyCode::Char('p') => match self.session.state() {
                SessionState::Running => self.session.pause(),
                SessionState::Paused => {
                    let _ = self.session.start();
                }
                SessionState::Idle => {}
            },
            KeyCode::Char('r') => self.session.reset(),
            _ => {}
        }
    }

    fn update(&mut self, _tui: &mut Tui) {
        // tick() itself refuses to run outside Running, so a tick that races
        // a pause or reset is dropped here rather than applied
        self.session.tick();
    }

    fn draw(&self, frame: &mut Frame) {
        let [status_area, main_area, log_area, help_area] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(12),
            Constraint::Min(5),
            Constraint::Length(1),
        ])
        .areas(frame.area());

        frame.render_widget(self.status_line(), status_area);

        let [board_area, players_area, chart_area] = Layout::horizontal([
            Constraint::Length(19),
            Constraint::Length(22),
            Constraint::Min(20),
        ])
        .areas(main_area);

        let mut board = BoardDisplay::new();
        if let Some(draw) = self.session.current_draw() {
            board = board.drawn(&draw.balls);
        }
        let best = self.session.best_player();
        if let Some(prediction) = best.and_then(|player| player.prediction()) {
            board = board.predicted(prediction);
        }
        frame.render_widget(board, board_area);

        frame.render_widget(
            PlayerTable::new(self.session.players(), best.map(|player| player.id())),
            players_area,
        );

        let best_scores: Vec<u64> = self
            .session
            .evolution_log()
            .best_scores()
            .into_iter()
            .map(|(_, score)| u64::try_from(score).unwrap_or(0))
            .collect();
        frame.render_widget(
            Sparkline::default()
                .data(best_scores)
                .style(Style::default().fg(Color::Cyan))
                .block(Block::bordered().title(Line::from("BEST SCORE").centered())),
            chart_area,
        );

        frame.render_widget(LogDisplay::new(self.session.event_log()), log_area);

        let help = Text::from("s (Start) | p (Pause/Resume) | r (Reset) | q (Quit)")
            .style(Style::default().fg(Color::DarkGray))
            .centered();
        frame.render_widget(help, help_area);
    }
}
