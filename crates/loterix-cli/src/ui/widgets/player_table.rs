use ratatui::{
    layout::Constraint,
    prelude::{Buffer, Rect},
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Block, Row, Table, Widget},
};

use loterix_engine::Player;

/// Player scores, the generation's current leader highlighted.
#[derive(Debug)]
pub struct PlayerTable<'a, P> {
    players: &'a [Player<P>],
    best_id: Option<u32>,
}

impl<'a, P> PlayerTable<'a, P> {
    #[must_use]
    pub fn new(players: &'a [Player<P>], best_id: Option<u32>) -> Self {
        Self { players, best_id }
    }
}

impl<P> Widget for PlayerTable<'_, P> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let rows = self.players.iter().map(|player| {
            let style = if Some(player.id()) == self.best_id {
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            Row::new(vec![format!("P{}", player.id()), player.score().to_string()]).style(style)
        });

        Table::new(rows, [Constraint::Length(6), Constraint::Min(10)])
            .header(Row::new(vec!["id", "score"]).style(Style::default().fg(Color::DarkGray)))
            .block(Block::bordered().title(Line::from("PLAYERS").centered()))
            .render(area, buf);
    }
}
