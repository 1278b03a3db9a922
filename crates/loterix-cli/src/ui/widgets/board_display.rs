use ratatui::{
    prelude::{Buffer, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Paragraph, Widget},
};

use loterix_engine::{BALL_MAX, BallSet};

/// The 5×5 ball board: every number in `1..=25`, styled by membership in
/// the drawn set and the highlighted player's prediction.
#[derive(Debug, Default)]
pub struct BoardDisplay {
    drawn: BallSet,
    predicted: BallSet,
}

impl BoardDisplay {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn drawn(self, balls: &[u8]) -> Self {
        Self {
            drawn: balls.iter().collect(),
            ..self
        }
    }

    #[must_use]
    pub fn predicted(self, balls: &[u8]) -> Self {
        Self {
            predicted: balls.iter().collect(),
            ..self
        }
    }

    fn ball_style(&self, ball: u8) -> Style {
        match (self.drawn.contains(ball), self.predicted.contains(ball)) {
            (true, true) => Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
            (true, false) => Style::default().fg(Color::Yellow),
            (false, true) => Style::default().fg(Color::Blue),
            (false, false) => Style::default().fg(Color::DarkGray),
        }
    }
}

impl Widget for BoardDisplay {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let mut lines = Vec::with_capacity(5);
        for row in 0..5u8 {
            let mut spans = Vec::with_capacity(5);
            for col in 0..5u8 {
                let ball = row * 5 + col + 1;
                debug_assert!(ball <= BALL_MAX);
                spans.push(Span::styled(format!(" {ball:02}"), self.ball_style(ball)));
            }
            lines.push(Line::from(spans));
        }

        Paragraph::new(Text::from(lines))
            .block(Block::bordered().title(Line::from("BOARD").centered()))
            .render(area, buf);
    }
}
