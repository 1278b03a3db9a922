use ratatui::{
    prelude::{Buffer, Rect},
    style::{Color, Style},
    text::{Line, Text},
    widgets::{Block, Paragraph, Widget},
};

use loterix_engine::{EventLog, LogKind};

/// Tail of the session's event log, errors in red.
#[derive(Debug)]
pub struct LogDisplay<'a> {
    log: &'a EventLog,
}

impl<'a> LogDisplay<'a> {
    #[must_use]
    pub fn new(log: &'a EventLog) -> Self {
        Self { log }
    }
}

impl Widget for LogDisplay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let visible = usize::from(area.height.saturating_sub(2));
        let entries = self.log.entries();
        let tail = &entries[entries.len().saturating_sub(visible)..];

        let lines: Vec<Line> = tail
            .iter()
            .map(|entry| {
                let style = match entry.kind {
                    LogKind::Info => Style::default(),
                    LogKind::Error => Style::default().fg(Color::Red),
                };
                Line::styled(entry.message.clone(), style)
            })
            .collect();

        Paragraph::new(Text::from(lines))
            .block(Block::bordered().title(Line::from("LOG").centered()))
            .render(area, buf);
    }
}
