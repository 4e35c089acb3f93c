use chrono::{DateTime, Local};
use color_eyre::Result;
use ratatui::prelude::*;
use ratatui::widgets::Paragraph;
use tokio::sync::mpsc::UnboundedReceiver;

use crate::tui::components::paged_table::TableEvent;
use crate::tui::{Action, Component, Theme};

/// One-line bar showing the most recent table event and key hints
pub struct Toolbar {
    events: UnboundedReceiver<TableEvent>,
    last: Option<(DateTime<Local>, String)>,
    last_is_error: bool,
    hints: String,
    theme: Theme,
}

impl Toolbar {
    pub fn new(events: UnboundedReceiver<TableEvent>, theme: Theme) -> Self {
        Self {
            events,
            last: None,
            last_is_error: false,
            hints: String::new(),
            theme,
        }
    }

    pub fn with_hints(mut self, hints: impl Into<String>) -> Self {
        self.hints = hints.into();
        self
    }

    pub fn last_message(&self) -> Option<&str> {
        self.last.as_ref().map(|(_, msg)| msg.as_str())
    }

    pub fn describe(event: &TableEvent) -> String {
        match event {
            TableEvent::PageLoaded {
                page, start, end, total,
            } => {
                if *total == 0 {
                    format!("Page {} loaded: no rows", page + 1)
                } else {
                    format!("Page {} loaded: rows {}-{} of {total}", page + 1, start + 1, end)
                }
            }
            TableEvent::SortChanged { column, direction } => {
                format!("Sort {column}: {direction}")
            }
            TableEvent::QueryChanged { query } if query.is_empty() => "Search cleared".to_string(),
            TableEvent::QueryChanged { query } => format!("Search: \"{query}\""),
            TableEvent::CellActivated { column, text } => format!("Activated {column}: {text}"),
            TableEvent::FetchFailed { error } => error.to_string(),
        }
    }

    fn record(&mut self, event: TableEvent) {
        self.last_is_error = matches!(event, TableEvent::FetchFailed { .. });
        self.last = Some((Local::now(), Self::describe(&event)));
    }
}

impl Component for Toolbar {
    fn handle_action(&mut self, _action: Action) -> Result<bool> {
        Ok(false)
    }

    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let [event_area, hint_area] = Layout::horizontal([
            Constraint::Min(10),
            Constraint::Length(self.hints.chars().count() as u16),
        ])
        .areas(area);

        let line = match &self.last {
            Some((at, msg)) => {
                let style = if self.last_is_error {
                    self.theme.error_style()
                } else {
                    self.theme.info_style()
                };
                Line::from(vec![
                    Span::styled(format!("{} ", at.format("%H:%M:%S")), self.theme.muted_style()),
                    Span::styled(msg.as_str(), style),
                ])
            }
            None => Line::from(Span::styled("Ready", self.theme.muted_style())),
        };
        frame.render_widget(Paragraph::new(line), event_area);
        frame.render_widget(
            Paragraph::new(self.hints.as_str()).style(self.theme.muted_style()),
            hint_area,
        );
    }

    fn supported_actions(&self) -> &[Action] {
        &[]
    }

    fn name(&self) -> &str {
        "Toolbar"
    }

    fn update(&mut self) -> Result<()> {
        while let Ok(event) = self.events.try_recv() {
            self.record(event);
        }
        Ok(())
    }
}
