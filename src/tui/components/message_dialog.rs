use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};
use ratatui::prelude::*;
use ratatui::widgets::{Block, BorderType, Borders, Clear};

use crate::tui::Theme;

/// Modal notification shown on top of the table until dismissed
#[derive(Debug, Clone)]
pub struct MessageDialog {
    title: String,
    message: String,
    is_error: bool,
}

impl MessageDialog {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            title: "Message".to_string(),
            message: message.into(),
            is_error: false,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            title: "Error".to_string(),
            message: message.into(),
            is_error: true,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns true when the key dismisses the dialog
    pub fn handle_key_event(&self, key: KeyEvent) -> bool {
        key.kind == KeyEventKind::Press && matches!(key.code, KeyCode::Enter | KeyCode::Esc)
    }

    fn modal_area(&self, area: Rect) -> Rect {
        let width = area.width.clamp(20, 50).min(area.width);
        let wrap_width = width.saturating_sub(4).max(1) as usize;
        let content_lines = textwrap::wrap(&self.message, wrap_width).len() as u16;
        let height = content_lines
            .saturating_add(4) // borders + hint + padding
            .min(area.height);
        let x = area.x + (area.width.saturating_sub(width)) / 2;
        let y = area.y + (area.height.saturating_sub(height)) / 2;
        Rect {
            x,
            y,
            width,
            height,
        }
    }

    pub fn render(&self, area: Rect, buf: &mut Buffer, theme: &Theme) {
        let modal = self.modal_area(area);
        Clear.render(modal, buf);

        let border_style = if self.is_error {
            theme.error_style()
        } else {
            theme.focused_border_style()
        };
        let block = Block::default()
            .title(self.title.as_str())
            .borders(Borders::ALL)
            .border_type(BorderType::Double)
            .border_style(border_style);
        let inner = block.inner(modal);
        block.render(modal, buf);

        let wrap_width = inner.width.saturating_sub(2).max(1) as usize;
        for (i, line) in textwrap::wrap(&self.message, wrap_width).iter().enumerate() {
            if i as u16 >= inner.height.saturating_sub(1) {
                break;
            }
            buf.set_string(inner.x + 1, inner.y + i as u16, line, theme.normal_style());
        }

        let hint = "Enter/Esc to close";
        let hint_x = inner.x + inner.width.saturating_sub(hint.len() as u16 + 1);
        let hint_y = inner.y + inner.height.saturating_sub(1);
        buf.set_string(hint_x, hint_y, hint, theme.muted_style());
    }
}
