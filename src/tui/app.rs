use crate::tui::components::{PagedTable, Toolbar};
use crate::tui::{Action, ActionCategory, Component, Focusable, KeyBindings, Theme};
use color_eyre::Result;
use crossterm::event::{KeyEvent, KeyEventKind, MouseEvent};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
};
use tracing::debug;

/// Application state
///
/// Hosts the paged table, routes input to it and draws the surrounding chrome.
pub struct App {
    /// The table being browsed
    table: PagedTable,

    /// Bottom bar fed by table events
    toolbar: Toolbar,

    /// Keybindings configuration
    keybindings: KeyBindings,

    /// Current theme
    theme: Theme,

    show_help: bool,

    /// Whether the app should quit
    should_quit: bool,
}

impl App {
    /// Create a new App around an already constructed table
    pub fn new(mut table: PagedTable, keybindings: KeyBindings, theme: Theme) -> Self {
        table.set_focused(true);
        table.set_theme(theme.clone());
        let hints = Self::hint_line(&keybindings);
        let toolbar = Toolbar::new(table.subscribe(), theme.clone()).with_hints(hints);

        Self {
            table,
            toolbar,
            keybindings,
            theme,
            show_help: false,
            should_quit: false,
        }
    }

    fn hint_line(keybindings: &KeyBindings) -> String {
        [Action::ToggleHelp, Action::FocusSearch, Action::Quit]
            .iter()
            .filter_map(|action| {
                keybindings
                    .get_keys_for_action(*action)
                    .first()
                    .map(|key| format!("{key}: {}", action.description()))
            })
            .collect::<Vec<_>>()
            .join("  ")
    }

    pub fn table(&self) -> &PagedTable {
        &self.table
    }

    pub fn table_mut(&mut self) -> &mut PagedTable {
        &mut self.table
    }

    pub fn toolbar(&self) -> &Toolbar {
        &self.toolbar
    }

    pub fn help_visible(&self) -> bool {
        self.show_help
    }

    /// Handle a key event
    pub fn handle_key_event(&mut self, key: KeyEvent) -> Result<()> {
        // Only handle key press events, ignore release/repeat
        if key.kind != KeyEventKind::Press {
            return Ok(());
        }

        // Help overlay swallows everything except its own toggles
        if self.show_help {
            if let Some(action @ (Action::ToggleHelp | Action::Cancel | Action::Quit)) =
                self.keybindings.get_action(&key)
            {
                self.handle_action(action)?;
            }
            return Ok(());
        }

        if self.table.handle_key_event(key, &self.keybindings)? {
            return Ok(());
        }

        // Translate key to action
        if let Some(action) = self.keybindings.get_action(&key) {
            self.handle_action(action)?;
        }

        Ok(())
    }

    pub fn handle_mouse_event(&mut self, mouse: MouseEvent) -> Result<()> {
        if self.show_help || self.table.notification().is_some() {
            return Ok(());
        }
        self.table.handle_mouse_event(mouse);
        Ok(())
    }

    /// Handle an action
    pub fn handle_action(&mut self, action: Action) -> Result<()> {
        debug!("App action: {action:?}");
        match action {
            Action::Quit => {
                self.should_quit = true;
            }
            Action::ToggleHelp => {
                self.show_help = !self.show_help;
            }
            Action::Cancel if self.show_help => {
                self.show_help = false;
            }
            _ => {
                self.table.handle_action(action)?;
            }
        }
        Ok(())
    }

    /// Check if the app should quit
    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Update app state (called on every tick)
    pub fn update(&mut self) -> Result<()> {
        self.table.update()?;
        self.toolbar.update()?;
        Ok(())
    }

    /// Render the app
    pub fn render(&mut self, frame: &mut Frame) {
        let area = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(5), Constraint::Length(1)])
            .split(area);

        self.table.render(frame, chunks[0]);
        self.toolbar.render(frame, chunks[1]);

        if self.show_help {
            self.render_help(frame, area);
        }
    }

    fn render_help(&self, frame: &mut Frame, area: Rect) {
        let mut lines: Vec<Line> = Vec::new();
        let categories = [
            ActionCategory::Navigation,
            ActionCategory::Table,
            ActionCategory::View,
            ActionCategory::Application,
        ];
        for category in categories {
            lines.push(Line::from(Span::styled(
                category.to_string(),
                self.theme.header_style(),
            )));
            for action in Action::all().into_iter().filter(|a| a.category() == category) {
                let keys = self.keybindings.get_keys_for_action(action).join(", ");
                lines.push(Line::from(vec![
                    Span::styled(format!("  {keys:<22}"), self.theme.info_style()),
                    Span::raw(action.description()),
                ]));
            }
            lines.push(Line::default());
        }

        let width = area.width.clamp(20, 64).min(area.width);
        let height = (lines.len() as u16 + 2).min(area.height);
        let popup = Rect::new(
            area.x + area.width.saturating_sub(width) / 2,
            area.y + area.height.saturating_sub(height) / 2,
            width,
            height,
        );

        let block = Block::default()
            .title(" Keybindings ")
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(self.theme.focused_border_style());
        frame.render_widget(Clear, popup);
        frame.render_widget(Paragraph::new(lines).block(block), popup);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{ColumnDescriptor, PageRequest, PageResponse};
    use crate::services::PageSource;
    use crate::tui::components::TableOptions;
    use crossterm::event::{KeyCode, KeyModifiers};
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;
    use std::sync::Arc;

    fn app() -> App {
        let source: Arc<dyn PageSource> = Arc::new(|req: PageRequest| async move {
            Ok::<_, color_eyre::Report>(PageResponse {
                rows: vec![vec![format!("row {}", req.page)]],
                start: req.offset(),
                total: 30,
            })
        });
        let options = TableOptions::new(vec![ColumnDescriptor::new("id", "Id").sortable()]);
        let table = PagedTable::new(options, source).unwrap();
        App::new(table, KeyBindings::default(), Theme::default())
    }

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[tokio::test]
    async fn test_quit_and_help() {
        let mut app = app();
        app.handle_key_event(press(KeyCode::Char('?'))).unwrap();
        assert!(app.help_visible());

        // Navigation is ignored while help is open
        app.handle_key_event(press(KeyCode::Char('n'))).unwrap();
        assert_eq!(app.table().current_page(), 0);

        app.handle_key_event(press(KeyCode::Esc)).unwrap();
        assert!(!app.help_visible());

        app.handle_key_event(press(KeyCode::Char('q'))).unwrap();
        assert!(app.should_quit());
    }

    #[tokio::test]
    async fn test_toolbar_follows_table() {
        let mut app = app();
        app.table_mut().next_outcome().await;
        app.update().unwrap();
        assert_eq!(
            app.toolbar().last_message(),
            Some("Page 1 loaded: rows 1-1 of 30")
        );
    }

    #[tokio::test]
    async fn test_render_with_help() {
        let mut app = app();
        app.table_mut().next_outcome().await;
        app.handle_action(Action::ToggleHelp).unwrap();

        let mut terminal = Terminal::new(TestBackend::new(80, 40)).unwrap();
        terminal.draw(|f| app.render(f)).unwrap();
        let text: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect();
        assert!(text.contains("Keybindings"));
        assert!(text.contains("Next page"));
    }
}
