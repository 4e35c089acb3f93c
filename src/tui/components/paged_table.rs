//! Paginated, sortable, searchable table backed by an async page source
//!
//! The table owns its display state and asks the `PageSource` for a fresh
//! window of rows whenever that state changes. Fetches run on spawned tokio
//! tasks; their outcomes come back over a channel and are applied on the
//! next `update()` tick. Every outcome carries a sequence number so that a
//! slow response cannot overwrite a newer one.

use crate::core::{
    ActivationCallback, ColumnDescriptor, DecorationKind, DecorationRule, DisplayState,
    PageRequest, PageResponse, SortDirection, TableError, validate_response,
};
use crate::services::PageSource;
use crate::tui::components::MessageDialog;
use crate::tui::{Action, Component, Focusable, KeyBindings, Theme};
use color_eyre::Result;
use crossterm::event::{
    KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Position, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, error, info, warn};
use tui_textarea::TextArea;

const COLUMN_SPACING: u16 = 1;

/// Construction options for a `PagedTable`
#[derive(Debug, Clone)]
pub struct TableOptions {
    pub headers: Vec<ColumnDescriptor>,
    pub decorations: Vec<DecorationRule>,
    pub rows_per_page: usize,
    pub search_placeholder: String,
    /// Zero fetches on every keystroke
    pub search_debounce: Duration,
    /// Drop outcomes older than the latest issued request
    pub discard_stale_responses: bool,
    pub title: Option<String>,
    pub theme: Theme,
}

impl Default for TableOptions {
    fn default() -> Self {
        Self {
            headers: Vec::new(),
            decorations: Vec::new(),
            rows_per_page: 10,
            search_placeholder: "Search".to_string(),
            search_debounce: Duration::ZERO,
            discard_stale_responses: true,
            title: None,
            theme: Theme::default(),
        }
    }
}

impl TableOptions {
    pub fn new(headers: Vec<ColumnDescriptor>) -> Self {
        Self {
            headers,
            ..Default::default()
        }
    }

    pub fn with_decoration(mut self, rule: DecorationRule) -> Self {
        self.decorations.push(rule);
        self
    }

    pub fn with_rows_per_page(mut self, rows_per_page: usize) -> Self {
        self.rows_per_page = rows_per_page;
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

/// Notifications published to subscribers (toolbars, status bars, logs)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableEvent {
    PageLoaded {
        page: usize,
        start: usize,
        end: usize,
        total: usize,
    },
    SortChanged {
        column: String,
        direction: SortDirection,
    },
    QueryChanged {
        query: String,
    },
    CellActivated {
        column: String,
        text: String,
    },
    FetchFailed {
        error: TableError,
    },
}

/// Shared counter of in-flight requests
#[derive(Debug, Clone, Default)]
pub struct LoadingIndicator {
    in_flight: Arc<AtomicUsize>,
}

impl LoadingIndicator {
    pub fn acquire(&self) -> LoadingGuard {
        self.in_flight.fetch_add(1, Ordering::SeqCst);
        LoadingGuard {
            in_flight: Arc::clone(&self.in_flight),
        }
    }

    pub fn is_visible(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst) > 0
    }
}

/// Keeps the loading indicator visible until dropped
#[derive(Debug)]
pub struct LoadingGuard {
    in_flight: Arc<AtomicUsize>,
}

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Settled fetch travelling back from the request task
#[derive(Debug)]
pub struct PageOutcome {
    seq: u64,
    request: PageRequest,
    result: Result<PageResponse, TableError>,
    loading: LoadingGuard,
}

/// What `apply_outcome` did with a settled fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settled {
    Rendered,
    Failed,
    Discarded,
}

/// A body cell after decoration
#[derive(Clone)]
pub struct RenderedCell {
    pub text: String,
    pub decoration: DecorationKind,
    on_activate: Option<ActivationCallback>,
}

impl RenderedCell {
    fn plain(text: String) -> Self {
        Self {
            text,
            decoration: DecorationKind::None,
            on_activate: None,
        }
    }

    pub fn is_interactive(&self) -> bool {
        self.decoration != DecorationKind::None
    }

    /// Text as drawn, including button brackets
    pub fn display_text(&self) -> String {
        match self.decoration {
            DecorationKind::Button => format!("[ {} ]", self.text),
            _ => self.text.clone(),
        }
    }

    fn to_cell(&self, theme: &Theme) -> Cell<'_> {
        match self.decoration {
            DecorationKind::None => Cell::from(self.text.as_str()),
            DecorationKind::Link => {
                Cell::from(Line::from(Span::styled(self.text.as_str(), theme.link_style())))
            }
            DecorationKind::Button => {
                Cell::from(Line::from(Span::styled(self.display_text(), theme.button_style())))
            }
        }
    }
}

impl std::fmt::Debug for RenderedCell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderedCell")
            .field("text", &self.text)
            .field("decoration", &self.decoration)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct RenderedRow {
    pub cells: Vec<RenderedCell>,
}

/// Screen regions recorded on the last draw, used for mouse hit testing
#[derive(Debug, Clone, Default)]
struct HitAreas {
    search: Rect,
    pager_prev: Rect,
    pager_next: Rect,
    header: Rect,
    /// (x, width) per column
    columns: Vec<(u16, u16)>,
    body: Rect,
}

pub struct PagedTable {
    state: DisplayState,
    decorations: Vec<DecorationRule>,
    source: Arc<dyn PageSource>,
    theme: Theme,
    title: String,

    search: TextArea<'static>,
    search_placeholder: String,
    search_focused: bool,
    focused: bool,

    body: Vec<RenderedRow>,
    selected_row: usize,
    selected_col: usize,

    loading: LoadingIndicator,
    last_issued: u64,
    discard_stale: bool,
    debounce: Duration,
    pending_query_since: Option<Instant>,
    outcome_tx: UnboundedSender<PageOutcome>,
    outcome_rx: UnboundedReceiver<PageOutcome>,
    subscribers: Vec<UnboundedSender<TableEvent>>,

    notification: Option<MessageDialog>,
    hit_areas: HitAreas,
    supported_actions: Vec<Action>,
}

impl PagedTable {
    /// Build the empty table shell and trigger the initial fetch
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(options: TableOptions, source: Arc<dyn PageSource>) -> Result<Self, TableError> {
        let state = DisplayState::new(options.headers, options.rows_per_page)?;
        for rule in &options.decorations {
            if !state.columns().iter().any(|c| c.id == rule.column) {
                warn!(
                    "Decoration for unknown column '{}' will never apply",
                    rule.column
                );
            }
        }

        let (outcome_tx, outcome_rx) = mpsc::unbounded_channel();
        let search = Self::build_search_input("", &options.search_placeholder, &options.theme);

        let mut table = Self {
            state,
            decorations: options.decorations,
            source,
            title: options.title.unwrap_or_else(|| "Table".to_string()),
            search,
            search_placeholder: options.search_placeholder,
            search_focused: false,
            focused: false,
            body: Vec::new(),
            selected_row: 0,
            selected_col: 0,
            loading: LoadingIndicator::default(),
            last_issued: 0,
            discard_stale: options.discard_stale_responses,
            debounce: options.search_debounce,
            pending_query_since: None,
            outcome_tx,
            outcome_rx,
            subscribers: Vec::new(),
            notification: None,
            hit_areas: HitAreas::default(),
            theme: options.theme,
            supported_actions: vec![
                Action::MoveUp,
                Action::MoveDown,
                Action::MoveLeft,
                Action::MoveRight,
                Action::NextPage,
                Action::PrevPage,
                Action::ToggleSort,
                Action::Activate,
                Action::FocusSearch,
                Action::ClearSearch,
                Action::Refresh,
                Action::Cancel,
            ],
        };
        table.request_page();
        Ok(table)
    }

    fn build_search_input(text: &str, placeholder: &str, theme: &Theme) -> TextArea<'static> {
        let mut input = TextArea::new(vec![text.to_string()]);
        input.set_placeholder_text(placeholder.to_string());
        input.set_placeholder_style(theme.muted_style());
        input.set_cursor_line_style(theme.normal_style());
        input.move_cursor(tui_textarea::CursorMove::End);
        input
    }

    pub fn state(&self) -> &DisplayState {
        &self.state
    }

    pub fn current_page(&self) -> usize {
        self.state.current_page()
    }

    pub fn query(&self) -> &str {
        self.state.query()
    }

    pub fn columns(&self) -> &[ColumnDescriptor] {
        self.state.columns()
    }

    pub fn status_line(&self) -> String {
        self.state.status_line()
    }

    pub fn rendered_rows(&self) -> &[RenderedRow] {
        &self.body
    }

    pub fn is_loading(&self) -> bool {
        self.loading.is_visible()
    }

    pub fn notification(&self) -> Option<&MessageDialog> {
        self.notification.as_ref()
    }

    pub fn dismiss_notification(&mut self) {
        self.notification = None;
    }

    pub fn search_focused(&self) -> bool {
        self.search_focused
    }

    pub fn set_search_focused(&mut self, focused: bool) {
        self.search_focused = focused;
    }

    pub fn selection(&self) -> (usize, usize) {
        (self.selected_row, self.selected_col)
    }

    pub fn set_theme(&mut self, theme: Theme) {
        self.search = Self::build_search_input(self.state.query(), &self.search_placeholder, &theme);
        self.theme = theme;
    }

    /// Receive `TableEvent`s from now on
    pub fn subscribe(&mut self) -> UnboundedReceiver<TableEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers.push(tx);
        rx
    }

    fn publish(&mut self, event: TableEvent) {
        self.subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }

    /// Fetch the page described by the current display state
    ///
    /// The loading indicator stays visible until the outcome is applied or
    /// the request task goes away.
    pub fn request_page(&mut self) {
        self.pending_query_since = None;
        self.last_issued += 1;
        let seq = self.last_issued;
        let request = self.state.page_request();
        let loading = self.loading.acquire();
        let source = Arc::clone(&self.source);
        let tx = self.outcome_tx.clone();
        debug!("Requesting page #{seq}: {request:?}");

        tokio::spawn(async move {
            let result = match source.fetch_page(request.clone()).await {
                Ok(response) => validate_response(&response).map(|()| response),
                Err(e) => Err(TableError::fetch_failed(&e)),
            };
            // A closed channel means the table is gone; dropping the outcome releases the guard.
            let _ = tx.send(PageOutcome {
                seq,
                request,
                result,
                loading,
            });
        });
    }

    /// Apply a settled fetch to the display
    pub fn apply_outcome(&mut self, outcome: PageOutcome) -> Settled {
        let PageOutcome {
            seq,
            request,
            result,
            loading,
        } = outcome;
        drop(loading);

        if self.discard_stale && seq < self.last_issued {
            debug!(
                "Discarding stale outcome #{seq} (latest is #{})",
                self.last_issued
            );
            return Settled::Discarded;
        }

        match result {
            Ok(response) => {
                self.state.apply_response(&response);
                self.state.record_rendered(&request);
                self.render_rows(response.rows);
                debug!("Rendered page #{seq}: {}", self.state.status_line());
                self.publish(TableEvent::PageLoaded {
                    page: request.page,
                    start: self.state.start(),
                    end: self.state.end(),
                    total: self.state.total(),
                });
                Settled::Rendered
            }
            Err(err) => {
                error!("Fetch for page {} failed: {err}", request.page);
                // Only the latest request may roll back; a pending debounced query has moved on.
                if seq == self.last_issued
                    && self.pending_query_since.is_none()
                    && self.state.restore_rendered()
                {
                    self.sync_search_input();
                    debug!("Restored page {} after failed fetch", self.state.current_page());
                }
                self.notification = Some(MessageDialog::error(err.to_string()));
                self.publish(TableEvent::FetchFailed { error: err });
                Settled::Failed
            }
        }
    }

    /// Wait for the next settled fetch and apply it
    pub async fn next_outcome(&mut self) -> Option<Settled> {
        let outcome = self.outcome_rx.recv().await?;
        Some(self.apply_outcome(outcome))
    }

    /// Move one page forward; returns the resulting page index
    pub fn advance_page(&mut self) -> usize {
        self.state.advance_page()
    }

    /// Move one page back; returns the resulting page index
    pub fn retreat_page(&mut self) -> usize {
        self.state.retreat_page()
    }

    fn next_page(&mut self) {
        let before = self.state.current_page();
        if self.advance_page() != before {
            self.request_page();
        }
    }

    fn prev_page(&mut self) {
        let before = self.state.current_page();
        if self.retreat_page() != before {
            self.request_page();
        }
    }

    fn set_search_text(&mut self, text: &str) {
        if self.search.lines().first().map(String::as_str) != Some(text) {
            self.search = Self::build_search_input(text, &self.search_placeholder, &self.theme);
        }
    }

    fn sync_search_input(&mut self) {
        let query = self.state.query().to_string();
        if self.search.lines().first().map(|l| l.trim()) != Some(query.as_str()) {
            self.set_search_text(&query);
        }
    }

    /// Replace the query, go back to page 0 and refetch
    pub fn set_query(&mut self, text: &str) {
        self.set_search_text(text);
        self.state.set_query(text);
        let query = self.state.query().to_string();
        self.publish(TableEvent::QueryChanged { query });
        if self.debounce.is_zero() {
            self.request_page();
        } else {
            self.pending_query_since = Some(Instant::now());
        }
    }

    /// Cycle sorting on a sortable column and refetch
    ///
    /// Returns false for unknown or unsortable columns.
    pub fn toggle_sort(&mut self, column_id: &str) -> bool {
        match self.state.toggle_sort(column_id) {
            Some(direction) => {
                info!("Sorting by '{column_id}' {direction}");
                self.publish(TableEvent::SortChanged {
                    column: column_id.to_string(),
                    direction,
                });
                self.request_page();
                true
            }
            None => false,
        }
    }

    /// Replace the body with freshly fetched rows, applying decorations
    pub fn render_rows(&mut self, rows: Vec<Vec<String>>) {
        let targets: Vec<(usize, &DecorationRule)> = self
            .decorations
            .iter()
            .filter_map(|rule| {
                self.state
                    .columns()
                    .iter()
                    .position(|c| c.id == rule.column)
                    .map(|idx| (idx, rule))
            })
            .collect();

        self.body = rows
            .into_iter()
            .map(|row| {
                let mut cells: Vec<RenderedCell> =
                    row.into_iter().map(RenderedCell::plain).collect();
                for (idx, rule) in &targets {
                    if let Some(cell) = cells.get_mut(*idx) {
                        cell.decoration = rule.kind;
                        cell.on_activate = rule.on_activate.clone();
                    }
                }
                RenderedRow { cells }
            })
            .collect();

        self.selected_row = self.selected_row.min(self.body.len().saturating_sub(1));
    }

    /// Invoke the decoration callback of a body cell
    ///
    /// Returns true if the cell is decorated.
    pub fn activate_cell(&mut self, row: usize, col: usize) -> bool {
        let Some(cell) = self.body.get(row).and_then(|r| r.cells.get(col)) else {
            return false;
        };
        if !cell.is_interactive() {
            return false;
        }
        let text = cell.text.clone();
        if let Some(callback) = cell.on_activate.clone() {
            callback(&text);
        }
        let column = self
            .state
            .columns()
            .get(col)
            .map(|c| c.id.clone())
            .unwrap_or_default();
        debug!("Activated {column} cell '{text}'");
        self.publish(TableEvent::CellActivated { column, text });
        true
    }

    /// Route a key to the notification, the search input or a bound action
    ///
    /// Returns Ok(false) when the key is left for the host to handle.
    pub fn handle_key_event(&mut self, key: KeyEvent, keybindings: &KeyBindings) -> Result<bool> {
        if let Some(dialog) = &self.notification {
            if dialog.handle_key_event(key) {
                self.notification = None;
            }
            return Ok(true);
        }
        if self.search_focused {
            return Ok(self.handle_search_key(key));
        }
        if key.kind != KeyEventKind::Press {
            return Ok(false);
        }
        match keybindings.get_action(&key) {
            Some(action) => self.handle_action(action),
            None => Ok(false),
        }
    }

    /// Keystrokes while the search input has focus
    ///
    /// Returns true if the key was consumed.
    pub fn handle_search_key(&mut self, key: KeyEvent) -> bool {
        if key.kind != KeyEventKind::Press {
            return false;
        }
        match key.code {
            KeyCode::Esc | KeyCode::Enter | KeyCode::Tab | KeyCode::Down => {
                self.search_focused = false;
                true
            }
            KeyCode::Char('m') | KeyCode::Char('j')
                if key.modifiers.contains(KeyModifiers::CONTROL) =>
            {
                true
            }
            _ => {
                if self.search.input(key) {
                    let text = self.search.lines().first().cloned().unwrap_or_default();
                    self.set_query(&text);
                }
                true
            }
        }
    }

    /// Left clicks on pager, headers, cells and the search box; wheel scrolls rows
    pub fn handle_mouse_event(&mut self, mouse: MouseEvent) -> bool {
        let pos = Position::new(mouse.column, mouse.row);
        match mouse.kind {
            MouseEventKind::ScrollDown => {
                self.move_selection_down();
                true
            }
            MouseEventKind::ScrollUp => {
                self.selected_row = self.selected_row.saturating_sub(1);
                true
            }
            MouseEventKind::Down(MouseButton::Left) => {
                let areas = &self.hit_areas;
                if areas.search.contains(pos) {
                    self.search_focused = true;
                    return true;
                }
                if areas.pager_prev.contains(pos) {
                    self.prev_page();
                    return true;
                }
                if areas.pager_next.contains(pos) {
                    self.next_page();
                    return true;
                }
                let Some(col) = self.column_at(pos.x) else {
                    return false;
                };
                if self.hit_areas.header.contains(pos) {
                    self.selected_col = col;
                    if let Some(id) = self.state.columns().get(col).map(|c| c.id.clone()) {
                        self.toggle_sort(&id);
                    }
                    return true;
                }
                if self.hit_areas.body.contains(pos) {
                    let row = (pos.y - self.hit_areas.body.y) as usize;
                    if row < self.body.len() {
                        self.search_focused = false;
                        self.selected_row = row;
                        self.selected_col = col;
                        self.activate_cell(row, col);
                        return true;
                    }
                }
                false
            }
            _ => false,
        }
    }

    fn column_at(&self, x: u16) -> Option<usize> {
        self.hit_areas
            .columns
            .iter()
            .position(|(start, width)| x >= *start && x < start + width)
    }

    fn move_selection_down(&mut self) {
        if self.selected_row + 1 < self.body.len() {
            self.selected_row += 1;
        }
    }

    fn selected_column_id(&self) -> Option<String> {
        self.state
            .columns()
            .get(self.selected_col)
            .map(|c| c.id.clone())
    }

    /// Equal widths that exactly fill `width`
    fn column_widths(width: u16, count: usize) -> Vec<u16> {
        if count == 0 {
            return Vec::new();
        }
        let count_u16 = count as u16;
        let available = width.saturating_sub(COLUMN_SPACING * count_u16.saturating_sub(1));
        let base = available / count_u16;
        let rem = available % count_u16;
        (0..count_u16).map(|i| base + u16::from(i < rem)).collect()
    }

    fn pager_label(&self) -> String {
        format!(
            " Page {}/{} ",
            self.state.current_page() + 1,
            self.state.page_count()
        )
    }

    fn header_row(&self) -> Row<'_> {
        let table_active = self.focused && !self.search_focused;
        let cells: Vec<Cell> = self
            .state
            .columns()
            .iter()
            .enumerate()
            .map(|(i, col)| {
                let mut spans = vec![Span::raw(col.label.as_str())];
                if col.sortable {
                    spans.push(Span::raw(" "));
                    spans.push(Span::styled(
                        col.sort.icon(),
                        self.theme.sort_icon_style(col.sort.is_active()),
                    ));
                }
                let style = if table_active && i == self.selected_col {
                    self.theme.header_selected_style()
                } else {
                    self.theme.header_style()
                };
                Cell::from(Line::from(spans)).style(style)
            })
            .collect();
        Row::new(cells)
    }

    fn body_rows(&self) -> Vec<Row<'_>> {
        self.body
            .iter()
            .enumerate()
            .map(|(i, row)| {
                let cells: Vec<Cell> = row.cells.iter().map(|c| c.to_cell(&self.theme)).collect();
                let style = if self.focused && i == self.selected_row {
                    self.theme.selected_style()
                } else if i % 2 == 1 {
                    self.theme.alt_row_style()
                } else {
                    self.theme.normal_style()
                };
                Row::new(cells).style(style)
            })
            .collect()
    }
}

impl Component for PagedTable {
    fn handle_action(&mut self, action: Action) -> Result<bool> {
        match action {
            Action::MoveUp => {
                self.selected_row = self.selected_row.saturating_sub(1);
                Ok(true)
            }
            Action::MoveDown => {
                self.move_selection_down();
                Ok(true)
            }
            Action::MoveLeft => {
                self.selected_col = self.selected_col.saturating_sub(1);
                Ok(true)
            }
            Action::MoveRight => {
                if self.selected_col + 1 < self.state.columns().len() {
                    self.selected_col += 1;
                }
                Ok(true)
            }
            Action::NextPage => {
                self.next_page();
                Ok(true)
            }
            Action::PrevPage => {
                self.prev_page();
                Ok(true)
            }
            Action::ToggleSort => {
                if let Some(id) = self.selected_column_id() {
                    self.toggle_sort(&id);
                }
                Ok(true)
            }
            Action::Activate => {
                self.activate_cell(self.selected_row, self.selected_col);
                Ok(true)
            }
            Action::FocusSearch => {
                self.search_focused = true;
                Ok(true)
            }
            Action::ClearSearch => {
                self.set_query("");
                Ok(true)
            }
            Action::Refresh => {
                self.request_page();
                Ok(true)
            }
            Action::Cancel => {
                if self.notification.is_some() {
                    self.notification = None;
                    Ok(true)
                } else if self.search_focused {
                    self.search_focused = false;
                    Ok(true)
                } else {
                    Ok(false)
                }
            }
            _ => Ok(false),
        }
    }

    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title(format!(" {} ", self.title))
            .border_style(if self.focused {
                self.theme.focused_border_style()
            } else {
                self.theme.border_style()
            });
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1), // search + pager + loading
                Constraint::Min(1),    // table
                Constraint::Length(1), // status line
            ])
            .split(inner);

        let pager_label = self.pager_label();
        let loading_text = if self.is_loading() { "⟳ Loading…" } else { "" };
        let toolbar = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Length(8), // "Search: "
                Constraint::Min(8),
                Constraint::Length(11), // loading
                Constraint::Length(2),
                Constraint::Length(pager_label.chars().count() as u16),
                Constraint::Length(2),
            ])
            .split(rows[0]);

        let widths = Self::column_widths(rows[1].width, self.state.columns().len());
        let mut columns = Vec::with_capacity(widths.len());
        let mut x = rows[1].x;
        for w in &widths {
            columns.push((x, *w));
            x = x.saturating_add(*w + COLUMN_SPACING);
        }
        self.hit_areas = HitAreas {
            search: Rect::new(toolbar[0].x, toolbar[0].y, toolbar[0].width + toolbar[1].width, 1),
            pager_prev: toolbar[3],
            pager_next: toolbar[5],
            header: Rect::new(rows[1].x, rows[1].y, rows[1].width, rows[1].height.min(1)),
            columns,
            body: Rect::new(
                rows[1].x,
                rows[1].y.saturating_add(1),
                rows[1].width,
                rows[1].height.saturating_sub(1),
            ),
        };

        let label_style = if self.search_focused {
            self.theme.focused_border_style()
        } else {
            self.theme.muted_style()
        };
        frame.render_widget(Paragraph::new("Search: ").style(label_style), toolbar[0]);
        frame.render_widget(&self.search, toolbar[1]);
        frame.render_widget(
            Paragraph::new(loading_text).style(self.theme.info_style()),
            toolbar[2],
        );
        let can_retreat = self.state.current_page() > 0;
        let can_advance = self.state.current_page() < self.state.last_page();
        let arrow_style = |enabled: bool| {
            if enabled {
                self.theme.header_style()
            } else {
                self.theme.muted_style()
            }
        };
        frame.render_widget(
            Paragraph::new(" ◀").style(arrow_style(can_retreat)),
            toolbar[3],
        );
        frame.render_widget(Paragraph::new(pager_label.as_str()), toolbar[4]);
        frame.render_widget(
            Paragraph::new("▶ ").style(arrow_style(can_advance)),
            toolbar[5],
        );

        let constraints: Vec<Constraint> = widths.iter().map(|w| Constraint::Length(*w)).collect();
        let table = Table::new(self.body_rows(), constraints)
            .header(self.header_row())
            .column_spacing(COLUMN_SPACING);
        frame.render_widget(table, rows[1]);

        if self.body.is_empty() && !self.is_loading() && rows[1].height > 1 {
            let empty = Rect::new(rows[1].x, rows[1].y + 1, rows[1].width, 1);
            frame.render_widget(
                Paragraph::new("No matching rows").style(self.theme.muted_style()),
                empty,
            );
        }

        frame.render_widget(
            Paragraph::new(self.state.status_line()).style(self.theme.muted_style()),
            rows[2],
        );

        if let Some(dialog) = &self.notification {
            dialog.render(area, frame.buffer_mut(), &self.theme);
        }
    }

    fn supported_actions(&self) -> &[Action] {
        &self.supported_actions
    }

    fn name(&self) -> &str {
        "PagedTable"
    }

    /// Apply settled fetches and fire a debounced query
    fn update(&mut self) -> Result<()> {
        while let Ok(outcome) = self.outcome_rx.try_recv() {
            self.apply_outcome(outcome);
        }
        if let Some(since) = self.pending_query_since {
            if since.elapsed() >= self.debounce {
                self.request_page();
            }
        }
        Ok(())
    }
}

impl Focusable for PagedTable {
    fn is_focused(&self) -> bool {
        self.focused
    }

    fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
        if !focused {
            self.search_focused = false;
        }
    }
}
