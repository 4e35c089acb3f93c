//! Synchronous view parameters of the paged table
//!
//! Everything here is plain state arithmetic; fetching and rendering live in
//! the TUI component that owns a `DisplayState`.

use crate::core::{ColumnDescriptor, PageRequest, PageResponse, SortDirection, TableError};

#[derive(Debug, Clone)]
pub struct DisplayState {
    columns: Vec<ColumnDescriptor>,
    current_page: usize,
    rows_per_page: usize,
    query: String,
    total: usize,
    start: usize,
    end: usize,
    /// Parameters of the page currently on screen
    rendered: Option<PageRequest>,
}

impl DisplayState {
    pub fn new(columns: Vec<ColumnDescriptor>, rows_per_page: usize) -> Result<Self, TableError> {
        if rows_per_page == 0 {
            return Err(TableError::InvalidConfig(
                "rows_per_page must be positive".to_string(),
            ));
        }
        for (i, col) in columns.iter().enumerate() {
            if columns[..i].iter().any(|c| c.id == col.id) {
                return Err(TableError::InvalidConfig(format!(
                    "duplicate column id '{}'",
                    col.id
                )));
            }
        }
        let mut columns = columns;
        // Only one active sort is allowed; keep the first one configured.
        let mut seen_active = false;
        for col in columns.iter_mut() {
            if !col.sortable || (col.sort.is_active() && seen_active) {
                col.sort = SortDirection::None;
            }
            seen_active |= col.sort.is_active();
        }
        Ok(Self {
            columns,
            current_page: 0,
            rows_per_page,
            query: String::new(),
            total: 0,
            start: 0,
            end: 0,
            rendered: None,
        })
    }

    pub fn columns(&self) -> &[ColumnDescriptor] {
        &self.columns
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn rows_per_page(&self) -> usize {
        self.rows_per_page
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn end(&self) -> usize {
        self.end
    }

    /// Index of the last page given the known total (0 when empty)
    pub fn last_page(&self) -> usize {
        if self.total == 0 {
            0
        } else {
            (self.total - 1) / self.rows_per_page
        }
    }

    /// Number of pages for the pager label (at least 1)
    pub fn page_count(&self) -> usize {
        self.last_page() + 1
    }

    /// Move one page forward unless already on the last page
    pub fn advance_page(&mut self) -> usize {
        if (self.current_page + 1).saturating_mul(self.rows_per_page) < self.total {
            self.current_page += 1;
        }
        self.current_page
    }

    /// Move one page back unless already on the first page
    pub fn retreat_page(&mut self) -> usize {
        self.current_page = self.current_page.saturating_sub(1);
        self.current_page
    }

    /// Store the trimmed query and go back to the first page
    ///
    /// Returns true if the stored query changed.
    pub fn set_query(&mut self, text: &str) -> bool {
        let trimmed = text.trim();
        let changed = self.query != trimmed;
        self.query = trimmed.to_string();
        self.current_page = 0;
        changed
    }

    /// Cycle the sort state of a sortable column, clearing every other column
    ///
    /// Returns the new direction, or `None` if the column is unknown or not sortable.
    pub fn toggle_sort(&mut self, column_id: &str) -> Option<SortDirection> {
        let idx = self
            .columns
            .iter()
            .position(|c| c.id == column_id && c.sortable)?;
        let next = self.columns[idx].sort.cycle();
        for col in self.columns.iter_mut() {
            col.sort = SortDirection::None;
        }
        self.columns[idx].sort = next;
        Some(next)
    }

    /// Active sort column and direction, if any
    pub fn sort(&self) -> Option<(&str, SortDirection)> {
        self.columns
            .iter()
            .find(|c| c.sort.is_active())
            .map(|c| (c.id.as_str(), c.sort))
    }

    /// Snapshot of the current parameters for a fetch
    pub fn page_request(&self) -> PageRequest {
        let (sort_column, sort_direction) = match self.sort() {
            Some((id, dir)) => (Some(id.to_string()), dir),
            None => (None, SortDirection::None),
        };
        PageRequest {
            page: self.current_page,
            rows_per_page: self.rows_per_page,
            query: (!self.query.is_empty()).then(|| self.query.clone()),
            sort_column,
            sort_direction,
        }
    }

    /// Record the window of a successfully applied response
    pub fn apply_response(&mut self, response: &PageResponse) {
        self.start = response.start;
        self.end = response.end();
        self.total = response.total;
    }

    /// Remember the parameters behind the rows now on screen
    pub fn record_rendered(&mut self, request: &PageRequest) {
        self.rendered = Some(request.clone());
    }

    /// Put page, query and sort back to the last rendered page
    ///
    /// Returns false if nothing has been rendered yet.
    pub fn restore_rendered(&mut self) -> bool {
        let Some(request) = self.rendered.clone() else {
            return false;
        };
        self.current_page = request.page;
        self.query = request.query.unwrap_or_default();
        for col in self.columns.iter_mut() {
            col.sort = match &request.sort_column {
                Some(id) if *id == col.id => request.sort_direction,
                _ => SortDirection::None,
            };
        }
        true
    }

    /// Status line for the current window
    pub fn status_line(&self) -> String {
        if self.total == 0 {
            return "Showing 0 to 0 of 0".to_string();
        }
        format!(
            "Showing {} to {} of {}",
            self.start + 1,
            self.end,
            self.total
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn columns() -> Vec<ColumnDescriptor> {
        vec![
            ColumnDescriptor::new("name", "Name").sortable(),
            ColumnDescriptor::new("age", "Age").sortable(),
            ColumnDescriptor::new("notes", "Notes"),
        ]
    }

    fn state_with_total(total: usize, rpp: usize) -> DisplayState {
        let mut state = DisplayState::new(columns(), rpp).unwrap();
        state.apply_response(&PageResponse {
            rows: Vec::new(),
            start: 0,
            total,
        });
        state
    }

    #[test]
    fn test_zero_rows_per_page_rejected() {
        assert!(matches!(
            DisplayState::new(columns(), 0),
            Err(TableError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_duplicate_column_rejected() {
        let cols = vec![
            ColumnDescriptor::new("a", "A"),
            ColumnDescriptor::new("a", "Again"),
        ];
        assert!(DisplayState::new(cols, 10).is_err());
    }

    #[test]
    fn test_initial_sort_normalized() {
        let mut cols = columns();
        cols[0].sort = SortDirection::Ascending;
        cols[1].sort = SortDirection::Descending;
        cols[2].sort = SortDirection::Ascending; // not sortable
        let state = DisplayState::new(cols, 10).unwrap();
        assert_eq!(state.sort(), Some(("name", SortDirection::Ascending)));
        assert_eq!(state.columns()[1].sort, SortDirection::None);
        assert_eq!(state.columns()[2].sort, SortDirection::None);
    }

    #[test]
    fn test_advance_stops_at_last_page() {
        let mut state = state_with_total(25, 10);
        assert_eq!(state.advance_page(), 1);
        assert_eq!(state.advance_page(), 2);
        assert_eq!(state.advance_page(), 2);
        assert_eq!(state.last_page(), 2);
    }

    #[test]
    fn test_retreat_stops_at_zero() {
        let mut state = state_with_total(25, 10);
        assert_eq!(state.retreat_page(), 0);
        state.advance_page();
        assert_eq!(state.retreat_page(), 0);
        assert_eq!(state.retreat_page(), 0);
    }

    #[test]
    fn test_empty_total_keeps_page_zero() {
        let mut state = state_with_total(0, 10);
        assert_eq!(state.advance_page(), 0);
        assert_eq!(state.retreat_page(), 0);
        assert_eq!(state.page_count(), 1);
    }

    #[test]
    fn test_page_bounds_hold_for_any_sequence() {
        for total in [0usize, 1, 9, 10, 11, 25, 100] {
            let mut state = state_with_total(total, 10);
            // deterministic walk of advances and retreats
            for step in 0..60 {
                if step % 7 < 4 {
                    state.advance_page();
                } else {
                    state.retreat_page();
                }
                if total == 0 {
                    assert_eq!(state.current_page(), 0);
                } else {
                    assert!(state.current_page() <= (total - 1) / 10);
                    assert!(state.current_page() * 10 < total);
                }
            }
        }
    }

    #[test]
    fn test_toggle_sort_cycle_and_reset() {
        let mut state = DisplayState::new(columns(), 10).unwrap();
        assert_eq!(state.toggle_sort("name"), Some(SortDirection::Ascending));
        assert_eq!(state.toggle_sort("name"), Some(SortDirection::Descending));
        assert_eq!(state.toggle_sort("name"), Some(SortDirection::Ascending));

        assert_eq!(state.toggle_sort("age"), Some(SortDirection::Ascending));
        assert_eq!(state.columns()[0].sort, SortDirection::None);
        assert_eq!(state.sort(), Some(("age", SortDirection::Ascending)));
    }

    #[test]
    fn test_toggle_sort_ignores_unsortable_and_unknown() {
        let mut state = DisplayState::new(columns(), 10).unwrap();
        state.toggle_sort("name");
        assert_eq!(state.toggle_sort("notes"), None);
        assert_eq!(state.toggle_sort("missing"), None);
        assert_eq!(state.sort(), Some(("name", SortDirection::Ascending)));
    }

    #[test]
    fn test_set_query_resets_page_and_trims() {
        let mut state = state_with_total(100, 10);
        state.advance_page();
        state.advance_page();
        assert_eq!(state.current_page(), 2);
        assert!(state.set_query("  foo "));
        assert_eq!(state.query(), "foo");
        assert_eq!(state.current_page(), 0);
        // same query still resets the page
        state.advance_page();
        assert!(!state.set_query("foo"));
        assert_eq!(state.current_page(), 0);
    }

    #[test]
    fn test_page_request_snapshot() {
        let mut state = state_with_total(100, 20);
        state.set_query("   ");
        state.toggle_sort("age");
        state.toggle_sort("age");
        state.advance_page();
        assert_eq!(
            state.page_request(),
            PageRequest {
                page: 1,
                rows_per_page: 20,
                query: None,
                sort_column: Some("age".to_string()),
                sort_direction: SortDirection::Descending,
            }
        );
    }

    #[test]
    fn test_status_line() {
        let mut state = DisplayState::new(columns(), 10).unwrap();
        assert_eq!(state.status_line(), "Showing 0 to 0 of 0");
        state.apply_response(&PageResponse {
            rows: vec![
                vec!["r1c1".into(), "r1c2".into()],
                vec!["r2c1".into(), "r2c2".into()],
            ],
            start: 10,
            total: 100,
        });
        assert_eq!(state.status_line(), "Showing 11 to 12 of 100");
    }

    #[test]
    fn test_restore_rendered_undoes_navigation_and_sort() {
        let mut state = state_with_total(25, 10);
        assert!(!state.restore_rendered());

        state.record_rendered(&state.page_request());
        let before = state.page_request();

        state.advance_page();
        state.toggle_sort("age");
        state.set_query("bob");
        assert_ne!(state.page_request(), before);

        assert!(state.restore_rendered());
        assert_eq!(state.page_request(), before);
        assert_eq!(state.current_page(), 0);
        assert_eq!(state.query(), "");
        assert!(state.columns().iter().all(|c| c.sort == SortDirection::None));
    }

    #[test]
    fn test_restore_rendered_keeps_rendered_sort() {
        let mut state = state_with_total(25, 10);
        state.toggle_sort("name");
        state.advance_page();
        state.record_rendered(&state.page_request());

        state.toggle_sort("name");
        state.retreat_page();
        assert!(state.restore_rendered());
        assert_eq!(state.current_page(), 1);
        assert_eq!(state.sort(), Some(("name", SortDirection::Ascending)));
    }
}
