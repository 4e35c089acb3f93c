use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use strum::Display;

/// Tri-state sort marker carried by each column
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    None,
    Ascending,
    Descending,
}

impl SortDirection {
    /// Next state when the user activates sorting on a column
    ///
    /// `None` and `Descending` both go to `Ascending`; `Ascending` goes to `Descending`.
    pub fn cycle(self) -> Self {
        match self {
            SortDirection::None | SortDirection::Descending => SortDirection::Ascending,
            SortDirection::Ascending => SortDirection::Descending,
        }
    }

    /// Header glyph for this state
    pub fn icon(self) -> &'static str {
        match self {
            SortDirection::None => "↕",
            SortDirection::Ascending => "▲",
            SortDirection::Descending => "▼",
        }
    }

    pub fn is_active(self) -> bool {
        self != SortDirection::None
    }
}

/// Column descriptor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    /// Unique key used in page requests
    pub id: String,
    /// Header label
    pub label: String,
    #[serde(default)]
    pub sortable: bool,
    #[serde(skip)]
    pub sort: SortDirection,
}

impl ColumnDescriptor {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            sortable: false,
            sort: SortDirection::None,
        }
    }

    pub fn sortable(mut self) -> Self {
        self.sortable = true;
        self
    }
}

/// How a decorated cell is presented
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum DecorationKind {
    #[default]
    None,
    Link,
    Button,
}

/// Callback invoked with the text of an activated cell
pub type ActivationCallback = Arc<dyn Fn(&str) + Send + Sync>;

/// Per-column presentation/interaction transform
#[derive(Clone)]
pub struct DecorationRule {
    pub column: String,
    pub kind: DecorationKind,
    pub on_activate: Option<ActivationCallback>,
}

impl DecorationRule {
    pub fn new(column: impl Into<String>, kind: DecorationKind) -> Self {
        Self {
            column: column.into(),
            kind,
            on_activate: None,
        }
    }

    pub fn link(column: impl Into<String>) -> Self {
        Self::new(column, DecorationKind::Link)
    }

    pub fn button(column: impl Into<String>) -> Self {
        Self::new(column, DecorationKind::Button)
    }

    /// Attach the activation callback
    pub fn on_activate<F>(mut self, callback: F) -> Self
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.on_activate = Some(Arc::new(callback));
        self
    }
}

impl fmt::Debug for DecorationRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecorationRule")
            .field("column", &self.column)
            .field("kind", &self.kind)
            .field("on_activate", &self.on_activate.is_some())
            .finish()
    }
}

/// Parameters handed to a page source for one fetch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub page: usize,
    pub rows_per_page: usize,
    /// Trimmed query, `None` when empty
    pub query: Option<String>,
    pub sort_column: Option<String>,
    pub sort_direction: SortDirection,
}

impl PageRequest {
    /// Zero-based offset of the first requested row
    pub fn offset(&self) -> usize {
        self.page.saturating_mul(self.rows_per_page)
    }
}

/// One window of rows plus pagination totals
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageResponse {
    pub rows: Vec<Vec<String>>,
    /// Zero-based offset of `rows[0]` among all matching rows
    pub start: usize,
    /// Matching row count after filtering, before pagination
    pub total: usize,
}

impl PageResponse {
    /// Exclusive end of the window
    pub fn end(&self) -> usize {
        self.start.saturating_add(self.rows.len())
    }
}
