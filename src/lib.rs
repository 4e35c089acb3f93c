#![allow(clippy::collapsible_if)]
#![allow(clippy::collapsible_match)]
#![allow(clippy::collapsible_else_if)]

pub mod config;
pub mod core;
pub mod logging;
pub mod services;
pub mod tui;

// Re-export commonly used types
pub use core::{
    ColumnDescriptor, DecorationKind, DecorationRule, DisplayState, PageRequest, PageResponse,
    SortDirection, TableError,
};
pub use services::{MemoryPageSource, PageSource};
pub use tui::{Action, ActionCategory, PagedTable, TableEvent, TableOptions};
