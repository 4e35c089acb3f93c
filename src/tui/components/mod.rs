pub mod message_dialog;
pub mod paged_table;
pub mod toolbar;

pub use message_dialog::MessageDialog;
pub use paged_table::{
    LoadingGuard, LoadingIndicator, PageOutcome, PagedTable, RenderedCell, RenderedRow, Settled,
    TableEvent, TableOptions,
};
pub use toolbar::Toolbar;
