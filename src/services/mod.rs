pub mod memory_source;
pub mod page_source;

pub use memory_source::MemoryPageSource;
pub use page_source::PageSource;
