pub mod display_state;
pub mod error;
pub mod types;

pub use display_state::DisplayState;
pub use error::{TableError, validate_response};
pub use types::*;
