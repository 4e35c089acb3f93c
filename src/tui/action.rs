use serde::{Deserialize, Serialize};
use std::fmt;

/// All possible actions in the application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum Action {
    // Navigation
    MoveUp,
    MoveDown,
    MoveLeft,
    MoveRight,
    NextPage,
    PrevPage,

    // Table
    ToggleSort,
    Activate,
    FocusSearch,
    ClearSearch,
    Refresh,

    // View
    ToggleHelp,

    // Application
    Quit,
    Cancel,
}

impl Action {
    /// Get human-readable description
    pub fn description(&self) -> &'static str {
        match self {
            Action::MoveUp => "Select previous row",
            Action::MoveDown => "Select next row",
            Action::MoveLeft => "Select previous column",
            Action::MoveRight => "Select next column",
            Action::NextPage => "Next page",
            Action::PrevPage => "Previous page",
            Action::ToggleSort => "Sort by selected column",
            Action::Activate => "Activate selected cell",
            Action::FocusSearch => "Focus search",
            Action::ClearSearch => "Clear search",
            Action::Refresh => "Reload current page",
            Action::ToggleHelp => "Toggle help",
            Action::Quit => "Quit application",
            Action::Cancel => "Cancel / close",
        }
    }

    /// Get category for grouping in help screen
    pub fn category(&self) -> ActionCategory {
        match self {
            Action::MoveUp
            | Action::MoveDown
            | Action::MoveLeft
            | Action::MoveRight
            | Action::NextPage
            | Action::PrevPage => ActionCategory::Navigation,

            Action::ToggleSort
            | Action::Activate
            | Action::FocusSearch
            | Action::ClearSearch
            | Action::Refresh => ActionCategory::Table,

            Action::ToggleHelp => ActionCategory::View,

            Action::Quit | Action::Cancel => ActionCategory::Application,
        }
    }

    /// Get all possible actions (for validation)
    pub fn all() -> Vec<Action> {
        vec![
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
            Action::ToggleHelp,
            Action::Quit,
            Action::Cancel,
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionCategory {
    Navigation,
    Table,
    View,
    Application,
}

impl fmt::Display for ActionCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionCategory::Navigation => write!(f, "Navigation"),
            ActionCategory::Table => write!(f, "Table"),
            ActionCategory::View => write!(f, "View"),
            ActionCategory::Application => write!(f, "Application"),
        }
    }
}
