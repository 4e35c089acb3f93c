use crate::tui::action::Action;
use color_eyre::Result;
use ratatui::{Frame, layout::Rect};

/// Base trait for all TUI components
///
/// All interactive UI elements implement this trait to provide consistent
/// behavior for action handling, rendering, and component lifecycle.
pub trait Component {
    /// Handle an action
    ///
    /// Returns Ok(true) if the action was handled and consumed.
    /// Returns Ok(false) if the action was not handled and should propagate.
    fn handle_action(&mut self, action: Action) -> Result<bool>;

    /// Render the component within the given area
    fn render(&mut self, frame: &mut Frame, area: Rect);

    /// Actions this component reacts to (used for the help overlay)
    fn supported_actions(&self) -> &[Action];

    /// Component name for logging
    fn name(&self) -> &str;

    /// Update component state (called on every tick)
    ///
    /// Default implementation does nothing.
    fn update(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Components that can receive keyboard focus
pub trait Focusable: Component {
    fn is_focused(&self) -> bool;

    fn set_focused(&mut self, focused: bool);
}
