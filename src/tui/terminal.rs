//! Terminal setup, teardown and panic reporting

use std::io::{self, Stdout};
use std::panic::PanicHookInfo;

use color_eyre::Result;
use color_eyre::config::HookBuilder;
use crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;

pub type Tui = Terminal<CrosstermBackend<Stdout>>;

/// Raw mode, alternate screen and mouse capture
pub fn init() -> Result<Tui> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    Ok(Terminal::new(CrosstermBackend::new(stdout))?)
}

/// Undo `init`; safe to call more than once
pub fn restore() -> Result<()> {
    disable_raw_mode()?;
    execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture)?;
    Ok(())
}

/// Install color-eyre's report hooks with the terminal restored before any panic report
pub fn install_hooks() -> Result<()> {
    let (panic_hook, eyre_hook) = HookBuilder::default().into_hooks();
    eyre_hook.install()?;
    let panic_hook = panic_hook.into_panic_hook();
    install_panic_hook(
        || {
            // Already panicking; a failed restore must not hide the report.
            let _ = restore();
        },
        move |info| panic_hook(info),
    );
    Ok(())
}

/// Run `cleanup` and then hand the panic to `report`
pub fn install_panic_hook<C, R>(cleanup: C, report: R)
where
    C: Fn() + Send + Sync + 'static,
    R: Fn(&PanicHookInfo<'_>) + Send + Sync + 'static,
{
    std::panic::set_hook(Box::new(move |info| {
        cleanup();
        report(info);
    }));
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_cleanup_runs_before_panic_report() {
        let calls = Arc::new(Mutex::new(Vec::<String>::new()));
        let (cleanup_log, report_log) = (Arc::clone(&calls), Arc::clone(&calls));
        install_panic_hook(
            move || cleanup_log.lock().unwrap().push("restore".to_string()),
            move |info| {
                let message = info
                    .payload()
                    .downcast_ref::<&str>()
                    .copied()
                    .unwrap_or_default();
                report_log.lock().unwrap().push(format!("report {message}"));
            },
        );

        let result = std::panic::catch_unwind(|| panic!("render blew up"));
        let _ = std::panic::take_hook();

        assert!(result.is_err());
        assert_eq!(
            *calls.lock().unwrap(),
            vec!["restore".to_string(), "report render blew up".to_string()]
        );
    }
}
