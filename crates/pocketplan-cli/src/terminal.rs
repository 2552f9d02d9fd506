//! Full-screen terminal handling for the chart view

use std::io::{stdout, Stdout};

use anyhow::{Context, Result};
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::{backend::CrosstermBackend, Terminal};

pub type ChartTerminal = Terminal<CrosstermBackend<Stdout>>;

/// Switch to raw mode and the alternate screen
///
/// If anything fails after raw mode is on, the console is put back the way
/// it was before the error is returned.
pub fn setup_terminal() -> Result<ChartTerminal> {
    enable_raw_mode().context("Failed to enable raw mode")?;
    undo_on_error(enter_chart_screen(), || {
        let _ = crossterm::execute!(stdout(), LeaveAlternateScreen);
        let _ = disable_raw_mode();
    })
}

fn undo_on_error<T>(result: Result<T>, undo: impl FnOnce()) -> Result<T> {
    if result.is_err() {
        undo();
    }
    result
}

fn enter_chart_screen() -> Result<ChartTerminal> {
    let mut stdout = stdout();
    crossterm::execute!(stdout, EnterAlternateScreen)
        .context("Failed to enter alternate screen")?;
    Terminal::new(CrosstermBackend::new(stdout)).context("Failed to create chart terminal")
}

/// Leave the alternate screen and give the console back to line input
///
/// Every step is attempted even if an earlier one fails; the first error
/// is returned.
pub fn restore_terminal(terminal: &mut ChartTerminal) -> Result<()> {
    let raw = disable_raw_mode().context("Failed to disable raw mode");
    let screen = crossterm::execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("Failed to leave alternate screen");
    let cursor = terminal.show_cursor().context("Failed to show cursor");
    raw.and(screen).and(cursor)
}
