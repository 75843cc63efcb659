//! Terminal setup and frame output via crossterm.

use std::io::{self, Write};

use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::style::Print;
use crossterm::terminal::{
    self, disable_raw_mode, enable_raw_mode, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::{execute, queue};

/// Raw mode plus alternate screen for as long as the guard lives.
pub struct TerminalGuard {
    active: bool,
}

impl TerminalGuard {
    pub fn enter() -> io::Result<Self> {
        enable_raw_mode()?;
        execute!(io::stdout(), EnterAlternateScreen, Hide)?;
        Ok(Self { active: true })
    }

    /// Restore the terminal now instead of on drop.
    pub fn leave(&mut self) -> io::Result<()> {
        if !self.active {
            return Ok(());
        }
        self.active = false;
        execute!(io::stdout(), Show, LeaveAlternateScreen)?;
        disable_raw_mode()
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        // Best effort
        let _ = self.leave();
    }
}

/// Terminal size as (columns, rows), 80x24 if it cannot be detected.
pub fn size() -> (u16, u16) {
    terminal::size().unwrap_or((80, 24))
}

/// Write `rows` top to bottom, clearing the rest of each line.
pub fn write_frame<W: Write>(out: &mut W, rows: &[String]) -> io::Result<()> {
    for (y, row) in rows.iter().enumerate() {
        queue!(
            out,
            MoveTo(0, y as u16),
            Print(row),
            Clear(ClearType::UntilNewLine)
        )?;
    }
    out.flush()
}
