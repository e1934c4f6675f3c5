use std::io::{stdout, Stdout};
use std::ops::{Deref, DerefMut};

use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use ratatui::backend::{Backend, CrosstermBackend};
use ratatui::Terminal;

/// Raw-mode alternate-screen terminal that restores the user's shell
/// on drop, even when the app unwinds.
pub struct TerminalGuard<B: Backend> {
    inner: Terminal<B>,
}

impl<B: Backend> TerminalGuard<B> {
    pub fn setup(backend: B) -> anyhow::Result<Self> {
        stdout().execute(EnterAlternateScreen)?;
        enable_raw_mode()?;

        Ok(Self {
            inner: Terminal::new(backend)?,
        })
    }
}

impl<B: Backend> Drop for TerminalGuard<B> {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = stdout().execute(LeaveAlternateScreen);
    }
}

impl<B: Backend> Deref for TerminalGuard<B> {
    type Target = Terminal<B>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl<B: Backend> DerefMut for TerminalGuard<B> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.inner
    }
}

pub fn setup() -> anyhow::Result<TerminalGuard<CrosstermBackend<Stdout>>> {
    TerminalGuard::setup(CrosstermBackend::new(stdout()))
}
