//! The serial driver loop and the terminal lifecycle around it.
//!
//! One thread owns the monitor and the viewport; ticks and key events
//! arrive over the event channel and are applied in order. Everything that
//! can fail after raw mode is enabled funnels back through the caller,
//! which restores the terminal before printing anything.

use std::io::{self, Stdout};

use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use nix::sys::signal::{Signal, raise};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tracing::info;

use super::event::{Event, EventHandler};
use super::input::{KeyAction, handle_key};
use super::render::render;
use super::state::Viewport;
use crate::collector::traits::FileSystem;
use crate::config::Config;
use crate::monitor::Monitor;
use crate::users::UserTable;

pub type Tui = Terminal<CrosstermBackend<Stdout>>;

/// Puts the terminal into raw mode on the alternate screen.
pub fn setup_terminal() -> io::Result<Tui> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    Terminal::new(CrosstermBackend::new(stdout))
}

/// Restores cooked mode, the main screen and the cursor. Must run before
/// any diagnostic lands on stderr.
pub fn restore_terminal(terminal: &mut Tui) -> io::Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()
}

/// Owns the monitor, the viewport and the configuration for one run.
pub struct App<F: FileSystem> {
    monitor: Monitor<F>,
    users: UserTable,
    config: Config,
    viewport: Viewport,
}

impl<F: FileSystem> App<F> {
    pub fn new(monitor: Monitor<F>, users: UserTable, config: Config) -> Self {
        // Real dimensions arrive from the first draw.
        let viewport = Viewport::new(0, 0, config.verbose);
        Self {
            monitor,
            users,
            config,
            viewport,
        }
    }

    /// Runs until quit or a fatal monitor error.
    pub fn run(&mut self, terminal: &mut Tui) -> Result<(), Box<dyn std::error::Error>> {
        let events = EventHandler::new(self.config.delay);
        self.monitor.update(&self.config, &self.users)?;
        info!(processes = self.monitor.list.len(), "monitor started");

        loop {
            terminal.draw(|frame| render(frame, &self.monitor, &mut self.viewport, &self.config))?;

            match events.next()? {
                Event::Tick => self.monitor.update(&self.config, &self.users)?,
                Event::Resize(width, height) => self.viewport.resize(width, height),
                Event::Key(key) => {
                    match handle_key(&mut self.viewport, key, self.monitor.list.len()) {
                        KeyAction::Quit => break,
                        KeyAction::Suspend => suspend(terminal, &events)?,
                        KeyAction::None => {}
                    }
                }
            }
        }

        info!("shutting down");
        Ok(())
    }
}

/// Ctrl-Z: hand the terminal back to the shell, stop, and rebuild on
/// resume. Events queued while stopped are dropped, not replayed.
fn suspend(terminal: &mut Tui, events: &EventHandler) -> io::Result<()> {
    restore_terminal(terminal)?;
    raise(Signal::SIGTSTP).map_err(io::Error::other)?;
    // Stopped here until SIGCONT.
    enable_raw_mode()?;
    execute!(terminal.backend_mut(), EnterAlternateScreen)?;
    terminal.clear()?;
    events.drain();
    Ok(())
}
