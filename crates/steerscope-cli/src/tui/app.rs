//! TUI application state and event loop.
//!
//! Design: two panes, one focus. Arrow keys move the selection on the focused
//! pane only; the other pane keeps whatever it had. File reloads run on the
//! current-thread runtime and report failures in the status line instead of
//! leaving the TUI.

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::prelude::*;

use steerscope_core::{Dashboard, DashboardView, DisplayConfig, Side};

// ---------------------------------------------------------------------------
// Status line
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    pub message: String,
    pub is_error: bool,
}

impl Status {
    fn info(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            is_error: false,
        }
    }

    fn error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            is_error: true,
        }
    }
}

// ---------------------------------------------------------------------------
// App
// ---------------------------------------------------------------------------

pub struct App {
    dashboard: Dashboard,
    config: DisplayConfig,
    paths: [Option<PathBuf>; 2],
    focus: Side,
    running: bool,
    status: Option<Status>,
    runtime: tokio::runtime::Runtime,
}

impl App {
    pub fn new(
        dashboard: Dashboard,
        config: DisplayConfig,
        baseline_path: Option<PathBuf>,
        steered_path: Option<PathBuf>,
        runtime: tokio::runtime::Runtime,
    ) -> Self {
        Self {
            dashboard,
            config,
            paths: [baseline_path, steered_path],
            focus: Side::Baseline,
            running: true,
            status: None,
            runtime,
        }
    }

    pub fn run(&mut self) -> io::Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        // Install panic hook that restores terminal before printing the panic.
        let original_hook = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            let _ = disable_raw_mode();
            let _ = execute!(io::stdout(), LeaveAlternateScreen, crossterm::cursor::Show);
            original_hook(info);
        }));

        let result = self.run_loop(&mut terminal);

        // Always restore terminal, even if the loop returned an error.
        let _ = std::panic::take_hook();
        disable_raw_mode()?;
        execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            crossterm::cursor::Show
        )?;

        result
    }

    fn run_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    ) -> io::Result<()> {
        while self.running {
            terminal.draw(|f| super::ui::draw(f, self))?;

            if event::poll(Duration::from_millis(100))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key.code);
                    }
                }
            }
        }
        Ok(())
    }

    pub(crate) fn handle_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Char('q') => self.running = false,
            KeyCode::Tab | KeyCode::BackTab => self.focus = self.focus.other(),
            KeyCode::Char('1') => self.focus = Side::Baseline,
            KeyCode::Char('2') => self.focus = Side::Steered,
            KeyCode::Right | KeyCode::Char('l') => self.step(1),
            KeyCode::Left | KeyCode::Char('h') => self.step(-1),
            KeyCode::Home | KeyCode::Char('g') => self.jump(false),
            KeyCode::End | KeyCode::Char('G') => self.jump(true),
            KeyCode::Esc => {
                self.dashboard.clear_selection(self.focus);
                self.status = None;
            }
            KeyCode::Char('r') => self.reload(self.focus),
            KeyCode::Char('R') => {
                for side in Side::ALL {
                    self.reload(side);
                }
            }
            _ => {}
        }
    }

    /// Move the focused selection by `delta`, clamped to the trace. With no
    /// selection, forward starts at the first token and backward at the last.
    fn step(&mut self, delta: isize) {
        let side = self.focus;
        let len = self.dashboard.state().trace(side).len();
        if len == 0 {
            self.status = Some(Status::error(format!("{side}: no trace loaded")));
            return;
        }
        let target = match self.dashboard.state().selection(side) {
            Some(current) => current.saturating_add_signed(delta).min(len - 1),
            None if delta >= 0 => 0,
            None => len - 1,
        };
        self.select(side, target);
    }

    fn jump(&mut self, to_end: bool) {
        let side = self.focus;
        let len = self.dashboard.state().trace(side).len();
        if len == 0 {
            self.status = Some(Status::error(format!("{side}: no trace loaded")));
            return;
        }
        self.select(side, if to_end { len - 1 } else { 0 });
    }

    fn select(&mut self, side: Side, index: usize) {
        match self.dashboard.select_token(side, index) {
            Ok(()) => self.status = None,
            Err(e) => self.status = Some(Status::error(e.to_string())),
        }
    }

    /// Re-read `side`'s file from disk. The side keeps its old trace if the
    /// read or parse fails.
    fn reload(&mut self, side: Side) {
        let Some(path) = self.paths[slot(side)].clone() else {
            self.status = Some(Status::error(format!(
                "{side}: no file given (start with --{side} <path>)"
            )));
            return;
        };
        log::debug!("reloading {side} from {}", path.display());
        let result = self
            .runtime
            .block_on(self.dashboard.load_trace_file(side, &path));
        self.status = Some(match result {
            Ok(()) => Status::info(format!(
                "{side}: loaded {} tokens from {}",
                self.dashboard.state().trace(side).len(),
                path.display()
            )),
            Err(e) => Status::error(format!("{side}: {e}")),
        });
    }

    // -----------------------------------------------------------------------
    // Accessors for the renderer
    // -----------------------------------------------------------------------

    pub fn view(&self) -> DashboardView {
        self.dashboard.view()
    }

    pub fn config(&self) -> &DisplayConfig {
        &self.config
    }

    pub fn focus(&self) -> Side {
        self.focus
    }

    pub fn status(&self) -> Option<&Status> {
        self.status.as_ref()
    }

    pub fn path(&self, side: Side) -> Option<&PathBuf> {
        self.paths[slot(side)].as_ref()
    }

    #[cfg(test)]
    fn dashboard(&self) -> &Dashboard {
        &self.dashboard
    }
}

fn slot(side: Side) -> usize {
    match side {
        Side::Baseline => 0,
        Side::Steered => 1,
    }
}
