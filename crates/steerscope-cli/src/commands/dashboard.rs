//! `steerscope dashboard`: interactive two-pane TUI.

use std::path::PathBuf;

use steerscope_core::{Dashboard, DisplayConfig, Side};

pub fn run(baseline: Option<&str>, steered: Option<&str>, display: DisplayConfig) {
    let rt = super::runtime();
    let mut dash = Dashboard::new();
    // Startup loads are fatal, the same as for the other commands; reloads
    // from inside the TUI only report.
    if let Some(path) = baseline {
        super::load_or_exit(&rt, &mut dash, Side::Baseline, path);
    }
    if let Some(path) = steered {
        super::load_or_exit(&rt, &mut dash, Side::Steered, path);
    }

    let mut app = crate::tui::app::App::new(
        dash,
        display,
        baseline.map(PathBuf::from),
        steered.map(PathBuf::from),
        rt,
    );
    if let Err(e) = app.run() {
        eprintln!("TUI error: {e}");
        std::process::exit(1);
    }
}
