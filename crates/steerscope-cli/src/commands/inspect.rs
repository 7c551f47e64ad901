//! `steerscope inspect`: list one trace's tokens and analyze one of them.

use steerscope_core::{Dashboard, DisplayConfig, Side};

pub struct InspectCommandConfig<'a> {
    pub path: &'a str,
    pub side: Side,
    pub index: Option<usize>,
    pub json: bool,
    pub display: DisplayConfig,
}

/// Run the inspect command.
pub fn run(cfg: InspectCommandConfig<'_>) {
    let rt = super::runtime();
    let mut dash = Dashboard::new();
    super::load_or_exit(&rt, &mut dash, cfg.side, cfg.path);
    super::select_or_exit(&mut dash, cfg.side, cfg.index);

    let pane = dash.pane_view(cfg.side);
    if cfg.json {
        match serde_json::to_string_pretty(&pane) {
            Ok(s) => println!("{s}"),
            Err(e) => {
                eprintln!("error: failed to encode view: {e}");
                std::process::exit(1);
            }
        }
        return;
    }

    println!("{}", cfg.path);
    print!("{}", super::render_pane_text(&pane, &cfg.display));
}
