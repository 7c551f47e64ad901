//! `steerscope compare`: analyze one token from each trace, one pane after
//! the other.

use steerscope_core::{Dashboard, DisplayConfig, Side};

pub struct CompareCommandConfig<'a> {
    pub baseline_path: &'a str,
    pub steered_path: &'a str,
    pub baseline_index: Option<usize>,
    pub steered_index: Option<usize>,
    pub json: bool,
    pub display: DisplayConfig,
}

/// Run the compare command.
pub fn run(cfg: CompareCommandConfig<'_>) {
    let rt = super::runtime();
    let mut dash = Dashboard::new();
    super::load_or_exit(&rt, &mut dash, Side::Baseline, cfg.baseline_path);
    super::load_or_exit(&rt, &mut dash, Side::Steered, cfg.steered_path);
    super::select_or_exit(&mut dash, Side::Baseline, cfg.baseline_index);
    super::select_or_exit(&mut dash, Side::Steered, cfg.steered_index);

    let view = dash.view();
    if cfg.json {
        match serde_json::to_string_pretty(&view) {
            Ok(s) => println!("{s}"),
            Err(e) => {
                eprintln!("error: failed to encode view: {e}");
                std::process::exit(1);
            }
        }
        return;
    }

    println!("Response Analysis Dashboard");
    println!("Compare Baseline and Steered Response Patterns");
    println!();
    for (side, path) in [
        (Side::Baseline, cfg.baseline_path),
        (Side::Steered, cfg.steered_path),
    ] {
        println!("{path}");
        print!("{}", super::render_pane_text(view.pane(side), &cfg.display));
        println!();
    }
}
