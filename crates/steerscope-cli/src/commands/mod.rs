pub mod compare;
pub mod dashboard;
pub mod inspect;

use std::fmt::Write;
use std::path::Path;

use steerscope_core::{Dashboard, DisplayConfig, PaneView, Side, load_display_config};

/// Width of the text bar drawn next to each activation.
const BAR_WIDTH: usize = 24;

/// Build the display config from an optional file plus a precision override.
pub fn display_config(path: Option<&str>, precision: Option<usize>) -> DisplayConfig {
    let config = match path {
        Some(p) => load_display_config(Path::new(p)).unwrap_or_else(|e| {
            eprintln!("error: {p}: {e}");
            std::process::exit(1);
        }),
        None => DisplayConfig::default(),
    };
    match precision {
        Some(p) => config.with_precision(p),
        None => config,
    }
}

/// Single-threaded runtime for file reads; all state lives on this thread.
pub fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap_or_else(|e| {
            eprintln!("error: failed to start runtime: {e}");
            std::process::exit(1);
        })
}

/// Load `path` into `side`, exiting on failure.
pub fn load_or_exit(rt: &tokio::runtime::Runtime, dash: &mut Dashboard, side: Side, path: &str) {
    if let Err(e) = rt.block_on(dash.load_trace_file(side, path)) {
        eprintln!("error: {side} trace: {e}");
        std::process::exit(1);
    }
}

/// Select `index` on `side` if given, exiting when it is out of range.
pub fn select_or_exit(dash: &mut Dashboard, side: Side, index: Option<usize>) {
    if let Some(e) = index
        .map(|i| dash.select_token(side, i))
        .and_then(Result::err)
    {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

/// Make control characters in a token visible without losing spaces.
pub fn printable_token(token: &str) -> String {
    token
        .chars()
        .map(|c| match c {
            '\n' => '⏎',
            '\t' => '⇥',
            '\r' => '␍',
            c if c.is_control() => '�',
            c => c,
        })
        .collect()
}

/// Plain-text rendering of one pane: token strip, then analysis if any.
pub fn render_pane_text(pane: &PaneView, config: &DisplayConfig) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}  ({} tokens)", pane.title(), pane.tokens.len());
    let _ = writeln!(out, "{}", "-".repeat(60));

    if pane.tokens.is_empty() {
        let _ = writeln!(out, "  (empty trace)");
    }
    for (i, token) in pane.tokens.iter().enumerate() {
        let marker = if pane.selection == Some(i) { "▸" } else { " " };
        let _ = writeln!(out, "{marker}{i:>5}  \"{}\"", printable_token(token));
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "{}", pane.analysis_heading());

    if let Some(err) = &pane.analysis_error {
        let _ = writeln!(out, "  analysis unavailable: {err}");
    }
    let Some(analysis) = &pane.analysis else {
        return out;
    };

    let _ = writeln!(out, "  Top Neuron Activations");
    if analysis.signals.is_empty() {
        let _ = writeln!(out, "    (none)");
    }
    let extent = steerscope_core::signal_extent(&analysis.signals);
    for bar in &analysis.signals {
        let filled = if extent > 0.0 && bar.value.is_finite() {
            ((bar.value.abs() / extent) * BAR_WIDTH as f64).round() as usize
        } else {
            0
        };
        let glyph = if bar.value < 0.0 { "░" } else { "█" };
        let _ = writeln!(
            out,
            "    {:<28} {:>12.4}  {}",
            bar.label,
            bar.value,
            glyph.repeat(filled)
        );
    }

    let _ = writeln!(out, "  Next Token Probabilities");
    let _ = writeln!(out, "    {:<28} {:>12}", "Token", "Probability");
    for row in &analysis.candidates {
        let _ = writeln!(
            out,
            "    {:<28} {:>12}",
            format!("\"{}\"", printable_token(&row.candidate)),
            config.format_probability(row.probability)
        );
    }
    out
}
