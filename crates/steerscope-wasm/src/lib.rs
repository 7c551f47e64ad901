//! steerscope WebAssembly bindings: the comparison engine in the browser.
//!
//! The page reads the uploaded file itself (`FileReader` / `file.text()`) and
//! hands the text to [`ActivationDashboard::load_trace`]. Everything after that
//! (parsing, selection, projections) runs here, and results cross back as JSON
//! strings the front end can `JSON.parse`.
//!
//! ```js
//! const dash = new ActivationDashboard();
//! dash.loadTrace("baseline", await file.text());
//! dash.selectToken("baseline", 0);
//! const view = JSON.parse(dash.viewJson());
//! ```

use steerscope_core::{Dashboard, DashboardError, DisplayConfig, Side};
use wasm_bindgen::prelude::*;

// ---------------------------------------------------------------------------
// Dashboard handle
// ---------------------------------------------------------------------------

/// One dashboard session: a baseline pane, a steered pane, and display options.
#[wasm_bindgen]
#[derive(Default)]
pub struct ActivationDashboard {
    inner: Dashboard,
    config: DisplayConfig,
}

#[wasm_bindgen]
impl ActivationDashboard {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace one side's trace with the parsed payload. On failure the side
    /// keeps its previous trace and selection.
    #[wasm_bindgen(js_name = loadTrace)]
    pub fn load_trace(&mut self, side: &str, raw: &str) -> Result<(), JsValue> {
        self.try_load_trace(side, raw).map_err(to_js)
    }

    /// Select a token position. Anything that is not a whole, non-negative
    /// number (`1.5`, `-1`, `NaN`) is rejected as out of range.
    #[wasm_bindgen(js_name = selectToken)]
    pub fn select_token(&mut self, side: &str, index: f64) -> Result<(), JsValue> {
        self.try_select_token(side, index).map_err(to_js)
    }

    #[wasm_bindgen(js_name = clearSelection)]
    pub fn clear_selection(&mut self, side: &str) -> Result<(), JsValue> {
        let side = parse_side(side).map_err(to_js)?;
        self.inner.clear_selection(side);
        Ok(())
    }

    /// Both panes' traces and selections.
    #[wasm_bindgen(js_name = stateJson)]
    pub fn state_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(self.inner.state()).map_err(to_js)
    }

    /// Render-ready view: token strips, headings and derived rows per pane.
    #[wasm_bindgen(js_name = viewJson)]
    pub fn view_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.inner.view()).map_err(to_js)
    }

    #[wasm_bindgen(js_name = themeJson)]
    pub fn theme_json(&self, side: &str) -> Result<String, JsValue> {
        let side = parse_side(side).map_err(to_js)?;
        serde_json::to_string(self.config.theme(side)).map_err(to_js)
    }

    #[wasm_bindgen(js_name = formatProbability)]
    pub fn format_probability(&self, probability: f64) -> String {
        self.config.format_probability(probability)
    }

    #[wasm_bindgen(js_name = setPrecision)]
    pub fn set_precision(&mut self, precision: u32) {
        let config = std::mem::take(&mut self.config);
        self.config = config.with_precision(precision as usize);
    }

    #[wasm_bindgen(js_name = hasTraces)]
    pub fn has_traces(&self) -> bool {
        self.inner.state().has_traces()
    }
}

// Native-callable halves of the bindings; `JsValue` only exists on wasm32.
impl ActivationDashboard {
    fn try_load_trace(&mut self, side: &str, raw: &str) -> Result<(), String> {
        let side = parse_side(side)?;
        self.inner
            .load_trace(side, raw)
            .map_err(|e| DashboardError::from(e).to_string())
    }

    fn try_select_token(&mut self, side: &str, index: f64) -> Result<(), String> {
        let side = parse_side(side)?;
        let Some(position) = token_position(index) else {
            let len = self.inner.state().trace(side).len();
            log::warn!("{side} selection {index} rejected, not a token position");
            return Err(format!(
                "{side} token index {index} is out of range for a trace of {len} tokens"
            ));
        };
        self.inner
            .select_token(side, position)
            .map_err(|e| DashboardError::from(e).to_string())
    }
}

/// A JS number as a token position, if it is a whole number that fits.
fn token_position(index: f64) -> Option<usize> {
    let whole = index.is_finite() && index >= 0.0 && index.fract() == 0.0;
    (whole && index <= usize::MAX as f64).then_some(index as usize)
}

fn parse_side(side: &str) -> Result<Side, String> {
    side.parse::<Side>().map_err(|e| e.to_string())
}

fn to_js(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}
