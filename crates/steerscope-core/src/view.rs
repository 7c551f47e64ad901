//! What the presentation layer renders: the state plus, for each side with a
//! selection, its derived projections.

use serde::Serialize;

use crate::derive::Projections;
use crate::state::{Dashboard, Side};

/// Render model for one pane.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaneView {
    pub side: Side,
    pub tokens: Vec<String>,
    pub selection: Option<usize>,
    pub selected_token: Option<String>,
    pub analysis: Option<Projections>,
    /// Set when the selected record could not be projected.
    pub analysis_error: Option<String>,
}

impl PaneView {
    pub fn title(&self) -> String {
        format!("{} Response", self.side.label())
    }

    pub fn analysis_heading(&self) -> String {
        match &self.selected_token {
            Some(token) => format!("Analysis for \"{token}\""),
            None => "Select a token to view analysis".to_string(),
        }
    }
}

/// Render model for the whole dashboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    pub has_traces: bool,
    pub baseline: PaneView,
    pub steered: PaneView,
}

impl DashboardView {
    pub fn pane(&self, side: Side) -> &PaneView {
        match side {
            Side::Baseline => &self.baseline,
            Side::Steered => &self.steered,
        }
    }
}

impl Dashboard {
    pub fn pane_view(&self, side: Side) -> PaneView {
        let pane = self.state().pane(side);
        let (analysis, analysis_error) = match self.projections(side) {
            Some(Ok(p)) => (Some(p), None),
            Some(Err(e)) => {
                log::debug!("{side} analysis unavailable: {e}");
                (None, Some(e.to_string()))
            }
            None => (None, None),
        };
        PaneView {
            side,
            tokens: pane.trace().tokens(),
            selection: pane.selection(),
            selected_token: pane.selected_record().map(|r| r.token.clone()),
            analysis,
            analysis_error,
        }
    }

    pub fn view(&self) -> DashboardView {
        DashboardView {
            has_traces: self.state().has_traces(),
            baseline: self.pane_view(Side::Baseline),
            steered: self.pane_view(Side::Steered),
        }
    }
}
