//! Two-pane selection state and the store that owns it.
//!
//! Invariants held after every operation:
//! - a selection, when present, indexes into its own side's current trace;
//! - replacing a side's trace clears that side's selection;
//! - nothing done to one side touches the other.

use std::str::FromStr;

use serde::Serialize;

use crate::derive::{Projections, derive_projections};
use crate::error::{IndexOutOfRangeError, MalformedCandidateEntryError, MalformedTraceError};
use crate::trace::{TokenRecord, Trace, parse_trace};

// ---------------------------------------------------------------------------
// Side
// ---------------------------------------------------------------------------

/// Which of the two parallel panes an operation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Baseline,
    Steered,
}

impl Side {
    pub const ALL: [Side; 2] = [Side::Baseline, Side::Steered];

    pub fn other(self) -> Self {
        match self {
            Self::Baseline => Self::Steered,
            Self::Steered => Self::Baseline,
        }
    }

    /// Capitalized label for headings.
    pub fn label(self) -> &'static str {
        match self {
            Self::Baseline => "Baseline",
            Self::Steered => "Steered",
        }
    }

    fn slot(self) -> usize {
        match self {
            Self::Baseline => 0,
            Self::Steered => 1,
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Baseline => write!(f, "baseline"),
            Self::Steered => write!(f, "steered"),
        }
    }
}

impl FromStr for Side {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "baseline" | "base" | "b" => Ok(Self::Baseline),
            "steered" | "steer" | "s" => Ok(Self::Steered),
            other => Err(format!("unknown side '{other}', expected baseline or steered")),
        }
    }
}

// ---------------------------------------------------------------------------
// DashboardState
// ---------------------------------------------------------------------------

/// One side's trace and its current selection.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Pane {
    trace: Trace,
    selection: Option<usize>,
}

impl Pane {
    pub fn trace(&self) -> &Trace {
        &self.trace
    }

    pub fn selection(&self) -> Option<usize> {
        self.selection
    }

    pub fn selected_record(&self) -> Option<&TokenRecord> {
        self.selection.and_then(|i| self.trace.get(i))
    }
}

/// Read-only view of both panes. Obtain one from [`Dashboard::state`] or
/// [`Dashboard::snapshot`]; only the store can change it.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct DashboardState {
    baseline: Pane,
    steered: Pane,
}

impl DashboardState {
    pub fn pane(&self, side: Side) -> &Pane {
        match side {
            Side::Baseline => &self.baseline,
            Side::Steered => &self.steered,
        }
    }

    fn pane_mut(&mut self, side: Side) -> &mut Pane {
        match side {
            Side::Baseline => &mut self.baseline,
            Side::Steered => &mut self.steered,
        }
    }

    pub fn trace(&self, side: Side) -> &Trace {
        &self.pane(side).trace
    }

    pub fn selection(&self, side: Side) -> Option<usize> {
        self.pane(side).selection
    }

    /// Whether either side has any tokens to show.
    pub fn has_traces(&self) -> bool {
        Side::ALL.iter().any(|&s| !self.trace(s).is_empty())
    }
}

// ---------------------------------------------------------------------------
// Dashboard: the single point of mutation
// ---------------------------------------------------------------------------

/// Owns the dashboard state. Every change goes through a named operation.
#[derive(Debug, Clone, Default)]
pub struct Dashboard {
    state: DashboardState,
    load_counts: [u64; 2],
}

impl Dashboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `raw` and, on success, replace `side`'s trace and clear its
    /// selection. On failure nothing changes.
    pub fn load_trace(&mut self, side: Side, raw: &str) -> Result<(), MalformedTraceError> {
        match parse_trace(raw) {
            Ok(trace) => {
                self.replace_trace(side, trace);
                Ok(())
            }
            Err(e) => {
                log::warn!("{side} trace rejected: {e}");
                Err(e)
            }
        }
    }

    /// Install an already-parsed trace on `side`, clearing its selection.
    pub fn replace_trace(&mut self, side: Side, trace: Trace) {
        log::info!("{side} trace loaded: {} tokens", trace.len());
        let pane = self.state.pane_mut(side);
        pane.trace = trace;
        pane.selection = None;
        self.load_counts[side.slot()] += 1;
    }

    /// Select the token at `index` on `side`.
    pub fn select_token(&mut self, side: Side, index: usize) -> Result<(), IndexOutOfRangeError> {
        let pane = self.state.pane_mut(side);
        let len = pane.trace.len();
        if index >= len {
            log::warn!("{side} selection {index} rejected, trace has {len} tokens");
            return Err(IndexOutOfRangeError { side, index, len });
        }
        log::debug!("{side} selection -> {index}");
        pane.selection = Some(index);
        Ok(())
    }

    pub fn clear_selection(&mut self, side: Side) {
        self.state.pane_mut(side).selection = None;
    }

    pub fn state(&self) -> &DashboardState {
        &self.state
    }

    /// Owned copy of the current state. Trace storage is shared, not copied.
    pub fn snapshot(&self) -> DashboardState {
        self.state.clone()
    }

    pub fn selected_record(&self, side: Side) -> Option<&TokenRecord> {
        self.state.pane(side).selected_record()
    }

    /// Display projections for `side`'s selected token, if one is selected.
    pub fn projections(
        &self,
        side: Side,
    ) -> Option<Result<Projections, MalformedCandidateEntryError>> {
        self.selected_record(side).map(derive_projections)
    }

    /// Number of successful loads applied to `side` so far.
    pub fn load_count(&self, side: Side) -> u64 {
        self.load_counts[side.slot()]
    }
}
