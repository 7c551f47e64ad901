//! # steerscope-core
//!
//! Headless engine behind the steerscope dashboards: load a **baseline** and a
//! **steered** activation trace, pick a token on either side, and get back the
//! rows a chart and a table need to show it.
//!
//! ## Quick Start
//!
//! ```
//! use steerscope_core::{Dashboard, Side};
//!
//! let mut dash = Dashboard::new();
//! dash.load_trace(
//!     Side::Baseline,
//!     r#"[{"token":"The","topk_neuron_activations":[{"neuron":"n1","activation":0.9}],
//!         "topk_next_tokens":[{"cat":0.7},{"dog":0.3}]}]"#,
//! )?;
//! dash.select_token(Side::Baseline, 0)?;
//!
//! let view = dash.view();
//! let analysis = view.baseline.analysis.unwrap();
//! assert_eq!(analysis.signals[0].label, "n1");
//! assert_eq!(analysis.candidates[1].candidate, "dog");
//! # Ok::<(), steerscope_core::DashboardError>(())
//! ```
//!
//! ## Architecture
//!
//! Upload → [`parse_trace`] → [`Dashboard`] (replaces one side, clears its
//! selection) → select token → [`derive_projections`] → renderer.
//!
//! The two sides share one implementation and never read each other's state.

pub mod config;
pub mod derive;
pub mod error;
#[cfg(feature = "fs")]
pub mod loader;
pub mod state;
pub mod trace;
pub mod view;

pub use config::{DisplayConfig, Theme, format_probability, load_display_config, parse_hex_color};
pub use derive::{
    CandidateRow, Projections, SignalBar, derive_candidate_table, derive_projections,
    derive_signal_ranking, signal_extent,
};
pub use error::{
    DashboardError, IndexOutOfRangeError, MalformedCandidateEntryError, MalformedKind,
    MalformedTraceError, ReadError,
};
#[cfg(feature = "fs")]
pub use loader::read_trace_payload;
pub use state::{Dashboard, DashboardState, Pane, Side};
pub use trace::{CandidateEntry, NeuronActivation, TokenRecord, Trace, parse_trace, parse_trace_bytes};
pub use view::{DashboardView, PaneView};

/// Library version (from Cargo.toml).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
