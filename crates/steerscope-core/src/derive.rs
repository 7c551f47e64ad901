//! Pure projections from a selected token record to display-ready rows.
//!
//! Producer ordering is kept as-is and values are passed through unrounded;
//! formatting belongs to whoever renders them.

use serde::Serialize;

use crate::error::MalformedCandidateEntryError;
use crate::trace::TokenRecord;

/// One bar in the signal chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SignalBar {
    pub label: String,
    pub value: f64,
}

/// One row in the next-token table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CandidateRow {
    pub candidate: String,
    pub probability: f64,
}

/// Both projections for one record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Projections {
    pub signals: Vec<SignalBar>,
    pub candidates: Vec<CandidateRow>,
}

pub fn derive_signal_ranking(record: &TokenRecord) -> Vec<SignalBar> {
    record
        .topk_neuron_activations
        .iter()
        .map(|n| SignalBar {
            label: n.neuron.clone(),
            value: n.activation,
        })
        .collect()
}

/// Flatten the single-key transport entries into rows.
///
/// Fails on the first entry that does not hold exactly one key.
pub fn derive_candidate_table(
    record: &TokenRecord,
) -> Result<Vec<CandidateRow>, MalformedCandidateEntryError> {
    record
        .topk_next_tokens
        .iter()
        .enumerate()
        .map(|(position, entry)| {
            entry
                .as_single()
                .map(|(candidate, probability)| CandidateRow {
                    candidate: candidate.to_string(),
                    probability,
                })
                .ok_or(MalformedCandidateEntryError {
                    position,
                    key_count: entry.key_count(),
                })
        })
        .collect()
}

pub fn derive_projections(
    record: &TokenRecord,
) -> Result<Projections, MalformedCandidateEntryError> {
    Ok(Projections {
        signals: derive_signal_ranking(record),
        candidates: derive_candidate_table(record)?,
    })
}

/// Largest absolute signal value, for scaling bars. Zero when empty.
pub fn signal_extent(signals: &[SignalBar]) -> f64 {
    signals
        .iter()
        .map(|b| b.value.abs())
        .filter(|v| v.is_finite())
        .fold(0.0, f64::max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trace::{CandidateEntry, NeuronActivation};

    fn record(activations: &[(&str, f64)], candidates: Vec<CandidateEntry>) -> TokenRecord {
        TokenRecord {
            token: "tok".into(),
            topk_neuron_activations: activations
                .iter()
                .map(|(n, a)| NeuronActivation {
                    neuron: n.to_string(),
                    activation: *a,
                })
                .collect(),
            topk_next_tokens: candidates,
        }
    }

    #[test]
    fn signal_ranking_keeps_producer_order() {
        // Deliberately unsorted: the producer's order wins.
        let r = record(&[("n3", 0.1), ("n1", 5.0), ("n2", -2.0)], vec![]);
        let bars = derive_signal_ranking(&r);
        assert_eq!(bars.len(), 3);
        for (bar, src) in bars.iter().zip(&r.topk_neuron_activations) {
            assert_eq!(bar.label, src.neuron);
            assert_eq!(bar.value, src.activation);
        }
    }

    #[test]
    fn candidate_table_flattens_entries() {
        let r = record(
            &[],
            vec![
                CandidateEntry::single("cat", 0.7),
                CandidateEntry::single("dog", 0.3),
            ],
        );
        assert_eq!(
            derive_candidate_table(&r).unwrap(),
            vec![
                CandidateRow {
                    candidate: "cat".into(),
                    probability: 0.7
                },
                CandidateRow {
                    candidate: "dog".into(),
                    probability: 0.3
                },
            ]
        );
    }

    #[test]
    fn probabilities_are_not_rounded() {
        let r = record(&[], vec![CandidateEntry::single(" the", 0.123_456_789_012)]);
        let rows = derive_candidate_table(&r).unwrap();
        assert_eq!(rows[0].probability, 0.123_456_789_012);
    }

    #[test]
    fn empty_entry_is_rejected() {
        let r = record(
            &[],
            vec![CandidateEntry::single("a", 0.5), CandidateEntry::default()],
        );
        assert_eq!(
            derive_candidate_table(&r).unwrap_err(),
            MalformedCandidateEntryError {
                position: 1,
                key_count: 0
            }
        );
    }

    #[test]
    fn multi_key_entry_is_rejected() {
        let entry = CandidateEntry::new(vec![("a".into(), 0.5), ("b".into(), 0.4)]);
        let r = record(&[], vec![entry]);
        let err = derive_projections(&r).unwrap_err();
        assert_eq!(err.key_count, 2);
        assert_eq!(err.position, 0);
    }

    #[test]
    fn empty_record_projects_to_empty_rows() {
        let p = derive_projections(&TokenRecord::bare("x")).unwrap();
        assert!(p.signals.is_empty());
        assert!(p.candidates.is_empty());
    }

    #[test]
    fn extent_uses_magnitude() {
        let r = record(&[("a", 0.5), ("b", -3.0), ("c", 1.0)], vec![]);
        assert_eq!(signal_extent(&derive_signal_ranking(&r)), 3.0);
        assert_eq!(signal_extent(&[]), 0.0);
    }
}
