//! Trace data model and parser.
//!
//! A trace is the JSON array written by the activation-capture run: one object
//! per generated token, each carrying the top contributing neurons and the
//! model's top next-token candidates.
//!
//! ```json
//! [
//!   {
//!     "token": "The",
//!     "topk_neuron_activations": [{"neuron": "n1", "activation": 0.9}],
//!     "topk_next_tokens": [{"cat": 0.7}, {"dog": 0.3}]
//!   }
//! ]
//! ```
//!
//! Producer ordering is trusted and never changed. Missing or `null`
//! activation and candidate lists decode as empty.

use std::fmt;
use std::sync::Arc;

use serde::de::{self, Deserializer, MapAccess, Visitor};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};

use crate::error::MalformedTraceError;

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// One (signal, magnitude) pair. Magnitudes may be negative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NeuronActivation {
    pub neuron: String,
    pub activation: f64,
}

/// One transport object from `topk_next_tokens`.
///
/// Well-formed entries hold exactly one `candidate -> probability` pair, but
/// the parser keeps whatever the producer wrote (in key order) so the
/// derivation step can reject bad entries without losing the rest of the
/// trace.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CandidateEntry {
    pairs: Vec<(String, f64)>,
}

impl CandidateEntry {
    pub fn new(pairs: Vec<(String, f64)>) -> Self {
        Self { pairs }
    }

    /// Convenience for the well-formed single-pair shape.
    pub fn single(candidate: impl Into<String>, probability: f64) -> Self {
        Self {
            pairs: vec![(candidate.into(), probability)],
        }
    }

    pub fn key_count(&self) -> usize {
        self.pairs.len()
    }

    pub fn pairs(&self) -> &[(String, f64)] {
        &self.pairs
    }

    /// The sole pair, if the entry has exactly one key.
    pub fn as_single(&self) -> Option<(&str, f64)> {
        match self.pairs.as_slice() {
            [(candidate, probability)] => Some((candidate.as_str(), *probability)),
            _ => None,
        }
    }
}

impl Serialize for CandidateEntry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.pairs.len()))?;
        for (candidate, probability) in &self.pairs {
            map.serialize_entry(candidate, probability)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for CandidateEntry {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct EntryVisitor;

        impl<'de> Visitor<'de> for EntryVisitor {
            type Value = CandidateEntry;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an object mapping a candidate token to its probability")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut pairs = Vec::with_capacity(access.size_hint().unwrap_or(1));
                while let Some((candidate, probability)) = access.next_entry::<String, f64>()? {
                    // A repeated key keeps its first position and its last value.
                    match pairs.iter_mut().find(|(c, _)| *c == candidate) {
                        Some(slot) => slot.1 = probability,
                        None => pairs.push((candidate, probability)),
                    }
                }
                Ok(CandidateEntry { pairs })
            }
        }

        deserializer.deserialize_map(EntryVisitor)
    }
}

/// One decoded unit of a trace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenRecord {
    pub token: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub topk_neuron_activations: Vec<NeuronActivation>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub topk_next_tokens: Vec<CandidateEntry>,
}

impl TokenRecord {
    /// A record with no activations or candidates.
    pub fn bare(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            topk_neuron_activations: Vec::new(),
            topk_next_tokens: Vec::new(),
        }
    }
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<Vec<T>>::deserialize(deserializer).map(Option::unwrap_or_default)
}

// ---------------------------------------------------------------------------
// Trace
// ---------------------------------------------------------------------------

/// An immutable, ordered run of token records.
///
/// Clones share storage, so state snapshots stay cheap however long the
/// trace is. Position in the sequence is generation position.
#[derive(Debug, Clone, PartialEq)]
pub struct Trace {
    records: Arc<[TokenRecord]>,
}

impl Trace {
    pub fn new(records: Vec<TokenRecord>) -> Self {
        Self {
            records: Arc::from(records),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&TokenRecord> {
        self.records.get(index)
    }

    pub fn records(&self) -> &[TokenRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TokenRecord> {
        self.records.iter()
    }

    /// Surface text of every token, in generation order.
    pub fn tokens(&self) -> Vec<String> {
        self.records.iter().map(|r| r.token.clone()).collect()
    }

    /// True when both traces share the same storage (no reload in between).
    pub fn same_storage(&self, other: &Trace) -> bool {
        Arc::ptr_eq(&self.records, &other.records)
    }
}

impl Default for Trace {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl<'a> IntoIterator for &'a Trace {
    type Item = &'a TokenRecord;
    type IntoIter = std::slice::Iter<'a, TokenRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl Serialize for Trace {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.records.iter())
    }
}

// ---------------------------------------------------------------------------
// Parser
// ---------------------------------------------------------------------------

/// Parse an uploaded text payload into a trace.
///
/// Pure: on failure nothing is produced, and the caller keeps whatever it
/// had loaded before.
pub fn parse_trace(raw: &str) -> Result<Trace, MalformedTraceError> {
    let body = raw.strip_prefix('\u{feff}').unwrap_or(raw);
    let records: Vec<TokenRecord> =
        serde_json::from_str(body).map_err(|e| MalformedTraceError::from_json(&e))?;
    Ok(Trace::new(records))
}

/// Parse raw file bytes, rejecting anything that is not UTF-8.
pub fn parse_trace_bytes(raw: &[u8]) -> Result<Trace, MalformedTraceError> {
    let text = std::str::from_utf8(raw).map_err(|e| MalformedTraceError::encoding(&e))?;
    parse_trace(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MalformedKind;

    const SAMPLE: &str = r#"[{"token":"The","topk_neuron_activations":[{"neuron":"n1","activation":0.9}],"topk_next_tokens":[{"cat":0.7},{"dog":0.3}]}]"#;

    #[test]
    fn parses_reference_record() {
        let trace = parse_trace(SAMPLE).unwrap();
        assert_eq!(trace.len(), 1);
        let record = trace.get(0).unwrap();
        assert_eq!(record.token, "The");
        assert_eq!(
            record.topk_neuron_activations,
            vec![NeuronActivation {
                neuron: "n1".into(),
                activation: 0.9
            }]
        );
        assert_eq!(
            record.topk_next_tokens,
            vec![
                CandidateEntry::single("cat", 0.7),
                CandidateEntry::single("dog", 0.3)
            ]
        );
    }

    #[test]
    fn preserves_record_order() {
        let raw = r#"[{"token":"a"},{"token":"b"},{"token":"c"}]"#;
        let trace = parse_trace(raw).unwrap();
        assert_eq!(trace.tokens(), vec!["a", "b", "c"]);
    }

    #[test]
    fn missing_lists_default_to_empty() {
        let trace = parse_trace(r#"[{"token":"x"}]"#).unwrap();
        assert_eq!(trace.get(0), Some(&TokenRecord::bare("x")));
    }

    #[test]
    fn null_lists_default_to_empty() {
        let raw = r#"[{"token":"x","topk_neuron_activations":null,"topk_next_tokens":null}]"#;
        let trace = parse_trace(raw).unwrap();
        assert_eq!(trace.get(0), Some(&TokenRecord::bare("x")));
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let raw = r#"[{"token":"x","layer":12,"extra":{"a":1}}]"#;
        assert_eq!(parse_trace(raw).unwrap().len(), 1);
    }

    #[test]
    fn empty_array_is_an_empty_trace() {
        assert!(parse_trace("[]").unwrap().is_empty());
    }

    #[test]
    fn non_array_payload_is_shape_error() {
        let err = parse_trace(r#"{"token":"x"}"#).unwrap_err();
        assert_eq!(err.kind, MalformedKind::Shape);
    }

    #[test]
    fn missing_token_is_shape_error() {
        let err = parse_trace(r#"[{"topk_next_tokens":[]}]"#).unwrap_err();
        assert_eq!(err.kind, MalformedKind::Shape);
        assert!(err.message.contains("token"), "{}", err.message);
    }

    #[test]
    fn non_string_token_is_shape_error() {
        let err = parse_trace(r#"[{"token":42}]"#).unwrap_err();
        assert_eq!(err.kind, MalformedKind::Shape);
    }

    #[test]
    fn non_numeric_probability_is_shape_error() {
        let err = parse_trace(r#"[{"token":"x","topk_next_tokens":[{"cat":"high"}]}]"#).unwrap_err();
        assert_eq!(err.kind, MalformedKind::Shape);
    }

    #[test]
    fn invalid_json_is_syntax_error() {
        let err = parse_trace("[{\"token\":").unwrap_err();
        assert_eq!(err.kind, MalformedKind::Syntax);
        assert!(err.line >= 1);
    }

    #[test]
    fn empty_input_is_malformed() {
        assert_eq!(parse_trace("").unwrap_err().kind, MalformedKind::Syntax);
        assert_eq!(parse_trace("   \n").unwrap_err().kind, MalformedKind::Syntax);
    }

    #[test]
    fn leading_bom_is_ignored() {
        let raw = format!("\u{feff}{SAMPLE}");
        assert_eq!(parse_trace(&raw).unwrap().len(), 1);
    }

    #[test]
    fn invalid_utf8_is_encoding_error() {
        let err = parse_trace_bytes(&[b'[', 0xff, b']']).unwrap_err();
        assert_eq!(err.kind, MalformedKind::Encoding);
    }

    #[test]
    fn candidate_entries_keep_every_key_in_order() {
        let raw = r#"[{"token":"x","topk_next_tokens":[{},{"b":0.2,"a":0.1}]}]"#;
        let trace = parse_trace(raw).unwrap();
        let entries = &trace.get(0).unwrap().topk_next_tokens;
        assert_eq!(entries[0].key_count(), 0);
        assert_eq!(
            entries[1].pairs(),
            &[("b".to_string(), 0.2), ("a".to_string(), 0.1)]
        );
        assert_eq!(entries[1].as_single(), None);
    }

    #[test]
    fn repeated_candidate_key_keeps_last_value() {
        let raw = r#"[{"token":"x","topk_next_tokens":[{"cat":0.5,"cat":0.7},{"b":0.2,"a":0.1,"b":0.3}]}]"#;
        let trace = parse_trace(raw).unwrap();
        let entries = &trace.get(0).unwrap().topk_next_tokens;
        assert_eq!(entries[0].as_single(), Some(("cat", 0.7)));
        assert_eq!(
            entries[1].pairs(),
            &[("b".to_string(), 0.3), ("a".to_string(), 0.1)]
        );
    }

    #[test]
    fn full_precision_floats_decode_exactly() {
        // Shortest round-trip renderings with 16-17 significant digits.
        let texts = [
            "1.4350984260001285e-2",
            "1.5047476844369784e-7",
            "8.864000511479369e-10",
            "0.30000000000000004",
            "-0.12345678901234568",
            "2.2250738585072014e-308",
        ];
        for text in texts {
            let raw = format!(
                r#"[{{"token":"t","topk_neuron_activations":[{{"neuron":"n","activation":{text}}}],"topk_next_tokens":[{{"c":{text}}}]}}]"#
            );
            let trace = parse_trace(&raw).unwrap();
            let record = trace.get(0).unwrap();
            let expected = text.parse::<f64>().unwrap().to_bits();
            assert_eq!(
                record.topk_neuron_activations[0].activation.to_bits(),
                expected,
                "activation {text}"
            );
            let (_, probability) = record.topk_next_tokens[0].as_single().unwrap();
            assert_eq!(probability.to_bits(), expected, "probability {text}");
        }
    }

    #[test]
    fn random_floats_decode_to_the_same_bits() {
        use rand::{Rng, SeedableRng, rngs::StdRng};

        let mut rng = StdRng::seed_from_u64(0x5eed);
        let mut checked = 0;
        while checked < 5_000 {
            let value = f64::from_bits(rng.random::<u64>());
            if !value.is_finite() {
                continue;
            }
            let text = format!("{value:e}");
            let raw = format!(r#"[{{"token":"t","topk_next_tokens":[{{"c":{text}}}]}}]"#);
            let trace = parse_trace(&raw).unwrap();
            let (_, probability) = trace.get(0).unwrap().topk_next_tokens[0].as_single().unwrap();
            assert_eq!(probability.to_bits(), value.to_bits(), "{text}");
            checked += 1;
        }
    }

    #[test]
    fn negative_activations_are_kept() {
        let raw = r#"[{"token":"x","topk_neuron_activations":[{"neuron":"L3.N7","activation":-12.5}]}]"#;
        let trace = parse_trace(raw).unwrap();
        assert_eq!(trace.get(0).unwrap().topk_neuron_activations[0].activation, -12.5);
    }

    #[test]
    fn serializes_back_to_transport_shape() {
        let trace = parse_trace(SAMPLE).unwrap();
        let value = serde_json::to_value(&trace).unwrap();
        let expected: serde_json::Value = serde_json::from_str(SAMPLE).unwrap();
        assert_eq!(value, expected);
    }

    #[test]
    fn clones_share_storage() {
        let trace = parse_trace(SAMPLE).unwrap();
        let copy = trace.clone();
        assert!(trace.same_storage(&copy));
        assert!(!trace.same_storage(&parse_trace(SAMPLE).unwrap()));
    }
}
