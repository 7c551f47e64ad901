//! Asynchronous trace file reads.
//!
//! The read is the only suspension point; parsing happens synchronously once
//! the bytes are in hand, inside the store. Reads are not cancellable. When
//! two loads target the same side, whichever is applied last wins.

use std::path::Path;

use crate::error::{DashboardError, ReadError};
use crate::state::{Dashboard, Side};
use crate::trace::parse_trace_bytes;

/// Read a trace payload from disk without parsing it.
pub async fn read_trace_payload(path: impl AsRef<Path>) -> Result<Vec<u8>, ReadError> {
    let path = path.as_ref();
    tokio::fs::read(path).await.map_err(|source| ReadError {
        path: path.to_path_buf(),
        source,
    })
}

impl Dashboard {
    /// Apply the outcome of a completed read to `side`.
    ///
    /// A failed read or an unparseable payload leaves the side untouched.
    pub fn apply_read(
        &mut self,
        side: Side,
        read: Result<Vec<u8>, ReadError>,
    ) -> Result<(), DashboardError> {
        let bytes = read.inspect_err(|e| log::warn!("{side} read failed: {e}"))?;
        let trace = parse_trace_bytes(&bytes)
            .inspect_err(|e| log::warn!("{side} trace rejected: {e}"))?;
        self.replace_trace(side, trace);
        Ok(())
    }

    /// Read `path` and load it into `side`.
    pub async fn load_trace_file(
        &mut self,
        side: Side,
        path: impl AsRef<Path>,
    ) -> Result<(), DashboardError> {
        let read = read_trace_payload(path).await;
        self.apply_read(side, read)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MalformedKind;

    #[tokio::test]
    async fn loads_trace_from_disk() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("baseline.json");
        std::fs::write(&path, r#"[{"token":"a"},{"token":"b"}]"#).unwrap();

        let mut dash = Dashboard::new();
        dash.load_trace_file(Side::Baseline, &path).await.unwrap();
        assert_eq!(dash.state().trace(Side::Baseline).tokens(), vec!["a", "b"]);
        assert_eq!(dash.state().selection(Side::Baseline), None);
    }

    #[tokio::test]
    async fn missing_file_leaves_state_untouched() {
        let tmp = tempfile::tempdir().unwrap();
        let mut dash = Dashboard::new();
        dash.load_trace(Side::Steered, r#"[{"token":"kept"}]"#).unwrap();
        dash.select_token(Side::Steered, 0).unwrap();
        let before = dash.snapshot();

        let err = dash
            .load_trace_file(Side::Steered, tmp.path().join("absent.json"))
            .await
            .unwrap_err();
        assert!(matches!(err, DashboardError::Read(_)), "{err:?}");
        assert_eq!(dash.snapshot(), before);
    }

    #[tokio::test]
    async fn non_utf8_file_is_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("binary.json");
        std::fs::write(&path, [0xffu8, 0xfe, 0x00]).unwrap();

        let mut dash = Dashboard::new();
        match dash.load_trace_file(Side::Baseline, &path).await {
            Err(DashboardError::MalformedTrace(e)) => assert_eq!(e.kind, MalformedKind::Encoding),
            other => panic!("expected encoding error, got {other:?}"),
        }
        assert_eq!(dash.load_count(Side::Baseline), 0);
    }

    #[tokio::test]
    async fn later_completed_read_wins() {
        let tmp = tempfile::tempdir().unwrap();
        let first = tmp.path().join("first.json");
        let second = tmp.path().join("second.json");
        std::fs::write(&first, r#"[{"token":"one"}]"#).unwrap();
        std::fs::write(&second, r#"[{"token":"two"},{"token":"three"}]"#).unwrap();

        let (a, b) = tokio::join!(read_trace_payload(&first), read_trace_payload(&second));
        let mut dash = Dashboard::new();
        dash.apply_read(Side::Baseline, b).unwrap();
        dash.apply_read(Side::Baseline, a).unwrap();
        assert_eq!(dash.state().trace(Side::Baseline).tokens(), vec!["one"]);
        assert_eq!(dash.load_count(Side::Baseline), 2);
    }
}
