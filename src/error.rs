//! Error types for the telemetry pipeline.

use thiserror::Error;

/// Errors produced while talking to the telemetry backend or decoding its
/// payloads.
///
/// Read-path errors are always recovered locally: the failed cycle is logged
/// and the previously rendered state stays on screen. Only
/// [`TelemetryError::WriteRejected`] and connection failures during a
/// threshold write are shown to the operator.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// The request could not be sent or the connection dropped.
    #[error("Connection failed: {0}")]
    Connection(String),

    /// The backend answered a read with a non-success status.
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// The body was not JSON or not one of the accepted shapes.
    #[error("Failed to parse response: {0}")]
    Parse(String),

    /// The reading list was well-formed but empty.
    #[error("No readings available")]
    EmptyData,

    /// The backend refused a threshold update.
    #[error("Threshold update rejected with status {0}")]
    WriteRejected(u16),
}

impl TelemetryError {
    /// Returns true for the "nothing to show yet" case, which is logged
    /// at a lower level than real failures.
    pub fn is_empty_data(&self) -> bool {
        matches!(self, TelemetryError::EmptyData)
    }
}

impl From<reqwest::Error> for TelemetryError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            TelemetryError::Parse(err.to_string())
        } else if err.is_connect() || err.is_request() || err.is_timeout() {
            TelemetryError::Connection(err.to_string())
        } else {
            TelemetryError::Http(err.to_string())
        }
    }
}

impl From<serde_json::Error> for TelemetryError {
    fn from(err: serde_json::Error) -> Self {
        TelemetryError::Parse(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_data_detection() {
        assert!(TelemetryError::EmptyData.is_empty_data());
        assert!(!TelemetryError::Parse("bad".into()).is_empty_data());
    }

    #[test]
    fn test_display_messages() {
        assert_eq!(
            TelemetryError::WriteRejected(500).to_string(),
            "Threshold update rejected with status 500"
        );
        assert_eq!(TelemetryError::EmptyData.to_string(), "No readings available");
    }

    #[test]
    fn test_from_serde_error() {
        let err = serde_json::from_str::<serde_json::Value>("not json").unwrap_err();
        assert!(matches!(TelemetryError::from(err), TelemetryError::Parse(_)));
    }
}
