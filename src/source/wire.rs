//! Wire types for the backend's JSON payloads.
//!
//! These match what the backend stores and returns; field names are the
//! backend's own. Unknown fields (`_id`, `nivelCO`, `statusQualidade`, ...)
//! are ignored. Optional fields carrying a value of the wrong type are
//! treated as absent instead of rejecting the reading.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::debug;

/// Key of the reading list in the wrapped response shape.
pub const READINGS_KEY: &str = "leituras";

/// The raw, undecoded body of a reading fetch.
///
/// Either `{"leituras": [...]}` or a bare `[...]`; see
/// [`crate::data::normalize`] for how each shape is interpreted.
pub type RawPayload = serde_json::Value;

/// One reading as the backend serializes it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireReading {
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<WireTimestamp>,

    pub temperatura: f64,

    pub umidade: f64,

    pub luminosidade: f64,

    /// Primary spelling of the air-quality field.
    #[serde(
        rename = "qualidadeAr",
        default,
        deserialize_with = "lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub qualidade_ar: Option<f64>,

    /// Legacy snake_case spelling, used only when the primary is absent.
    #[serde(
        rename = "qualidade_ar",
        default,
        deserialize_with = "lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub qualidade_ar_legacy: Option<f64>,

    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub led_ativo: Option<bool>,

    /// Primary spelling of the face count.
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub faces_detectadas: Option<u32>,

    /// Alternate spelling of the face count.
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub rostos: Option<u32>,
}

impl WireReading {
    /// Air quality, preferring the primary spelling.
    pub fn air_quality(&self) -> Option<f64> {
        self.qualidade_ar.or(self.qualidade_ar_legacy)
    }

    /// Face count, preferring the primary spelling.
    pub fn faces(&self) -> Option<u32> {
        self.faces_detectadas.or(self.rostos)
    }
}

/// Decode an optional field, mapping `null` or an unusable value to `None`.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(value) => match serde_json::from_value(value.clone()) {
            Ok(decoded) => Ok(Some(decoded)),
            Err(err) => {
                debug!(%value, error = %err, "ignoring unusable optional field");
                Ok(None)
            }
        },
    }
}

/// A timestamp as sent by the backend: an ISO-8601 string (with or
/// without offset) or epoch milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WireTimestamp {
    Millis(i64),
    Text(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_backend_reading() {
        let json = r#"{
            "_id": "65f0c0ffee",
            "temperatura": 22.4,
            "umidade": 55.1,
            "luminosidade": 320,
            "qualidadeAr": 410,
            "nivelCO": 42,
            "statusQualidade": "BOA",
            "led_ativo": false,
            "faces_detectadas": 1,
            "timestamp": "2025-03-01T10:15:00.123456"
        }"#;

        let reading: WireReading = serde_json::from_str(json).unwrap();
        assert_eq!(reading.temperatura, 22.4);
        assert_eq!(reading.luminosidade, 320.0);
        assert_eq!(reading.air_quality(), Some(410.0));
        assert_eq!(reading.led_ativo, Some(false));
        assert_eq!(reading.faces(), Some(1));
        assert_eq!(
            reading.timestamp,
            Some(WireTimestamp::Text("2025-03-01T10:15:00.123456".to_string()))
        );
    }

    #[test]
    fn test_alias_preference() {
        let both = r#"{"temperatura": 1, "umidade": 2, "luminosidade": 3,
                      "qualidadeAr": 700, "qualidade_ar": 900, "faces_detectadas": 2, "rostos": 5}"#;
        let reading: WireReading = serde_json::from_str(both).unwrap();
        assert_eq!(reading.air_quality(), Some(700.0));
        assert_eq!(reading.faces(), Some(2));

        let legacy = r#"{"temperatura": 1, "umidade": 2, "luminosidade": 3,
                        "qualidade_ar": 900, "rostos": 5}"#;
        let reading: WireReading = serde_json::from_str(legacy).unwrap();
        assert_eq!(reading.air_quality(), Some(900.0));
        assert_eq!(reading.faces(), Some(5));
    }

    #[test]
    fn test_null_optionals_are_absent() {
        let json = r#"{"temperatura": 1, "umidade": 2, "luminosidade": 3,
                      "qualidadeAr": null, "faces_detectadas": null, "led_ativo": null}"#;
        let reading: WireReading = serde_json::from_str(json).unwrap();
        assert!(reading.air_quality().is_none());
        assert!(reading.faces().is_none());
        assert!(reading.led_ativo.is_none());
    }

    #[test]
    fn test_mistyped_optionals_are_absent() {
        let json = r#"{"temperatura": 21.5, "umidade": 2, "luminosidade": 3,
                      "qualidadeAr": "high", "faces_detectadas": 1.5, "rostos": -2,
                      "led_ativo": "yes", "timestamp": true}"#;
        let reading: WireReading = serde_json::from_str(json).unwrap();
        assert_eq!(reading.temperatura, 21.5);
        assert!(reading.air_quality().is_none());
        assert!(reading.faces().is_none());
        assert!(reading.led_ativo.is_none());
        assert!(reading.timestamp.is_none());
    }

    #[test]
    fn test_mistyped_primary_falls_back_to_alias() {
        let json = r#"{"temperatura": 1, "umidade": 2, "luminosidade": 3,
                      "faces_detectadas": "two", "rostos": 2}"#;
        let reading: WireReading = serde_json::from_str(json).unwrap();
        assert_eq!(reading.faces(), Some(2));
    }

    #[test]
    fn test_epoch_millis_timestamp() {
        let json = r#"{"temperatura": 1, "umidade": 2, "luminosidade": 3, "timestamp": 1700000000000}"#;
        let reading: WireReading = serde_json::from_str(json).unwrap();
        assert_eq!(reading.timestamp, Some(WireTimestamp::Millis(1_700_000_000_000)));
    }
}
