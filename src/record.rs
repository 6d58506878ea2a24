//! IP information record returned by the IPPure endpoint.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// IPPure `/v1/info` response.
///
/// Every field is optional. A field carrying the wrong JSON type decodes as
/// absent instead of rejecting the whole record. Fields this crate does not
/// interpret are kept in `extra` so the record survives a trip through the
/// cache unchanged.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct InfoRecord {
    /// Fraud score (0-100, higher = worse).
    #[serde(
        rename = "fraudScore",
        default,
        deserialize_with = "lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub fraud_score: Option<f64>,

    /// Whether the IP belongs to a consumer ISP block.
    #[serde(
        rename = "isResidential",
        default,
        deserialize_with = "lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub is_residential: Option<bool>,

    /// Whether the IP is announced (broadcast) from outside its registered region.
    #[serde(
        rename = "isBroadcast",
        default,
        deserialize_with = "lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub is_broadcast: Option<bool>,

    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,

    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,

    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,

    /// Organization owning the autonomous system.
    #[serde(
        rename = "asOrganization",
        default,
        deserialize_with = "lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub as_organization: Option<String>,

    /// Uninterpreted fields (ip, asn, ...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl InfoRecord {
    /// Decode a record from a JSON document.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Encode the record for the cache.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Residential flag, absent treated as false.
    pub fn residential(&self) -> bool {
        self.is_residential.unwrap_or(false)
    }

    /// Broadcast flag, absent treated as false.
    pub fn broadcast(&self) -> bool {
        self.is_broadcast.unwrap_or(false)
    }

    /// Most specific non-empty location: city, then region, then country.
    pub fn location(&self) -> Option<&str> {
        [&self.city, &self.region, &self.country]
            .into_iter()
            .filter_map(|field| field.as_deref())
            .find(|value| !value.is_empty())
    }

    /// Non-empty AS organization.
    pub fn organization(&self) -> Option<&str> {
        self.as_organization
            .as_deref()
            .filter(|value| !value.is_empty())
    }
}

/// Decode a value of type `T`, mapping null or a mismatched type to `None`.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_full_record() {
        let json = r#"{
            "ip": "203.0.113.7",
            "fraudScore": 85,
            "isResidential": false,
            "isBroadcast": true,
            "city": "Tokyo",
            "region": "Tokyo",
            "country": "Japan",
            "asOrganization": "Example Hosting"
        }"#;

        let record = InfoRecord::from_json(json).unwrap();
        assert_eq!(record.fraud_score, Some(85.0));
        assert_eq!(record.is_residential, Some(false));
        assert_eq!(record.is_broadcast, Some(true));
        assert_eq!(record.location(), Some("Tokyo"));
        assert_eq!(record.organization(), Some("Example Hosting"));
        assert_eq!(record.extra.get("ip"), Some(&Value::from("203.0.113.7")));
    }

    #[test]
    fn test_decode_empty_object() {
        let record = InfoRecord::from_json("{}").unwrap();
        assert_eq!(record, InfoRecord::default());
        assert!(!record.residential());
        assert!(!record.broadcast());
        assert!(record.location().is_none());
        assert!(record.organization().is_none());
    }

    #[test]
    fn test_mismatched_types_decode_as_absent() {
        let json = r#"{"fraudScore": "high", "isResidential": "yes", "isBroadcast": 1, "city": 42}"#;

        let record = InfoRecord::from_json(json).unwrap();
        assert!(record.fraud_score.is_none());
        assert!(record.is_residential.is_none());
        assert!(record.is_broadcast.is_none());
        assert!(record.city.is_none());
    }

    #[test]
    fn test_null_fields_decode_as_absent() {
        let record = InfoRecord::from_json(r#"{"fraudScore": null, "city": null}"#).unwrap();
        assert!(record.fraud_score.is_none());
        assert!(record.city.is_none());
    }

    #[test]
    fn test_location_skips_empty_strings() {
        let record = InfoRecord {
            city: Some(String::new()),
            region: None,
            country: Some("Germany".to_string()),
            ..Default::default()
        };
        assert_eq!(record.location(), Some("Germany"));
    }

    #[test]
    fn test_non_object_rejected() {
        assert!(InfoRecord::from_json("[1, 2, 3]").is_err());
        assert!(InfoRecord::from_json("not json").is_err());
    }

    #[test]
    fn test_cache_encoding_is_stable() {
        let json = r#"{"fraudScore":12.5,"isResidential":true,"asn":4134,"country":"China"}"#;
        let record = InfoRecord::from_json(json).unwrap();

        let encoded = record.to_json().unwrap();
        let decoded = InfoRecord::from_json(&encoded).unwrap();
        assert_eq!(decoded, record);
        assert_eq!(decoded.to_json().unwrap(), encoded);
    }
}
