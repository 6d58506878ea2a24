//! Invocation argument parsing.
//!
//! The host hands the panel a single optional string. It is either a JSON
//! object or an `&`-separated list of percent-encoded `key=value` pairs:
//!
//! ```text
//! mode=fraud
//! {"mode": "native"}
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// What the panel shows.
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum PanelMode {
    /// Fraud score with a risk bucket.
    Fraud,
    /// Residential/datacenter and native/broadcast check.
    Native,
    /// Location and AS organization.
    #[default]
    Info,
    /// Fraud and native checks in one panel.
    Combined,
}

impl PanelMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            PanelMode::Fraud => "fraud",
            PanelMode::Native => "native",
            PanelMode::Info => "info",
            PanelMode::Combined => "combined",
        }
    }
}

impl fmt::Display for PanelMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A `mode` value that names no known mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownMode(pub String);

impl fmt::Display for UnknownMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Unknown mode: {}", self.0)
    }
}

impl std::error::Error for UnknownMode {}

impl FromStr for PanelMode {
    type Err = UnknownMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fraud" => Ok(PanelMode::Fraud),
            "native" => Ok(PanelMode::Native),
            "info" => Ok(PanelMode::Info),
            "combined" => Ok(PanelMode::Combined),
            _ => Err(UnknownMode(s.trim().to_string())),
        }
    }
}

/// Parsed invocation argument.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PanelArgs {
    params: BTreeMap<String, String>,
}

impl PanelArgs {
    /// Parse the raw argument. Never fails: anything unparseable yields
    /// empty or partial parameters.
    pub fn parse(raw: Option<&str>) -> Self {
        let raw = match raw.map(str::trim) {
            Some(raw) if !raw.is_empty() => raw,
            _ => return Self::default(),
        };

        if raw.starts_with('{') && raw.ends_with('}') {
            if let Some(params) = parse_json_object(raw) {
                return Self { params };
            }
            debug!("Argument looks like JSON but does not parse, trying key=value");
        }

        Self {
            params: parse_query(raw),
        }
    }

    /// Value of a parameter.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    /// Selected mode. A missing or empty `mode` yields `default`; an
    /// unrecognized one is an error.
    pub fn mode(&self, default: PanelMode) -> Result<PanelMode, UnknownMode> {
        match self.get("mode").map(str::trim) {
            Some(mode) if !mode.is_empty() => mode.parse(),
            _ => Ok(default),
        }
    }
}

fn parse_json_object(raw: &str) -> Option<BTreeMap<String, String>> {
    let object = match serde_json::from_str::<Value>(raw).ok()? {
        Value::Object(object) => object,
        _ => return None,
    };

    Some(
        object
            .into_iter()
            .filter_map(|(key, value)| match value {
                Value::Null => None,
                Value::String(s) => Some((key, s)),
                other => Some((key, other.to_string())),
            })
            .collect(),
    )
}

fn parse_query(raw: &str) -> BTreeMap<String, String> {
    raw.split('&')
        .filter_map(|pair| {
            let (key, value) = pair.split_once('=')?;
            let key = urlencoding::decode(key.trim()).ok()?;
            let value = urlencoding::decode(value.trim()).ok()?;
            Some((key.into_owned(), value.into_owned()))
        })
        .collect()
}
