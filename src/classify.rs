//! Classification of an [`InfoRecord`] into a panel.

use crate::args::PanelMode;
use crate::record::InfoRecord;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const FRAUD_TITLE: &str = "IPPure Fraud Score";
pub const NATIVE_TITLE: &str = "IPPure Native Check";
pub const INFO_TITLE: &str = "IPPure IP Info";
pub const COMBINED_TITLE: &str = "IPPure Risk Overview";
/// Title of panels reporting a failure.
pub const ERROR_TITLE: &str = "IPPure";

/// Panel style, ordered from best to worst.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Style {
    Good,
    Info,
    Alert,
    Error,
}

impl Style {
    pub fn as_str(&self) -> &'static str {
        match self {
            Style::Good => "good",
            Style::Info => "info",
            Style::Alert => "alert",
            Style::Error => "error",
        }
    }
}

impl fmt::Display for Style {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the host renders.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct Panel {
    pub title: String,
    /// May span several lines.
    pub content: String,
    pub style: Style,
}

impl Panel {
    pub fn new(title: impl Into<String>, content: impl Into<String>, style: Style) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            style,
        }
    }

    /// Error panel.
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(ERROR_TITLE, message, Style::Error)
    }
}

/// Fraud risk bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiskLevel {
    /// Score below 40.
    Low,
    /// Score from 40 up to 70.
    Medium,
    /// Score 70 and above.
    High,
}

impl RiskLevel {
    pub fn from_score(score: f64) -> Self {
        if score >= 70.0 {
            RiskLevel::High
        } else if score >= 40.0 {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RiskLevel::Low => "Low Risk",
            RiskLevel::Medium => "Medium Risk",
            RiskLevel::High => "High Risk",
        }
    }

    pub fn style(&self) -> Style {
        match self {
            RiskLevel::Low => Style::Good,
            RiskLevel::Medium => Style::Alert,
            RiskLevel::High => Style::Error,
        }
    }
}

/// Style for the residential/broadcast pair.
///
/// Residential and native is best, datacenter and broadcast is worst, the
/// two mixed cases sit in between.
pub fn native_style(residential: bool, broadcast: bool) -> Style {
    match (residential, broadcast) {
        (true, false) => Style::Good,
        (true, true) | (false, false) => Style::Alert,
        (false, true) => Style::Error,
    }
}

fn network_label(residential: bool) -> &'static str {
    if residential {
        "Residential"
    } else {
        "Datacenter"
    }
}

fn nativity_label(broadcast: bool) -> &'static str {
    if broadcast {
        "Broadcast"
    } else {
        "Native"
    }
}

/// Build the panel for `mode`.
pub fn classify(record: &InfoRecord, mode: PanelMode) -> Panel {
    match mode {
        PanelMode::Fraud => classify_fraud(record),
        PanelMode::Native => classify_native(record),
        PanelMode::Info => classify_info(record),
        PanelMode::Combined => classify_combined(record),
    }
}

fn classify_fraud(record: &InfoRecord) -> Panel {
    match record.fraud_score {
        Some(score) => {
            let risk = RiskLevel::from_score(score);
            Panel::new(
                FRAUD_TITLE,
                format!("Fraud Score: {}\n{}", score, risk.label()),
                risk.style(),
            )
        }
        None => Panel::new(FRAUD_TITLE, "No Score", Style::Error),
    }
}

fn classify_native(record: &InfoRecord) -> Panel {
    let (residential, broadcast) = (record.residential(), record.broadcast());
    Panel::new(
        NATIVE_TITLE,
        format!(
            "{} • {}",
            network_label(residential),
            nativity_label(broadcast)
        ),
        native_style(residential, broadcast),
    )
}

fn classify_info(record: &InfoRecord) -> Panel {
    Panel::new(
        INFO_TITLE,
        format!(
            "{}\n{}",
            record.location().unwrap_or("Unknown"),
            record.organization().unwrap_or("Unknown")
        ),
        Style::Info,
    )
}

fn classify_combined(record: &InfoRecord) -> Panel {
    let fraud = classify_fraud(record);
    let native = classify_native(record);
    let (residential, broadcast) = (record.residential(), record.broadcast());

    let mut lines = Vec::with_capacity(4);
    match record.fraud_score {
        Some(score) => {
            lines.push(format!("Fraud Score: {}", score));
            lines.push(RiskLevel::from_score(score).label().to_string());
        }
        None => lines.push("No Score".to_string()),
    }
    lines.push(network_label(residential).to_string());
    lines.push(nativity_label(broadcast).to_string());

    Panel::new(COMBINED_TITLE, lines.join("\n"), fraud.style.max(native.style))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scored(score: f64) -> InfoRecord {
        InfoRecord {
            fraud_score: Some(score),
            ..Default::default()
        }
    }

    fn flags(residential: bool, broadcast: bool) -> InfoRecord {
        InfoRecord {
            is_residential: Some(residential),
            is_broadcast: Some(broadcast),
            ..Default::default()
        }
    }

    #[test]
    fn test_style_ordering() {
        assert!(Style::Error > Style::Alert);
        assert!(Style::Alert > Style::Info);
        assert!(Style::Info > Style::Good);
        assert_eq!(Style::Good.max(Style::Error), Style::Error);
    }

    #[test]
    fn test_style_serialization() {
        let panel = Panel::new("t", "c", Style::Alert);
        let json = serde_json::to_string(&panel).unwrap();
        assert_eq!(json, r#"{"title":"t","content":"c","style":"alert"}"#);
    }

    #[test]
    fn test_fraud_buckets() {
        for score in 0..=100 {
            let panel = classify(&scored(score as f64), PanelMode::Fraud);
            let expected = if score < 40 {
                Style::Good
            } else if score < 70 {
                Style::Alert
            } else {
                Style::Error
            };
            assert_eq!(panel.style, expected, "score {}", score);
            assert_eq!(panel.title, FRAUD_TITLE);
        }
    }

    #[test]
    fn test_fraud_fractional_boundaries() {
        assert_eq!(classify(&scored(39.9), PanelMode::Fraud).style, Style::Good);
        assert_eq!(classify(&scored(69.99), PanelMode::Fraud).style, Style::Alert);
    }

    #[test]
    fn test_fraud_content() {
        let panel = classify(&scored(85.0), PanelMode::Fraud);
        assert_eq!(panel.content, "Fraud Score: 85\nHigh Risk");

        let panel = classify(&scored(12.5), PanelMode::Fraud);
        assert_eq!(panel.content, "Fraud Score: 12.5\nLow Risk");

        let panel = classify(&scored(40.0), PanelMode::Fraud);
        assert_eq!(panel.content, "Fraud Score: 40\nMedium Risk");
    }

    #[test]
    fn test_fraud_missing_score() {
        let panel = classify(&InfoRecord::default(), PanelMode::Fraud);
        assert_eq!(panel.style, Style::Error);
        assert_eq!(panel.content, "No Score");
        assert_eq!(panel.title, FRAUD_TITLE);
    }

    #[test]
    fn test_native_truth_table() {
        let cases = [
            (true, false, Style::Good, "Residential • Native"),
            (true, true, Style::Alert, "Residential • Broadcast"),
            (false, false, Style::Alert, "Datacenter • Native"),
            (false, true, Style::Error, "Datacenter • Broadcast"),
        ];

        for (residential, broadcast, style, content) in cases {
            let panel = classify(&flags(residential, broadcast), PanelMode::Native);
            assert_eq!(panel.style, style, "({}, {})", residential, broadcast);
            assert_eq!(panel.content, content);
            assert_eq!(panel.title, NATIVE_TITLE);
        }
    }

    #[test]
    fn test_native_missing_flags_are_false() {
        let panel = classify(&InfoRecord::default(), PanelMode::Native);
        assert_eq!(panel.style, Style::Alert);
        assert_eq!(panel.content, "Datacenter • Native");
    }

    #[test]
    fn test_info_content() {
        let record = InfoRecord {
            region: Some("Bavaria".to_string()),
            country: Some("Germany".to_string()),
            as_organization: Some("Example ISP".to_string()),
            ..Default::default()
        };
        let panel = classify(&record, PanelMode::Info);
        assert_eq!(panel.style, Style::Info);
        assert_eq!(panel.content, "Bavaria\nExample ISP");
        assert_eq!(panel.title, INFO_TITLE);
    }

    #[test]
    fn test_info_unknown() {
        let panel = classify(&InfoRecord::default(), PanelMode::Info);
        assert_eq!(panel.content, "Unknown\nUnknown");
        assert_eq!(panel.style, Style::Info);
    }

    #[test]
    fn test_combined_style_is_worst_of_both() {
        let scores = [10.0, 50.0, 90.0];
        let pairs = [(true, false), (true, true), (false, false), (false, true)];

        for score in scores {
            for (residential, broadcast) in pairs {
                let record = InfoRecord {
                    fraud_score: Some(score),
                    is_residential: Some(residential),
                    is_broadcast: Some(broadcast),
                    ..Default::default()
                };
                let expected = RiskLevel::from_score(score)
                    .style()
                    .max(native_style(residential, broadcast));

                let panel = classify(&record, PanelMode::Combined);
                assert_eq!(
                    panel.style, expected,
                    "score {} ({}, {})",
                    score, residential, broadcast
                );
            }
        }
    }

    #[test]
    fn test_combined_content() {
        let record = InfoRecord {
            fraud_score: Some(25.0),
            is_residential: Some(true),
            is_broadcast: Some(false),
            ..Default::default()
        };
        let panel = classify(&record, PanelMode::Combined);
        assert_eq!(panel.title, COMBINED_TITLE);
        assert_eq!(panel.content, "Fraud Score: 25\nLow Risk\nResidential\nNative");
        assert_eq!(panel.style, Style::Good);
    }

    #[test]
    fn test_combined_missing_score() {
        let panel = classify(&flags(true, false), PanelMode::Combined);
        assert_eq!(panel.style, Style::Error);
        assert_eq!(panel.content, "No Score\nResidential\nNative");
    }

    #[test]
    fn test_error_panel() {
        let panel = Panel::error("Network Error");
        assert_eq!(panel.title, ERROR_TITLE);
        assert_eq!(panel.content, "Network Error");
        assert_eq!(panel.style, Style::Error);
    }
}
