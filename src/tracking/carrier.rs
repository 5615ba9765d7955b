use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "TEXT")]
pub enum Carrier {
    #[sqlx(rename = "dhl")]
    Dhl,
    #[sqlx(rename = "hermes")]
    Hermes,
}

impl fmt::Display for Carrier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Carrier::Dhl => write!(f, "DHL"),
            Carrier::Hermes => write!(f, "Hermes"),
        }
    }
}

impl Carrier {
    /// Public tracking page for a shipment.
    pub fn tracking_url(&self, tracking_number: &str) -> String {
        match self {
            Carrier::Dhl => format!(
                "https://www.dhl.de/de/privatkunden/pakete-empfangen/verfolgen.html?piececode={}",
                tracking_number
            ),
            Carrier::Hermes => format!(
                "https://www.myhermes.de/empfangen/sendungsverfolgung/sendungsinformation#{}",
                tracking_number
            ),
        }
    }
}

/// Guess the carrier from the tracking number shape. Total: anything that
/// matches neither pattern falls back to DHL.
///
/// Hermes numbers are exactly 14 digits; DHL numbers are 10-39 digits.
pub fn detect_carrier(tracking_number: &str) -> Carrier {
    let cleaned: String = tracking_number
        .chars()
        .filter(|c| *c != ' ' && *c != '-')
        .collect();

    let all_digits = !cleaned.is_empty() && cleaned.chars().all(|c| c.is_ascii_digit());

    if all_digits && cleaned.len() == 14 {
        Carrier::Hermes
    } else if all_digits && (10..=39).contains(&cleaned.len()) {
        Carrier::Dhl
    } else {
        Carrier::Dhl
    }
}

/// An explicitly stored carrier always wins; detection only runs when the
/// stored value is absent.
pub fn resolve_carrier(stored: Option<Carrier>, tracking_number: &str) -> Carrier {
    stored.unwrap_or_else(|| detect_carrier(tracking_number))
}
