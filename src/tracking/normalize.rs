use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::tracking::{progress_from_status, Carrier};

/// At most this many history events are kept per snapshot.
pub const MAX_HISTORY_EVENTS: usize = 8;

const EVENT_DATE_FORMAT: &str = "%d.%m.%Y, %H:%M";

/// One formatted entry of a shipment's event history.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HistoryEvent {
    pub time: String,
    pub text: String,
}

/// Normalized result of a single tracking check. Fetch or decode failures are
/// represented as a snapshot with `error` set rather than an `Err`; a single
/// item's tracking failure must never abort a monitoring cycle.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrackingSnapshot {
    pub carrier: Carrier,
    pub status: String,
    pub short_status: Option<String>,
    pub destination: Option<String>,
    pub progress: u8,
    pub history: Vec<HistoryEvent>,
    pub url: String,
    pub error: Option<String>,
}

impl TrackingSnapshot {
    pub fn failure(carrier: Carrier, tracking_number: &str, message: impl Into<String>) -> Self {
        Self {
            carrier,
            status: "Tracking error".to_string(),
            short_status: None,
            destination: None,
            progress: 0,
            history: Vec::new(),
            url: carrier.tracking_url(tracking_number),
            error: Some(message.into()),
        }
    }
}

/// Raw carrier API response, tagged by the carrier that produced it.
#[derive(Debug, Clone, Deserialize)]
pub enum RawTrackingPayload {
    Dhl(DhlPayload),
    Hermes(HermesPayload),
}

impl RawTrackingPayload {
    pub fn carrier(&self) -> Carrier {
        match self {
            RawTrackingPayload::Dhl(_) => Carrier::Dhl,
            RawTrackingPayload::Hermes(_) => Carrier::Hermes,
        }
    }
}

// DHL shipment search response ("int-verfolgen" data API).

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DhlPayload {
    #[serde(default)]
    pub sendungen: Vec<DhlShipment>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DhlShipment {
    #[serde(default)]
    pub has_complete_details: bool,
    #[serde(default)]
    pub sendungsdetails: DhlShipmentDetails,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DhlShipmentDetails {
    #[serde(default)]
    pub sendungsverlauf: DhlShipmentHistory,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DhlShipmentHistory {
    pub aktueller_status: Option<String>,
    #[serde(default)]
    pub events: Vec<DhlEvent>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DhlEvent {
    pub datum: Option<String>,
    pub status: Option<String>,
}

// Hermes parcel details response.

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HermesPayload {
    #[serde(default)]
    pub status: HermesStatus,
    #[serde(default)]
    pub parcel_history: Vec<HermesEvent>,
    #[serde(default)]
    pub meta_information: HermesMetaInformation,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct HermesStatus {
    #[serde(default)]
    pub text: HermesStatusText,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HermesStatusText {
    pub long_text: Option<String>,
    pub short_text: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HermesEvent {
    pub timestamp: Option<String>,
    pub status_history_text: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct HermesMetaInformation {
    pub destination: Option<String>,
}

/// Turn a raw carrier payload into a normalized snapshot. Date parsing is
/// best-effort: unparseable event dates fall back to the raw string, never
/// failing the whole call.
pub fn normalize_tracking_result(
    tracking_number: &str,
    payload: &RawTrackingPayload,
) -> TrackingSnapshot {
    match payload {
        RawTrackingPayload::Dhl(payload) => normalize_dhl(tracking_number, payload),
        RawTrackingPayload::Hermes(payload) => normalize_hermes(tracking_number, payload),
    }
}

fn normalize_dhl(tracking_number: &str, payload: &DhlPayload) -> TrackingSnapshot {
    let shipment = payload.sendungen.iter().find(|s| s.has_complete_details);

    let Some(shipment) = shipment else {
        return TrackingSnapshot {
            carrier: Carrier::Dhl,
            status: "Package not found".to_string(),
            short_status: None,
            destination: None,
            progress: 0,
            history: Vec::new(),
            url: Carrier::Dhl.tracking_url(tracking_number),
            error: Some("No tracking data available".to_string()),
        };
    };

    let history = &shipment.sendungsdetails.sendungsverlauf;
    let status = history
        .aktueller_status
        .clone()
        .unwrap_or_else(|| "Status unknown".to_string());

    let events = history
        .events
        .iter()
        .take(MAX_HISTORY_EVENTS)
        .map(|event| HistoryEvent {
            time: match event.datum.as_deref() {
                Some(raw) if !raw.is_empty() => {
                    format_event_date(raw).unwrap_or_else(|| raw.to_string())
                }
                _ => "Unknown".to_string(),
            },
            text: event.status.clone().unwrap_or_default(),
        })
        .collect();

    TrackingSnapshot {
        carrier: Carrier::Dhl,
        progress: progress_from_status(Carrier::Dhl, &status, ""),
        status,
        short_status: None,
        destination: None,
        history: events,
        url: Carrier::Dhl.tracking_url(tracking_number),
        error: None,
    }
}

fn normalize_hermes(tracking_number: &str, payload: &HermesPayload) -> TrackingSnapshot {
    let status = payload
        .status
        .text
        .long_text
        .clone()
        .unwrap_or_else(|| "Unknown".to_string());
    let short_status = payload.status.text.short_text.clone().unwrap_or_default();

    let events = payload
        .parcel_history
        .iter()
        .filter_map(|event| {
            let raw_text = event
                .status_history_text
                .clone()
                .or_else(|| event.status.clone())
                .unwrap_or_default();
            let text = map_hermes_status_code(&raw_text);
            if text.is_empty() {
                return None;
            }

            let time = match event.timestamp.as_deref() {
                Some(raw) => format_event_date(raw).unwrap_or_else(|| raw.to_string()),
                None => "Pending".to_string(),
            };

            Some(HistoryEvent { time, text })
        })
        .take(MAX_HISTORY_EVENTS)
        .collect();

    TrackingSnapshot {
        carrier: Carrier::Hermes,
        progress: progress_from_status(Carrier::Hermes, &status, &short_status),
        status,
        short_status: Some(short_status),
        destination: payload.meta_information.destination.clone(),
        history: events,
        url: Carrier::Hermes.tracking_url(tracking_number),
        error: None,
    }
}

/// Hermes history entries sometimes carry internal status codes instead of
/// display text.
fn map_hermes_status_code(text: &str) -> String {
    match text {
        "SENDUNG_IN_ZIELREGION_ANGEKOMMEN" => "Package arrived in destination region".to_string(),
        "ZUSTELLTOUR" => "Out for delivery".to_string(),
        "ZUGESTELLT" => "Delivered".to_string(),
        other => other.to_string(),
    }
}

fn format_event_date(raw: &str) -> Option<String> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.format(EVENT_DATE_FORMAT).to_string());
    }
    // Some carrier dates come without an offset
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S") {
        return Some(dt.format(EVENT_DATE_FORMAT).to_string());
    }
    None
}
