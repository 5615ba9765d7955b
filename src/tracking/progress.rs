use crate::tracking::Carrier;

// The rule tables are deliberately kept separate per carrier: the two use
// incompatible status vocabularies and different breakpoints, and 100 is
// treated as terminal ("Delivered") downstream. First matching rule wins.

const DHL_RULES: &[(&str, u8)] = &[
    ("elektronisch angekündigt", 20),
    ("abgeholt", 40),
    ("transport", 60),
    ("unterwegs", 60),
    ("zustellbasis", 80),
    ("zustellung", 80),
    ("zugestellt", 100),
    ("empfangen", 100),
];

const HERMES_RULES: &[(&str, u8)] = &[
    ("eingeliefert", 30),
    ("übernommen", 40),
    ("zielregion", 60),
    ("zustelltour", 80),
    ("out for delivery", 80),
    ("zugestellt", 100),
    ("delivered", 100),
];

/// Map a carrier's free-text status to a 0-100 progress value. Matching is
/// case-insensitive substring search over the ordered rule table; unknown
/// text resolves to 0 (shipment stays pending until a clearer status shows
/// up). DHL only uses the long text; Hermes also consults the short text.
pub fn progress_from_status(carrier: Carrier, long_text: &str, short_text: &str) -> u8 {
    match carrier {
        Carrier::Dhl => dhl_progress(long_text),
        Carrier::Hermes => hermes_progress(long_text, short_text),
    }
}

fn dhl_progress(status: &str) -> u8 {
    let status = status.to_lowercase();
    for (needle, progress) in DHL_RULES {
        if status.contains(needle) {
            return *progress;
        }
    }
    0
}

fn hermes_progress(long_text: &str, short_text: &str) -> u8 {
    if short_text.to_lowercase().contains("abgegeben") {
        return 30;
    }
    let status = long_text.to_lowercase();
    for (needle, progress) in HERMES_RULES {
        if status.contains(needle) {
            return *progress;
        }
    }
    0
}
