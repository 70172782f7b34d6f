// src/reference.rs
//
// Process-wide reference sets for forecast submissions. Read-only after
// startup; the horizon range is the one knob that changes when the hub
// accepts longer forecasts.

use once_cell::sync::Lazy;

/// ISO-style region codes: DE plus the 16 federal states.
pub static LOCATION_CODES: &[&str] = &[
    "DE", "DE-BW", "DE-BY", "DE-HB", "DE-HH", "DE-HE", "DE-NI", "DE-NW", "DE-RP", "DE-SL",
    "DE-SH", "DE-BB", "DE-MV", "DE-SN", "DE-ST", "DE-TH", "DE-BE",
];

/// The seven quantile levels a complete interval forecast must carry.
pub static VALID_QUANTILES: &[f64] = &[0.025, 0.1, 0.25, 0.5, 0.75, 0.9, 0.975];

pub static VALID_TYPES: &[&str] = &["mean", "quantile"];

pub static VALID_AGE_GROUPS: &[&str] =
    &["00+", "00-04", "05-14", "15-34", "35-59", "60-79", "80+"];

/// Accepted week-ahead horizons, inclusive on both ends.
pub const MIN_HORIZON: i64 = -2;
pub const MAX_HORIZON: i64 = 1;

/// Targets rendered from the horizon range: `"<n> wk ahead inc hosp"`.
pub static VALID_TARGETS: Lazy<Vec<String>> = Lazy::new(|| {
    (MIN_HORIZON..=MAX_HORIZON)
        .map(|h| format!("{} wk ahead inc hosp", h))
        .collect()
});

pub static VALID_PATHOGENS: &[&str] = &["COVID-19"];

/// The exact column set a submission must carry, in canonical order.
pub static REQUIRED_COLUMNS: &[&str] = &[
    "location",
    "age_group",
    "forecast_date",
    "target_end_date",
    "target",
    "type",
    "quantile",
    "value",
    "pathogen",
];
