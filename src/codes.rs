//! Lookup tables and per-value normalization rules.
//!
//! Every function here is total: unknown codes map to the sentinel label,
//! unparseable numbers and dates map to `None`. The extracts are known to
//! carry out-of-range codes, so none of this can fail.

use crate::constants::{
    AFFIRMATIVE_FLAGS, API10_LEN, DATE_FORMATS, DATETIME_FORMATS, DISPOSAL_WELL_TYPE,
    FOCUS_COUNTY, GALLONS_PER_BARREL, OFFSHORE_MARKER, SENTINEL_LABEL, SOURCE_NAME_RULES,
    water_kind, water_source,
};
use crate::models::{CountyBucket, Suitability};
use chrono::{Datelike, NaiveDate, NaiveDateTime};

fn lookup(table: &'static [(&'static str, &'static str)], code: Option<&str>) -> &'static str {
    let Some(code) = code.map(str::trim).filter(|c| !c.is_empty()) else {
        return SENTINEL_LABEL;
    };
    // "2.0" shows up where a spreadsheet touched the extract
    let code = code.strip_suffix(".0").unwrap_or(code).to_uppercase();
    table
        .iter()
        .find(|(known, _)| *known == code)
        .map(|(_, label)| *label)
        .unwrap_or(SENTINEL_LABEL)
}

/// Water source code to label
pub fn water_source_label(code: Option<&str>) -> &'static str {
    lookup(water_source::CODES, code)
}

/// Water kind code to label
pub fn water_kind_label(code: Option<&str>) -> &'static str {
    lookup(water_kind::CODES, code)
}

pub fn is_affirmative(flag: Option<&str>) -> bool {
    flag.map(|f| f.trim().to_uppercase())
        .is_some_and(|f| AFFIRMATIVE_FLAGS.contains(&f.as_str()))
}

/// Concatenate treatment flags as `Y`, `N` or `-` (missing)
pub fn treatment_token(flags: &[Option<&str>]) -> String {
    flags
        .iter()
        .map(|flag| match flag.map(str::trim) {
            None | Some("") => '-',
            Some(_) if is_affirmative(*flag) => 'Y',
            Some(_) => 'N',
        })
        .collect()
}

/// Classify a record from its suitability flag and treatment token
pub fn classify_suitability(suitable_flag: Option<&str>, token: &str) -> Suitability {
    if is_affirmative(suitable_flag) {
        Suitability::Yes
    } else if token.contains('Y') {
        Suitability::NoTreated
    } else {
        Suitability::NoUntreated
    }
}

/// Parse a barrel count. Thousands separators are tolerated; text and
/// negative values are not volumes.
pub fn parse_barrels(raw: Option<&str>) -> Option<f64> {
    let cleaned: String = raw?.trim().chars().filter(|c| *c != ',').collect();
    cleaned
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v >= 0.0)
}

pub fn barrels_to_gallons(barrels: f64) -> f64 {
    barrels * GALLONS_PER_BARREL
}

pub fn parse_date(raw: Option<&str>) -> Option<NaiveDate> {
    let raw = raw?.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
                .map(|dt| dt.date())
        })
}

/// Calendar quarter (1-4) of a date string
pub fn quarter_of(raw: Option<&str>) -> Option<i32> {
    parse_date(raw).map(|d| (d.month0() / 3 + 1) as i32)
}

/// First ten characters of a full API number
pub fn api10(api_number: Option<&str>) -> Option<String> {
    api_number
        .map(str::trim)
        .filter(|a| !a.is_empty())
        .map(|a| a.chars().take(API10_LEN).collect())
}

pub fn county_bucket(county: Option<&str>) -> CountyBucket {
    match county {
        Some(c) if c.trim().eq_ignore_ascii_case(FOCUS_COUNTY) => CountyBucket::Focus,
        _ => CountyBucket::Other,
    }
}

pub fn is_offshore(county: Option<&str>) -> bool {
    county.is_some_and(|c| c.to_lowercase().contains(OFFSHORE_MARKER))
}

pub fn is_disposal(well_type: Option<&str>) -> bool {
    well_type.is_some_and(|w| w.trim().eq_ignore_ascii_case(DISPOSAL_WELL_TYPE))
}

/// Consolidate an operator-entered water source name.
///
/// Rules are applied in order and the first substring match wins; values no
/// rule recognizes pass through trimmed.
pub fn consolidate_source_name(raw: Option<&str>) -> Option<String> {
    let trimmed = raw?.trim();
    if trimmed.is_empty() {
        return None;
    }
    let lower = trimmed.to_lowercase();
    let canonical = SOURCE_NAME_RULES
        .iter()
        .find(|(pattern, _)| lower.contains(pattern))
        .map(|(_, canonical)| canonical.to_string());
    Some(canonical.unwrap_or_else(|| trimmed.to_string()))
}
