//! Application constants for the injection water pipeline
//!
//! Analysis window, unit conversion, file layout, canonical column names and
//! the lookup tables used to turn regulatory codes into readable labels.

// =============================================================================
// Analysis Window and Units
// =============================================================================

/// Years covered by the analysis. Every year must be present for every kind.
pub const YEARS: &[i32] = &[2018, 2019, 2020, 2021];

/// US gallons per oil barrel. Exact by definition.
pub const GALLONS_PER_BARREL: f64 = 42.0;

/// Length of the short well identifier used by the location reference
pub const API10_LEN: usize = 10;

/// Decimal places kept when percentages are displayed
pub const PERCENT_DECIMALS: i32 = 2;

// =============================================================================
// File Layout
// =============================================================================

/// Default root holding `<kind>/<year>/<table>.csv`
pub const DEFAULT_DATA_DIR: &str = "data";

/// Cached well location reference, fetched once outside the pipeline
pub const DEFAULT_LOCATION_CACHE: &str = "data/well_locations.csv";

/// Default snapshot directory
pub const DEFAULT_SNAPSHOT_DIR: &str = "snapshot";

pub const SNAPSHOT_QUARTERLY_FILE: &str = "quarterly.parquet";
pub const SNAPSHOT_MONTHLY_FILE: &str = "monthly.parquet";
pub const SNAPSHOT_WELLS_FILE: &str = "wells.parquet";
pub const BUILD_STATS_FILE: &str = "build_stats.json";

// =============================================================================
// Canonical Column Names
// =============================================================================

/// Column names shared by the raw and typed tables
pub mod columns {
    pub const API_NUMBER: &str = "api_number";
    pub const API10: &str = "api10";
    pub const YEAR: &str = "year";
    pub const QUARTER: &str = "quarter";

    pub const REPORT_DATE: &str = "report_date";
    pub const INJECTION_DATE: &str = "injection_date";
    pub const VOLUME_BBL: &str = "volume_bbl";
    pub const GALLONS: &str = "gallons";

    pub const WATER_SOURCE: &str = "water_source";
    pub const WATER_SOURCE_LABEL: &str = "water_source_label";
    pub const WATER_SOURCE_NAME: &str = "water_source_name";
    pub const WATER_KIND: &str = "water_kind";
    pub const WATER_KIND_LABEL: &str = "water_kind_label";

    pub const SUITABLE_FLAG: &str = "suitable_flag";
    pub const TREATED_FILTRATION: &str = "treated_filtration";
    pub const TREATED_SOFTENING: &str = "treated_softening";
    pub const TREATED_REVERSE_OSMOSIS: &str = "treated_reverse_osmosis";
    pub const TREATED_CHEMICAL: &str = "treated_chemical";
    pub const TREATED_OTHER: &str = "treated_other";
    pub const TREATMENT_TOKEN: &str = "treatment_token";
    pub const SUITABILITY: &str = "suitability";

    /// Treatment method flags in token order
    pub const TREATMENT_FLAGS: [&str; 5] = [
        TREATED_FILTRATION,
        TREATED_SOFTENING,
        TREATED_REVERSE_OSMOSIS,
        TREATED_CHEMICAL,
        TREATED_OTHER,
    ];

    pub const WELL_TYPE: &str = "well_type";
    pub const IS_DISPOSAL: &str = "is_disposal";
    pub const PRESSURE_PSI: &str = "pressure_psi";
    pub const DAYS_INJECTING: &str = "days_injecting";

    pub const OPERATOR_CODE: &str = "operator_code";
    pub const OPERATOR_NAME: &str = "operator_name";
    pub const COUNTY_NAME: &str = "county_name";
    pub const COUNTY_BUCKET: &str = "county_bucket";
    pub const IS_OFFSHORE: &str = "is_offshore";

    pub const LATITUDE: &str = "latitude";
    pub const LONGITUDE: &str = "longitude";
    pub const FIELD_NAME: &str = "field_name";

    /// Columns the well registry contributes to injection tables
    pub const REGISTRY_PROVIDED: &[&str] = &[
        OPERATOR_CODE,
        OPERATOR_NAME,
        COUNTY_NAME,
        API10,
        LATITUDE,
        LONGITUDE,
        FIELD_NAME,
    ];
}

/// Header spellings seen across extract years, after snake_case normalization
pub const COLUMN_ALIASES: &[(&str, &str)] = &[
    ("api", "api_number"),
    ("api_no", "api_number"),
    ("apinumber", "api_number"),
    ("well_api", "api_number"),
    ("api_10", "api10"),
    ("api_10_digit", "api10"),
    ("injection_month", "injection_date"),
    ("production_date", "injection_date"),
    ("quarter_end_date", "report_date"),
    ("reporting_date", "report_date"),
    ("water_injected_bbl", "volume_bbl"),
    ("water_injected", "volume_bbl"),
    ("volume_injected", "volume_bbl"),
    ("injection_volume", "volume_bbl"),
    ("water_source_type", "water_source"),
    ("source_of_water", "water_source"),
    ("source_name", "water_source_name"),
    ("water_source_description", "water_source_name"),
    ("kind_of_water", "water_kind"),
    ("water_kind_type", "water_kind"),
    ("suitable_for_domestic", "suitable_flag"),
    ("suitable_domestic_irrigation", "suitable_flag"),
    ("is_suitable", "suitable_flag"),
    ("filtration", "treated_filtration"),
    ("softening", "treated_softening"),
    ("reverse_osmosis", "treated_reverse_osmosis"),
    ("chemical_treatment", "treated_chemical"),
    ("other_treatment", "treated_other"),
    ("well_type_code", "well_type"),
    ("injection_pressure", "pressure_psi"),
    ("days_injected", "days_injecting"),
    ("operator", "operator_name"),
    ("county", "county_name"),
    ("lat", "latitude"),
    ("lon", "longitude"),
    ("long", "longitude"),
    ("field", "field_name"),
];

// =============================================================================
// Code Tables
// =============================================================================

/// Label for any code outside a lookup table
pub const SENTINEL_LABEL: &str = "Error/Missing";

pub mod water_source {
    pub const PRODUCED: &str = "Produced Water";
    pub const DOMESTIC: &str = "Domestic Water";
    pub const SURFACE: &str = "Surface Water";
    pub const GROUND: &str = "Groundwater";
    pub const OCEAN: &str = "Ocean Water";
    pub const RECYCLED: &str = "Recycled Water";
    pub const OTHER: &str = "Other";

    /// Numeric and text codes as they appear in the extracts
    pub const CODES: &[(&str, &str)] = &[
        ("1", PRODUCED),
        ("PW", PRODUCED),
        ("PRODUCED", PRODUCED),
        ("2", DOMESTIC),
        ("DW", DOMESTIC),
        ("DOMESTIC", DOMESTIC),
        ("3", SURFACE),
        ("SW", SURFACE),
        ("SURFACE", SURFACE),
        ("4", GROUND),
        ("GW", GROUND),
        ("GROUND", GROUND),
        ("5", OCEAN),
        ("OW", OCEAN),
        ("OCEAN", OCEAN),
        ("6", RECYCLED),
        ("RW", RECYCLED),
        ("RECYCLED", RECYCLED),
        ("7", OTHER),
        ("OT", OTHER),
        ("OTHER", OTHER),
    ];
}

pub mod water_kind {
    pub const WATER: &str = "Water";
    pub const STEAM: &str = "Steam";
    pub const GAS: &str = "Gas";
    pub const AIR: &str = "Air";

    pub const CODES: &[(&str, &str)] = &[
        ("1", WATER),
        ("W", WATER),
        ("WATER", WATER),
        ("2", STEAM),
        ("S", STEAM),
        ("STEAM", STEAM),
        ("3", GAS),
        ("G", GAS),
        ("GAS", GAS),
        ("4", AIR),
        ("A", AIR),
        ("AIR", AIR),
    ];
}

/// Flag spellings treated as affirmative (compared upper-cased)
pub const AFFIRMATIVE_FLAGS: &[&str] = &["Y", "YES", "T", "TRUE", "1"];

/// Well type code for water disposal wells
pub const DISPOSAL_WELL_TYPE: &str = "WD";

/// County substring marking offshore wells (compared lower-cased)
pub const OFFSHORE_MARKER: &str = "offshore";

/// County reported on its own; everything else is grouped as "Other"
pub const FOCUS_COUNTY: &str = "Kern";
pub const OTHER_COUNTY_BUCKET: &str = "Other";

/// Group label for null keys in summary tables
pub const MISSING_KEY_LABEL: &str = "Missing";

/// Ordered source-name consolidation rules: lower-case substring, canonical name.
/// First match wins.
pub const SOURCE_NAME_RULES: &[(&str, &str)] = &[
    ("aqueduct", "California Aqueduct"),
    ("swp", "California Aqueduct"),
    ("state water project", "California Aqueduct"),
    ("kern county water", "Kern County Water Agency"),
    ("kcwa", "Kern County Water Agency"),
    ("west kern", "West Kern Water District"),
    ("wkwd", "West Kern Water District"),
    ("cawelo", "Cawelo Water District"),
    ("north kern", "North Kern Water Storage District"),
    ("bakersfield", "City of Bakersfield"),
    ("cal water", "California Water Service"),
    ("california water service", "California Water Service"),
];

/// Date layouts seen in the report and injection date columns
pub const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%Y%m%d"];
pub const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %I:%M:%S %p",
    "%m/%d/%Y %H:%M",
];
