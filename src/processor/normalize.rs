//! Typing and code normalization.
//!
//! Turns the joined all-text tables into the typed snapshot tables: volumes
//! become barrels and gallons, dates become quarters, codes become labels,
//! and the suitability partition and county predicates are materialized as
//! columns so reports only filter and group.

use crate::codes;
use crate::constants::SENTINEL_LABEL;
use crate::constants::columns::*;
use crate::error::Result;
use crate::schema::{int_values, optional_text_values, text_values};

use polars::prelude::*;
use tracing::{info, warn};

fn parse_number(raw: Option<&str>) -> Option<f64> {
    let cleaned: String = raw?.trim().chars().filter(|c| *c != ',').collect();
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

fn count_sentinels(labels: &[&str]) -> usize {
    labels.iter().filter(|l| **l == SENTINEL_LABEL).count()
}

/// Operator, county and location columns contributed by the registry join
struct WellContext {
    operator_code: Vec<Option<String>>,
    operator_name: Vec<Option<String>>,
    county_name: Vec<Option<String>>,
    latitude: Vec<Option<f64>>,
    longitude: Vec<Option<f64>>,
    field_name: Vec<Option<String>>,
}

impl WellContext {
    fn read(df: &DataFrame) -> Result<Self> {
        let coordinate = |name: &str| -> Result<Vec<Option<f64>>> {
            Ok(optional_text_values(df, name)?
                .iter()
                .map(|v| parse_number(v.as_deref()))
                .collect())
        };
        Ok(Self {
            operator_code: optional_text_values(df, OPERATOR_CODE)?,
            operator_name: optional_text_values(df, OPERATOR_NAME)?,
            county_name: optional_text_values(df, COUNTY_NAME)?,
            latitude: coordinate(LATITUDE)?,
            longitude: coordinate(LONGITUDE)?,
            field_name: optional_text_values(df, FIELD_NAME)?,
        })
    }

    /// Context columns plus the derived county bucket and offshore flag
    fn into_columns(self) -> Vec<Column> {
        let bucket: Vec<&str> = self
            .county_name
            .iter()
            .map(|c| codes::county_bucket(c.as_deref()).label())
            .collect();
        let offshore: Vec<bool> = self
            .county_name
            .iter()
            .map(|c| codes::is_offshore(c.as_deref()))
            .collect();

        vec![
            Column::new(OPERATOR_CODE.into(), self.operator_code),
            Column::new(OPERATOR_NAME.into(), self.operator_name),
            Column::new(COUNTY_NAME.into(), self.county_name),
            Column::new(COUNTY_BUCKET.into(), bucket),
            Column::new(IS_OFFSHORE.into(), offshore),
            Column::new(LATITUDE.into(), self.latitude),
            Column::new(LONGITUDE.into(), self.longitude),
            Column::new(FIELD_NAME.into(), self.field_name),
        ]
    }
}

/// Barrels, gallons, quarter and disposal flag shared by both injection tables
struct InjectionCore {
    volume_bbl: Vec<Option<f64>>,
    gallons: Vec<Option<f64>>,
    quarter: Vec<Option<i32>>,
    is_disposal: Vec<bool>,
}

impl InjectionCore {
    fn read(df: &DataFrame, table: &str, date_column: &str) -> Result<Self> {
        let volume_bbl: Vec<Option<f64>> = text_values(df, table, VOLUME_BBL)?
            .iter()
            .map(|v| codes::parse_barrels(v.as_deref()))
            .collect();
        let gallons = volume_bbl
            .iter()
            .map(|v| v.map(codes::barrels_to_gallons))
            .collect();
        let quarter: Vec<Option<i32>> = text_values(df, table, date_column)?
            .iter()
            .map(|v| codes::quarter_of(v.as_deref()))
            .collect();
        let is_disposal = optional_text_values(df, WELL_TYPE)?
            .iter()
            .map(|v| codes::is_disposal(v.as_deref()))
            .collect();

        let missing_volume = volume_bbl.iter().filter(|v| v.is_none()).count();
        if missing_volume > 0 {
            warn!(
                "{} {} rows have no usable volume and are excluded from sums",
                missing_volume, table
            );
        }
        let missing_quarter = quarter.iter().filter(|q| q.is_none()).count();
        if missing_quarter > 0 {
            warn!("{} {} rows have an unparseable date", missing_quarter, table);
        }

        Ok(Self {
            volume_bbl,
            gallons,
            quarter,
            is_disposal,
        })
    }
}

/// Type the joined quarterly table
pub fn type_quarterly(df: &DataFrame) -> Result<DataFrame> {
    const TABLE: &str = "quarterly";

    let core = InjectionCore::read(df, TABLE, REPORT_DATE)?;
    let source = optional_text_values(df, WATER_SOURCE)?;
    let source_label: Vec<&str> = source
        .iter()
        .map(|v| codes::water_source_label(v.as_deref()))
        .collect();
    let source_name: Vec<Option<String>> = optional_text_values(df, WATER_SOURCE_NAME)?
        .iter()
        .map(|v| codes::consolidate_source_name(v.as_deref()))
        .collect();

    let suitable = optional_text_values(df, SUITABLE_FLAG)?;
    let flags = TREATMENT_FLAGS
        .iter()
        .map(|name| optional_text_values(df, name))
        .collect::<Result<Vec<_>>>()?;
    let tokens: Vec<String> = (0..df.height())
        .map(|row| {
            let row_flags: Vec<Option<&str>> = flags.iter().map(|f| f[row].as_deref()).collect();
            codes::treatment_token(&row_flags)
        })
        .collect();
    let suitability: Vec<&str> = suitable
        .iter()
        .zip(&tokens)
        .map(|(flag, token)| codes::classify_suitability(flag.as_deref(), token).label())
        .collect();

    let sentinels = count_sentinels(&source_label);
    if sentinels > 0 {
        warn!("{} quarterly rows carry an unknown water source code", sentinels);
    }

    let mut columns = vec![
        Column::new(API_NUMBER.into(), text_values(df, TABLE, API_NUMBER)?),
        Column::new(YEAR.into(), int_values(df, TABLE, YEAR)?),
        Column::new(QUARTER.into(), core.quarter),
        Column::new(REPORT_DATE.into(), text_values(df, TABLE, REPORT_DATE)?),
        Column::new(VOLUME_BBL.into(), core.volume_bbl),
        Column::new(GALLONS.into(), core.gallons),
        Column::new(WATER_SOURCE.into(), source),
        Column::new(WATER_SOURCE_LABEL.into(), source_label),
        Column::new(WATER_SOURCE_NAME.into(), source_name),
        Column::new(SUITABLE_FLAG.into(), suitable),
        Column::new(TREATMENT_TOKEN.into(), tokens),
        Column::new(SUITABILITY.into(), suitability),
        Column::new(WELL_TYPE.into(), optional_text_values(df, WELL_TYPE)?),
        Column::new(IS_DISPOSAL.into(), core.is_disposal),
    ];
    columns.extend(WellContext::read(df)?.into_columns());

    let typed = DataFrame::new(columns)?;
    info!("Typed {} quarterly rows", typed.height());
    Ok(typed)
}

/// Type the joined monthly table
pub fn type_monthly(df: &DataFrame) -> Result<DataFrame> {
    const TABLE: &str = "monthly";

    let core = InjectionCore::read(df, TABLE, INJECTION_DATE)?;
    let source = optional_text_values(df, WATER_SOURCE)?;
    let source_label: Vec<&str> = source
        .iter()
        .map(|v| codes::water_source_label(v.as_deref()))
        .collect();
    let kind = optional_text_values(df, WATER_KIND)?;
    let kind_label: Vec<&str> = kind
        .iter()
        .map(|v| codes::water_kind_label(v.as_deref()))
        .collect();
    let numeric = |name: &str| -> Result<Vec<Option<f64>>> {
        Ok(optional_text_values(df, name)?
            .iter()
            .map(|v| parse_number(v.as_deref()))
            .collect())
    };

    let sentinels = count_sentinels(&source_label) + count_sentinels(&kind_label);
    if sentinels > 0 {
        warn!("{} monthly codes fell outside the lookup tables", sentinels);
    }

    let mut columns = vec![
        Column::new(API_NUMBER.into(), text_values(df, TABLE, API_NUMBER)?),
        Column::new(YEAR.into(), int_values(df, TABLE, YEAR)?),
        Column::new(QUARTER.into(), core.quarter),
        Column::new(INJECTION_DATE.into(), text_values(df, TABLE, INJECTION_DATE)?),
        Column::new(VOLUME_BBL.into(), core.volume_bbl),
        Column::new(GALLONS.into(), core.gallons),
        Column::new(WATER_SOURCE.into(), source),
        Column::new(WATER_SOURCE_LABEL.into(), source_label),
        Column::new(WATER_KIND.into(), kind),
        Column::new(WATER_KIND_LABEL.into(), kind_label),
        Column::new(WELL_TYPE.into(), optional_text_values(df, WELL_TYPE)?),
        Column::new(IS_DISPOSAL.into(), core.is_disposal),
        Column::new(PRESSURE_PSI.into(), numeric(PRESSURE_PSI)?),
        Column::new(DAYS_INJECTING.into(), numeric(DAYS_INJECTING)?),
    ];
    columns.extend(WellContext::read(df)?.into_columns());

    let typed = DataFrame::new(columns)?;
    info!("Typed {} monthly rows", typed.height());
    Ok(typed)
}

/// Type the enriched registry
pub fn type_registry(df: &DataFrame) -> Result<DataFrame> {
    const TABLE: &str = "well registry";

    let mut columns = vec![
        Column::new(API_NUMBER.into(), text_values(df, TABLE, API_NUMBER)?),
        Column::new(API10.into(), text_values(df, TABLE, API10)?),
        Column::new(YEAR.into(), int_values(df, TABLE, YEAR)?),
    ];
    columns.extend(WellContext::read(df)?.into_columns());

    Ok(DataFrame::new(columns)?)
}
