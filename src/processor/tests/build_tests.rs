//! Full snapshot build over the fixture dataset

use super::*;
use crate::constants::columns::*;
use crate::constants::water_source;
use crate::processor::Pipeline;
use crate::report::{Dimension, Filter, LongTable, PercentOf, aggregate};
use crate::schema::{float_values, int_values, text_values};
use crate::models::Suitability;

fn build() -> (TempDir, crate::models::Snapshot, crate::models::BuildStats) {
    let (temp_dir, config) = dataset();
    let (snapshot, stats) = Pipeline::new(config).build_snapshot().unwrap();
    (temp_dir, snapshot, stats)
}

/// Values of `column` on rows whose api_number is `api`
fn texts_for(df: &polars::prelude::DataFrame, api: &str, column: &str) -> Vec<Option<String>> {
    let apis = text_values(df, "t", API_NUMBER).unwrap();
    let values = text_values(df, "t", column).unwrap();
    apis.iter()
        .zip(values)
        .filter(|(a, _)| a.as_deref() == Some(api))
        .map(|(_, v)| v)
        .collect()
}

#[test]
fn test_ingest_counts_and_exact_duplicates() {
    let (_temp_dir, snapshot, stats) = build();

    assert_eq!(stats.quarterly.files_read, 4);
    assert_eq!(stats.quarterly.rows_read, 10);
    assert_eq!(stats.quarterly.duplicates_dropped, 1);
    assert_eq!(stats.quarterly.rows_kept(), 9);
    assert_eq!(snapshot.quarterly.height(), 9);

    assert_eq!(stats.monthly.rows_kept(), 5);
    assert_eq!(snapshot.monthly.height(), 5);

    assert_eq!(stats.registry.duplicates_dropped, 1);
    assert_eq!(snapshot.wells.height(), 16);
    assert_eq!(stats.locations, 2);
}

#[test]
fn test_every_row_is_tagged_with_its_year() {
    let (_temp_dir, snapshot, _stats) = build();

    let years = int_values(&snapshot.quarterly, "t", YEAR).unwrap();
    let count = |y: i32| years.iter().filter(|v| **v == Some(y)).count();
    assert_eq!(
        (count(2018), count(2019), count(2020), count(2021)),
        (5, 1, 2, 1)
    );
}

#[test]
fn test_renamed_headers_are_stacked_into_one_table() {
    let (_temp_dir, snapshot, _stats) = build();

    let years = int_values(&snapshot.quarterly, "t", YEAR).unwrap();
    let gallons = float_values(&snapshot.quarterly, "t", GALLONS).unwrap();
    let suitability = text_values(&snapshot.quarterly, "t", SUITABILITY).unwrap();
    let source_name = text_values(&snapshot.quarterly, "t", WATER_SOURCE_NAME).unwrap();

    let row = years.iter().position(|y| *y == Some(2021)).unwrap();
    assert_eq!(gallons[row], Some(420.0));
    // columns the 2021 extract lacks arrive as nulls
    assert_eq!(suitability[row].as_deref(), Some("no_untreated"));
    assert_eq!(source_name[row], None);
}

#[test]
fn test_registry_and_location_join() {
    let (_temp_dir, snapshot, stats) = build();

    assert_eq!(
        texts_for(&snapshot.quarterly, WELL_A, OPERATOR_NAME)[0].as_deref(),
        Some("Acme Oil")
    );
    assert_eq!(
        texts_for(&snapshot.quarterly, WELL_A, FIELD_NAME)[0].as_deref(),
        Some("Midway-Sunset")
    );
    // registered but not in the location cache
    assert_eq!(texts_for(&snapshot.quarterly, WELL_C, FIELD_NAME), vec![None]);
    assert_eq!(
        texts_for(&snapshot.quarterly, WELL_C, COUNTY_NAME)[0].as_deref(),
        Some("Kern")
    );

    // not registered at all
    assert_eq!(stats.quarterly_unmatched, 1);
    assert_eq!(stats.monthly_unmatched, 0);
    assert_eq!(texts_for(&snapshot.quarterly, WELL_E, OPERATOR_NAME), vec![None]);

    let api10 = texts_for(&snapshot.wells, WELL_A, API10);
    assert!(api10.iter().all(|v| v.as_deref() == Some("0403000001")));
}

#[test]
fn test_codes_are_normalized() {
    let (_temp_dir, snapshot, _stats) = build();

    let names = texts_for(&snapshot.quarterly, WELL_B, WATER_SOURCE_NAME);
    assert_eq!(names, vec![Some("California Aqueduct".to_string())]);
    let labels = texts_for(&snapshot.quarterly, WELL_E, WATER_SOURCE_LABEL);
    assert_eq!(labels, vec![Some(water_source::GROUND.to_string())]);
    let buckets = texts_for(&snapshot.quarterly, WELL_E, COUNTY_BUCKET);
    assert_eq!(buckets, vec![Some("Other".to_string())]);

    let kinds = text_values(&snapshot.monthly, "t", WATER_KIND_LABEL).unwrap();
    assert!(kinds.iter().all(|k| k.as_deref() == Some("Water")));
    let pressure = float_values(&snapshot.monthly, "t", PRESSURE_PSI).unwrap();
    assert_eq!(pressure.iter().flatten().count(), 1);
}

#[test]
fn test_suitable_volume_by_county() {
    let (_temp_dir, snapshot, _stats) = build();

    let filter = Filter::injection().with_suitability(Suitability::Yes);
    let dims = [Dimension::CountyBucket];
    let groups = aggregate(&snapshot.quarterly, &filter, &dims).unwrap();
    let table = LongTable::from_groups("t", &dims, PercentOf::Total, groups);

    assert_eq!(table.find(&["Kern"]).unwrap().gallons, 4200.0);
    assert_eq!(table.find(&["Other"]).unwrap().gallons, 42.0);
    assert_eq!(table.total(), 4242.0);
    assert_eq!(table.find(&["Kern"]).unwrap().rounded_percent(), 99.01);
}
