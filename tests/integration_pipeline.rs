//! End-to-end: extracts on disk -> snapshot -> reports and crosscheck

use injection_water::constants::YEARS;
use injection_water::crosscheck::{self, FlagRule};
use injection_water::report::{self, ReportTable};
use injection_water::{PipelineConfig, Pipeline, RecordKind, Snapshot};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const KERN_WELL: &str = "0403012345";
const VENTURA_WELL: &str = "0411154321";
const DISPOSAL_WELL: &str = "0403099999";

fn write(path: &Path, contents: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

/// Suitable water example: Kern 100 bbl suitable and 50 bbl untreated,
/// Ventura 1 bbl suitable, in 2018; a disposal well reports domestic water
/// quarterly and produced water monthly in 2020 Q1.
fn write_extracts(data_dir: &Path) {
    for year in YEARS.iter().copied() {
        let quarterly = match year {
            2018 => format!(
                "API,Report Date,Water Source,Volume Injected,Suitable Flag,Filtration,Well Type\n\
                 {KERN_WELL},2018-03-31,2,100,Y,N,WF\n\
                 {KERN_WELL},2018-06-30,1,50,N,N,WF\n\
                 {VENTURA_WELL},2018-03-31,2,1,Y,N,WF\n"
            ),
            2020 => format!(
                "API,Report Date,Water Source,Volume Injected,Suitable Flag,Filtration,Well Type\n\
                 {DISPOSAL_WELL},2020-03-31,2,10,Y,N,WD\n"
            ),
            _ => "API,Report Date,Water Source,Volume Injected,Suitable Flag,Filtration,Well Type\n"
                .to_string(),
        };
        let monthly = match year {
            2020 => format!(
                "API,Injection Date,Water Source,Volume Injected,Well Type\n\
                 {DISPOSAL_WELL},2020-02-29,1,10,WD\n"
            ),
            _ => "API,Injection Date,Water Source,Volume Injected,Well Type\n".to_string(),
        };
        let registry = format!(
            "API,Operator,County\n\
             {KERN_WELL},Acme Oil,Kern\n\
             {VENTURA_WELL},Basin Energy,Ventura\n\
             {DISPOSAL_WELL},Acme Oil,Kern\n"
        );

        write(&RecordKind::QuarterlyInjection.extract_path(data_dir, year), &quarterly);
        write(&RecordKind::MonthlyInjection.extract_path(data_dir, year), &monthly);
        write(&RecordKind::WellRegistry.extract_path(data_dir, year), &registry);
    }
    write(
        &data_dir.join("well_locations.csv"),
        &format!("api10,latitude,longitude\n{KERN_WELL},35.3,-119.6\n"),
    );
}

fn build_and_load(temp_dir: &TempDir) -> (PipelineConfig, Snapshot) {
    let data_dir = temp_dir.path().join("data");
    write_extracts(&data_dir);
    let config = PipelineConfig::default()
        .with_data_dir(&data_dir)
        .with_snapshot_dir(temp_dir.path().join("snapshot"))
        .with_export_dir(temp_dir.path().join("out"));

    Pipeline::new(config.clone()).run().unwrap();
    let snapshot = Snapshot::load(&config.snapshot_dir).unwrap();
    (config, snapshot)
}

#[test]
fn test_suitable_by_county_end_to_end() {
    let temp_dir = TempDir::new().unwrap();
    let (_config, snapshot) = build_and_load(&temp_dir);

    let query = report::find_query("suitable_by_county").unwrap();
    let ReportTable::Long(table) = report::run_query(&snapshot, &query).unwrap() else {
        panic!("expected a long table");
    };

    assert_eq!(table.find(&["Kern"]).unwrap().gallons, 4200.0);
    assert_eq!(table.find(&["Other"]).unwrap().gallons, 42.0);
    assert_eq!(table.total(), 4242.0);
    assert_eq!(table.find(&["Kern"]).unwrap().rounded_percent(), 99.01);
}

#[test]
fn test_every_catalog_report_renders_and_exports() {
    let temp_dir = TempDir::new().unwrap();
    let (config, snapshot) = build_and_load(&temp_dir);
    let export_dir = config.export_dir.unwrap();

    for query in report::catalog() {
        let table = report::run_query(&snapshot, &query).unwrap();
        let df = table.to_dataframe().unwrap();
        assert!(df.width() >= 2, "{}", query.name);

        let path = report::export_csv(&export_dir, query.name, &table).unwrap();
        assert!(path.is_file());
    }
}

#[test]
fn test_crosscheck_surfaces_source_mismatch() {
    let temp_dir = TempDir::new().unwrap();
    let (_config, snapshot) = build_and_load(&temp_dir);

    let rows = crosscheck::crosscheck(&snapshot, &FlagRule::default()).unwrap();
    assert_eq!(rows.len(), 1);

    let row = &rows[0];
    assert_eq!(row.api_number, DISPOSAL_WELL);
    assert_eq!((row.year, row.quarter), (2020, 1));
    assert_eq!(row.monthly_bbl, Some(10.0));
    assert!(row.volume_matches);
    assert!(!row.source_matches);
    assert_eq!(row.quarterly_sources, vec!["Domestic Water"]);
    assert_eq!(row.monthly_sources, vec!["Produced Water"]);
}
