//! Integration tests for the processor module
//!
//! Builds complete extract directories in a temp dir: four years of each
//! record kind plus the location cache.

pub mod build_tests;
pub mod snapshot_tests;

use crate::config::PipelineConfig;
use crate::models::RecordKind;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

pub const WELL_A: &str = "040300000100";
pub const WELL_B: &str = "041110000200";
pub const WELL_C: &str = "040300000300";
pub const WELL_D: &str = "041110000400";
/// Reported but never registered
pub const WELL_E: &str = "049990000500";

const QUARTERLY_HEADER: &str = "API Number,Report Date,Water Injected (BBL),Water Source,Source Name,\
Suitable For Domestic,Filtration,Softening,Reverse Osmosis,Chemical Treatment,Other Treatment,Well Type";
/// Later extracts renamed and dropped columns
const QUARTERLY_HEADER_2021: &str = "APINumber,ReportingDate,WaterInjected,SourceOfWater,WellType";
const MONTHLY_HEADER: &str = "API Number,Injection Date,Water Injected (BBL),Water Source,\
Kind Of Water,Well Type,Injection Pressure,Days Injected";
const REGISTRY_HEADER: &str = "APINumber,OperatorCode,Operator,County";
const LOCATION_HEADER: &str = "API10,Latitude,Longitude,Field";

pub fn write_extract(data_dir: &Path, kind: RecordKind, year: i32, header: &str, rows: &[String]) {
    let path = kind.extract_path(data_dir, year);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    let mut contents = String::from(header);
    for row in rows {
        contents.push('\n');
        contents.push_str(row);
    }
    contents.push('\n');
    fs::write(path, contents).unwrap();
}

fn quarterly_rows(year: i32) -> Vec<String> {
    let mut rows = match year {
        2018 => vec![
            format!("{WELL_A},2018-03-31,100,2,Calif. Aqueduct,Y,N,N,N,N,N,WF"),
            format!("{WELL_A},2018-06-30,50,1,,N,N,N,N,N,N,WF"),
            format!("{WELL_B},3/31/2018,1,2,SWP turnout,Y,N,N,N,N,N,WF"),
            format!("{WELL_D},2018-03-31,1000,2,,Y,N,N,N,N,N,WF"),
            format!("{WELL_C},2018-03-31,10,2,,Y,N,N,N,N,N,WD"),
        ],
        2021 => vec![format!("{WELL_A},2021-03-31,10,1,WF")],
        _ => vec![format!("{WELL_A},{year}-03-31,10,1,,N,Y,N,N,N,N,WF")],
    };
    if year == 2018 {
        // exact duplicate of the first row
        rows.push(rows[0].clone());
    }
    if year == 2020 {
        rows.push(format!("{WELL_E},2020-09-30,3,4,,N,N,N,N,N,N,WF"));
    }
    rows
}

fn monthly_rows(year: i32) -> Vec<String> {
    match year {
        2018 => vec![
            format!("{WELL_C},2018-02-15,10,1,W,WD,500,28"),
            format!("{WELL_A},2018-01-31,33,1,W,WF,,"),
        ],
        _ => vec![format!("{WELL_A},{year}-01-31,5,1,W,WF,,")],
    }
}

pub fn registry_rows() -> Vec<String> {
    vec![
        format!("{WELL_A},A100,Acme Oil,Kern"),
        format!("{WELL_B},B200,Basin Energy,Ventura"),
        format!("{WELL_C},A100,Acme Oil,Kern"),
        format!("{WELL_D},B200,Basin Energy,Ventura Offshore"),
    ]
}

/// Write every extract and the location cache under `root`
pub fn write_dataset(root: &Path) -> PipelineConfig {
    let data_dir = root.join("data");

    for year in crate::constants::YEARS.iter().copied() {
        let header = if year == 2021 {
            QUARTERLY_HEADER_2021
        } else {
            QUARTERLY_HEADER
        };
        write_extract(
            &data_dir,
            RecordKind::QuarterlyInjection,
            year,
            header,
            &quarterly_rows(year),
        );
        write_extract(
            &data_dir,
            RecordKind::MonthlyInjection,
            year,
            MONTHLY_HEADER,
            &monthly_rows(year),
        );

        let mut registry = registry_rows();
        if year == 2018 {
            registry.push(registry[0].clone());
        }
        write_extract(&data_dir, RecordKind::WellRegistry, year, REGISTRY_HEADER, &registry);
    }

    let locations = format!(
        "{LOCATION_HEADER}\n0403000001,35.21,-119.45,Midway-Sunset\n0411100002,34.40,-119.10,\n"
    );
    fs::write(data_dir.join("well_locations.csv"), locations).unwrap();

    PipelineConfig::default()
        .with_data_dir(&data_dir)
        .with_snapshot_dir(root.join("snapshot"))
}

/// A temp dir holding a complete dataset
pub fn dataset() -> (TempDir, PipelineConfig) {
    let temp_dir = TempDir::new().unwrap();
    let config = write_dataset(temp_dir.path());
    (temp_dir, config)
}
