//! Aggregation and reporting.
//!
//! A report is a [`Query`]: a [`Filter`] over one snapshot table, a set of
//! grouping [`Dimension`]s summed in gallons, an optional pivot into wide
//! form and a percentage basis. Filtering and summing run as a polars lazy
//! plan; percentages and reshaping are computed from the unrounded sums.

pub mod catalog;
pub mod table;


pub use catalog::{catalog, find_query};
pub use table::{GroupSum, LongRow, LongTable, ReportTable, WideRow, WideTable};

use crate::constants::MISSING_KEY_LABEL;
use crate::constants::columns::{
    COUNTY_BUCKET, GALLONS, IS_DISPOSAL, IS_OFFSHORE, OPERATOR_NAME, SUITABILITY, WATER_SOURCE_LABEL,
    WATER_SOURCE_NAME, YEAR,
};
use crate::error::Result;
use crate::models::{Snapshot, Suitability};
use crate::schema::{float_values, text_values};

use polars::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Grouping keys available to reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dimension {
    CountyBucket,
    Year,
    Operator,
    WaterSource,
    Suitability,
    /// Consolidated free-text source name
    SourceName,
}

impl Dimension {
    pub fn column(&self) -> &'static str {
        match self {
            Dimension::CountyBucket => COUNTY_BUCKET,
            Dimension::Year => YEAR,
            Dimension::Operator => OPERATOR_NAME,
            Dimension::WaterSource => WATER_SOURCE_LABEL,
            Dimension::Suitability => SUITABILITY,
            Dimension::SourceName => WATER_SOURCE_NAME,
        }
    }

    /// Column header in rendered tables
    pub fn header(&self) -> &'static str {
        match self {
            Dimension::CountyBucket => "county",
            Dimension::Year => "year",
            Dimension::Operator => "operator",
            Dimension::WaterSource => "water_source",
            Dimension::Suitability => "suitability",
            Dimension::SourceName => "source_name",
        }
    }
}

/// Row predicate applied before grouping
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    pub exclude_offshore: bool,
    pub exclude_disposal: bool,
    pub water_source: Option<String>,
    pub suitability: Option<Suitability>,
}

impl Filter {
    /// Onshore injection for extraction: offshore and disposal wells removed
    pub fn injection() -> Self {
        Self {
            exclude_offshore: true,
            exclude_disposal: true,
            ..Default::default()
        }
    }

    pub fn with_water_source(mut self, label: impl Into<String>) -> Self {
        self.water_source = Some(label.into());
        self
    }

    pub fn with_suitability(mut self, suitability: Suitability) -> Self {
        self.suitability = Some(suitability);
        self
    }

    pub fn to_expr(&self) -> Expr {
        let mut predicate = lit(true);
        if self.exclude_offshore {
            predicate = predicate.and(col(IS_OFFSHORE).not());
        }
        if self.exclude_disposal {
            predicate = predicate.and(col(IS_DISPOSAL).not());
        }
        if let Some(label) = &self.water_source {
            predicate = predicate.and(col(WATER_SOURCE_LABEL).eq(lit(label.clone())));
        }
        if let Some(suitability) = self.suitability {
            predicate = predicate.and(col(SUITABILITY).eq(lit(suitability.label())));
        }
        predicate
    }
}

/// What a percentage is a share of
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PercentOf {
    /// The filtered grand total
    Total,
    /// The total of rows sharing this dimension's value
    Within(Dimension),
}

/// Snapshot table a query reads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportSource {
    Quarterly,
    Monthly,
}

impl ReportSource {
    pub fn table<'a>(&self, snapshot: &'a Snapshot) -> &'a DataFrame {
        match self {
            ReportSource::Quarterly => &snapshot.quarterly,
            ReportSource::Monthly => &snapshot.monthly,
        }
    }
}

/// A named summary table
#[derive(Debug, Clone)]
pub struct Query {
    pub name: &'static str,
    pub title: &'static str,
    pub source: ReportSource,
    pub filter: Filter,
    pub group_by: Vec<Dimension>,
    /// Pivot dimension; must also appear in `group_by`
    pub pivot: Option<Dimension>,
    pub percent_of: PercentOf,
}

/// Sum gallons over `filter`, grouped by `dimensions`.
///
/// Null volumes are skipped by the sum. Null keys are reported as
/// `Missing`. With no dimensions a single row holds the filtered total.
pub fn aggregate(table: &DataFrame, filter: &Filter, dimensions: &[Dimension]) -> Result<Vec<GroupSum>> {
    let total = col(GALLONS).sum().alias(GALLONS);
    let filtered = table.clone().lazy().filter(filter.to_expr());

    let plan = if dimensions.is_empty() {
        filtered.select([total])
    } else {
        let keys: Vec<Expr> = dimensions.iter().map(|d| col(d.column())).collect();
        filtered.group_by(keys).agg([total])
    };
    let grouped = plan.collect()?;

    let key_columns = dimensions
        .iter()
        .map(|d| text_values(&grouped, "aggregate", d.column()))
        .collect::<Result<Vec<_>>>()?;
    let gallons = float_values(&grouped, "aggregate", GALLONS)?;

    let mut rows: Vec<GroupSum> = gallons
        .into_iter()
        .enumerate()
        .map(|(i, sum)| GroupSum {
            keys: key_columns
                .iter()
                .map(|c| c[i].clone().unwrap_or_else(|| MISSING_KEY_LABEL.to_string()))
                .collect(),
            gallons: sum.unwrap_or(0.0),
        })
        .collect();
    rows.sort_by(|a, b| a.keys.cmp(&b.keys));

    debug!(
        "Aggregated {} rows into {} groups by {:?}",
        table.height(),
        rows.len(),
        dimensions
    );
    Ok(rows)
}

/// Run one query against the snapshot
pub fn run_query(snapshot: &Snapshot, query: &Query) -> Result<ReportTable> {
    let groups = aggregate(query.source.table(snapshot), &query.filter, &query.group_by)?;

    let table = match query.pivot {
        Some(pivot) => ReportTable::Wide(WideTable::from_groups(
            query.title,
            &query.group_by,
            pivot,
            query.percent_of,
            &groups,
        )),
        None => ReportTable::Long(LongTable::from_groups(
            query.title,
            &query.group_by,
            query.percent_of,
            groups,
        )),
    };
    Ok(table)
}

/// Write `df` as `<dir>/<name>.csv`, creating `dir` if needed
pub fn write_csv(dir: &Path, name: &str, df: &mut DataFrame) -> Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(format!("{}.csv", name));
    let file = fs::File::create(&path)?;
    CsvWriter::new(file).include_header(true).finish(df)?;
    info!("Exported {} to {}", name, path.display());
    Ok(path)
}

/// Write a rendered table as `<dir>/<name>.csv`
pub fn export_csv(dir: &Path, name: &str, table: &ReportTable) -> Result<PathBuf> {
    let mut df = table.to_dataframe()?;
    write_csv(dir, name, &mut df)
}
