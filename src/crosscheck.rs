//! Quarterly versus monthly consistency check.
//!
//! Quarterly records matching a [`FlagRule`] are reduced to their
//! (api_number, year, quarter) keys. Both tables are then semi-joined on
//! those keys, so each side holds every record of a flagged well-quarter,
//! flagged or not, and each key's volume and source labels are laid side
//! by side. Nothing is corrected: disagreements are only reported.

use crate::constants::columns::{
    API_NUMBER, IS_DISPOSAL, QUARTER, SUITABILITY, VOLUME_BBL, WATER_SOURCE_LABEL, YEAR,
};
use crate::constants::water_source;
use crate::error::Result;
use crate::models::{Snapshot, Suitability};
use crate::schema::{float_values, int_values, text_values};

use polars::prelude::*;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{info, warn};

/// Barrel totals closer than this are considered equal
const VOLUME_TOLERANCE_BBL: f64 = 1e-6;

/// Predicate selecting suspicious quarterly records
#[derive(Debug, Clone, PartialEq)]
pub struct FlagRule {
    pub disposal_only: bool,
    pub water_source: Option<String>,
    pub suitability: Option<Suitability>,
}

impl Default for FlagRule {
    /// Fresh domestic water reported as going into a disposal well
    fn default() -> Self {
        Self {
            disposal_only: true,
            water_source: Some(water_source::DOMESTIC.to_string()),
            suitability: Some(Suitability::Yes),
        }
    }
}

impl FlagRule {
    pub fn to_expr(&self) -> Expr {
        let mut predicate = lit(true);
        if self.disposal_only {
            predicate = predicate.and(col(IS_DISPOSAL));
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

fn key_exprs() -> [Expr; 3] {
    [col(API_NUMBER), col(YEAR), col(QUARTER)]
}

/// Flagged quarterly rows with a usable quarter
pub fn flagged_rows(quarterly: &DataFrame, rule: &FlagRule) -> Result<DataFrame> {
    let flagged = quarterly
        .clone()
        .lazy()
        .filter(rule.to_expr())
        .filter(col(QUARTER).is_not_null())
        .collect()?;
    Ok(flagged)
}

/// Distinct (api_number, year, quarter) keys of flagged quarterly rows
pub fn flagged_keys(quarterly: &DataFrame, rule: &FlagRule) -> Result<DataFrame> {
    let keys = flagged_rows(quarterly, rule)?
        .lazy()
        .select(key_exprs())
        .collect()?
        .unique_stable(None, UniqueKeepStrategy::First, None)?;
    Ok(keys)
}

/// Rows of `table` sharing a key with `keys`
pub fn rows_for_keys(table: &DataFrame, keys: &DataFrame) -> Result<DataFrame> {
    let matched = table
        .clone()
        .lazy()
        .join(
            keys.clone().lazy(),
            key_exprs(),
            key_exprs(),
            JoinArgs::new(JoinType::Semi),
        )
        .collect()?;
    Ok(matched)
}

#[derive(Debug, Default)]
struct Side {
    barrels: f64,
    sources: BTreeSet<String>,
}

type Key = (String, i32, i32);

fn collect_sides(df: &DataFrame, table: &str) -> Result<BTreeMap<Key, Side>> {
    let apis = text_values(df, table, API_NUMBER)?;
    let years = int_values(df, table, YEAR)?;
    let quarters = int_values(df, table, QUARTER)?;
    let barrels = float_values(df, table, VOLUME_BBL)?;
    let sources = text_values(df, table, WATER_SOURCE_LABEL)?;

    let mut sides: BTreeMap<Key, Side> = BTreeMap::new();
    for i in 0..df.height() {
        let (Some(api), Some(year), Some(quarter)) = (&apis[i], years[i], quarters[i]) else {
            continue;
        };
        let side = sides.entry((api.clone(), year, quarter)).or_default();
        side.barrels += barrels[i].unwrap_or(0.0);
        if let Some(source) = &sources[i] {
            side.sources.insert(source.clone());
        }
    }
    Ok(sides)
}

/// One flagged well-quarter compared across both reports
#[derive(Debug, Clone, PartialEq)]
pub struct Discrepancy {
    pub api_number: String,
    pub year: i32,
    pub quarter: i32,
    pub quarterly_bbl: f64,
    /// `None` when no monthly record exists for the key
    pub monthly_bbl: Option<f64>,
    pub quarterly_sources: Vec<String>,
    pub monthly_sources: Vec<String>,
    pub volume_matches: bool,
    pub source_matches: bool,
}

impl Discrepancy {
    pub fn is_consistent(&self) -> bool {
        self.volume_matches && self.source_matches
    }
}

/// Compare every flagged quarterly key against the monthly report
pub fn crosscheck(snapshot: &Snapshot, rule: &FlagRule) -> Result<Vec<Discrepancy>> {
    let flagged = flagged_rows(&snapshot.quarterly, rule)?;
    let keys = flagged_keys(&snapshot.quarterly, rule)?;
    let quarterly = rows_for_keys(&snapshot.quarterly, &keys)?;
    let monthly = rows_for_keys(&snapshot.monthly, &keys)?;
    info!(
        "{} flagged quarterly rows over {} well-quarters ({} quarterly, {} monthly rows compared)",
        flagged.height(),
        keys.height(),
        quarterly.height(),
        monthly.height()
    );

    let quarterly_sides = collect_sides(&quarterly, "quarterly")?;
    let mut monthly_sides = collect_sides(&monthly, "monthly")?;

    let rows: Vec<Discrepancy> = quarterly_sides
        .into_iter()
        .map(|((api_number, year, quarter), q)| {
            let m = monthly_sides.remove(&(api_number.clone(), year, quarter));
            let volume_matches = m
                .as_ref()
                .is_some_and(|m| (m.barrels - q.barrels).abs() < VOLUME_TOLERANCE_BBL);
            let source_matches = m.as_ref().is_some_and(|m| m.sources == q.sources);
            Discrepancy {
                api_number,
                year,
                quarter,
                quarterly_bbl: q.barrels,
                monthly_bbl: m.as_ref().map(|m| m.barrels),
                quarterly_sources: q.sources.into_iter().collect(),
                monthly_sources: m.map(|m| m.sources.into_iter().collect()).unwrap_or_default(),
                volume_matches,
                source_matches,
            }
        })
        .collect();

    let inconsistent = rows.iter().filter(|r| !r.is_consistent()).count();
    if inconsistent > 0 {
        warn!(
            "{} of {} flagged well-quarters disagree between quarterly and monthly reports",
            inconsistent,
            rows.len()
        );
    }
    Ok(rows)
}

pub fn to_dataframe(rows: &[Discrepancy]) -> Result<DataFrame> {
    let joined = |sources: &[String]| sources.join("; ");
    let df = DataFrame::new(vec![
        Column::new(
            API_NUMBER.into(),
            rows.iter().map(|r| r.api_number.as_str()).collect::<Vec<_>>(),
        ),
        Column::new(YEAR.into(), rows.iter().map(|r| r.year).collect::<Vec<_>>()),
        Column::new(QUARTER.into(), rows.iter().map(|r| r.quarter).collect::<Vec<_>>()),
        Column::new(
            "quarterly_bbl".into(),
            rows.iter().map(|r| r.quarterly_bbl).collect::<Vec<_>>(),
        ),
        Column::new(
            "monthly_bbl".into(),
            rows.iter().map(|r| r.monthly_bbl).collect::<Vec<_>>(),
        ),
        Column::new(
            "quarterly_sources".into(),
            rows.iter().map(|r| joined(&r.quarterly_sources)).collect::<Vec<_>>(),
        ),
        Column::new(
            "monthly_sources".into(),
            rows.iter().map(|r| joined(&r.monthly_sources)).collect::<Vec<_>>(),
        ),
        Column::new(
            "volume_matches".into(),
            rows.iter().map(|r| r.volume_matches).collect::<Vec<_>>(),
        ),
        Column::new(
            "source_matches".into(),
            rows.iter().map(|r| r.source_matches).collect::<Vec<_>>(),
        ),
    ])?;
    Ok(df)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn injection(
        rows: &[(&str, i32, i32, f64, &str, &str, bool)],
    ) -> DataFrame {
        df!(
            API_NUMBER => rows.iter().map(|r| r.0).collect::<Vec<_>>(),
            YEAR => rows.iter().map(|r| r.1).collect::<Vec<_>>(),
            QUARTER => rows.iter().map(|r| r.2).collect::<Vec<_>>(),
            VOLUME_BBL => rows.iter().map(|r| r.3).collect::<Vec<_>>(),
            WATER_SOURCE_LABEL => rows.iter().map(|r| r.4).collect::<Vec<_>>(),
            SUITABILITY => rows.iter().map(|r| r.5).collect::<Vec<_>>(),
            IS_DISPOSAL => rows.iter().map(|r| r.6).collect::<Vec<_>>(),
        )
        .unwrap()
    }

    fn snapshot() -> Snapshot {
        Snapshot {
            quarterly: injection(&[
                ("X", 2020, 1, 10.0, water_source::DOMESTIC, "yes", true),
                ("Y", 2020, 1, 5.0, water_source::DOMESTIC, "yes", false),
                ("Z", 2021, 3, 7.0, water_source::DOMESTIC, "yes", true),
            ]),
            monthly: injection(&[
                ("X", 2020, 1, 10.0, water_source::PRODUCED, "yes", true),
                ("X", 2020, 2, 99.0, water_source::PRODUCED, "yes", true),
                ("Y", 2020, 1, 5.0, water_source::DOMESTIC, "yes", false),
            ]),
            wells: DataFrame::empty(),
        }
    }

    #[test]
    fn test_flagged_keys_follow_rule() {
        let keys = flagged_keys(&snapshot().quarterly, &FlagRule::default()).unwrap();
        assert_eq!(keys.height(), 2);

        let everything = FlagRule {
            disposal_only: false,
            water_source: None,
            suitability: None,
        };
        assert_eq!(flagged_keys(&snapshot().quarterly, &everything).unwrap().height(), 3);
    }

    #[test]
    fn test_semi_join_keeps_only_matching_quarters() {
        let snapshot = snapshot();
        let keys = flagged_keys(&snapshot.quarterly, &FlagRule::default()).unwrap();
        let matched = rows_for_keys(&snapshot.monthly, &keys).unwrap();
        assert_eq!(matched.height(), 1);
        assert_eq!(matched.width(), snapshot.monthly.width());
    }

    #[test]
    fn test_source_mismatch_with_equal_volume() {
        let rows = crosscheck(&snapshot(), &FlagRule::default()).unwrap();
        let x = rows.iter().find(|r| r.api_number == "X").unwrap();

        assert_eq!((x.year, x.quarter), (2020, 1));
        assert!(x.volume_matches);
        assert!(!x.source_matches);
        assert_eq!(x.quarterly_sources, vec![water_source::DOMESTIC]);
        assert_eq!(x.monthly_sources, vec![water_source::PRODUCED]);
    }

    #[test]
    fn test_unflagged_rows_of_a_flagged_quarter_are_compared() {
        let snapshot = Snapshot {
            quarterly: injection(&[
                ("W", 2019, 2, 10.0, water_source::DOMESTIC, "yes", true),
                ("W", 2019, 2, 90.0, water_source::PRODUCED, "no_untreated", true),
                ("W", 2019, 3, 40.0, water_source::PRODUCED, "no_untreated", true),
            ]),
            monthly: injection(&[
                ("W", 2019, 2, 60.0, water_source::PRODUCED, "no_untreated", true),
                ("W", 2019, 2, 40.0, water_source::PRODUCED, "no_untreated", true),
            ]),
            wells: DataFrame::empty(),
        };

        let rows = crosscheck(&snapshot, &FlagRule::default()).unwrap();
        assert_eq!(rows.len(), 1);
        let w = &rows[0];
        assert_eq!((w.year, w.quarter), (2019, 2));
        assert_eq!(w.quarterly_bbl, 100.0);
        assert_eq!(w.monthly_bbl, Some(100.0));
        assert!(w.volume_matches);
        assert_eq!(
            w.quarterly_sources,
            vec![water_source::DOMESTIC, water_source::PRODUCED]
        );
        assert!(!w.source_matches);
    }

    #[test]
    fn test_missing_monthly_report_is_surfaced() {
        let rows = crosscheck(&snapshot(), &FlagRule::default()).unwrap();
        let z = rows.iter().find(|r| r.api_number == "Z").unwrap();
        assert_eq!(z.monthly_bbl, None);
        assert!(!z.is_consistent());

        let df = to_dataframe(&rows).unwrap();
        assert_eq!(df.height(), 2);
        assert_eq!(df.column("monthly_bbl").unwrap().null_count(), 1);
    }
}
