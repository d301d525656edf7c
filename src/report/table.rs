//! Long and wide summary tables.
//!
//! Percentages are always derived from the unrounded gallon sums; rounding
//! happens only in [`round_percent`] when a table is rendered.

use super::{Dimension, PercentOf};
use crate::constants::PERCENT_DECIMALS;
use crate::error::Result;

use polars::prelude::*;
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// One group of an aggregation, keys in dimension order
#[derive(Debug, Clone, PartialEq)]
pub struct GroupSum {
    pub keys: Vec<String>,
    pub gallons: f64,
}

pub fn round_percent(value: f64) -> f64 {
    let scale = 10f64.powi(PERCENT_DECIMALS);
    (value * scale).round() / scale
}

fn share(part: f64, whole: f64) -> f64 {
    if whole == 0.0 { 0.0 } else { part / whole * 100.0 }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LongRow {
    pub keys: Vec<String>,
    pub gallons: f64,
    /// Unrounded share of the row's percentage basis
    pub percent: f64,
}

impl LongRow {
    pub fn rounded_percent(&self) -> f64 {
        round_percent(self.percent)
    }
}

/// Grouped sums, one row per group
#[derive(Debug, Clone)]
pub struct LongTable {
    pub title: String,
    pub dimensions: Vec<Dimension>,
    pub rows: Vec<LongRow>,
}

impl LongTable {
    pub fn from_groups(
        title: &str,
        dimensions: &[Dimension],
        percent_of: PercentOf,
        groups: Vec<GroupSum>,
    ) -> Self {
        let basis_index = match percent_of {
            PercentOf::Total => None,
            PercentOf::Within(dim) => dimensions.iter().position(|d| *d == dim),
        };

        let mut basis: HashMap<Option<String>, f64> = HashMap::new();
        for group in &groups {
            let key = basis_index.map(|i| group.keys[i].clone());
            *basis.entry(key).or_insert(0.0) += group.gallons;
        }

        let rows = groups
            .into_iter()
            .map(|group| {
                let key = basis_index.map(|i| group.keys[i].clone());
                let whole = basis.get(&key).copied().unwrap_or(0.0);
                LongRow {
                    percent: share(group.gallons, whole),
                    keys: group.keys,
                    gallons: group.gallons,
                }
            })
            .collect();

        Self {
            title: title.to_string(),
            dimensions: dimensions.to_vec(),
            rows,
        }
    }

    pub fn total(&self) -> f64 {
        self.rows.iter().map(|r| r.gallons).sum()
    }

    pub fn find(&self, keys: &[&str]) -> Option<&LongRow> {
        self.rows
            .iter()
            .find(|r| r.keys.iter().map(String::as_str).eq(keys.iter().copied()))
    }

    pub fn to_dataframe(&self) -> Result<DataFrame> {
        let mut columns: Vec<Column> = self
            .dimensions
            .iter()
            .enumerate()
            .map(|(i, dim)| {
                let values: Vec<&str> = self.rows.iter().map(|r| r.keys[i].as_str()).collect();
                Column::new(dim.header().into(), values)
            })
            .collect();
        let gallons: Vec<f64> = self.rows.iter().map(|r| r.gallons).collect();
        let percent: Vec<f64> = self.rows.iter().map(|r| r.rounded_percent()).collect();
        columns.push(Column::new("gallons".into(), gallons));
        columns.push(Column::new("percent".into(), percent));
        Ok(DataFrame::new(columns)?)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WideRow {
    pub keys: Vec<String>,
    /// Gallons per pivot column, zero where no records matched
    pub cells: Vec<f64>,
    /// Unrounded share of the table's percentage basis, per cell
    pub percents: Vec<f64>,
}

impl WideRow {
    pub fn total(&self) -> f64 {
        self.cells.iter().sum()
    }

    pub fn percent(&self, index: usize) -> f64 {
        self.percents[index]
    }
}

/// Grouped sums reshaped with one column per pivot value
#[derive(Debug, Clone)]
pub struct WideTable {
    pub title: String,
    pub row_dimensions: Vec<Dimension>,
    pub pivot: Dimension,
    pub columns: Vec<String>,
    pub rows: Vec<WideRow>,
}

impl WideTable {
    /// Reshape long groups keyed by `dimensions` on the `pivot` dimension.
    ///
    /// Cells with no matching group are zero: absence means no volume.
    /// `percent_of` picks the basis of every cell percentage: the grand
    /// total, the rows sharing a row dimension value, or the pivot column.
    pub fn from_groups(
        title: &str,
        dimensions: &[Dimension],
        pivot: Dimension,
        percent_of: PercentOf,
        groups: &[GroupSum],
    ) -> Self {
        let pivot_index = dimensions.iter().position(|d| *d == pivot);
        let row_dimensions: Vec<Dimension> =
            dimensions.iter().copied().filter(|d| *d != pivot).collect();

        let split = |group: &GroupSum| -> (Vec<String>, String) {
            match pivot_index {
                Some(p) => {
                    let mut keys = group.keys.clone();
                    let value = keys.remove(p);
                    (keys, value)
                }
                None => (group.keys.clone(), pivot.header().to_string()),
            }
        };

        let columns: Vec<String> = groups
            .iter()
            .map(|g| split(g).1)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let mut rows: BTreeMap<Vec<String>, Vec<f64>> = BTreeMap::new();
        for group in groups {
            let (keys, value) = split(group);
            let cells = rows.entry(keys).or_insert_with(|| vec![0.0; columns.len()]);
            if let Ok(i) = columns.binary_search(&value) {
                cells[i] += group.gallons;
            }
        }

        let grand_total: f64 = rows.values().flatten().sum();
        let mut column_totals = vec![0.0; columns.len()];
        for cells in rows.values() {
            for (total, cell) in column_totals.iter_mut().zip(cells) {
                *total += cell;
            }
        }
        let row_basis_index = match percent_of {
            PercentOf::Within(dim) if dim != pivot => row_dimensions.iter().position(|d| *d == dim),
            _ => None,
        };
        let mut row_basis: HashMap<String, f64> = HashMap::new();
        if let Some(j) = row_basis_index {
            for (keys, cells) in &rows {
                *row_basis.entry(keys[j].clone()).or_insert(0.0) += cells.iter().sum::<f64>();
            }
        }

        let rows = rows
            .into_iter()
            .map(|(keys, cells)| {
                let percents = cells
                    .iter()
                    .enumerate()
                    .map(|(i, cell)| {
                        let whole = match (percent_of, row_basis_index) {
                            (PercentOf::Within(dim), _) if dim == pivot => column_totals[i],
                            (PercentOf::Within(_), Some(j)) => {
                                row_basis.get(&keys[j]).copied().unwrap_or(0.0)
                            }
                            _ => grand_total,
                        };
                        share(*cell, whole)
                    })
                    .collect();
                WideRow {
                    keys,
                    cells,
                    percents,
                }
            })
            .collect();

        Self {
            title: title.to_string(),
            row_dimensions,
            pivot,
            columns,
            rows,
        }
    }

    pub fn find(&self, keys: &[&str]) -> Option<&WideRow> {
        self.rows
            .iter()
            .find(|r| r.keys.iter().map(String::as_str).eq(keys.iter().copied()))
    }

    #[cfg(test)]
    pub fn column_index(&self, value: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == value)
    }

    pub fn to_dataframe(&self) -> Result<DataFrame> {
        let mut columns: Vec<Column> = self
            .row_dimensions
            .iter()
            .enumerate()
            .map(|(i, dim)| {
                let values: Vec<&str> = self.rows.iter().map(|r| r.keys[i].as_str()).collect();
                Column::new(dim.header().into(), values)
            })
            .collect();

        for (i, name) in self.columns.iter().enumerate() {
            let cells: Vec<f64> = self.rows.iter().map(|r| r.cells[i]).collect();
            columns.push(Column::new(name.as_str().into(), cells));
        }
        let totals: Vec<f64> = self.rows.iter().map(WideRow::total).collect();
        columns.push(Column::new("total".into(), totals));
        for (i, name) in self.columns.iter().enumerate() {
            let percent: Vec<f64> = self
                .rows
                .iter()
                .map(|r| round_percent(r.percents[i]))
                .collect();
            columns.push(Column::new(format!("{} %", name).into(), percent));
        }

        Ok(DataFrame::new(columns)?)
    }
}

/// A rendered report
#[derive(Debug, Clone)]
pub enum ReportTable {
    Long(LongTable),
    Wide(WideTable),
}

impl ReportTable {
    pub fn title(&self) -> &str {
        match self {
            ReportTable::Long(t) => &t.title,
            ReportTable::Wide(t) => &t.title,
        }
    }

    pub fn to_dataframe(&self) -> Result<DataFrame> {
        match self {
            ReportTable::Long(t) => t.to_dataframe(),
            ReportTable::Wide(t) => t.to_dataframe(),
        }
    }
}
