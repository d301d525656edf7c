//! Named analysis queries.

use super::{Dimension, Filter, PercentOf, Query, ReportSource};
use crate::constants::water_source;
use crate::error::{PipelineError, Result};
use crate::models::Suitability;

/// Every query the `report` command knows, in presentation order
pub fn catalog() -> Vec<Query> {
    let suitable = Filter::injection().with_suitability(Suitability::Yes);

    vec![
        Query {
            name: "total_by_year",
            title: "Water injected for extraction by year",
            source: ReportSource::Quarterly,
            filter: Filter::injection(),
            group_by: vec![Dimension::Year],
            pivot: None,
            percent_of: PercentOf::Total,
        },
        Query {
            name: "suitability_by_year",
            title: "Injected water by suitability and year",
            source: ReportSource::Quarterly,
            filter: Filter::injection(),
            group_by: vec![Dimension::Year, Dimension::Suitability],
            pivot: Some(Dimension::Suitability),
            percent_of: PercentOf::Within(Dimension::Year),
        },
        Query {
            name: "suitable_by_county",
            title: "Suitable water injected by county",
            source: ReportSource::Quarterly,
            filter: suitable.clone(),
            group_by: vec![Dimension::CountyBucket],
            pivot: None,
            percent_of: PercentOf::Total,
        },
        Query {
            name: "suitable_by_county_year",
            title: "Suitable water injected by county and year",
            source: ReportSource::Quarterly,
            filter: suitable.clone(),
            group_by: vec![Dimension::Year, Dimension::CountyBucket],
            pivot: Some(Dimension::CountyBucket),
            percent_of: PercentOf::Within(Dimension::Year),
        },
        Query {
            name: "source_by_year",
            title: "Injected water by source and year",
            source: ReportSource::Quarterly,
            filter: Filter::injection(),
            group_by: vec![Dimension::WaterSource, Dimension::Year],
            pivot: Some(Dimension::Year),
            percent_of: PercentOf::Within(Dimension::WaterSource),
        },
        Query {
            name: "suitable_source_by_year",
            title: "Suitable water by source, share of each year",
            source: ReportSource::Quarterly,
            filter: suitable.clone(),
            group_by: vec![Dimension::Year, Dimension::WaterSource],
            pivot: None,
            percent_of: PercentOf::Within(Dimension::Year),
        },
        Query {
            name: "suitable_by_operator",
            title: "Suitable water injected by operator",
            source: ReportSource::Quarterly,
            filter: suitable,
            group_by: vec![Dimension::Operator],
            pivot: None,
            percent_of: PercentOf::Total,
        },
        Query {
            name: "domestic_source_names",
            title: "Named sources of domestic water",
            source: ReportSource::Quarterly,
            filter: Filter::injection().with_water_source(water_source::DOMESTIC),
            group_by: vec![Dimension::SourceName],
            pivot: None,
            percent_of: PercentOf::Total,
        },
        Query {
            name: "monthly_source_by_year",
            title: "Monthly-reported injection by source and year",
            source: ReportSource::Monthly,
            filter: Filter::injection(),
            group_by: vec![Dimension::WaterSource, Dimension::Year],
            pivot: Some(Dimension::Year),
            percent_of: PercentOf::Within(Dimension::WaterSource),
        },
    ]
}

pub fn find_query(name: &str) -> Result<Query> {
    catalog()
        .into_iter()
        .find(|q| q.name == name)
        .ok_or_else(|| PipelineError::UnknownReport {
            name: name.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_catalog_names_are_unique() {
        let queries = catalog();
        let names: HashSet<_> = queries.iter().map(|q| q.name).collect();
        assert_eq!(names.len(), queries.len());
    }

    #[test]
    fn test_pivot_is_a_grouping_dimension() {
        for query in catalog() {
            if let Some(pivot) = query.pivot {
                assert!(query.group_by.contains(&pivot), "{}", query.name);
            }
            if let PercentOf::Within(dim) = query.percent_of {
                assert!(query.group_by.contains(&dim), "{}", query.name);
            }
        }
    }

    #[test]
    fn test_pivoted_percentages_are_shares_of_the_row() {
        for query in catalog() {
            let Some(pivot) = query.pivot else { continue };
            let rows: Vec<_> = query.group_by.iter().filter(|d| **d != pivot).collect();
            assert_eq!(rows.len(), 1, "{}", query.name);
            assert_eq!(query.percent_of, PercentOf::Within(*rows[0]), "{}", query.name);
        }
    }

    #[test]
    fn test_find_query() {
        assert_eq!(find_query("suitable_by_county").unwrap().name, "suitable_by_county");
        assert!(matches!(
            find_query("nope"),
            Err(PipelineError::UnknownReport { .. })
        ));
    }
}
