//! Sample composition against census margins.

use std::collections::BTreeMap;

use polars::prelude::DataFrame;
use serde::Serialize;

use panel_common::column_strings;
use panel_model::{PanelError, PopulationMargin, Result};

/// One category of an observed distribution.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryShare {
    pub category: String,
    pub count: usize,
    /// Share of non-missing answers, in percent, rounded to one decimal.
    pub percent: f64,
}

/// Expected count of one category under the census margin.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExpectedCount {
    pub category: String,
    pub share: f64,
    pub expected: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarginTable {
    pub column: String,
    pub rows: Vec<ExpectedCount>,
}

fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Counts and percentages per category over the non-missing values of a column.
///
/// Categories are sorted by label.
pub fn distribution(df: &DataFrame, column: &str) -> Result<Vec<CategoryShare>> {
    let values = column_strings(df, column).ok_or_else(|| PanelError::MissingColumn {
        column: column.to_string(),
    })?;
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for value in values.into_iter().flatten() {
        *counts.entry(value).or_default() += 1;
    }
    let total: usize = counts.values().sum();
    Ok(counts
        .into_iter()
        .map(|(category, count)| CategoryShare {
            percent: round_one_decimal(100.0 * count as f64 / total as f64),
            category,
            count,
        })
        .collect())
}

/// Expected counts per category for a sample of `sample_size` respondents.
pub fn population_margins(margins: &[PopulationMargin], sample_size: usize) -> Vec<MarginTable> {
    margins
        .iter()
        .map(|margin| MarginTable {
            column: margin.column.clone(),
            rows: margin
                .shares
                .iter()
                .map(|(category, share)| ExpectedCount {
                    category: category.clone(),
                    share: *share,
                    expected: share * sample_size as f64,
                })
                .collect(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use polars::prelude::Column;

    use super::*;

    #[test]
    fn test_distribution() {
        let df = DataFrame::new(vec![Column::new(
            "S1_gender".into(),
            vec![Some("Male"), Some("Female"), None, Some("Female")],
        )])
        .unwrap();
        let shares = distribution(&df, "S1_gender").unwrap();
        assert_eq!(
            shares,
            vec![
                CategoryShare {
                    category: "Female".to_string(),
                    count: 2,
                    percent: 66.7
                },
                CategoryShare {
                    category: "Male".to_string(),
                    count: 1,
                    percent: 33.3
                },
            ]
        );
        assert!(distribution(&df, "S1_age").is_err());
    }

    #[test]
    fn test_population_margins() {
        let margins = population_margins(&panel_model::PipelineConfig::default().resolved_margins(), 1000);
        let gender = margins.iter().find(|m| m.column == "S1_gender").unwrap();
        let female = gender.rows.iter().find(|r| r.category == "Female").unwrap();
        assert!((female.expected - 500.2).abs() < 1e-9);
    }
}
