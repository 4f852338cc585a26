//! Column-name utilities: substring renames, wave prefixes, anonymization.

use polars::prelude::DataFrame;
use tracing::debug;

use panel_model::{ColumnRename, Result};

/// Apply every substring replacement to every column name, in order.
pub fn rename_substrings(df: &DataFrame, renames: &[ColumnRename]) -> Result<DataFrame> {
    if renames.is_empty() {
        return Ok(df.clone());
    }
    let mut changed = 0usize;
    let names: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|name| {
            let mut renamed = name.to_string();
            for rename in renames {
                if !rename.from.is_empty() {
                    renamed = renamed.replace(&rename.from, &rename.to);
                }
            }
            if renamed != name.as_str() {
                changed += 1;
            }
            renamed
        })
        .collect();
    let mut out = df.clone();
    out.set_column_names(names)?;
    debug!(renamed = changed, "renamed columns");
    Ok(out)
}

/// Prefix every column name with `<prefix>_`.
pub fn add_prefix(df: &DataFrame, prefix: &str) -> Result<DataFrame> {
    let names: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|name| format!("{prefix}_{name}"))
        .collect();
    let mut out = df.clone();
    out.set_column_names(names)?;
    Ok(out)
}

/// Drop identifying columns, matched bare or with one of the wave prefixes.
pub fn drop_anonymized(df: &DataFrame, columns: &[String], prefixes: &[&str]) -> Result<DataFrame> {
    let is_identifying = |name: &str| {
        columns.iter().any(|column| {
            name == column
                || prefixes.iter().any(|prefix| {
                    name.strip_prefix(prefix)
                        .and_then(|rest| rest.strip_prefix('_'))
                        .is_some_and(|rest| rest == column)
                })
        })
    };
    let keep: Vec<String> = df
        .get_column_names()
        .iter()
        .filter(|name| !is_identifying(name.as_str()))
        .map(|name| name.to_string())
        .collect();
    let dropped = df.width() - keep.len();
    let out = df.select(keep)?;
    debug!(dropped, "dropped identifying columns");
    Ok(out)
}

#[cfg(test)]
mod tests {
    use polars::prelude::{Column, DataFrame};

    use super::*;

    fn frame(names: &[&str]) -> DataFrame {
        let columns: Vec<Column> = names
            .iter()
            .map(|name| Column::new((*name).into(), vec!["x"]))
            .collect();
        DataFrame::new(columns).unwrap()
    }

    fn names(df: &DataFrame) -> Vec<String> {
        df.get_column_names()
            .iter()
            .map(|name| name.to_string())
            .collect()
    }

    #[test]
    fn test_rename_substrings() {
        let df = frame(&["municipality_1", "municipality_2", "id"]);
        let renamed = rename_substrings(
            &df,
            &[ColumnRename {
                from: "municipality".to_string(),
                to: "benefits".to_string(),
            }],
        )
        .unwrap();
        assert_eq!(names(&renamed), vec!["benefits_1", "benefits_2", "id"]);
    }

    #[test]
    fn test_add_prefix() {
        let df = frame(&["id", "age"]);
        assert_eq!(names(&add_prefix(&df, "S1").unwrap()), vec!["S1_id", "S1_age"]);
    }

    #[test]
    fn test_drop_anonymized() {
        let df = frame(&["S1_IPAddress", "IPAddress", "S2_Status", "S1_id", "S3_Status"]);
        let anonymized = drop_anonymized(
            &df,
            &["IPAddress".to_string(), "Status".to_string()],
            &["S1", "S2"],
        )
        .unwrap();
        assert_eq!(names(&anonymized), vec!["S1_id", "S3_Status"]);
    }
}
