//! Straightliner filter.

use std::collections::BTreeSet;

use polars::prelude::DataFrame;
use tracing::debug;

use panel_common::column_cell_keys;
use panel_model::StraightlineGroup;

/// Per-group straightlining counts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupCount {
    pub group: String,
    pub columns: usize,
    pub flagged: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StraightlineFlags {
    pub excluded: Vec<bool>,
    pub groups: Vec<GroupCount>,
}

/// Columns belonging to a group, in frame order.
pub fn group_columns(df: &DataFrame, group: &StraightlineGroup) -> Vec<String> {
    df.get_column_names()
        .iter()
        .filter(|name| name.starts_with(group.prefix.as_str()))
        .map(|name| name.to_string())
        .collect()
}

/// Flag respondents whose non-missing answers within any group take exactly
/// one distinct value.
///
/// All-missing rows and groups without columns never flag.
pub fn straightline_flags(df: &DataFrame, groups: &[StraightlineGroup]) -> StraightlineFlags {
    let mut excluded = vec![false; df.height()];
    let mut counts = Vec::with_capacity(groups.len());
    for group in groups {
        let columns: Vec<Vec<Option<String>>> = group_columns(df, group)
            .iter()
            .filter_map(|name| column_cell_keys(df, name))
            .collect();
        let mut flagged = 0usize;
        if !columns.is_empty() {
            for (row, flag) in excluded.iter_mut().enumerate() {
                let distinct: BTreeSet<&str> = columns
                    .iter()
                    .filter_map(|column| column[row].as_deref())
                    .collect();
                if distinct.len() == 1 {
                    flagged += 1;
                    *flag = true;
                }
            }
        }
        debug!(group = %group.name, columns = columns.len(), flagged, "straightline group");
        counts.push(GroupCount {
            group: group.name.clone(),
            columns: columns.len(),
            flagged,
        });
    }
    StraightlineFlags {
        excluded,
        groups: counts,
    }
}

#[cfg(test)]
mod tests {
    use polars::prelude::Column;

    use super::*;

    #[test]
    fn test_numeric_text_compares_by_value() {
        let df = DataFrame::new(vec![
            Column::new("gal_tan_1".into(), vec![Some("3"), Some("2")]),
            Column::new("gal_tan_2".into(), vec![Some("3.0"), Some("2")]),
            Column::new("gal_tan_3".into(), vec![None, Some("4")]),
        ])
        .unwrap();
        let flags = straightline_flags(&df, &[StraightlineGroup::new("value_orientation", "gal_tan_")]);
        assert_eq!(flags.excluded, vec![true, false]);
        assert_eq!(flags.groups[0].columns, 3);
        assert_eq!(flags.groups[0].flagged, 1);
    }
}
