//! Row exclusion masks.

use polars::prelude::{BooleanChunked, DataFrame, NewChunkedArray};

use panel_model::{PanelError, Result};

/// Keep the rows whose exclusion flag is false.
pub fn retain_rows(df: &DataFrame, excluded: &[bool]) -> Result<DataFrame> {
    if excluded.len() != df.height() {
        return Err(PanelError::invalid_argument(format!(
            "exclusion mask has {} entries for {} rows",
            excluded.len(),
            df.height()
        )));
    }
    let keep: Vec<bool> = excluded.iter().map(|flag| !flag).collect();
    let mask = BooleanChunked::from_slice("keep".into(), &keep);
    Ok(df.filter(&mask)?)
}

/// Element-wise OR of equally long masks.
pub fn any_excluded(masks: &[&[bool]], height: usize) -> Vec<bool> {
    (0..height)
        .map(|idx| masks.iter().any(|mask| mask.get(idx).copied().unwrap_or(false)))
        .collect()
}

pub fn count_excluded(mask: &[bool]) -> usize {
    mask.iter().filter(|flag| **flag).count()
}

#[cfg(test)]
mod tests {
    use polars::prelude::Column;

    use super::*;

    #[test]
    fn test_retain_rows() {
        let df = DataFrame::new(vec![Column::new("id".into(), vec!["a", "b", "c"])]).unwrap();
        let kept = retain_rows(&df, &[false, true, false]).unwrap();
        assert_eq!(kept.height(), 2);
        assert!(retain_rows(&df, &[true]).is_err());
    }

    #[test]
    fn test_any_excluded() {
        let a = [true, false, false];
        let b = [false, false, true];
        assert_eq!(any_excluded(&[&a[..], &b[..]], 3), vec![true, false, true]);
        assert_eq!(count_excluded(&[true, false, true]), 2);
    }
}
