//! Column selection for stages that act on "all columns" or a named subset.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{PanelError, Result};

/// Which columns a stage should touch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "Value")]
pub enum ColumnSelector {
    /// Every column of the frame.
    #[default]
    All,
    /// Only the listed columns; names absent from the frame are skipped.
    Named(Vec<String>),
}

/// Result of resolving a selector against a concrete schema.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedColumns {
    /// Requested columns that exist, in request order.
    pub present: Vec<String>,
    /// Requested columns that do not exist in the schema.
    pub missing: Vec<String>,
}

impl ColumnSelector {
    pub fn named<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Named(columns.into_iter().map(Into::into).collect())
    }

    /// Parse a selector from a loosely typed value.
    ///
    /// `null` selects all columns and an array of strings selects those
    /// columns. Anything else is an [`PanelError::InvalidArgument`].
    pub fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::Null => Ok(Self::All),
            Value::Array(items) => {
                let mut columns = Vec::with_capacity(items.len());
                for item in items {
                    match item {
                        Value::String(name) => columns.push(name.clone()),
                        other => {
                            return Err(PanelError::invalid_argument(format!(
                                "leave the column selection empty or give a list of column names, found element {other}"
                            )));
                        }
                    }
                }
                Ok(Self::Named(columns))
            }
            other => Err(PanelError::invalid_argument(format!(
                "leave the column selection empty or give a list of column names, found {other}"
            ))),
        }
    }

    /// Intersect the selector with the available column names.
    pub fn resolve<S: AsRef<str>>(&self, available: &[S]) -> ResolvedColumns {
        match self {
            Self::All => ResolvedColumns {
                present: available.iter().map(|s| s.as_ref().to_string()).collect(),
                missing: Vec::new(),
            },
            Self::Named(requested) => {
                let mut resolved = ResolvedColumns::default();
                for name in requested {
                    if available.iter().any(|s| s.as_ref() == name) {
                        if !resolved.present.contains(name) {
                            resolved.present.push(name.clone());
                        }
                    } else {
                        resolved.missing.push(name.clone());
                    }
                }
                resolved
            }
        }
    }
}

impl TryFrom<Value> for ColumnSelector {
    type Error = PanelError;

    fn try_from(value: Value) -> Result<Self> {
        Self::from_value(&value)
    }
}

impl From<ColumnSelector> for Value {
    fn from(selector: ColumnSelector) -> Self {
        match selector {
            ColumnSelector::All => Value::Null,
            ColumnSelector::Named(columns) => {
                Value::Array(columns.into_iter().map(Value::String).collect())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn null_selects_all_columns() {
        assert_eq!(
            ColumnSelector::from_value(&Value::Null).unwrap(),
            ColumnSelector::All
        );
    }

    #[test]
    fn string_list_selects_named_columns() {
        let selector = ColumnSelector::from_value(&json!(["a", "b"])).unwrap();
        assert_eq!(selector, ColumnSelector::named(["a", "b"]));
    }

    #[test]
    fn other_shapes_are_invalid_arguments() {
        for value in [json!("a"), json!(3), json!(["a", 1]), json!({"a": 1})] {
            let err = ColumnSelector::from_value(&value).unwrap_err();
            assert!(matches!(err, PanelError::InvalidArgument { .. }), "{value}");
        }
    }

    #[test]
    fn resolve_reports_missing_columns() {
        let selector = ColumnSelector::named(["likert_costs_1", "absent", "likert_costs_1"]);
        let resolved = selector.resolve(&["id", "likert_costs_1"]);
        assert_eq!(resolved.present, vec!["likert_costs_1"]);
        assert_eq!(resolved.missing, vec!["absent"]);
    }

    #[test]
    fn empty_list_selects_nothing() {
        let resolved = ColumnSelector::Named(Vec::new()).resolve(&["id"]);
        assert!(resolved.present.is_empty());
        assert!(resolved.missing.is_empty());
    }
}
