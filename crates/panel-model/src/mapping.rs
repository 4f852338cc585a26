//! Mapping tables from raw survey answers to normalized values.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Normalized counterpart of a raw answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MappedValue {
    /// Categorical label.
    Text(String),
    /// Numeric code.
    Number(f64),
    /// Intentionally discarded answer ("Prefer not to say", "I don't know").
    Missing,
}

impl MappedValue {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(value) => Some(*value),
            _ => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing)
    }
}

impl From<&str> for MappedValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<f64> for MappedValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl<T: Into<MappedValue>> From<Option<T>> for MappedValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Missing, Into::into)
    }
}

/// A key that was declared more than once with different targets.
#[derive(Debug, Clone, PartialEq)]
pub struct ShadowedKey {
    pub key: String,
    pub previous: MappedValue,
    pub current: MappedValue,
}

/// Ordered raw-value to normalized-value table.
///
/// Keys are trimmed on insert and on lookup, so `"Prefer not to say "` and
/// `"Prefer not to say"` share one canonical entry. A later insert for an
/// existing key replaces the value in place; conflicting redefinitions are
/// kept in [`MappingTable::shadowed`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MappingTable {
    name: String,
    entries: Vec<(String, MappedValue)>,
    index: BTreeMap<String, usize>,
    shadowed: Vec<ShadowedKey>,
}

impl MappingTable {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Build a table from `(raw, value)` pairs, in order.
    pub fn from_pairs<I, K, V>(name: impl Into<String>, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<MappedValue>,
    {
        let mut table = Self::new(name);
        for (key, value) in pairs {
            table.insert(key.as_ref(), value.into());
        }
        table
    }

    pub fn insert(&mut self, raw: &str, value: MappedValue) {
        let key = raw.trim().to_string();
        match self.index.get(&key) {
            Some(&position) => {
                let previous = std::mem::replace(&mut self.entries[position].1, value.clone());
                if previous != value {
                    self.shadowed.push(ShadowedKey {
                        key,
                        previous,
                        current: value,
                    });
                }
            }
            None => {
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push((key, value));
            }
        }
    }

    pub fn get(&self, raw: &str) -> Option<&MappedValue> {
        self.index
            .get(raw.trim())
            .map(|&position| &self.entries[position].1)
    }

    pub fn contains(&self, raw: &str) -> bool {
        self.index.contains_key(raw.trim())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &MappedValue)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), value))
    }

    /// Keys redefined with a different target while building the table.
    pub fn shadowed(&self) -> &[ShadowedKey] {
        &self.shadowed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whitespace_variants_share_one_key() {
        let table = MappingTable::from_pairs(
            "demo",
            [
                ("Prefer not to say ", MappedValue::Missing),
                ("Prefer not to say", MappedValue::Missing),
            ],
        );
        assert_eq!(table.len(), 1);
        assert!(table.shadowed().is_empty());
        assert_eq!(table.get("  Prefer not to say"), Some(&MappedValue::Missing));
    }

    #[test]
    fn conflicting_redefinition_is_recorded() {
        let table = MappingTable::from_pairs(
            "demo",
            [("Male", MappedValue::text("M")), ("Male", MappedValue::text("Man"))],
        );
        assert_eq!(table.get("Male"), Some(&MappedValue::text("Man")));
        assert_eq!(table.shadowed().len(), 1);
        assert_eq!(table.shadowed()[0].previous, MappedValue::text("M"));
    }

    #[test]
    fn insertion_order_is_preserved() {
        let table = MappingTable::from_pairs("t", [("b", 2.0), ("a", 1.0)]);
        let keys: Vec<&str> = table.iter().map(|(key, _)| key).collect();
        assert_eq!(keys, vec!["b", "a"]);
    }

    #[test]
    fn option_converts_to_missing() {
        let value: MappedValue = Option::<f64>::None.into();
        assert!(value.is_missing());
        let value: MappedValue = Some(6.0).into();
        assert_eq!(value.as_number(), Some(6.0));
    }

    proptest::proptest! {
        #[test]
        fn last_definition_wins(
            entries in proptest::collection::vec(("[ab]{1,2} ?", 0u8..4), 1..16)
        ) {
            let table = MappingTable::from_pairs(
                "p",
                entries.iter().map(|(key, value)| (key.as_str(), f64::from(*value))),
            );
            for (key, _) in &entries {
                let expected = entries
                    .iter()
                    .rev()
                    .find(|(other, _)| other.trim() == key.trim())
                    .map(|(_, value)| f64::from(*value));
                proptest::prop_assert_eq!(table.get(key).and_then(MappedValue::as_number), expected);
            }
        }
    }
}
