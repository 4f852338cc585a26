//! Non-fatal findings collected while the pipeline runs.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
}

/// What a diagnostic is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// A value had no entry in a mapping table.
    UnmappedValue,
    /// A requested column is absent from the wave schema.
    MissingColumn,
    /// The duration column was already canonical, speed filter skipped.
    SpeedFilterSkipped,
    /// The crosswalk contains fully duplicated rows.
    DuplicateCrosswalkRows,
    /// Wave-1 identifiers occur more than once.
    DuplicateWaveIdentifiers,
    /// Crosswalk old identifiers could not be found in wave 1.
    CrosswalkMismatch,
    /// A mapping key was declared twice with different targets.
    ShadowedMappingKey,
    /// The swap-error radicand is negative.
    DegenerateSwapError,
}

impl DiagnosticKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::UnmappedValue => "unmapped_value",
            Self::MissingColumn => "missing_column",
            Self::SpeedFilterSkipped => "speed_filter_skipped",
            Self::DuplicateCrosswalkRows => "duplicate_crosswalk_rows",
            Self::DuplicateWaveIdentifiers => "duplicate_wave_identifiers",
            Self::CrosswalkMismatch => "crosswalk_mismatch",
            Self::ShadowedMappingKey => "shadowed_mapping_key",
            Self::DegenerateSwapError => "degenerate_swap_error",
        }
    }
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub severity: Severity,
    pub message: String,
    /// Column the finding refers to (if applicable).
    pub column: Option<String>,
    /// Offending value (if applicable).
    pub value: Option<String>,
    /// Count of occurrences.
    pub count: Option<u64>,
}

impl Diagnostic {
    pub fn warning(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            severity: Severity::Warning,
            message: message.into(),
            column: None,
            value: None,
            count: None,
        }
    }

    pub fn info(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Info,
            ..Self::warning(kind, message)
        }
    }

    #[must_use]
    pub fn with_column(mut self, column: impl Into<String>) -> Self {
        self.column = Some(column.into());
        self
    }

    #[must_use]
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    #[must_use]
    pub fn with_count(mut self, count: usize) -> Self {
        self.count = Some(count as u64);
        self
    }
}

/// Unmapped raw value found in a column, with its frequency.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UnmappedValue {
    pub column: String,
    pub value: String,
    pub count: usize,
}

impl UnmappedValue {
    pub fn to_diagnostic(&self) -> Diagnostic {
        Diagnostic::warning(
            DiagnosticKind::UnmappedValue,
            format!("unmapped value in column {}: {}", self.column, self.value),
        )
        .with_column(&self.column)
        .with_value(&self.value)
        .with_count(self.count)
    }
}

/// Count diagnostics of a given severity.
pub fn count_severity(diagnostics: &[Diagnostic], severity: Severity) -> usize {
    diagnostics
        .iter()
        .filter(|diagnostic| diagnostic.severity == severity)
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unmapped_value_becomes_warning() {
        let unmapped = UnmappedValue {
            column: "gender".to_string(),
            value: "Divers".to_string(),
            count: 3,
        };
        let diagnostic = unmapped.to_diagnostic();
        assert_eq!(diagnostic.severity, Severity::Warning);
        assert_eq!(diagnostic.kind, DiagnosticKind::UnmappedValue);
        assert_eq!(diagnostic.count, Some(3));
        assert_eq!(diagnostic.message, "unmapped value in column gender: Divers");
    }

    #[test]
    fn counts_by_severity() {
        let diagnostics = vec![
            Diagnostic::warning(DiagnosticKind::MissingColumn, "a"),
            Diagnostic::info(DiagnosticKind::SpeedFilterSkipped, "b"),
            Diagnostic::warning(DiagnosticKind::MissingColumn, "c"),
        ];
        assert_eq!(count_severity(&diagnostics, Severity::Warning), 2);
        assert_eq!(count_severity(&diagnostics, Severity::Info), 1);
    }

    #[test]
    fn kind_serializes_snake_case() {
        let json = serde_json::to_string(&DiagnosticKind::DegenerateSwapError).unwrap();
        assert_eq!(json, "\"degenerate_swap_error\"");
    }
}
