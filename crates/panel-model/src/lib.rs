//! Data model for the panel survey pipeline.
//!
//! - **error**: fatal error taxonomy
//! - **selector**: "all columns" or named column selection
//! - **mapping**: ordered raw-to-normalized value tables
//! - **dictionaries**: built-in tables of the natural-hazards study
//! - **diagnostics**: non-fatal findings (unmapped values, schema drift)
//! - **config**: immutable pipeline configuration

pub mod config;
pub mod diagnostics;
pub mod dictionaries;
pub mod error;
pub mod mapping;
pub mod selector;

pub use config::{
    AttentionConfig, BadQualityConfig, ColumnRename, CrosswalkConfig, DemographicsConfig,
    DuplicateIpConfig, PipelineConfig, PopulationMargin, RecodeStep, SpeedConfig,
    StraightlineGroup, UnmappedPolicy, WaveConfig,
};
pub use diagnostics::{Diagnostic, DiagnosticKind, Severity, UnmappedValue, count_severity};
pub use dictionaries::{
    BUILTIN_TABLES, LIKERT_UNKNOWN_SENTINEL, builtin_table, demographics_map, likert_map,
    nh_experience_map, preference_map, translation_map,
};
pub use error::{PanelError, Result};
pub use mapping::{MappedValue, MappingTable, ShadowedKey};
pub use selector::{ColumnSelector, ResolvedColumns};
