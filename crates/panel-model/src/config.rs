//! Pipeline configuration.
//!
//! Every table and column list a stage needs is an explicit, immutable value
//! carried here and passed into the stage entry points. The defaults reproduce
//! the two-wave natural-hazards study.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{PanelError, Result};
use crate::selector::ColumnSelector;

/// One survey wave.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaveConfig {
    /// Wave name, also used as the column prefix (`S1` -> `S1_id`).
    pub name: String,
    /// Respondent identifier within the wave.
    pub id_column: String,
    /// Column joined against the crosswalk.
    pub link_column: String,
}

impl WaveConfig {
    pub fn new(name: &str, id_column: &str, link_column: &str) -> Self {
        Self {
            name: name.to_string(),
            id_column: id_column.to_string(),
            link_column: link_column.to_string(),
        }
    }

    /// Column name after wave prefixing.
    pub fn prefixed(&self, column: &str) -> String {
        format!("{}_{column}", self.name)
    }
}

/// Substring replacement applied to every column name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnRename {
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BadQualityConfig {
    pub channel_column: String,
    pub excluded_channel: String,
    pub finished_column: String,
    pub terminate_column: String,
    pub terminating_flags: Vec<String>,
}

impl Default for BadQualityConfig {
    fn default() -> Self {
        Self {
            channel_column: "DistributionChannel".to_string(),
            excluded_channel: "preview".to_string(),
            finished_column: "Finished".to_string(),
            terminate_column: "Q_TerminateFlag".to_string(),
            terminating_flags: ["PoorQuality", "NA", "QuotaMet", "Screened"]
                .map(String::from)
                .to_vec(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeedConfig {
    /// Export name of the duration column (after header cleaning).
    pub source_column: String,
    /// Canonical name the column is renamed to.
    pub canonical_column: String,
    pub lower_quantile: f64,
    pub upper_quantile: f64,
}

impl Default for SpeedConfig {
    fn default() -> Self {
        Self {
            source_column: "Duration(inseconds)".to_string(),
            canonical_column: "duration".to_string(),
            lower_quantile: 0.05,
            upper_quantile: 0.95,
        }
    }
}

/// Columns whose names start with `prefix` form one straightlining group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StraightlineGroup {
    pub name: String,
    pub prefix: String,
}

impl StraightlineGroup {
    pub fn new(name: &str, prefix: &str) -> Self {
        Self {
            name: name.to_string(),
            prefix: prefix.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttentionConfig {
    pub column: String,
    pub expected: String,
}

impl Default for AttentionConfig {
    fn default() -> Self {
        Self {
            column: "attention_check".to_string(),
            expected: "Agree".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DuplicateIpConfig {
    pub ip_column: String,
    pub id_column: String,
    /// An address is shared once more than this many identities use it.
    pub max_identities_per_ip: usize,
}

impl Default for DuplicateIpConfig {
    fn default() -> Self {
        Self {
            ip_column: "IPAddress".to_string(),
            id_column: "id".to_string(),
            max_identities_per_ip: 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrosswalkConfig {
    pub new_id_column: String,
    pub old_id_column: String,
}

impl Default for CrosswalkConfig {
    fn default() -> Self {
        Self {
            new_id_column: "NEW IDS".to_string(),
            old_id_column: "OLD IDS".to_string(),
        }
    }
}

/// What happens to demographic answers that are not in the mapping table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnmappedPolicy {
    /// Unmapped answers become missing.
    #[default]
    Missing,
    /// Unmapped answers are kept verbatim (trimmed).
    Keep,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DemographicsConfig {
    /// Demographic fields, matched bare or behind any wave prefix (`gender`, `S1_gender`).
    pub fields: Vec<String>,
    /// Extra regex patterns selecting demographic columns by full name.
    pub patterns: Vec<String>,
    /// Report every unmapped answer as a warning.
    pub strict: bool,
    pub unmapped: UnmappedPolicy,
}

impl Default for DemographicsConfig {
    fn default() -> Self {
        let fields = [
            "gender",
            "age",
            "education",
            "income",
            "language",
            "language_region",
            "party_choice",
        ]
        .map(String::from)
        .to_vec();
        Self {
            fields,
            patterns: Vec::new(),
            strict: true,
            unmapped: UnmappedPolicy::Missing,
        }
    }
}

/// Apply one built-in mapping table to a set of columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecodeStep {
    pub table: String,
    #[serde(default)]
    pub columns: ColumnSelector,
    /// Coerce the selected columns to numbers after mapping.
    #[serde(default)]
    pub numeric: bool,
}

/// Census share per category for one demographic field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PopulationMargin {
    /// Field name without wave prefix; compared against the first wave's column.
    pub column: String,
    pub shares: BTreeMap<String, f64>,
}

impl PopulationMargin {
    fn new(column: &str, shares: &[(&str, f64)]) -> Self {
        Self {
            column: column.to_string(),
            shares: shares
                .iter()
                .map(|(label, share)| ((*label).to_string(), *share))
                .collect(),
        }
    }
}

/// Full configuration of a panel preparation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub waves: Vec<WaveConfig>,
    pub column_renames: Vec<ColumnRename>,
    pub likert_columns: Vec<String>,
    pub numeric_columns: Vec<String>,
    pub recodes: Vec<RecodeStep>,
    pub bad_quality: BadQualityConfig,
    pub speed: SpeedConfig,
    pub straightline_groups: Vec<StraightlineGroup>,
    pub attention: AttentionConfig,
    pub duplicate_ip: DuplicateIpConfig,
    pub crosswalk: CrosswalkConfig,
    pub demographics: DemographicsConfig,
    pub respondent_id_column: String,
    /// Identifying columns dropped from the written output.
    pub anonymize_columns: Vec<String>,
    pub population_margins: Vec<PopulationMargin>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            waves: vec![
                WaveConfig::new("S1", "id", "id"),
                WaveConfig::new("S2", "id", "m"),
            ],
            column_renames: vec![ColumnRename {
                from: "municipality".to_string(),
                to: "benefits".to_string(),
            }],
            likert_columns: [
                "sensitivity_nh_1",
                "sensitivity_nh_2",
                "sensitivity_nh_3",
                "costs_cc_policy_1",
                "finan_vulnerability_1",
                "lreco_2",
                "climatechange_nh_1",
                "climatechange_nh_2",
                "climatechange_nh_3",
                "psycho_distance_1",
                "psycho_distance_2",
                "psycho_distance_3",
                "psycho_distance_4",
            ]
            .map(String::from)
            .to_vec(),
            numeric_columns: vec!["number_household_1_TEXT".to_string()],
            recodes: vec![RecodeStep {
                table: "translations".to_string(),
                columns: ColumnSelector::All,
                numeric: false,
            }],
            bad_quality: BadQualityConfig::default(),
            speed: SpeedConfig::default(),
            straightline_groups: vec![
                StraightlineGroup::new("costs", "likert_costs_"),
                StraightlineGroup::new("identity", "identity_group"),
                StraightlineGroup::new("value_orientation", "gal_tan_"),
                StraightlineGroup::new("deservingness", "deservingness"),
            ],
            attention: AttentionConfig::default(),
            duplicate_ip: DuplicateIpConfig::default(),
            crosswalk: CrosswalkConfig::default(),
            demographics: DemographicsConfig::default(),
            respondent_id_column: "respondent_id".to_string(),
            anonymize_columns: [
                "Status",
                "IPAddress",
                "RecipientLastName",
                "RecipientFirstName",
                "RecipientEmail",
                "ExternalReference",
                "LocationLatitude",
                "LocationLongitude",
                "consent_choice",
                "DistributionChannel",
                "UserLanguage",
                "language",
                "RecordedDate",
                "ResponseId",
            ]
            .map(String::from)
            .to_vec(),
            population_margins: vec![
                PopulationMargin::new(
                    "age",
                    &[("18 - 34", 0.2707), ("35 - 49", 0.2772), ("50+", 0.4522)],
                ),
                PopulationMargin::new("gender", &[("Female", 0.5002), ("Male", 0.4998)]),
                PopulationMargin::new(
                    "language_region",
                    &[
                        ("German-speaking region", 0.7114),
                        ("French-speaking region", 0.2467),
                        ("Italian-speaking region", 0.0419),
                    ],
                ),
                PopulationMargin::new(
                    "education",
                    &[
                        ("Below Secondary", 0.008),
                        ("High school diploma", 0.409),
                        ("University degree", 0.438),
                        ("Vocational training or apprenticeship", 0.145),
                    ],
                ),
            ],
        }
    }
}

impl PipelineConfig {
    /// Parse a TOML document; absent keys keep their defaults.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: Self = toml::from_str(contents).map_err(|e| PanelError::Config {
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| PanelError::Config {
            message: format!("{}: {e}", path.display()),
        })?;
        Self::from_toml_str(&contents)
    }

    /// Check invariants serde cannot express.
    pub fn validate(&self) -> Result<()> {
        if self.waves.len() != 2 {
            return Err(PanelError::Config {
                message: format!("expected exactly two waves, found {}", self.waves.len()),
            });
        }
        if self.waves[0].name == self.waves[1].name {
            return Err(PanelError::Config {
                message: format!("wave names must differ, both are '{}'", self.waves[0].name),
            });
        }
        let speed = &self.speed;
        if !(0.0..=1.0).contains(&speed.lower_quantile)
            || !(0.0..=1.0).contains(&speed.upper_quantile)
            || speed.lower_quantile >= speed.upper_quantile
        {
            return Err(PanelError::Config {
                message: format!(
                    "speed quantiles must satisfy 0 <= lower < upper <= 1, got {} and {}",
                    speed.lower_quantile, speed.upper_quantile
                ),
            });
        }
        Ok(())
    }

    /// Population margins keyed by the first wave's prefixed column names.
    pub fn resolved_margins(&self) -> Vec<PopulationMargin> {
        let first = self.first_wave();
        self.population_margins
            .iter()
            .map(|margin| PopulationMargin {
                column: first.prefixed(&margin.column),
                shares: margin.shares.clone(),
            })
            .collect()
    }

    pub fn wave_names(&self) -> Vec<&str> {
        self.waves.iter().map(|wave| wave.name.as_str()).collect()
    }

    pub fn first_wave(&self) -> &WaveConfig {
        &self.waves[0]
    }

    pub fn second_wave(&self) -> &WaveConfig {
        &self.waves[1]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = PipelineConfig::default();
        config.validate().unwrap();
        assert_eq!(config.first_wave().link_column, "id");
        assert_eq!(config.second_wave().link_column, "m");
        assert_eq!(config.straightline_groups.len(), 4);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = PipelineConfig::from_toml_str(
            r#"
            likert_columns = ["q1"]

            [duplicate_ip]
            max_identities_per_ip = 3
            "#,
        )
        .unwrap();
        assert_eq!(config.likert_columns, vec!["q1"]);
        assert_eq!(config.duplicate_ip.max_identities_per_ip, 3);
        assert_eq!(config.duplicate_ip.ip_column, "IPAddress");
        assert_eq!(config.attention.expected, "Agree");
    }

    #[test]
    fn recode_columns_accept_string_list() {
        let config = PipelineConfig::from_toml_str(
            r#"
            [[recodes]]
            table = "preference"
            columns = ["choice_first", "choice_last"]
            numeric = true
            "#,
        )
        .unwrap();
        assert_eq!(
            config.recodes[0].columns,
            ColumnSelector::named(["choice_first", "choice_last"])
        );
        assert!(config.recodes[0].numeric);
    }

    #[test]
    fn recode_columns_reject_other_shapes() {
        let err = PipelineConfig::from_toml_str(
            r#"
            [[recodes]]
            table = "preference"
            columns = "choice_first"
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, PanelError::Config { .. }));
    }

    #[test]
    fn inverted_quantiles_are_rejected() {
        let err = PipelineConfig::from_toml_str(
            r#"
            [speed]
            lower_quantile = 0.9
            upper_quantile = 0.1
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, PanelError::Config { .. }));
    }

    #[test]
    fn prefixed_column_names() {
        let wave = WaveConfig::new("S2", "id", "m");
        assert_eq!(wave.prefixed("m"), "S2_m");
    }

    #[test]
    fn margins_follow_wave_names() {
        let config = PipelineConfig::from_toml_str(
            r#"
            [[waves]]
            name = "W1"
            id_column = "id"
            link_column = "id"

            [[waves]]
            name = "W2"
            id_column = "id"
            link_column = "m"
            "#,
        )
        .unwrap();
        let columns: Vec<String> = config
            .resolved_margins()
            .into_iter()
            .map(|margin| margin.column)
            .collect();
        assert_eq!(
            columns,
            vec!["W1_age", "W1_gender", "W1_language_region", "W1_education"]
        );
        assert_eq!(config.wave_names(), vec!["W1", "W2"]);
    }

    #[test]
    fn language_is_anonymized_by_default() {
        let config = PipelineConfig::default();
        assert!(config.anonymize_columns.iter().any(|column| column == "language"));
        assert!(!config.anonymize_columns.iter().any(|column| column == "language_region"));
    }
}
