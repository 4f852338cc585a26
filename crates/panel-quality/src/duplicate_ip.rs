//! Duplicate-IP Resolver.

use std::collections::{BTreeMap, BTreeSet};

use polars::prelude::DataFrame;
use tracing::{info, info_span, trace};

use panel_common::{column_cell_keys, redact_value};
use panel_model::{Diagnostic, DiagnosticKind, DuplicateIpConfig, Result};

use crate::mask::{count_excluded, retain_rows};

/// An address used by more identities than the threshold allows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SharedIp {
    pub ip: String,
    pub identities: usize,
}

#[derive(Debug, Clone)]
pub struct DuplicateIpOutcome {
    pub frame: DataFrame,
    pub rows_before: usize,
    pub rows_after: usize,
    pub shared: Vec<SharedIp>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Addresses shared by more than `max_identities_per_ip` distinct identifiers.
///
/// Rows without an address are ignored; identifiers are compared by value.
pub fn shared_ips(ips: &[Option<String>], ids: &[Option<String>], max_identities: usize) -> Vec<SharedIp> {
    let mut identities: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
    for (ip, id) in ips.iter().zip(ids) {
        let Some(ip) = ip.as_deref() else {
            continue;
        };
        let entry = identities.entry(ip).or_default();
        if let Some(id) = id.as_deref() {
            entry.insert(id);
        }
    }
    identities
        .into_iter()
        .filter(|(_, ids)| ids.len() > max_identities)
        .map(|(ip, ids)| SharedIp {
            ip: ip.to_string(),
            identities: ids.len(),
        })
        .collect()
}

/// Remove every respondent who used a shared address.
///
/// Not just the identities above the threshold: all rows on a shared address
/// go. Without the address or identifier column the stage is skipped.
pub fn resolve_duplicate_ips(df: &DataFrame, config: &DuplicateIpConfig) -> Result<DuplicateIpOutcome> {
    let span = info_span!("duplicate_ip");
    let _guard = span.enter();

    let mut diagnostics = Vec::new();
    let (Some(ips), Some(ids)) = (
        column_cell_keys(df, &config.ip_column),
        column_cell_keys(df, &config.id_column),
    ) else {
        for column in [&config.ip_column, &config.id_column] {
            if df.column(column).is_err() {
                diagnostics.push(
                    Diagnostic::warning(
                        DiagnosticKind::MissingColumn,
                        format!("column {column} is not present, duplicate-IP filter skipped"),
                    )
                    .with_column(column),
                );
            }
        }
        return Ok(DuplicateIpOutcome {
            frame: df.clone(),
            rows_before: df.height(),
            rows_after: df.height(),
            shared: Vec::new(),
            diagnostics,
        });
    };

    let shared = shared_ips(&ips, &ids, config.max_identities_per_ip);
    let flagged: BTreeSet<&str> = shared.iter().map(|entry| entry.ip.as_str()).collect();
    for entry in &shared {
        trace!(
            ip = redact_value(&entry.ip),
            identities = entry.identities,
            "shared address"
        );
    }
    let excluded: Vec<bool> = ips
        .iter()
        .map(|ip| ip.as_deref().is_some_and(|ip| flagged.contains(ip)))
        .collect();
    let frame = retain_rows(df, &excluded)?;
    info!(
        rows_before = df.height(),
        rows_after = frame.height(),
        shared_ips = shared.len(),
        excluded = count_excluded(&excluded),
        "duplicate-IP filter applied"
    );
    Ok(DuplicateIpOutcome {
        rows_before: df.height(),
        rows_after: frame.height(),
        frame,
        shared,
        diagnostics,
    })
}
