// src/checks/quantiles.rs

use anyhow::Result;
use std::collections::BTreeMap;

use super::{Finding, FindingKind};
use crate::reference::VALID_QUANTILES;
use crate::table::ForecastTable;

const CHECK: &str = "quantiles";

/// Quantile completeness: quantile-type rows grouped by `(location,
/// age_group, target, target_end_date)` must cover all seven levels. The
/// column-value check has already rejected invalid levels, so counting the
/// distinct ones per group is enough. Groups that fall short are listed with
/// the levels they did contain.
pub fn check(table: &ForecastTable) -> Result<Vec<Finding>> {
    let mut groups: BTreeMap<(String, String, String, String), Vec<f64>> = BTreeMap::new();

    for row in &table.rows {
        if row.row_type != "quantile" {
            continue;
        }
        let key = (
            row.location.clone(),
            row.age_group.clone(),
            row.target.clone(),
            row.target_end_date_raw.clone(),
        );
        let levels = groups.entry(key).or_default();
        if let Some(q) = row.quantile.as_deref().and_then(|q| q.parse::<f64>().ok()) {
            if !levels.iter().any(|&seen| (seen - q).abs() < 1e-9) {
                levels.push(q);
            }
        }
    }

    let incomplete: Vec<_> = groups
        .into_iter()
        .filter(|(_, levels)| levels.len() != VALID_QUANTILES.len())
        .collect();

    if incomplete.is_empty() {
        return Ok(Vec::new());
    }

    let mut message = String::from("not all quantiles were provided in the following setting(s):\n");
    for ((location, age_group, target, target_end_date), mut levels) in incomplete {
        levels.sort_by(|a, b| a.partial_cmp(b).expect("quantile levels are finite"));
        message.push_str(&format!(
            "\nlocation={} age_group={} target={} target_end_date={}: {:?}",
            location, age_group, target, target_end_date, levels
        ));
    }

    Ok(vec![Finding::error(
        CHECK,
        FindingKind::IncompleteQuantileSet,
        message,
    )])
}
