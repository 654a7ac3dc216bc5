//! Missing-value percentages, optionally grouped.

use crate::types::{CellKey, NullReport, NullReportRow, Table};
use crate::utils::{cell_keys, missing_mask, percentage};
use polars::prelude::*;
use std::collections::HashMap;

/// Build a [`NullReport`] for `features`, split by `groups` when non-empty.
///
/// Groups appear in first-seen order. A missing group cell is a key of its
/// own, so rows with a missing group value are reported rather than dropped.
pub(crate) fn null_report(
    table: &Table,
    groups: &[String],
    features: &[String],
) -> PolarsResult<NullReport> {
    let mut masks = Vec::with_capacity(features.len());
    for feature in features {
        let series = table.data().column(feature)?.as_materialized_series();
        masks.push(missing_mask(series)?);
    }

    let rows = if groups.is_empty() {
        let all: Vec<usize> = (0..table.height()).collect();
        vec![report_row(None, &all, &masks)]
    } else {
        let mut group_cells = Vec::with_capacity(groups.len());
        for group in groups {
            let series = table.data().column(group)?.as_materialized_series();
            group_cells.push(cell_keys(series)?);
        }

        let mut order: Vec<Vec<CellKey>> = Vec::new();
        let mut members: HashMap<Vec<CellKey>, Vec<usize>> = HashMap::new();
        for row in 0..table.height() {
            let key: Vec<CellKey> = group_cells.iter().map(|cells| cells[row].clone()).collect();
            members
                .entry(key)
                .or_insert_with_key(|key| {
                    order.push(key.clone());
                    Vec::new()
                })
                .push(row);
        }

        order
            .into_iter()
            .map(|key| {
                let rows = members.remove(&key).unwrap_or_default();
                report_row(Some(key), &rows, &masks)
            })
            .collect()
    };

    Ok(NullReport {
        group_columns: groups.to_vec(),
        feature_columns: features.to_vec(),
        rows,
    })
}

fn report_row(group_key: Option<Vec<CellKey>>, rows: &[usize], masks: &[Vec<bool>]) -> NullReportRow {
    let percentages = masks
        .iter()
        .map(|mask| {
            let missing = rows.iter().filter(|&&r| mask[r]).count();
            percentage(missing, rows.len())
        })
        .collect();

    NullReportRow {
        group_key,
        row_count: rows.len(),
        percentages,
    }
}
