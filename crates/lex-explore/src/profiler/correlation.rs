//! Pearson correlation and pairplot data over numeric columns.

use crate::types::{CorrelationMatrix, Pairplot, Table};
use crate::utils::optional_numeric_values;
use polars::prelude::*;
use rand::prelude::*;
use tracing::debug;

/// Pairwise Pearson correlation matrix.
///
/// Each coefficient uses the rows where both columns are present. Returns
/// `None` when the table has fewer than two numeric columns.
pub(crate) fn correlation_matrix(table: &Table) -> PolarsResult<Option<CorrelationMatrix>> {
    let columns = table.numeric_columns();
    if columns.len() < 2 {
        debug!("Skipping correlation: {} numeric column(s)", columns.len());
        return Ok(None);
    }

    let mut data = Vec::with_capacity(columns.len());
    for name in &columns {
        let series = table.data().column(name)?.as_materialized_series();
        data.push(optional_numeric_values(series)?);
    }

    let n = columns.len();
    let mut values = vec![vec![None; n]; n];
    for i in 0..n {
        for j in i..n {
            let r = pearson(&data[i], &data[j]);
            values[i][j] = r;
            values[j][i] = r;
        }
    }

    Ok(Some(CorrelationMatrix { columns, values }))
}

/// Pearson coefficient over pairwise-complete observations.
///
/// `None` with fewer than two complete pairs or a zero-variance side.
pub(crate) fn pearson(x: &[Option<f64>], y: &[Option<f64>]) -> Option<f64> {
    let pairs: Vec<(f64, f64)> = x
        .iter()
        .zip(y)
        .filter_map(|(a, b)| Some(((*a)?, (*b)?)))
        .collect();
    if pairs.len() < 2 {
        return None;
    }

    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|(a, _)| a).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|(_, b)| b).sum::<f64>() / n;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (a, b) in &pairs {
        let dx = a - mean_x;
        let dy = b - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    if var_x == 0.0 || var_y == 0.0 {
        return None;
    }
    Some((cov / (var_x.sqrt() * var_y.sqrt())).clamp(-1.0, 1.0))
}

/// Row-aligned numeric data for a scatter matrix.
///
/// Tables taller than `max_rows` are sampled without replacement using a
/// seeded RNG; sampled rows keep their original order.
pub(crate) fn pairplot(table: &Table, max_rows: usize, seed: u64) -> PolarsResult<Pairplot> {
    let columns = table.numeric_columns();
    if columns.is_empty() {
        return Ok(Pairplot::NoNumericColumns);
    }

    let total_rows = table.height();
    let rows: Option<Vec<usize>> = (total_rows > max_rows).then(|| {
        let mut rng = StdRng::seed_from_u64(seed);
        let indices: Vec<usize> = (0..total_rows).collect();
        let mut sampled: Vec<usize> = indices
            .choose_multiple(&mut rng, max_rows)
            .copied()
            .collect();
        sampled.sort_unstable();
        sampled
    });

    let mut values = Vec::with_capacity(columns.len());
    for name in &columns {
        let series = table.data().column(name)?.as_materialized_series();
        let all = optional_numeric_values(series)?;
        let picked = match &rows {
            Some(rows) => rows.iter().map(|&r| all[r]).collect(),
            None => all,
        };
        values.push(picked);
    }

    if let Some(rows) = &rows {
        debug!("Pairplot sampled {} of {} rows", rows.len(), total_rows);
    }

    Ok(Pairplot::Available {
        columns,
        values,
        total_rows,
    })
}
