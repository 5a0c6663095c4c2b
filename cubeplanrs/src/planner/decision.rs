//! Storage-side planning decisions: aggregation necessity, limit
//! push-down eligibility, memory threshold.

use indexmap::IndexSet;

use crate::catalog::CuboidRef;
use crate::config::QueryConfig;
use crate::filter::FilterTree;
use crate::models::{ColumnRef, MeasureFunction, MeasureKind};

/// Storage rows are already unique per requested grouping iff the
/// grouping columns plus the filter-pinned single-value columns account
/// for every cuboid column. Anything short of that needs a second
/// aggregation pass over the scan output.
pub fn needs_storage_aggregation(
    cuboid: &CuboidRef,
    groups_d: &IndexSet<ColumnRef>,
    single_values_d: &IndexSet<ColumnRef>,
) -> bool {
    let covered = cuboid
        .columns
        .iter()
        .all(|c| groups_d.contains(c) || single_values_d.contains(c));
    tracing::debug!(
        cuboid = cuboid.id,
        ?groups_d,
        ?single_values_d,
        needs_storage_aggregation = !covered,
        "storage aggregation decision"
    );
    !covered
}

/// Whether a row-count limit can be pushed into the physical scan. Every
/// condition is evaluated so each blocking reason gets logged; the result
/// is their conjunction.
#[allow(clippy::too_many_arguments)]
pub fn storage_limit_possible(
    cuboid: &CuboidRef,
    groups: &[ColumnRef],
    post_aggregation: &IndexSet<ColumnRef>,
    groups_d: &IndexSet<ColumnRef>,
    filter: Option<&FilterTree>,
    loosened: &IndexSet<ColumnRef>,
    aggregations: &[MeasureFunction],
    has_sort: bool,
) -> bool {
    let mut possible = true;

    if !filter.map_or(true, FilterTree::is_evaluable_recursively) {
        possible = false;
        tracing::debug!("limit push-down impossible: filter is not storage evaluable");
    }

    if !loosened.is_empty() {
        possible = false;
        tracing::debug!(?loosened, "limit push-down impossible: filter is loosened");
    }

    if has_sort {
        possible = false;
        tracing::debug!("limit push-down impossible: query has order by");
    }

    // Post-aggregation on an expanded host is fine only when the host is
    // already an explicit grouping column.
    if !post_aggregation.iter().all(|c| groups.contains(c)) {
        possible = false;
        tracing::debug!(
            ?post_aggregation,
            "limit push-down impossible: derived columns require post aggregation"
        );
    }

    // The grouping set must be exactly the head of the cuboid's column
    // ordering; only then does a storage-side row count correspond to a
    // result-row count.
    let head = groups_d.len();
    let clustered_at_head = head <= cuboid.columns.len()
        && cuboid.columns[..head].iter().all(|c| groups_d.contains(c));
    if !clustered_at_head {
        possible = false;
        tracing::debug!(
            ?groups_d,
            cuboid_columns = ?cuboid.columns,
            "limit push-down impossible: grouping is not clustered at the cuboid head"
        );
    }

    for func in aggregations {
        if func.is_dimension_as_metric() {
            possible = false;
            tracing::debug!(%func, "limit push-down impossible: dimension used as metric");
        }
    }

    possible
}

/// Final pushed-down limit across all ready segments: the requested limit
/// widened by the configured per-segment safety margin, capped.
pub fn final_push_down_limit(
    requested: usize,
    ready_segments: usize,
    config: &QueryConfig,
) -> usize {
    let combined = requested
        .saturating_mul(config.push_down_limit_margin)
        .saturating_mul(ready_segments.max(1));
    combined.min(config.max_push_down_limit)
}

/// Row threshold guarding against unbounded in-memory measure
/// representations. Returns `None` (unbounded) when no metric is
/// memory-hungry, or when the budget rounds down to zero rows.
pub fn memory_row_threshold(
    dimensions: &IndexSet<ColumnRef>,
    metrics: &[MeasureFunction],
    mem_budget_bytes: u64,
) -> Option<usize> {
    if !metrics.iter().any(MeasureFunction::is_memory_hungry) {
        return None;
    }

    let mut row_bytes = 3 * dimensions.len();
    for func in metrics {
        if let MeasureKind::MemoryHungry {
            max_serialized_bytes,
        } = func.returns
        {
            row_bytes += max_serialized_bytes;
        }
    }
    if row_bytes == 0 {
        return None;
    }

    let rows = (mem_budget_bytes / row_bytes as u64) as usize;
    if rows > 0 {
        tracing::debug!(rows, row_bytes, "memory budget applied");
        Some(rows)
    } else {
        tracing::debug!(row_bytes, "memory budget too small, leaving unbounded");
        None
    }
}
