//! Derived-dimension expansion and single-value column discovery.

use indexmap::IndexSet;

use crate::error::{CubeplanError, Result};
use crate::filter::{CompareOp, FilterTree, LogicalOp};
use crate::models::{ColumnRef, CubeModel};

/// Replace derived columns with their host columns. Hosts of a
/// non-one-to-one mapping are added to `post_aggregation`: one derived
/// value may cover several host tuples, so grouping on the hosts alone
/// would not reproduce the requested granularity and a post-scan
/// re-aggregation is required. Native columns pass through unchanged.
pub fn expand_derived<'a>(
    cube: &CubeModel,
    columns: impl IntoIterator<Item = &'a ColumnRef>,
    post_aggregation: &mut IndexSet<ColumnRef>,
) -> IndexSet<ColumnRef> {
    let mut expanded = IndexSet::new();
    for column in columns {
        match cube.host_mapping(column) {
            Some(mapping) => {
                for host in &mapping.host_columns {
                    expanded.insert(host.clone());
                    if !mapping.one_to_one {
                        post_aggregation.insert(host.clone());
                    }
                }
            }
            None => {
                expanded.insert(column.clone());
            }
        }
    }
    expanded
}

/// Columns the filter pins to exactly one value: an equality comparison
/// with a single value, either as the whole filter or as a conjunct of a
/// top-level AND. Range and multi-value predicates never qualify.
///
/// Derived single-value columns expand to their hosts only under a
/// one-to-one mapping; otherwise uniqueness of the hosts is not implied
/// and the column is dropped. An extended column here is fatal: extended
/// columns are not filterable at all.
pub fn find_single_value_columns(
    filter: Option<&FilterTree>,
    cube: &CubeModel,
) -> Result<IndexSet<ColumnRef>> {
    let to_check: Vec<&FilterTree> = match filter {
        Some(tree @ FilterTree::Compare { .. }) => vec![tree],
        Some(FilterTree::Logical {
            op: LogicalOp::And,
            children,
        }) => children.iter().collect(),
        _ => Vec::new(),
    };

    let mut pinned = IndexSet::new();
    for node in to_check {
        if let FilterTree::Compare {
            column: Some(column),
            op: CompareOp::Eq,
            values,
        } = node
        {
            if values.len() == 1 {
                pinned.insert(column.clone());
            }
        }
    }

    let mut expanded = IndexSet::new();
    for column in pinned {
        if cube.is_extended(&column) {
            return Err(CubeplanError::UnsupportedFilterColumn(column.to_string()));
        }
        match cube.host_mapping(&column) {
            Some(mapping) if mapping.one_to_one => {
                expanded.extend(mapping.host_columns.iter().cloned());
            }
            Some(_) => {} // many-to-one: pruned, hosts are not pinned
            None => {
                expanded.insert(column);
            }
        }
    }
    Ok(expanded)
}
