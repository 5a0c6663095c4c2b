//! Filter translation: derived-column comparisons rewritten against the
//! lookup relation.

use std::borrow::Cow;

use indexmap::IndexSet;

use crate::error::{CubeplanError, Result};
use crate::filter::FilterTree;
use crate::lookup::LookupResolver;
use crate::models::{ColumnRef, CubeModel};

/// Rewrite every comparison on a derived column via the lookup resolver.
/// Columns touched by a loosened rewrite are collected into `loosened`;
/// the caller must add them to the effective grouping set. Logical nodes
/// are rebuilt only when a child actually changed, so a tree without
/// derived columns comes back borrowed.
pub fn translate_derived<'a>(
    filter: &'a FilterTree,
    cube: &CubeModel,
    resolver: &dyn LookupResolver,
    loosened: &mut IndexSet<ColumnRef>,
) -> Result<Cow<'a, FilterTree>> {
    match filter {
        FilterTree::Compare { column, values, .. } => {
            let Some(column) = column else {
                return Ok(Cow::Borrowed(filter));
            };
            if values.is_empty() {
                return Ok(Cow::Borrowed(filter));
            }
            if cube.is_extended(column) {
                return Err(CubeplanError::UnsupportedFilterColumn(column.to_string()));
            }
            let Some(mapping) = cube.host_mapping(column) else {
                return Ok(Cow::Borrowed(filter));
            };
            let (rewritten, is_loosened) = resolver.rewrite_compare(cube, mapping, filter)?;
            if is_loosened {
                rewritten.collect_columns(loosened);
            }
            Ok(Cow::Owned(rewritten))
        }
        FilterTree::Logical { op, children } => {
            let mut translated = Vec::with_capacity(children.len());
            let mut modified = false;
            for child in children {
                let t = translate_derived(child, cube, resolver, loosened)?;
                modified |= matches!(t, Cow::Owned(_));
                translated.push(t);
            }
            if modified {
                Ok(Cow::Owned(FilterTree::Logical {
                    op: *op,
                    children: translated.into_iter().map(Cow::into_owned).collect(),
                }))
            } else {
                Ok(Cow::Borrowed(filter))
            }
        }
    }
}
