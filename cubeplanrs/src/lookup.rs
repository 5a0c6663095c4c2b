//! Lookup-table predicate rewriting contract.

use crate::error::Result;
use crate::filter::FilterTree;
use crate::models::{CubeModel, DerivedMapping};

pub trait LookupResolver {
    /// Rewrite a comparison on a derived column into a predicate over the
    /// mapping's host columns, consulting the materialized lookup
    /// relation. The returned flag is true when the rewrite is loosened:
    /// a superset approximation whose columns must join the effective
    /// grouping set, because the predicate alone no longer pins their
    /// values.
    fn rewrite_compare(
        &self,
        cube: &CubeModel,
        mapping: &DerivedMapping,
        compare: &FilterTree,
    ) -> Result<(FilterTree, bool)>;
}
