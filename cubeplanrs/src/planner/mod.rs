//! Query-to-plan resolution.
//!
//! `StoragePlanner` turns a structural query requirement into a physical
//! scan plan: resolve dimensions and metrics, expand derived dimensions
//! to host columns, identify the covering cuboid, translate the filter,
//! and decide storage aggregation, limit push-down and memory threshold.
//! Planning is pure synchronous computation over immutable inputs;
//! independent queries may plan concurrently.

use indexmap::IndexSet;

use crate::catalog::CuboidCatalog;
use crate::config::PlannerConfig;
use crate::error::Result;
use crate::lookup::LookupResolver;
use crate::models::{ColumnRef, CubeModel, QueryRequirement};
use crate::scan::{open_segment_scanners, ScannerFactory, SegmentInfo, SequentialTupleIterator};

pub mod decision;
pub mod derived;
pub mod plan;
pub mod resolve;
pub mod translate;

pub use plan::{Plan, PlanBuilder};

pub struct StoragePlanner<'a> {
    cube: &'a CubeModel,
    catalog: &'a dyn CuboidCatalog,
    lookups: &'a dyn LookupResolver,
    config: &'a PlannerConfig,
}

impl<'a> StoragePlanner<'a> {
    pub fn new(
        cube: &'a CubeModel,
        catalog: &'a dyn CuboidCatalog,
        lookups: &'a dyn LookupResolver,
        config: &'a PlannerConfig,
    ) -> Self {
        Self {
            cube,
            catalog,
            lookups,
            config,
        }
    }

    /// Resolve a query requirement into a physical scan plan.
    pub fn plan(
        &self,
        requirement: &QueryRequirement,
        ready_segments: &[SegmentInfo],
    ) -> Result<Plan> {
        let (dimensions, metrics) =
            resolve::resolve_dimensions_and_metrics(requirement, self.cube);

        // all dimensions = groups + other (e.g. filter-only) dimensions
        let groups: IndexSet<ColumnRef> = requirement.group_by.iter().cloned().collect();
        let other_dims: IndexSet<ColumnRef> = dimensions
            .iter()
            .filter(|c| !groups.contains(*c))
            .cloned()
            .collect();

        // expand derived: the *_d sets contain host columns only
        let mut post_aggregation = IndexSet::new();
        let mut groups_d = derived::expand_derived(self.cube, &groups, &mut post_aggregation);
        let mut other_dims_d =
            derived::expand_derived(self.cube, &other_dims, &mut post_aggregation);
        other_dims_d.retain(|c| !groups_d.contains(c));

        let mut dimensions_d = groups_d.clone();
        dimensions_d.extend(other_dims_d);

        let cuboid = self.catalog.identify(self.cube, &dimensions_d, &metrics)?;
        tracing::info!(
            cube = %self.cube.name,
            cuboid = cuboid.id,
            ?groups_d,
            "cuboid identified"
        );

        let single_values_d =
            derived::find_single_value_columns(requirement.filter.as_ref(), self.cube)?;
        let needs_aggregation =
            decision::needs_storage_aggregation(&cuboid, &groups_d, &single_values_d);

        // replace derived columns in the filter with host columns;
        // loosened columns must join the effective grouping set
        let mut loosened = IndexSet::new();
        let filter_d = match &requirement.filter {
            Some(filter) => Some(
                translate::translate_derived(filter, self.cube, self.lookups, &mut loosened)?
                    .into_owned(),
            ),
            None => None,
        };
        groups_d.extend(loosened.iter().cloned());

        let limit_possible = decision::storage_limit_possible(
            &cuboid,
            &requirement.group_by,
            &post_aggregation,
            &groups_d,
            requirement.filter.as_ref(),
            &loosened,
            &requirement.aggregations,
            requirement.has_sort,
        );
        let storage_limit = match (limit_possible, requirement.limit) {
            (true, Some(limit)) => Some(decision::final_push_down_limit(
                limit,
                ready_segments.len(),
                &self.config.query,
            )),
            _ => None,
        };

        let threshold = decision::memory_row_threshold(
            &dimensions_d,
            &metrics,
            self.config.query.mem_budget_bytes,
        );

        Ok(PlanBuilder::new(cuboid, dimensions_d, metrics)
            .filter(filter_d)
            .groups(groups_d)
            .needs_storage_aggregation(needs_aggregation)
            .storage_limit(storage_limit)
            .memory_row_threshold(threshold)
            .build())
    }

    /// Plan and open one scanner per ready segment, concatenated in
    /// segment order. No ready segments yields an empty stream, not an
    /// error.
    pub fn search(
        &self,
        requirement: &QueryRequirement,
        ready_segments: &[SegmentInfo],
        factory: &dyn ScannerFactory,
    ) -> Result<SequentialTupleIterator> {
        let plan = self.plan(requirement, ready_segments)?;
        open_segment_scanners(factory, ready_segments, &plan)
    }
}
