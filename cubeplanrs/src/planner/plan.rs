//! The physical scan plan.
//!
//! A `Plan` is an immutable value owned by one query execution. It is
//! assembled once, through `PlanBuilder`, after every planning decision
//! has been made; nothing mutates it afterwards.

use indexmap::IndexSet;

use crate::catalog::CuboidRef;
use crate::filter::FilterTree;
use crate::models::{ColumnRef, MeasureFunction};

#[derive(Debug, Clone)]
pub struct Plan {
    pub cuboid: CuboidRef,
    /// Host-level dimensions to scan (derived columns already expanded).
    pub dimensions: IndexSet<ColumnRef>,
    pub metrics: Vec<MeasureFunction>,
    /// Translated filter, host columns only.
    pub filter: Option<FilterTree>,
    /// Effective grouping set, including columns forced in by loosened
    /// filter rewrites.
    pub groups: IndexSet<ColumnRef>,
    pub needs_storage_aggregation: bool,
    pub limit_push_down_enabled: bool,
    /// Row cap handed to storage when push-down is enabled.
    pub storage_limit: Option<usize>,
    /// Hard row cap guarding memory-hungry measures; `None` = unbounded.
    pub memory_row_threshold: Option<usize>,
}

pub struct PlanBuilder {
    cuboid: CuboidRef,
    dimensions: IndexSet<ColumnRef>,
    metrics: Vec<MeasureFunction>,
    filter: Option<FilterTree>,
    groups: IndexSet<ColumnRef>,
    needs_storage_aggregation: bool,
    storage_limit: Option<usize>,
    memory_row_threshold: Option<usize>,
}

impl PlanBuilder {
    pub fn new(
        cuboid: CuboidRef,
        dimensions: IndexSet<ColumnRef>,
        metrics: Vec<MeasureFunction>,
    ) -> Self {
        Self {
            cuboid,
            dimensions,
            metrics,
            filter: None,
            groups: IndexSet::new(),
            needs_storage_aggregation: true,
            storage_limit: None,
            memory_row_threshold: None,
        }
    }

    pub fn filter(mut self, filter: Option<FilterTree>) -> Self {
        self.filter = filter;
        self
    }

    pub fn groups(mut self, groups: IndexSet<ColumnRef>) -> Self {
        self.groups = groups;
        self
    }

    pub fn needs_storage_aggregation(mut self, needs: bool) -> Self {
        self.needs_storage_aggregation = needs;
        self
    }

    pub fn storage_limit(mut self, limit: Option<usize>) -> Self {
        self.storage_limit = limit;
        self
    }

    pub fn memory_row_threshold(mut self, threshold: Option<usize>) -> Self {
        self.memory_row_threshold = threshold;
        self
    }

    pub fn build(self) -> Plan {
        Plan {
            cuboid: self.cuboid,
            dimensions: self.dimensions,
            metrics: self.metrics,
            filter: self.filter,
            groups: self.groups,
            needs_storage_aggregation: self.needs_storage_aggregation,
            limit_push_down_enabled: self.storage_limit.is_some(),
            storage_limit: self.storage_limit,
            memory_row_threshold: self.memory_row_threshold,
        }
    }
}
