//! Cube design metadata and the structural query requirement.
//!
//! These types describe a cube's aggregation design (aggregation groups,
//! dimension descriptors, measure definitions) as authored by design
//! tooling. They are validated before activation and never mutated by the
//! planner.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::filter::FilterTree;

/// Opaque column identity: a table alias plus a column name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ColumnRef {
    pub table: String,
    pub name: String,
}

impl ColumnRef {
    pub fn new(table: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for ColumnRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.table, self.name)
    }
}

/// One unit of the cube's aggregation design. Both fields are optional so
/// that an incomplete descriptor deserializes and is rejected by the
/// validator with a message, rather than failing to load.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AggregationGroup {
    pub includes: Option<Vec<String>>,
    pub select_rule: Option<SelectRule>,
}

/// Structural constraints bounding which dimension subsets materialize.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SelectRule {
    #[serde(default)]
    pub mandatory_dims: Vec<String>,
    /// Ordered dimension-name chains, coarse to fine.
    #[serde(default)]
    pub hierarchy_dims: Vec<Vec<String>>,
    /// Dimension-name sets that always materialize together.
    #[serde(default)]
    pub joint_dims: Vec<Vec<String>>,
}

/// How a dimension is physically sourced.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum DimensionKind {
    /// Stored directly on the fact table.
    #[default]
    Normal,
    /// Sourced from a lookup table, resolved to fact-table host columns.
    Derived(DerivedMapping),
    /// Synthetic column; present in results but never filterable.
    Extended,
}

/// Host-column mapping for a derived dimension.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DerivedMapping {
    /// Fact-table columns the derived dimension resolves to, in lookup
    /// join-key order.
    pub host_columns: Vec<ColumnRef>,
    /// True when each derived value corresponds to exactly one host tuple.
    pub one_to_one: bool,
    pub lookup_table: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DimensionDesc {
    pub column: ColumnRef,
    #[serde(default)]
    pub kind: DimensionKind,
}

/// Runtime capability of a measure's return representation. A closed set;
/// planning logic dispatches on it with plain matches.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum MeasureKind {
    #[default]
    Basic,
    /// Unbounded runtime representation, e.g. approximate-distinct
    /// sketches. Carries the worst-case serialized size for memory
    /// budgeting.
    MemoryHungry { max_serialized_bytes: usize },
    /// The aggregation's value is a plain dimension (e.g. max over a
    /// dimension column); not a faithful cuboid substitute.
    DimensionAsMetric,
}

/// An aggregation function as requested by a query or defined on the cube.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeasureFunction {
    /// Function name, e.g. `SUM` or `COUNT_DISTINCT`.
    pub expression: String,
    /// Parameter column or literal, if any.
    pub parameter: Option<String>,
    #[serde(default)]
    pub returns: MeasureKind,
}

impl MeasureFunction {
    pub fn new(expression: impl Into<String>, parameter: Option<String>) -> Self {
        Self {
            expression: expression.into(),
            parameter,
            returns: MeasureKind::Basic,
        }
    }

    /// Signature equality: expression and parameter, ignoring the return
    /// capability. Canonical-measure substitution matches on this.
    pub fn same_signature(&self, other: &MeasureFunction) -> bool {
        self.expression.eq_ignore_ascii_case(&other.expression) && self.parameter == other.parameter
    }

    pub fn is_memory_hungry(&self) -> bool {
        matches!(self.returns, MeasureKind::MemoryHungry { .. })
    }

    pub fn is_dimension_as_metric(&self) -> bool {
        self.returns == MeasureKind::DimensionAsMetric
    }
}

impl fmt::Display for MeasureFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}({})",
            self.expression,
            self.parameter.as_deref().unwrap_or("")
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeasureDesc {
    pub name: String,
    pub function: MeasureFunction,
    pub description: Option<String>,
}

/// A cube's full aggregation design.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CubeModel {
    pub name: String,
    #[serde(default)]
    pub aggregation_groups: Vec<AggregationGroup>,
    #[serde(default)]
    pub dimensions: Vec<DimensionDesc>,
    #[serde(default)]
    pub measures: Vec<MeasureDesc>,
    /// Per-cube override of the configured combination ceiling.
    pub max_combination: Option<u64>,
    pub description: Option<String>,
}

impl CubeModel {
    pub fn dimension_kind(&self, column: &ColumnRef) -> Option<&DimensionKind> {
        self.dimensions
            .iter()
            .find(|d| &d.column == column)
            .map(|d| &d.kind)
    }

    /// Host-column mapping when the column is a derived dimension.
    pub fn host_mapping(&self, column: &ColumnRef) -> Option<&DerivedMapping> {
        match self.dimension_kind(column) {
            Some(DimensionKind::Derived(mapping)) => Some(mapping),
            _ => None,
        }
    }

    pub fn is_extended(&self, column: &ColumnRef) -> bool {
        matches!(self.dimension_kind(column), Some(DimensionKind::Extended))
    }

    /// The cube's own definition of an aggregation, matched by function
    /// signature. The cube definition carries richer return metadata
    /// (e.g. sketch sizing) than a bare query-side function.
    pub fn canonical_measure(&self, func: &MeasureFunction) -> Option<&MeasureFunction> {
        self.measures
            .iter()
            .map(|m| &m.function)
            .find(|f| f.same_signature(func))
    }
}

/// Structural query requirement, as produced by the (external) SQL layer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueryRequirement {
    pub cube: String,
    #[serde(default)]
    pub group_by: Vec<ColumnRef>,
    pub filter: Option<FilterTree>,
    /// Every column the query references anywhere.
    #[serde(default)]
    pub all_columns: Vec<ColumnRef>,
    /// Columns referenced only as measure inputs.
    #[serde(default)]
    pub metric_columns: Vec<ColumnRef>,
    /// Columns referenced by the filter.
    #[serde(default)]
    pub filter_columns: Vec<ColumnRef>,
    #[serde(default)]
    pub aggregations: Vec<MeasureFunction>,
    #[serde(default)]
    pub has_sort: bool,
    pub limit: Option<usize>,
}
