//! Cuboid lattice lookup contract.
//!
//! The physical lattice enumeration lives outside this crate; the planner
//! only asks for the minimal precomputed cuboid covering a dimension and
//! metric set.

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::{ColumnRef, CubeModel, MeasureFunction};

/// One precomputed aggregate table. `columns` carries the cuboid's fixed
/// column ordering, which the limit push-down decision depends on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CuboidRef {
    pub id: u64,
    pub columns: Vec<ColumnRef>,
}

pub trait CuboidCatalog {
    /// Return the minimal precomputed cuboid covering the given dimension
    /// and metric set under the cube's validated aggregation-group
    /// lattice.
    fn identify(
        &self,
        cube: &CubeModel,
        dimensions: &IndexSet<ColumnRef>,
        metrics: &[MeasureFunction],
    ) -> Result<CuboidRef>;
}
