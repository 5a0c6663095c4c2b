pub mod catalog;
pub mod config;
pub mod error;
pub mod filter;
pub mod lookup;
pub mod models;
pub mod planner;
pub mod registry;
pub mod scan;
pub mod validation;

use std::path::Path;

use crate::error::Result;
use crate::registry::CubeRegistry;

/// Load cube descriptors from disk and validate their aggregation-group
/// design against the configured combination ceiling.
pub fn load_and_validate<P: AsRef<Path>>(
    cube_dir: P,
    config: &crate::config::PlannerConfig,
) -> Result<CubeRegistry> {
    let registry = CubeRegistry::load_from_dir(cube_dir)?;
    registry.validate_registry(config)?;
    Ok(registry)
}

pub use catalog::{CuboidCatalog, CuboidRef};
pub use config::PlannerConfig;
pub use error::{CubeplanError, Result as CubeplanResult};
pub use filter::{CompareOp, FilterTree, LogicalOp};
pub use lookup::LookupResolver;
pub use models::{
    AggregationGroup, ColumnRef, CubeModel, DerivedMapping, MeasureFunction, MeasureKind,
    QueryRequirement, SelectRule,
};
pub use planner::{Plan, StoragePlanner};
pub use scan::{ScanError, ScannerFactory, SegmentInfo, SequentialTupleIterator};
pub use validation::{validate_aggregation_groups, Severity, ValidationMessage};
