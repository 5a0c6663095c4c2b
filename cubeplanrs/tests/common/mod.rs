//! Shared fixtures: an in-memory cube design plus stub implementations of
//! the external catalog and lookup contracts.
#![allow(dead_code)]

use cubeplan::catalog::{CuboidCatalog, CuboidRef};
use cubeplan::error::Result;
use cubeplan::filter::FilterTree;
use cubeplan::lookup::LookupResolver;
use cubeplan::models::{
    ColumnRef, CubeModel, DerivedMapping, DimensionDesc, DimensionKind, MeasureDesc,
    MeasureFunction, MeasureKind,
};
use indexmap::IndexSet;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_test_writer()
        .try_init();
}

pub fn fact(name: &str) -> ColumnRef {
    ColumnRef::new("fact", name)
}

pub fn lookup(name: &str) -> ColumnRef {
    ColumnRef::new("lk", name)
}

/// A sales cube: native columns `country_id`, `city`, `price`, `user`;
/// derived `lk.country` (one-to-one on `country_id`) and `lk.region`
/// (many-to-one on `country_id`); one extended column.
pub fn sales_cube() -> CubeModel {
    CubeModel {
        name: "sales".to_string(),
        aggregation_groups: Vec::new(),
        dimensions: vec![
            DimensionDesc {
                column: fact("country_id"),
                kind: DimensionKind::Normal,
            },
            DimensionDesc {
                column: fact("city"),
                kind: DimensionKind::Normal,
            },
            DimensionDesc {
                column: lookup("country"),
                kind: DimensionKind::Derived(DerivedMapping {
                    host_columns: vec![fact("country_id")],
                    one_to_one: true,
                    lookup_table: "lk".to_string(),
                }),
            },
            DimensionDesc {
                column: lookup("region"),
                kind: DimensionKind::Derived(DerivedMapping {
                    host_columns: vec![fact("country_id")],
                    one_to_one: false,
                    lookup_table: "lk".to_string(),
                }),
            },
            DimensionDesc {
                column: fact("synthetic"),
                kind: DimensionKind::Extended,
            },
        ],
        measures: vec![
            MeasureDesc {
                name: "total_price".to_string(),
                function: MeasureFunction::new("SUM", Some("fact.price".to_string())),
                description: None,
            },
            MeasureDesc {
                name: "distinct_users".to_string(),
                function: MeasureFunction {
                    expression: "COUNT_DISTINCT".to_string(),
                    parameter: Some("fact.user".to_string()),
                    returns: MeasureKind::MemoryHungry {
                        max_serialized_bytes: 10 * 1024,
                    },
                },
                description: None,
            },
        ],
        max_combination: None,
        description: None,
    }
}

/// Catalog stub answering every identification with one fixed cuboid.
pub struct FixedCatalog {
    pub cuboid: CuboidRef,
}

impl FixedCatalog {
    pub fn with_columns(columns: Vec<ColumnRef>) -> Self {
        Self {
            cuboid: CuboidRef { id: 42, columns },
        }
    }
}

impl CuboidCatalog for FixedCatalog {
    fn identify(
        &self,
        _cube: &CubeModel,
        _dimensions: &IndexSet<ColumnRef>,
        _metrics: &[MeasureFunction],
    ) -> Result<CuboidRef> {
        Ok(self.cuboid.clone())
    }
}

/// Catalog stub that answers with exactly the requested dimensions in
/// request order: an always-exact-match lattice.
pub struct IdentityCatalog;

impl CuboidCatalog for IdentityCatalog {
    fn identify(
        &self,
        _cube: &CubeModel,
        dimensions: &IndexSet<ColumnRef>,
        _metrics: &[MeasureFunction],
    ) -> Result<CuboidRef> {
        Ok(CuboidRef {
            id: dimensions.len() as u64,
            columns: dimensions.iter().cloned().collect(),
        })
    }
}

/// Lookup stub: rewrites a derived comparison onto the first host column,
/// loosened exactly when the mapping is not one-to-one.
pub struct HostRewriteResolver;

impl LookupResolver for HostRewriteResolver {
    fn rewrite_compare(
        &self,
        _cube: &CubeModel,
        mapping: &DerivedMapping,
        compare: &FilterTree,
    ) -> Result<(FilterTree, bool)> {
        let FilterTree::Compare { op, values, .. } = compare else {
            unreachable!("only comparisons reach the lookup resolver");
        };
        let rewritten = FilterTree::Compare {
            column: Some(mapping.host_columns[0].clone()),
            op: *op,
            values: values.clone(),
        };
        Ok((rewritten, !mapping.one_to_one))
    }
}
