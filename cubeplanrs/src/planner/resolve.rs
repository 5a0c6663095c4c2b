//! Dimension and metric resolution from a query requirement.

use indexmap::IndexSet;

use crate::models::{ColumnRef, CubeModel, MeasureFunction, QueryRequirement};

/// Derive the dimension and metric sets the query implies. Pure function.
///
/// Metrics: every requested aggregation that is not dimension-as-metric,
/// swapped for the cube's canonical definition when one matches by
/// signature (the cube definition carries richer return metadata).
/// Dimensions: every referenced column except pure measure columns that
/// are neither grouped nor filtered.
pub fn resolve_dimensions_and_metrics(
    requirement: &QueryRequirement,
    cube: &CubeModel,
) -> (IndexSet<ColumnRef>, Vec<MeasureFunction>) {
    let mut metrics: Vec<MeasureFunction> = Vec::new();
    for func in &requirement.aggregations {
        if func.is_dimension_as_metric() {
            continue;
        }
        if metrics.iter().any(|m| m.same_signature(func)) {
            continue;
        }
        let resolved = cube.canonical_measure(func).cloned().unwrap_or_else(|| func.clone());
        metrics.push(resolved);
    }

    let mut dimensions = IndexSet::new();
    for column in &requirement.all_columns {
        let pure_metric = requirement.metric_columns.contains(column)
            && !(requirement.group_by.contains(column)
                || requirement.filter_columns.contains(column));
        if pure_metric {
            continue;
        }
        dimensions.insert(column.clone());
    }

    (dimensions, metrics)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MeasureDesc, MeasureKind};

    fn col(name: &str) -> ColumnRef {
        ColumnRef::new("fact", name)
    }

    fn cube_with_measure(function: MeasureFunction) -> CubeModel {
        CubeModel {
            name: "c".to_string(),
            aggregation_groups: Vec::new(),
            dimensions: Vec::new(),
            measures: vec![MeasureDesc {
                name: "m".to_string(),
                function,
                description: None,
            }],
            max_combination: None,
            description: None,
        }
    }

    #[test]
    fn canonical_measure_replaces_requested() {
        let mut canonical = MeasureFunction::new("COUNT_DISTINCT", Some("fact.user".to_string()));
        canonical.returns = MeasureKind::MemoryHungry {
            max_serialized_bytes: 16384,
        };
        let cube = cube_with_measure(canonical.clone());

        let requirement = QueryRequirement {
            aggregations: vec![MeasureFunction::new(
                "COUNT_DISTINCT",
                Some("fact.user".to_string()),
            )],
            ..Default::default()
        };
        let (_, metrics) = resolve_dimensions_and_metrics(&requirement, &cube);
        assert_eq!(metrics, vec![canonical]);
    }

    #[test]
    fn unknown_aggregation_kept_as_is() {
        let cube = cube_with_measure(MeasureFunction::new("SUM", Some("fact.price".to_string())));
        let requested = MeasureFunction::new("MAX", Some("fact.price".to_string()));
        let requirement = QueryRequirement {
            aggregations: vec![requested.clone()],
            ..Default::default()
        };
        let (_, metrics) = resolve_dimensions_and_metrics(&requirement, &cube);
        assert_eq!(metrics, vec![requested]);
    }

    #[test]
    fn dimension_as_metric_omitted_from_metrics() {
        let cube = cube_with_measure(MeasureFunction::new("SUM", Some("fact.price".to_string())));
        let mut requested = MeasureFunction::new("MAX", Some("fact.cal_dt".to_string()));
        requested.returns = MeasureKind::DimensionAsMetric;
        let requirement = QueryRequirement {
            aggregations: vec![requested],
            ..Default::default()
        };
        let (_, metrics) = resolve_dimensions_and_metrics(&requirement, &cube);
        assert!(metrics.is_empty());
    }

    #[test]
    fn pure_measure_columns_are_not_dimensions() {
        let cube = cube_with_measure(MeasureFunction::new("SUM", Some("fact.price".to_string())));
        let requirement = QueryRequirement {
            group_by: vec![col("region")],
            all_columns: vec![col("region"), col("price"), col("state")],
            metric_columns: vec![col("price"), col("state")],
            filter_columns: vec![col("state")],
            ..Default::default()
        };
        let (dimensions, _) = resolve_dimensions_and_metrics(&requirement, &cube);
        // price is a pure measure input; state is filtered so it stays
        assert_eq!(
            dimensions.into_iter().collect::<Vec<_>>(),
            vec![col("region"), col("state")]
        );
    }
}
