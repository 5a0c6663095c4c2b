use cubeplan::config::PlannerConfig;
use cubeplan::load_and_validate;
use cubeplan::models::{AggregationGroup, CubeModel, SelectRule};
use cubeplan::registry::CubeRegistry;
use cubeplan::CubeplanError;

const GOOD_CUBE: &str = r#"
name: sales
dimensions:
  - column: { table: fact, name: country_id }
  - column: { table: fact, name: city }
measures:
  - name: total_price
    function:
      expression: SUM
      parameter: fact.price
aggregation_groups:
  - includes: [country_id, city]
    select_rule:
      mandatory_dims: [country_id]
"#;

const OVERWIDE_CUBE: &str = r#"
name: wide
aggregation_groups:
  - includes: [a, b, c, d, e]
    select_rule: {}
"#;

#[test]
fn loads_cube_descriptors_from_directory() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("sales.yml"), GOOD_CUBE).unwrap();

    let registry = CubeRegistry::load_from_dir(dir.path()).unwrap();
    let cube = registry.get_cube("sales").unwrap();
    assert_eq!(cube.dimensions.len(), 2);
    assert_eq!(cube.measures[0].function.expression, "SUM");
    assert!(registry.validate_registry(&PlannerConfig::default()).is_ok());
}

#[test]
fn missing_directory_is_an_error() {
    let err = CubeRegistry::load_from_dir("/nonexistent/cubes").unwrap_err();
    assert!(matches!(err, CubeplanError::Validation(_)));
}

#[test]
fn invalid_design_blocks_activation() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("wide.yml"), OVERWIDE_CUBE).unwrap();

    // 2^5 = 32 combinations against a ceiling of 16
    let config = PlannerConfig::from_toml("[cube]\nmax_combination = 16\n").unwrap();
    let err = load_and_validate(dir.path(), &config).unwrap_err();
    match err {
        CubeplanError::Validation(message) => {
            assert!(message.contains("cube wide"));
            assert!(message.contains("too many combinations"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn from_parts_registry_validates_in_memory() {
    let cube = CubeModel {
        name: "inline".to_string(),
        aggregation_groups: vec![AggregationGroup {
            includes: Some(vec!["a".to_string(), "b".to_string()]),
            select_rule: Some(SelectRule::default()),
        }],
        dimensions: Vec::new(),
        measures: Vec::new(),
        max_combination: None,
        description: None,
    };
    let registry = CubeRegistry::from_parts(vec![cube]);
    assert!(registry.validate_registry(&PlannerConfig::default()).is_ok());
    assert!(registry.get_cube("missing").is_none());
}
