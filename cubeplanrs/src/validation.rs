//! Structural validation of a cube's aggregation groups.
//!
//! Every group is checked against the mandatory/hierarchy/joint overlap
//! rules and its admitted combination count is bounded by the configured
//! ceiling. Validation is cumulative: a failing group never halts the
//! cube, and independent checks within a group each append their own
//! message. An `Error` result blocks cube activation.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::models::{AggregationGroup, CubeModel, SelectRule};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Warn,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationMessage {
    pub severity: Severity,
    pub message: String,
}

impl ValidationMessage {
    fn error(message: String) -> Self {
        Self {
            severity: Severity::Error,
            message,
        }
    }
}

/// Dimension name with case-insensitive ordering and equality, keeping
/// the original spelling for messages. Scoped to this module; everywhere
/// else columns compare exactly.
#[derive(Debug, Clone, Eq)]
struct CiName(String);

impl PartialEq for CiName {
    fn eq(&self, other: &Self) -> bool {
        self.0.eq_ignore_ascii_case(&other.0)
    }
}

impl Ord for CiName {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0
            .to_ascii_lowercase()
            .cmp(&other.0.to_ascii_lowercase())
    }
}

impl PartialOrd for CiName {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

type CiSet = BTreeSet<CiName>;

fn ci_set<'a>(names: impl IntoIterator<Item = &'a String>) -> CiSet {
    names.into_iter().map(|n| CiName(n.clone())).collect()
}

fn render(set: &CiSet) -> String {
    let names: Vec<&str> = set.iter().map(|n| n.0.as_str()).collect();
    format!("[{}]", names.join(", "))
}

/// Validate every aggregation group of the cube against the combination
/// ceiling. Groups are identified in messages by their stable position in
/// the descriptor list.
pub fn validate_aggregation_groups(cube: &CubeModel, max_combination: u64) -> Vec<ValidationMessage> {
    let ceiling = cube.max_combination.unwrap_or(max_combination);
    let mut out = Vec::new();
    for (index, group) in cube.aggregation_groups.iter().enumerate() {
        validate_group(index, group, ceiling, &mut out);
    }
    out
}

fn validate_group(
    index: usize,
    group: &AggregationGroup,
    ceiling: u64,
    out: &mut Vec<ValidationMessage>,
) {
    let Some(includes) = &group.includes else {
        out.push(ValidationMessage::error(format!(
            "Aggregation group {index} 'includes' field not set"
        )));
        return;
    };
    let Some(rule) = &group.select_rule else {
        out.push(ValidationMessage::error(format!(
            "Aggregation group {index} 'select rule' field not set"
        )));
        return;
    };

    let include_dims = ci_set(includes);
    let mandatory_dims = ci_set(&rule.mandatory_dims);
    let hierarchy_dims = ci_set(rule.hierarchy_dims.iter().flatten());
    let joint_dims = ci_set(rule.joint_dims.iter().flatten());

    let mut combination: u128 = 1;
    for chain in &rule.hierarchy_dims {
        combination = combination.saturating_mul(chain.len() as u128 + 1);
    }
    for _ in &rule.joint_dims {
        combination = combination.saturating_mul(2);
    }

    let not_included: CiSet = mandatory_dims
        .iter()
        .chain(hierarchy_dims.iter())
        .chain(joint_dims.iter())
        .filter(|dim| !include_dims.contains(dim))
        .cloned()
        .collect();
    if !not_included.is_empty() {
        out.push(ValidationMessage::error(format!(
            "Aggregation group {index} 'includes' dimensions not include all the dimensions: {}",
            render(&not_included)
        )));
        return;
    }

    let normal_dims: CiSet = include_dims
        .iter()
        .filter(|dim| {
            !mandatory_dims.contains(dim)
                && !hierarchy_dims.contains(dim)
                && !joint_dims.contains(dim)
        })
        .cloned()
        .collect();
    combination = combination.saturating_mul(1u128 << normal_dims.len().min(127));

    let mandatory_hierarchy: CiSet = mandatory_dims.intersection(&hierarchy_dims).cloned().collect();
    if !mandatory_hierarchy.is_empty() {
        out.push(ValidationMessage::error(format!(
            "Aggregation group {index} mandatory dimension has overlap with hierarchy dimension: {}",
            render(&mandatory_hierarchy)
        )));
        return;
    }
    let mandatory_joint: CiSet = mandatory_dims.intersection(&joint_dims).cloned().collect();
    if !mandatory_joint.is_empty() {
        out.push(ValidationMessage::error(format!(
            "Aggregation group {index} mandatory dimension has overlap with joint dimension: {}",
            render(&mandatory_joint)
        )));
        return;
    }

    // Per-joint violations append their message and move on to the next
    // joint; sibling joints must still be reported.
    for joint in &rule.joint_dims {
        let one_joint = ci_set(joint);
        if one_joint.len() < 2 {
            out.push(ValidationMessage::error(format!(
                "Aggregation group {index} require at least 2 dimensions in a joint: {}",
                render(&one_joint)
            )));
            continue;
        }

        let mut overlap_hierarchies = 0;
        for chain in &rule.hierarchy_dims {
            let share: CiSet = one_joint.intersection(&ci_set(chain)).cloned().collect();
            if !share.is_empty() {
                overlap_hierarchies += 1;
            }
            if share.len() > 1 {
                out.push(ValidationMessage::error(format!(
                    "Aggregation group {index} joint dimensions has overlap with more than 1 dimensions in same hierarchy: {}",
                    render(&share)
                )));
            }
        }
        if overlap_hierarchies > 1 {
            out.push(ValidationMessage::error(format!(
                "Aggregation group {index} joint dimensions has overlap with more than 1 hierarchies"
            )));
        }
    }

    let mut existing = CiSet::new();
    let mut overlap = CiSet::new();
    for joint in &rule.joint_dims {
        let one_joint = ci_set(joint);
        overlap.extend(one_joint.intersection(&existing).cloned());
        existing.extend(one_joint);
    }
    if !overlap.is_empty() {
        out.push(ValidationMessage::error(format!(
            "Aggregation group {index} a dimension exists in more than one joint: {}",
            render(&overlap)
        )));
        return;
    }

    if combination > ceiling as u128 {
        out.push(ValidationMessage::error(format!(
            "Aggregation group {index} has too many combinations, current combination is {combination}, \
             max allowed combination is {ceiling}; use 'mandatory'/'hierarchy'/'joint' to optimize, \
             or raise 'cube.max_combination' in the planner config"
        )));
    }
}

/// Admitted combination count of a well-formed select rule:
/// `Π(chain_len + 1) × 2^joints × 2^normal_dims`.
pub fn combination_count(includes: &[String], rule: &SelectRule) -> u128 {
    let include_dims = ci_set(includes);
    let mandatory_dims = ci_set(&rule.mandatory_dims);
    let hierarchy_dims = ci_set(rule.hierarchy_dims.iter().flatten());
    let joint_dims = ci_set(rule.joint_dims.iter().flatten());
    let normal = include_dims
        .iter()
        .filter(|dim| {
            !mandatory_dims.contains(dim)
                && !hierarchy_dims.contains(dim)
                && !joint_dims.contains(dim)
        })
        .count();

    let mut combination: u128 = 1;
    for chain in &rule.hierarchy_dims {
        combination = combination.saturating_mul(chain.len() as u128 + 1);
    }
    combination = combination.saturating_mul(1u128 << (rule.joint_dims.len() as u32).min(127));
    combination.saturating_mul(1u128 << (normal as u32).min(127))
}
