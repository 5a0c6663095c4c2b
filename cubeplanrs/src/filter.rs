//! Filter predicate trees.
//!
//! A filter is a tree of comparison leaves under logical nodes. The
//! planner rewrites comparison nodes (derived-column translation) and
//! inspects the tree for single-value columns and storage evaluability;
//! it never evaluates predicates itself.

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::ColumnRef;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompareOp {
    Eq,
    Neq,
    Gt,
    Gte,
    Lt,
    Lte,
    In,
    NotIn,
    Like,
    IsNull,
    IsNotNull,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogicalOp {
    And,
    Or,
    Not,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "node")]
pub enum FilterTree {
    Compare {
        /// Absent when the left side is an expression rather than a plain
        /// column; such comparisons cannot be evaluated by storage.
        column: Option<ColumnRef>,
        op: CompareOp,
        #[serde(default)]
        values: Vec<Value>,
    },
    Logical {
        op: LogicalOp,
        children: Vec<FilterTree>,
    },
}

impl FilterTree {
    pub fn compare(column: ColumnRef, op: CompareOp, values: Vec<Value>) -> Self {
        FilterTree::Compare {
            column: Some(column),
            op,
            values,
        }
    }

    pub fn and(children: Vec<FilterTree>) -> Self {
        FilterTree::Logical {
            op: LogicalOp::And,
            children,
        }
    }

    pub fn or(children: Vec<FilterTree>) -> Self {
        FilterTree::Logical {
            op: LogicalOp::Or,
            children,
        }
    }

    /// Collect every column the tree references, in first-seen order.
    pub fn collect_columns(&self, out: &mut IndexSet<ColumnRef>) {
        match self {
            FilterTree::Compare { column, .. } => {
                if let Some(col) = column {
                    out.insert(col.clone());
                }
            }
            FilterTree::Logical { children, .. } => {
                for child in children {
                    child.collect_columns(out);
                }
            }
        }
    }

    /// Whether storage can evaluate the whole tree. A comparison without
    /// a plain column, or without values for a value-carrying operator,
    /// leaves a residual post-scan predicate.
    pub fn is_evaluable_recursively(&self) -> bool {
        match self {
            FilterTree::Compare { column, op, values } => {
                column.is_some()
                    && (matches!(op, CompareOp::IsNull | CompareOp::IsNotNull)
                        || !values.is_empty())
            }
            FilterTree::Logical { children, .. } => {
                children.iter().all(FilterTree::is_evaluable_recursively)
            }
        }
    }
}
