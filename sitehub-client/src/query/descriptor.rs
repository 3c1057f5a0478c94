//! Protocol-agnostic query descriptor.
//!
//! The descriptor is the translator's output: field filters with boolean
//! grouping, ordered sort keys, the selected field set, and paging limits.
//! It is owned by the calling collection for the duration of one query
//! build and is not mutated after translation returns.

use serde::{Deserialize, Serialize};

use super::expr::Value;

/// Comparison criteria of a single filter item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FilterCriteria {
    Equal,
    NotEqual,
    GreaterThan,
    GreaterThanOrEqual,
    LessThan,
    LessThanOrEqual,
}

impl FilterCriteria {
    /// Wire token of this criteria in the remote filter grammar.
    pub fn token(&self) -> &'static str {
        match self {
            FilterCriteria::Equal => "eq",
            FilterCriteria::NotEqual => "ne",
            FilterCriteria::GreaterThan => "gt",
            FilterCriteria::GreaterThanOrEqual => "ge",
            FilterCriteria::LessThan => "lt",
            FilterCriteria::LessThanOrEqual => "le",
        }
    }
}

/// Operator concatenating a filter node with its siblings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConcatOperator {
    And,
    Or,
}

impl ConcatOperator {
    pub fn token(&self) -> &'static str {
        match self {
            ConcatOperator::And => "and",
            ConcatOperator::Or => "or",
        }
    }
}

/// Sort direction of one order-by key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderDirection {
    Ascending,
    Descending,
}

impl OrderDirection {
    pub fn token(&self) -> &'static str {
        match self {
            OrderDirection::Ascending => "asc",
            OrderDirection::Descending => "desc",
        }
    }
}

/// Single field/criteria/value leaf of the filter tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterItem {
    /// Remote field name, or a mapped function token used as a field.
    pub field: String,
    pub criteria: FilterCriteria,
    pub value: Value,
    /// Operator linking this node to its siblings. `None` for a node with
    /// no stamped operator (sole node, or first position).
    pub concat: Option<ConcatOperator>,
}

/// Nested ordered collection of filter nodes sharing a concatenation
/// operator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FiltersGroup {
    pub filters: Vec<FilterNode>,
    /// Operator linking the group itself to its siblings.
    pub concat: Option<ConcatOperator>,
}

impl FiltersGroup {
    /// The operator stamped on this group's children. Children of a
    /// finalized group are always stamped uniformly.
    pub fn children_concat(&self) -> Option<ConcatOperator> {
        self.filters.first().and_then(|node| node.concat())
    }
}

/// Node of the descriptor's filter tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FilterNode {
    Item(FilterItem),
    Group(FiltersGroup),
}

impl FilterNode {
    /// Operator linking this node to its siblings.
    pub fn concat(&self) -> Option<ConcatOperator> {
        match self {
            FilterNode::Item(item) => item.concat,
            FilterNode::Group(group) => group.concat,
        }
    }

    pub(crate) fn set_concat(&mut self, concat: ConcatOperator) {
        match self {
            FilterNode::Item(item) => item.concat = Some(concat),
            FilterNode::Group(group) => group.concat = Some(concat),
        }
    }
}

/// One sort key; earlier entries are higher priority.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderByItem {
    pub field: String,
    pub direction: OrderDirection,
}

/// Normalized, protocol-agnostic representation of a query: filters,
/// sort keys, selected fields, and paging limits.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryDescriptor {
    pub filters: Vec<FilterNode>,
    pub order_by: Vec<OrderByItem>,
    /// Selected field names; unique, insertion order preserved.
    pub fields: Vec<String>,
    /// Result count bound. `Some(1)` is the canonical encoding of a
    /// first-match request.
    pub top: Option<u32>,
    /// Result offset.
    pub skip: Option<u32>,
}

impl QueryDescriptor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a selected field, keeping the set unique and ordered.
    pub(crate) fn add_field(&mut self, name: String) {
        if !self.fields.contains(&name) {
            self.fields.push(name);
        }
    }
}
